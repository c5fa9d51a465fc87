#![forbid(unsafe_code)]

//! Sortable, searchable report tables.
//!
//! A [`ReportTable`] pairs one report's spec with the case rows of one
//! cluster. Cells are rendered by [`render_cell`] with a fixed precedence:
//!
//! 1. the field's `_pretty` companion, when present
//! 2. the summary column, as a key/value table
//! 3. the action column, as the case action menu
//! 4. the raw field value
//! 5. a placeholder dash
//!
//! Ordering and search happen client-side over the raw values, the way the
//! browser table plugin does it.

use std::cmp::Ordering;

use druid_core::report::{ACTION_DATUM, ID_DATUM, SUMMARY_DATUM};
use druid_core::{CaseAction, CaseRow, ClusterId, ColumnType, ReportSpec, SortDirection, SortOrder};
use druid_i18n::Translator;
use serde_json::{Map, Value};

use crate::dom::{Element, Node};

/// Rendered for absent fields.
pub const PLACEHOLDER: &str = "-";

/// Id of the table element for `report` on `cluster`.
#[must_use]
pub fn table_id(cluster: &ClusterId, report: &str) -> String {
    format!("{report}_table_{cluster}")
}

/// Id of the row element for case `case_id`.
#[must_use]
pub fn row_id(cluster: &ClusterId, report: &str, case_id: impl std::fmt::Display) -> String {
    format!("{cluster}_{report}_{case_id}")
}

/// What a single cell shows.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Server pre-rendered markup.
    Markup(String),
    /// Key/value table; values are markup when they came from `_pretty`.
    Summary {
        entries: Vec<(String, String)>,
        pretty: bool,
    },
    /// Case action menu entries.
    Actions(Vec<CaseAction>),
    /// Plain value.
    Value(String),
    Placeholder,
}

impl CellContent {
    /// Text the cell displays, without markup structure.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Markup(s) | Self::Value(s) => s.clone(),
            Self::Summary { entries, .. } => entries
                .iter()
                .map(|(k, v)| format!("{k} {v}"))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Actions(actions) => actions
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Self::Placeholder => PLACEHOLDER.to_owned(),
        }
    }
}

/// Plain text of a JSON value: strings unquoted, everything else as JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => PLACEHOLDER.to_owned(),
        other => other.to_string(),
    }
}

fn summary_entries(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter().map(|(k, v)| (k.clone(), value_text(v))).collect()
}

/// Decide what the `datum` cell of `row` shows.
#[must_use]
pub fn render_cell(row: &CaseRow, datum: &str, analyst: Option<&str>) -> CellContent {
    if let Some(pretty) = row.pretty(datum) {
        if datum == SUMMARY_DATUM
            && let Value::Object(map) = pretty
        {
            return CellContent::Summary {
                entries: summary_entries(map),
                pretty: true,
            };
        }
        return CellContent::Markup(value_text(pretty));
    }
    if datum == SUMMARY_DATUM
        && let Some(map) = row.summary()
    {
        return CellContent::Summary {
            entries: summary_entries(map),
            pretty: false,
        };
    }
    if datum == ACTION_DATUM {
        return CellContent::Actions(CaseAction::available(row, analyst));
    }
    match row.field(datum) {
        Some(value) => CellContent::Value(value_text(value)),
        None => CellContent::Placeholder,
    }
}

fn summary_element(entries: &[(String, String)], pretty: bool) -> Element {
    Element::new("table")
        .with_class("not-table")
        .with_children(entries.iter().map(|(key, value)| {
            let td = Element::new("td");
            let td = if pretty {
                td.with_markup(value.clone())
            } else {
                td.with_text(value.clone())
            };
            Element::new("tr")
                .with_child(Element::new("th").with_text(key.clone()))
                .with_child(td)
        }))
}

/// Context menu of case actions for one row.
#[must_use]
pub fn action_menu(row: &CaseRow, actions: &[CaseAction], tr: &Translator) -> Element {
    let case_id = row.id().map(|id| id.to_string()).unwrap_or_default();
    Element::new("div")
        .with_class("dropdown")
        .with_child(
            Element::new("button")
                .with_class("btn btn-sm btn-outline-secondary dropdown-toggle")
                .with_attr("type", "button")
                .with_attr("data-bs-toggle", "dropdown")
                .with_attr("aria-expanded", "false")
                .with_text(tr.text("ACTION")),
        )
        .with_child(
            Element::new("ul")
                .with_class("dropdown-menu")
                .with_children(actions.iter().map(|action| {
                    Element::new("li").with_child(
                        Element::new("a")
                            .with_class("dropdown-item")
                            .with_attr("href", "#")
                            .with_attr("data-case-action", action.as_str())
                            .with_attr("data-case-id", case_id.clone())
                            .with_text(tr.text(action.label_key())),
                    )
                })),
        )
}

/// Ordering key of one cell.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(row: &CaseRow, datum: &str, column_type: ColumnType) -> Self {
        let Some(value) = row.field(datum) else {
            return Self::Missing;
        };
        if column_type == ColumnType::Number || datum == ID_DATUM {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            if let Some(n) = number {
                return Self::Number(n);
            }
        }
        Self::Text(value_text(value).to_lowercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

/// One report's table for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    cluster: ClusterId,
    report: String,
    spec: ReportSpec,
    rows: Vec<CaseRow>,
    order: SortOrder,
    search: String,
    analyst: Option<String>,
}

impl ReportTable {
    pub fn new(
        cluster: ClusterId,
        report: impl Into<String>,
        spec: ReportSpec,
        rows: Vec<CaseRow>,
        order: SortOrder,
    ) -> Self {
        let mut table = Self {
            cluster,
            report: report.into(),
            order: spec.default_sort(),
            spec,
            rows,
            search: String::new(),
            analyst: None,
        };
        table.set_order(order);
        table
    }

    /// Analyst the action menu is computed for.
    #[must_use]
    pub fn with_analyst(mut self, analyst: Option<String>) -> Self {
        self.analyst = analyst;
        self
    }

    #[must_use]
    pub fn id(&self) -> String {
        table_id(&self.cluster, &self.report)
    }

    #[must_use]
    pub fn cluster(&self) -> &ClusterId {
        &self.cluster
    }

    #[must_use]
    pub fn report(&self) -> &str {
        &self.report
    }

    #[must_use]
    pub fn rows(&self) -> &[CaseRow] {
        &self.rows
    }

    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Number of columns including the hidden id column.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.spec.cols.len() + 1
    }

    fn column(&self, index: usize) -> Option<(&str, ColumnType, bool)> {
        match self.spec.cols.get(index) {
            Some(col) => Some((col.datum.as_str(), col.column_type, col.sortable)),
            None if index == self.spec.cols.len() => Some((ID_DATUM, ColumnType::Number, true)),
            None => None,
        }
    }

    /// Change the ordering. Orders on unknown or unsortable columns are
    /// refused and leave the current order in place.
    pub fn set_order(&mut self, order: SortOrder) -> bool {
        match self.column(order.column) {
            Some((_, _, true)) => {
                self.order = order;
                true
            }
            _ => {
                tracing::debug!(
                    table = %self.id(),
                    column = order.column,
                    "ignoring sort on unsortable column"
                );
                false
            }
        }
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    fn matches_search(&self, row: &CaseRow) -> bool {
        let terms: Vec<String> = self
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return true;
        }
        let haystack: Vec<String> = self
            .spec
            .cols
            .iter()
            .filter(|c| c.searchable)
            .map(|c| {
                row.field(&c.datum)
                    .or_else(|| row.pretty(&c.datum))
                    .map(value_text)
                    .unwrap_or_default()
                    .to_lowercase()
            })
            .collect();
        terms
            .iter()
            .all(|term| haystack.iter().any(|cell| cell.contains(term.as_str())))
    }

    /// Rows passing the search filter, in display order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&CaseRow> {
        let mut rows: Vec<&CaseRow> = self.rows.iter().filter(|r| self.matches_search(r)).collect();
        if let Some((datum, column_type, _)) = self.column(self.order.column) {
            rows.sort_by(|a, b| {
                let ord = SortKey::of(a, datum, column_type)
                    .compare(&SortKey::of(b, datum, column_type));
                match self.order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        rows
    }

    fn header(&self) -> Element {
        let mut tr = Element::new("tr");
        for (index, col) in self.spec.cols.iter().enumerate() {
            let mut th = Element::new("th").with_markup(col.title.clone());
            if !col.searchable {
                th.add_class("nosearch");
            }
            if !col.sortable {
                th.add_class("nosort");
            }
            if col.column_type == ColumnType::Number {
                th.add_class("number");
            }
            if let Some(help) = &col.help {
                th.set_attr("title", help.clone());
            }
            if index == self.order.column {
                let (class, aria) = match self.order.direction {
                    SortDirection::Asc => ("sorting_asc", "ascending"),
                    SortDirection::Desc => ("sorting_desc", "descending"),
                };
                th.add_class(class);
                th.set_attr("aria-sort", aria);
            }
            tr.push_child(th);
        }
        tr.push_child(Element::new("th").with_attr("hidden", "").with_text(ID_DATUM));
        Element::new("thead").with_child(tr)
    }

    fn cell(&self, row: &CaseRow, datum: &str, column_type: ColumnType, tr: &Translator) -> Element {
        let mut td = Element::new("td");
        if column_type == ColumnType::Number {
            td.add_class("number");
        }
        match render_cell(row, datum, self.analyst.as_deref()) {
            CellContent::Markup(markup) => td.push_child(Node::Markup(markup)),
            CellContent::Summary { entries, pretty } => {
                td.push_child(summary_element(&entries, pretty));
            }
            CellContent::Actions(actions) => td.push_child(action_menu(row, &actions, tr)),
            CellContent::Value(text) => td.push_child(Node::Text(text)),
            CellContent::Placeholder => td.push_child(Node::Text(PLACEHOLDER.into())),
        }
        td
    }

    /// Build the table element.
    #[must_use]
    pub fn to_element(&self, tr: &Translator) -> Element {
        let body = Element::new("tbody").with_children(self.visible_rows().into_iter().map(|row| {
            let id = row
                .id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_owned());
            let mut tr_el = Element::new("tr").with_id(row_id(&self.cluster, &self.report, &id));
            for col in &self.spec.cols {
                tr_el.push_child(self.cell(row, &col.datum, col.column_type, tr));
            }
            tr_el.push_child(Element::new("td").with_attr("hidden", "").with_text(id));
            tr_el
        }));
        Element::new("table")
            .with_id(self.id())
            .with_class("bursts")
            .with_attr("style", "width: 100%")
            .with_attr("data-ccf-cluster", self.cluster.as_str())
            .with_attr("data-ccf-report", self.report.clone())
            .with_child(self.header())
            .with_child(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use druid_core::ColumnSpec;
    use druid_i18n::StringTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn translator() -> Translator {
        let table: StringTable = [
            ("ACTION", "Action"),
            ("CLAIM", "Claim"),
            ("ACCEPT", "Accept"),
            ("REJECT", "Reject"),
            ("CREATE_NOTE", "Create note"),
        ]
        .into_iter()
        .collect();
        Translator::new("en", table)
    }

    fn spec() -> ReportSpec {
        ReportSpec {
            title: "Bursts".into(),
            metric: "pain".into(),
            cols: vec![
                ColumnSpec::new("account", "Account"),
                ColumnSpec::new("pain", "Pain").number().help("Relative pain"),
                ColumnSpec::new("summary", "Summary").searchable(false).sortable(false),
                ColumnSpec::new("action", "Action").searchable(false).sortable(false),
            ],
        }
    }

    fn rows() -> Vec<CaseRow> {
        vec![
            CaseRow::new().with("id", 1).with("account", "def-bob").with("pain", 1.5),
            CaseRow::new().with("id", 2).with("account", "DEF-alice").with("pain", 12),
            CaseRow::new().with("id", 3).with("account", "rrg-carol").with("pain", 4),
        ]
    }

    fn table(order: SortOrder) -> ReportTable {
        ReportTable::new(ClusterId::from("cedar"), "bursts", spec(), rows(), order).with_analyst(Some("me".into()))
    }

    #[test]
    fn pretty_wins_over_raw() {
        let row = CaseRow::new().with("foo", "raw").with("foo_pretty", "<b>nice</b>");
        assert_eq!(
            render_cell(&row, "foo", None),
            CellContent::Markup("<b>nice</b>".into())
        );
    }

    #[test]
    fn raw_then_placeholder() {
        let row = CaseRow::new().with("foo", "raw");
        assert_eq!(render_cell(&row, "foo", None), CellContent::Value("raw".into()));
        assert_eq!(render_cell(&row, "bar", None), CellContent::Placeholder);
        assert_eq!(render_cell(&row, "bar", None).display_text(), "-");
    }

    #[test]
    fn summary_column_renders_key_value_table() {
        let row = CaseRow::new().with("summary", json!({"jobs": 12, "user": "bob"}));
        let cell = render_cell(&row, "summary", None);
        assert_eq!(
            cell,
            CellContent::Summary {
                entries: vec![("jobs".into(), "12".into()), ("user".into(), "bob".into())],
                pretty: false,
            }
        );
    }

    #[test]
    fn pretty_summary_string_is_verbatim() {
        let row = CaseRow::new()
            .with("summary", json!({"jobs": 12}))
            .with("summary_pretty", "<i>12 jobs</i>");
        assert_eq!(
            render_cell(&row, "summary", None),
            CellContent::Markup("<i>12 jobs</i>".into())
        );
    }

    #[test]
    fn action_column_lists_available_actions() {
        let row = CaseRow::new().with("id", 4).with("state", "unactioned");
        assert_eq!(
            render_cell(&row, "action", Some("me")),
            CellContent::Actions(vec![
                CaseAction::Claim,
                CaseAction::Accept,
                CaseAction::Reject,
                CaseAction::Note
            ])
        );
    }

    #[test]
    fn action_column_without_analyst_offers_no_claim() {
        let row = CaseRow::new().with("id", 4).with("state", "unactioned");
        assert_eq!(
            render_cell(&row, "action", None),
            CellContent::Actions(vec![CaseAction::Accept, CaseAction::Reject, CaseAction::Note])
        );
    }

    #[test]
    fn number_column_sorts_numerically() {
        let t = table(SortOrder::descending(1));
        let ids: Vec<u64> = t.visible_rows().iter().filter_map(|r| r.id()).map(|id| id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn text_column_sorts_case_insensitively() {
        let t = table(SortOrder::ascending(0));
        let ids: Vec<u64> = t.visible_rows().iter().filter_map(|r| r.id()).map(|id| id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn unsortable_order_is_refused() {
        let mut t = table(SortOrder::ascending(2));
        assert_eq!(t.order(), SortOrder::descending(1));
        assert!(!t.set_order(SortOrder::ascending(9)));
        assert!(t.set_order(SortOrder::ascending(4)));
    }

    #[test]
    fn search_is_case_insensitive_over_searchable_columns() {
        let mut t = table(SortOrder::descending(1));
        t.set_search("def");
        assert_eq!(t.visible_rows().len(), 2);
        t.set_search("ALICE");
        assert_eq!(t.visible_rows()[0].id().map(|i| i.0), Some(2));
        t.set_search("def carol");
        assert!(t.visible_rows().is_empty());
    }

    #[test]
    fn element_carries_ids_and_header_classes() {
        let el = table(SortOrder::descending(1)).to_element(&translator());
        assert_eq!(el.id(), Some("bursts_table_cedar"));
        assert!(el.find_by_id("cedar_bursts_2").is_some());
        let html = el.to_html();
        assert!(html.contains("<th class=\"number sorting_desc\" title=\"Relative pain\" aria-sort=\"descending\">Pain</th>"));
        assert!(html.contains("<th class=\"nosearch nosort\">Summary</th>"));
        assert!(html.contains("<th hidden>id</th>"));
        assert!(html.contains("data-case-action=\"claim\""));
    }
}
