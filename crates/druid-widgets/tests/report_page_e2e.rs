//! Report page assembly E2E tests.
//!
//! Builds a dashboard page the way the runtime does (skeleton, tabs, panes,
//! accordions, tables) and checks the resulting tree and markup.
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p druid-widgets --test report_page_e2e
//! ```
//!
//! # Invariants
//!
//! 1. **Metric first**: a fresh table orders by its metric, descending
//! 2. **Missing values sort lowest**, in either direction's natural place
//! 3. **Replace in place**: rebuilding a table keeps its accordion

#![cfg(test)]

use druid_core::{CaseRow, Cluster, ClusterId, ColumnSpec, ReportSpec, SortOrder};
use druid_i18n::{StringTable, Translator};
use druid_widgets::page::{PANES_CONTAINER_ID, REFRESH_LINK_ID, TABS_CONTAINER_ID, dashboard_skeleton};
use druid_widgets::report_view::{
    accordions_id, activate_cluster, cluster_pane, cluster_tab, collapse_id, report_accordion,
    replace_table, set_expanded, tab_id,
};
use druid_widgets::{Element, ReportTable, translate_static_elements};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Test Utilities
// ============================================================================

fn translator() -> Translator {
    let table: StringTable = [
        ("ACTION", "Action"),
        ("CLAIM", "Claim"),
        ("CREATE_NOTE", "Add note"),
        ("REFRESH_CONTENT", "Refresh"),
    ]
    .into_iter()
    .collect();
    Translator::new("en", table)
}

fn spec() -> ReportSpec {
    ReportSpec {
        title: "Burst candidates".into(),
        metric: "pain".into(),
        cols: vec![
            ColumnSpec::new("account", "Account"),
            ColumnSpec::new("pain", "Pain").number(),
        ],
    }
}

fn row(id: u64, account: &str, pain: Option<f64>) -> CaseRow {
    let row = CaseRow::new().with("id", id).with("account", account);
    match pain {
        Some(p) => row.with("pain", p),
        None => row,
    }
}

fn ids(table: &ReportTable) -> Vec<u64> {
    table.visible_rows().iter().filter_map(|r| r.id()).map(|id| id.0).collect()
}

fn page_with_cedar() -> Element {
    let cedar = Cluster::new("cedar", "Cedar");
    let mut page = dashboard_skeleton();
    page.find_by_id_mut(TABS_CONTAINER_ID).unwrap().push_child(cluster_tab(&cedar));
    page.find_by_id_mut(PANES_CONTAINER_ID).unwrap().push_child(cluster_pane(&cedar.id));
    activate_cluster(&mut page, &cedar.id);
    page
}

// ============================================================================
// 1. Page assembly
// ============================================================================

#[test]
fn accordion_lands_in_the_cluster_pane_and_expands() {
    let cedar = ClusterId::from("cedar");
    let tr = translator();
    let mut page = page_with_cedar();
    let table = ReportTable::new(
        cedar.clone(),
        "bursts",
        spec(),
        vec![row(1, "def-a", Some(2.0))],
        SortOrder::descending(1),
    );
    page.find_by_id_mut(&accordions_id(&cedar))
        .unwrap()
        .push_child(report_accordion(&cedar, "bursts", "Burst candidates", table.to_element(&tr)));

    assert!(page.find_by_id(&tab_id(&cedar)).unwrap().has_class("active"));
    assert!(set_expanded(&mut page, &cedar, "bursts", true));
    assert!(page.find_by_id(&collapse_id(&cedar, "bursts")).unwrap().has_class("show"));
    assert!(page.find_by_id(&table.id()).is_some());
    assert!(!set_expanded(&mut page, &cedar, "unknown", true));
}

#[test]
fn replacing_a_table_keeps_the_accordion() {
    let cedar = ClusterId::from("cedar");
    let tr = translator();
    let mut page = page_with_cedar();
    let rows = vec![row(1, "def-a", Some(2.0)), row(2, "def-b", Some(9.0))];
    let mut table = ReportTable::new(cedar.clone(), "bursts", spec(), rows, SortOrder::descending(1));
    page.find_by_id_mut(&accordions_id(&cedar))
        .unwrap()
        .push_child(report_accordion(&cedar, "bursts", "Burst candidates", table.to_element(&tr)));
    set_expanded(&mut page, &cedar, "bursts", true);

    table.set_search("DEF-B");
    assert!(replace_table(&mut page, &cedar, "bursts", table.to_element(&tr)));

    let collapse = page.find_by_id(&collapse_id(&cedar, "bursts")).unwrap();
    assert!(collapse.has_class("show"));
    let html = collapse.to_html();
    assert!(html.contains("def-b"));
    assert!(!html.contains("def-a"));
}

#[test]
fn static_elements_are_translated() {
    let mut page = dashboard_skeleton();
    assert_eq!(translate_static_elements(&mut page, &translator()), 1);
    let link = page.find_by_id(REFRESH_LINK_ID).unwrap();
    assert!(link.to_html().contains("Refresh"));
}

// ============================================================================
// 2. Ordering and search
// ============================================================================

#[test]
fn fresh_table_orders_by_metric_with_missing_last() {
    let table = ReportTable::new(
        ClusterId::from("cedar"),
        "bursts",
        spec(),
        vec![row(1, "a", Some(2.0)), row(3, "c", None), row(2, "b", Some(9.0))],
        spec().default_sort(),
    );
    assert_eq!(table.order(), SortOrder::descending(1));
    assert_eq!(ids(&table), vec![2, 1, 3]);
}

#[test]
fn unsortable_order_is_refused() {
    let mut spec = spec();
    spec.cols[0] = ColumnSpec::new("account", "Account").sortable(false);
    let mut table = ReportTable::new(ClusterId::from("cedar"), "bursts", spec, vec![], SortOrder::ascending(0));
    assert_eq!(table.order(), SortOrder::descending(1));
    assert!(!table.set_order(SortOrder::ascending(7)));
    assert!(table.set_order(SortOrder::ascending(2)));
}

proptest! {
    #[test]
    fn visible_rows_are_a_sorted_permutation(pains in prop::collection::vec(0.0f64..1000.0, 0..20)) {
        let rows: Vec<CaseRow> = pains
            .iter()
            .enumerate()
            .map(|(i, p)| row(i as u64, "acct", Some(*p)))
            .collect();
        let table = ReportTable::new(ClusterId::from("c"), "bursts", spec(), rows, SortOrder::descending(1));
        let visible = table.visible_rows();
        prop_assert_eq!(visible.len(), pains.len());
        let shown: Vec<f64> = visible
            .iter()
            .filter_map(|r| r.field("pain").and_then(serde_json::Value::as_f64))
            .collect();
        prop_assert!(shown.windows(2).all(|w| w[0] >= w[1]));
    }
}
