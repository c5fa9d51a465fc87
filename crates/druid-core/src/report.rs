//! Report specs and report result sets.
//!
//! A [`ReportSpec`] is static, declarative metadata describing how one report
//! type renders: its title, its primary "trouble" metric, and its ordered
//! column list. A [`ReportSet`] is what the cases endpoint returns for one
//! cluster: the cluster id plus one [`ReportData`] section per report type,
//! in server order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::case::CaseRow;
use crate::cluster::ClusterId;
use crate::error::{ModelError, ModelResult};
use crate::sort::SortOrder;

/// Datum of the column rendered as a key/value summary table.
pub const SUMMARY_DATUM: &str = "summary";
/// Datum of the column rendered as the case action menu.
pub const ACTION_DATUM: &str = "action";
/// Datum of the hidden trailing column carrying the case id.
pub const ID_DATUM: &str = "id";

/// Display type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
}

/// One column of a report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Name of the case-row field rendered in this column.
    pub datum: String,
    /// Header label (may contain markup).
    pub title: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub sortable: bool,
    /// Hover help for the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ColumnSpec {
    pub fn new(datum: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            datum: datum.into(),
            title: title.into(),
            column_type: ColumnType::Text,
            searchable: true,
            sortable: true,
            help: None,
        }
    }

    #[must_use]
    pub fn number(mut self) -> Self {
        self.column_type = ColumnType::Number;
        self
    }

    #[must_use]
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Declarative description of one report type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    pub title: String,
    /// Datum of the primary metric of interest.
    pub metric: String,
    pub cols: Vec<ColumnSpec>,
}

impl ReportSpec {
    /// Index of the column whose datum is the report's metric.
    #[must_use]
    pub fn metric_index(&self) -> Option<usize> {
        self.cols.iter().position(|col| col.datum == self.metric)
    }

    /// Sort order used until the user picks one: metric column, descending.
    ///
    /// Falls back to the first column when the metric has no column.
    #[must_use]
    pub fn default_sort(&self) -> SortOrder {
        SortOrder::descending(self.metric_index().unwrap_or(0))
    }

    /// Data column names in render order, followed by the hidden id column.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.cols
            .iter()
            .map(|c| c.datum.as_str())
            .chain(std::iter::once(ID_DATUM))
            .collect()
    }
}

/// All known report specs, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSpecs {
    specs: Vec<(String, ReportSpec)>,
}

impl ReportSpecs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the spec for `name`, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, spec: ReportSpec) {
        let name = name.into();
        if let Some(slot) = self.specs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = spec;
        } else {
            self.specs.push((name, spec));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReportSpec> {
        self.specs.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportSpec)> {
        self.specs.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parse the `{ name: spec, ... }` object embedded in the page.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'de> Deserialize<'de> for ReportSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecsVisitor;

        impl<'de> Visitor<'de> for SpecsVisitor {
            type Value = ReportSpecs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of report name to report spec")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut specs = ReportSpecs::new();
                while let Some((name, spec)) = map.next_entry::<String, ReportSpec>()? {
                    specs.insert(name, spec);
                }
                Ok(specs)
            }
        }

        deserializer.deserialize_map(SpecsVisitor)
    }
}

/// One report section of a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Generation time of the report, seconds since the Unix epoch.
    pub epoch: i64,
    #[serde(default)]
    pub results: Vec<CaseRow>,
}

/// Case reports for one cluster, as returned by the cases endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSet {
    pub cluster: ClusterId,
    reports: Vec<(String, ReportData)>,
}

impl ReportSet {
    pub fn new(cluster: ClusterId) -> Self {
        Self {
            cluster,
            reports: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_report(mut self, name: impl Into<String>, data: ReportData) -> Self {
        self.reports.push((name.into(), data));
        self
    }

    /// Decode `{ cluster, [reportName]: { epoch, results } }`.
    ///
    /// Sections that are `null` (no current records) are dropped. Report
    /// order follows the payload.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> ModelResult<Self> {
        let Value::Object(map) = value else {
            return Err(ModelError::MalformedReport("<root>".to_owned()));
        };
        let mut cluster = None;
        let mut reports = Vec::new();
        for (key, section) in map {
            if key == "cluster" {
                cluster = section.as_str().map(ClusterId::from);
                continue;
            }
            if section.is_null() {
                tracing::debug!(report = %key, "skipping empty report section");
                continue;
            }
            let data: ReportData = serde_json::from_value(section).map_err(|err| {
                tracing::warn!(report = %key, error = %err, "malformed report section");
                ModelError::MalformedReport(key.clone())
            })?;
            reports.push((key, data));
        }
        let cluster = cluster.ok_or(ModelError::MissingCluster)?;
        Ok(Self { cluster, reports })
    }

    /// Report names in server order.
    pub fn report_names(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|(n, _)| n.as_str())
    }

    pub fn reports(&self) -> impl Iterator<Item = (&str, &ReportData)> {
        self.reports.iter().map(|(n, d)| (n.as_str(), d))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReportData> {
        self.reports.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bursts_spec() -> ReportSpec {
        ReportSpec {
            title: "Burst candidates".into(),
            metric: "pain".into(),
            cols: vec![
                ColumnSpec::new("ticks", "Ticks").number(),
                ColumnSpec::new("account", "Account"),
                ColumnSpec::new("pain", "Pain").number().help("Relative pain"),
                ColumnSpec::new("summary", "Summary").sortable(false),
            ],
        }
    }

    #[test]
    fn default_sort_is_metric_descending() {
        assert_eq!(bursts_spec().default_sort(), SortOrder::descending(2));
    }

    #[test]
    fn default_sort_without_metric_column_uses_first() {
        let mut spec = bursts_spec();
        spec.metric = "missing".into();
        assert_eq!(spec.metric_index(), None);
        assert_eq!(spec.default_sort(), SortOrder::descending(0));
    }

    #[test]
    fn column_names_end_with_hidden_id() {
        assert_eq!(
            bursts_spec().column_names(),
            vec!["ticks", "account", "pain", "summary", "id"]
        );
    }

    #[test]
    fn specs_keep_server_order() {
        let specs = ReportSpecs::from_json(
            r#"{
                "oldjobs": {"title": "Job age", "metric": "age", "cols": [
                    {"datum": "age", "title": "Age", "type": "number",
                     "searchable": true, "sortable": true, "help": "Days waiting"}
                ]},
                "bursts": {"title": "Bursts", "metric": "pain", "cols": []}
            }"#,
        )
        .unwrap();
        let names: Vec<&str> = specs.names().collect();
        assert_eq!(names, vec!["oldjobs", "bursts"]);
        let age = &specs.get("oldjobs").unwrap().cols[0];
        assert_eq!(age.column_type, ColumnType::Number);
        assert_eq!(age.help.as_deref(), Some("Days waiting"));
    }

    #[test]
    fn report_set_decodes_sections_in_order() {
        let set = ReportSet::from_json(
            r#"{"cluster": "cedar",
                "oldjobs": {"epoch": 1700000000, "results": []},
                "bursts": {"epoch": 1700000100, "results": [{"id": 7, "pain": 1.5}]}}"#,
        )
        .unwrap();
        assert_eq!(set.cluster, ClusterId::from("cedar"));
        let names: Vec<&str> = set.report_names().collect();
        assert_eq!(names, vec!["oldjobs", "bursts"]);
        assert_eq!(set.get("bursts").unwrap().results.len(), 1);
    }

    #[test]
    fn report_set_skips_null_sections() {
        let set = ReportSet::from_json(r#"{"cluster": "cedar", "bursts": null}"#).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn report_set_requires_cluster() {
        let err = ReportSet::from_json(r#"{"bursts": {"epoch": 1, "results": []}}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingCluster));
    }

    #[test]
    fn report_set_flags_malformed_section() {
        let err = ReportSet::from_json(r#"{"cluster": "c", "bursts": 12}"#).unwrap_err();
        assert!(matches!(err, ModelError::MalformedReport(name) if name == "bursts"));
    }
}
