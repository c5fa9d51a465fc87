#![forbid(unsafe_code)]

//! Per-user dashboard preferences.
//!
//! The whole blob lives in one cookie:
//!
//! ```json
//! { "cluster": "cedar",
//!   "clusters": { "cedar": { "expanded": "bursts",
//!                            "sorting": { "bursts": [3, "desc"] } } } }
//! ```
//!
//! The store hydrates once at page load and writes the full blob back after
//! every mutation. A missing or malformed cookie yields an empty blob; bad
//! entries inside an otherwise valid blob are dropped one by one.

use std::collections::BTreeMap;

use druid_core::{ClusterDirectory, ClusterId, ReportSpecs, SortOrder};
use serde::Serialize;
use serde_json::Value;

use crate::state_persistence::CookieJar;

/// Preferences of one cluster tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterPreferences {
    /// Report accordion shown expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<String>,
    /// Sort order per report name.
    pub sorting: BTreeMap<String, SortOrder>,
}

impl ClusterPreferences {
    fn from_value(value: &Value) -> Self {
        let expanded = value
            .get("expanded")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let sorting = value
            .get("sorting")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(report, order)| {
                        match serde_json::from_value::<SortOrder>(order.clone()) {
                            Ok(order) => Some((report.clone(), order)),
                            Err(err) => {
                                tracing::debug!(report = %report, error = %err, "dropping stored sort order");
                                None
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { expanded, sorting }
    }
}

/// The preferences blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterId>,
    pub clusters: BTreeMap<ClusterId, ClusterPreferences>,
}

impl Preferences {
    /// Decode a stored blob, keeping whatever parts are well formed.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let cluster = value
            .get("cluster")
            .and_then(Value::as_str)
            .map(ClusterId::from);
        let clusters = value
            .get("clusters")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter(|(_, prefs)| prefs.is_object())
                    .map(|(id, prefs)| (ClusterId::new(id.as_str()), ClusterPreferences::from_value(prefs)))
                    .collect()
            })
            .unwrap_or_default();
        Self { cluster, clusters }
    }

    /// Decode a cookie value; anything unparseable is an empty blob.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed preferences cookie");
                Self::default()
            }
        }
    }

    /// Bring the blob in line with the known clusters and report types.
    ///
    /// The active cluster falls back to the first listed cluster when absent
    /// or unknown. Every cluster gets an entry, and every report type gets a
    /// sort order (metric column, descending) unless one is stored. Returns
    /// whether anything changed.
    pub fn repair(&mut self, clusters: &ClusterDirectory, specs: &ReportSpecs) -> bool {
        let mut changed = false;

        let active_ok = self.cluster.as_ref().is_some_and(|id| clusters.contains(id));
        if !active_ok {
            let fallback = clusters.first().map(|c| c.id.clone());
            if self.cluster != fallback {
                tracing::info!(
                    stale = ?self.cluster.as_ref().map(ClusterId::as_str),
                    active = ?fallback.as_ref().map(ClusterId::as_str),
                    "replacing stale active cluster"
                );
                self.cluster = fallback;
                changed = true;
            }
        }

        for id in clusters.ids() {
            let entry = self.clusters.entry(id.clone()).or_insert_with(|| {
                changed = true;
                ClusterPreferences::default()
            });
            for (report, spec) in specs.iter() {
                if !entry.sorting.contains_key(report) {
                    entry.sorting.insert(report.to_owned(), spec.default_sort());
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Write-through preference store over a cookie.
#[derive(Debug)]
pub struct PreferenceStore<J: CookieJar> {
    jar: J,
    cookie: String,
    prefs: Preferences,
}

impl<J: CookieJar> PreferenceStore<J> {
    /// Hydrate from cookie `cookie` in `jar`. Never fails.
    pub fn load(jar: J, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        let prefs = match jar.get(&cookie) {
            Ok(Some(raw)) => Preferences::parse(&raw),
            Ok(None) => Preferences::default(),
            Err(err) => {
                tracing::warn!(jar = jar.name(), cookie = %cookie, error = %err, "preferences unavailable");
                Preferences::default()
            }
        };
        Self { jar, cookie, prefs }
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    #[must_use]
    pub fn jar(&self) -> &J {
        &self.jar
    }

    #[must_use]
    pub fn active_cluster(&self) -> Option<&ClusterId> {
        self.prefs.cluster.as_ref()
    }

    pub fn set_active_cluster(&mut self, cluster: &ClusterId) {
        self.prefs.cluster = Some(cluster.clone());
        self.persist();
    }

    /// Report shown expanded for `cluster`.
    #[must_use]
    pub fn active_report(&self, cluster: &ClusterId) -> Option<&str> {
        self.prefs.clusters.get(cluster)?.expanded.as_deref()
    }

    pub fn set_active_report(&mut self, cluster: &ClusterId, report: &str) {
        self.prefs.clusters.entry(cluster.clone()).or_default().expanded = Some(report.to_owned());
        self.persist();
    }

    #[must_use]
    pub fn sort_order(&self, cluster: &ClusterId, report: &str) -> Option<SortOrder> {
        self.prefs.clusters.get(cluster)?.sorting.get(report).copied()
    }

    pub fn set_sort_order(&mut self, cluster: &ClusterId, report: &str, order: SortOrder) {
        self.prefs
            .clusters
            .entry(cluster.clone())
            .or_default()
            .sorting
            .insert(report.to_owned(), order);
        self.persist();
    }

    /// Repair the blob against the cluster list and report specs, persisting
    /// when it changed.
    pub fn initialize_cluster_preferences(&mut self, clusters: &ClusterDirectory, specs: &ReportSpecs) -> bool {
        let changed = self.prefs.repair(clusters, specs);
        if changed {
            self.persist();
        }
        changed
    }

    /// Serialize the blob back to the cookie. Failures are logged only.
    pub fn persist(&self) {
        let raw = match serde_json::to_string(&self.prefs) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(error = %err, "cannot serialize preferences");
                return;
            }
        };
        if let Err(err) = self.jar.set(&self.cookie, &raw) {
            tracing::warn!(jar = self.jar.name(), cookie = %self.cookie, error = %err, "failed to persist preferences");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_persistence::MemoryCookieJar;
    use druid_core::{Cluster, ColumnSpec, ReportSpec};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn specs() -> ReportSpecs {
        let mut specs = ReportSpecs::new();
        specs.insert(
            "bursts",
            ReportSpec {
                title: "Bursts".into(),
                metric: "pain".into(),
                cols: vec![
                    ColumnSpec::new("account", "Account"),
                    ColumnSpec::new("summary", "Summary"),
                    ColumnSpec::new("pain", "Pain").number(),
                ],
            },
        );
        specs.insert(
            "oldjobs",
            ReportSpec {
                title: "Old jobs".into(),
                metric: "age".into(),
                cols: vec![ColumnSpec::new("age", "Age").number()],
            },
        );
        specs
    }

    fn clusters() -> ClusterDirectory {
        ClusterDirectory::new(vec![Cluster::new("c2", "Cedar"), Cluster::new("c1", "Arbutus")])
    }

    #[test]
    fn malformed_cookie_is_empty() {
        assert_eq!(Preferences::parse("{not json"), Preferences::default());
        assert_eq!(Preferences::parse("[1,2]"), Preferences::default());
    }

    #[test]
    fn bad_entries_are_dropped_individually() {
        let prefs = Preferences::parse(
            r#"{"cluster":"c1","clusters":{"c1":{"expanded":"bursts","sorting":{"bursts":[2,"asc"],"oldjobs":"x"}},"c9":3}}"#,
        );
        assert_eq!(prefs.cluster, Some(ClusterId::from("c1")));
        let c1 = &prefs.clusters[&ClusterId::from("c1")];
        assert_eq!(c1.expanded.as_deref(), Some("bursts"));
        assert_eq!(c1.sorting.len(), 1);
        assert!(!prefs.clusters.contains_key(&ClusterId::from("c9")));
    }

    #[test]
    fn repair_fills_defaults_from_metric() {
        let mut prefs = Preferences::default();
        assert!(prefs.repair(&clusters(), &specs()));
        assert_eq!(prefs.cluster, Some(ClusterId::from("c1")));
        for id in ["c1", "c2"] {
            let sorting = &prefs.clusters[&ClusterId::from(id)].sorting;
            assert_eq!(sorting["bursts"], SortOrder::descending(2));
            assert_eq!(sorting["oldjobs"], SortOrder::descending(0));
        }
    }

    #[test]
    fn repair_replaces_stale_cluster_and_keeps_user_sorts() {
        let mut prefs = Preferences::parse(r#"{"cluster":"gone","clusters":{"c2":{"sorting":{"bursts":[0,"asc"]}}}}"#);
        prefs.repair(&clusters(), &specs());
        assert_eq!(prefs.cluster, Some(ClusterId::from("c1")));
        assert_eq!(
            prefs.clusters[&ClusterId::from("c2")].sorting["bursts"],
            SortOrder::ascending(0)
        );
    }

    #[test]
    fn repair_twice_is_a_no_op() {
        let mut prefs = Preferences::default();
        prefs.repair(&clusters(), &specs());
        let once = prefs.clone();
        assert!(!prefs.repair(&clusters(), &specs()));
        assert_eq!(prefs, once);
    }

    #[test]
    fn serializes_in_cookie_shape() {
        let mut prefs = Preferences::default();
        prefs.cluster = Some(ClusterId::from("c1"));
        prefs.clusters.insert(
            ClusterId::from("c1"),
            ClusterPreferences {
                expanded: Some("bursts".into()),
                sorting: BTreeMap::from([("bursts".to_owned(), SortOrder::descending(2))]),
            },
        );
        assert_eq!(
            serde_json::to_string(&prefs).unwrap(),
            r#"{"cluster":"c1","clusters":{"c1":{"expanded":"bursts","sorting":{"bursts":[2,"desc"]}}}}"#
        );
    }

    #[test]
    fn setters_write_through() {
        let jar = Rc::new(MemoryCookieJar::new());
        let mut store = PreferenceStore::load(Rc::clone(&jar), "prefs");
        store.set_sort_order(&ClusterId::from("c1"), "bursts", SortOrder::ascending(1));
        let reloaded = PreferenceStore::load(Rc::clone(&jar), "prefs");
        assert_eq!(
            reloaded.sort_order(&ClusterId::from("c1"), "bursts"),
            Some(SortOrder::ascending(1))
        );

        store.set_active_report(&ClusterId::from("c1"), "oldjobs");
        store.set_active_cluster(&ClusterId::from("c1"));
        let reloaded = PreferenceStore::load(Rc::clone(&jar), "prefs");
        assert_eq!(reloaded.active_report(&ClusterId::from("c1")), Some("oldjobs"));
        assert_eq!(reloaded.active_cluster(), Some(&ClusterId::from("c1")));
    }

    #[test]
    fn initialize_persists_only_on_change() {
        let jar = Rc::new(MemoryCookieJar::new());
        let mut store = PreferenceStore::load(Rc::clone(&jar), "prefs");
        assert!(store.initialize_cluster_preferences(&clusters(), &specs()));
        assert!(jar.get("prefs").unwrap().is_some());
        jar.remove("prefs").unwrap();
        assert!(!store.initialize_cluster_preferences(&clusters(), &specs()));
        assert!(jar.get("prefs").unwrap().is_none());
    }
}
