#![forbid(unsafe_code)]

//! Dashboard configuration.
//!
//! Every field has a default matching the stock server routes, so an empty
//! JSON object (or no environment at all) yields a working configuration.
//!
//! # Environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DRUID_CLUSTERS_URL` | `clusters_url` |
//! | `DRUID_CASES_URL` | `cases_url` |
//! | `DRUID_CASE_UPDATE_URL` | `case_update_url` |
//! | `DRUID_NOTIFICATIONS_URL` | `notifications_url` |
//! | `DRUID_PREFS_COOKIE` | `prefs_cookie` |
//! | `DRUID_LANGUAGES` | `supported_languages` (comma separated) |
//! | `DRUID_FALLBACK_LANGUAGE` | `fallback_language` |
//! | `DRUID_ANALYST` | `analyst` |
//! | `DRUID_NOTIFICATION_CLOSE_SECS` | `notification_close_secs` |
//! | `DRUID_UTC_OFFSET_SECONDS` | `utc_offset_seconds` |

use std::env;
use std::time::Duration;

use druid_core::ClusterId;
use serde::{Deserialize, Serialize};

use crate::http::url_encode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub clusters_url: String,
    /// Per-cluster reports; the cluster goes in the `cluster` query parameter.
    pub cases_url: String,
    pub case_update_url: String,
    pub notifications_url: String,
    pub apikeys_url: String,
    pub components_url: String,
    pub prefs_cookie: String,
    pub admin_prefs_cookie: String,
    pub supported_languages: Vec<String>,
    pub fallback_language: String,
    /// Push message that means "refresh, show nothing".
    pub refresh_sentinel: String,
    pub notification_close_secs: u64,
    /// Acting analyst, used for claim/steal and the action menu.
    pub analyst: Option<String>,
    /// Auto-hide delay for warning toasts; `None` keeps them until closed.
    pub warning_autohide_secs: Option<u64>,
    /// Host offset from UTC for "reported at" times.
    pub utc_offset_seconds: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            clusters_url: "/xhr/clusters/".into(),
            cases_url: "/xhr/cases/".into(),
            case_update_url: "/xhr/cases/".into(),
            notifications_url: "/notifications".into(),
            apikeys_url: "/xhr/apikeys/".into(),
            components_url: "/xhr/components/".into(),
            prefs_cookie: "prefs".into(),
            admin_prefs_cookie: "admin_prefs".into(),
            supported_languages: vec!["en".into(), "fr".into()],
            fallback_language: "en".into(),
            refresh_sentinel: "refresh".into(),
            notification_close_secs: 15,
            analyst: None,
            warning_autohide_secs: None,
            utc_offset_seconds: 0,
        }
    }
}

impl DashboardConfig {
    /// Parse from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults overridden by `DRUID_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let strings: [(&str, &mut String); 8] = [
            ("DRUID_CLUSTERS_URL", &mut config.clusters_url),
            ("DRUID_CASES_URL", &mut config.cases_url),
            ("DRUID_CASE_UPDATE_URL", &mut config.case_update_url),
            ("DRUID_NOTIFICATIONS_URL", &mut config.notifications_url),
            ("DRUID_APIKEYS_URL", &mut config.apikeys_url),
            ("DRUID_COMPONENTS_URL", &mut config.components_url),
            ("DRUID_PREFS_COOKIE", &mut config.prefs_cookie),
            ("DRUID_ADMIN_PREFS_COOKIE", &mut config.admin_prefs_cookie),
        ];
        for (key, field) in strings {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }
        if let Some(langs) = lookup("DRUID_LANGUAGES") {
            config.supported_languages = langs
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(lang) = lookup("DRUID_FALLBACK_LANGUAGE") {
            config.fallback_language = lang;
        }
        if let Some(analyst) = lookup("DRUID_ANALYST").filter(|a| !a.is_empty()) {
            config.analyst = Some(analyst);
        }
        if let Some(raw) = lookup("DRUID_NOTIFICATION_CLOSE_SECS") {
            match raw.parse() {
                Ok(secs) => config.notification_close_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "ignoring DRUID_NOTIFICATION_CLOSE_SECS"),
            }
        }
        if let Some(raw) = lookup("DRUID_UTC_OFFSET_SECONDS") {
            match raw.parse() {
                Ok(offset) => config.utc_offset_seconds = offset,
                Err(_) => tracing::warn!(value = %raw, "ignoring DRUID_UTC_OFFSET_SECONDS"),
            }
        }
        config
    }

    /// Reports URL for one cluster.
    #[must_use]
    pub fn cases_url_for(&self, cluster: &ClusterId) -> String {
        let sep = if self.cases_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}cluster={}", self.cases_url, url_encode(cluster.as_str()))
    }

    #[must_use]
    pub fn notification_close_after(&self) -> Duration {
        Duration::from_secs(self.notification_close_secs)
    }

    #[must_use]
    pub fn warning_autohide(&self) -> Option<Duration> {
        self.warning_autohide_secs.map(Duration::from_secs)
    }

    /// Supported languages as string slices, for language selection.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.supported_languages.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(DashboardConfig::from_json("{}").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = DashboardConfig::from_json(r#"{"analyst":"alice","notification_close_secs":5}"#).unwrap();
        assert_eq!(config.analyst.as_deref(), Some("alice"));
        assert_eq!(config.notification_close_after(), Duration::from_secs(5));
        assert_eq!(config.clusters_url, "/xhr/clusters/");
    }

    #[test]
    fn lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DRUID_LANGUAGES", "en, fr ,de"),
            ("DRUID_ANALYST", "bob"),
            ("DRUID_UTC_OFFSET_SECONDS", "-18000"),
            ("DRUID_NOTIFICATION_CLOSE_SECS", "soon"),
        ]);
        let config = DashboardConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_owned()));
        assert_eq!(config.languages(), vec!["en", "fr", "de"]);
        assert_eq!(config.analyst.as_deref(), Some("bob"));
        assert_eq!(config.utc_offset_seconds, -18000);
        assert_eq!(config.notification_close_secs, 15);
    }

    #[test]
    fn lookup_overrides_admin_endpoints() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DRUID_APIKEYS_URL", "/keys/"),
            ("DRUID_COMPONENTS_URL", "/components/"),
            ("DRUID_ADMIN_PREFS_COOKIE", "druid_admin"),
        ]);
        let config = DashboardConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_owned()));
        assert_eq!(config.apikeys_url, "/keys/");
        assert_eq!(config.components_url, "/components/");
        assert_eq!(config.admin_prefs_cookie, "druid_admin");
    }

    #[test]
    fn cases_url_encodes_cluster() {
        let config = DashboardConfig::default();
        assert_eq!(config.cases_url_for(&ClusterId::from("cedar")), "/xhr/cases/?cluster=cedar");
        let config = DashboardConfig {
            cases_url: "/api?v=2".into(),
            ..DashboardConfig::default()
        };
        assert_eq!(config.cases_url_for(&ClusterId::from("a b")), "/api?v=2&cluster=a%20b");
    }
}
