//! Clusters and the `id -> name` directory.
//!
//! Clusters are supplied by the server and are read-only on the client. The
//! directory keeps them in display order (by name) and answers name lookups
//! for status messages.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Opaque cluster identifier as used by the server (e.g. `"cedar"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub String);

impl ClusterId {
    /// Create a cluster id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A cluster as listed by the clusters endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
}

impl Cluster {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ClusterId::new(id),
            name: name.into(),
        }
    }
}

/// Primary collation key: decomposed, accent-stripped, lowercased.
fn collation_key(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two display names the way a user expects them listed.
///
/// Accents and case only break ties, so `"Béluga"` sorts next to
/// `"beluga"` rather than after `"Zeta"`.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Cluster list in display order with an id lookup.
#[derive(Debug, Clone, Default)]
pub struct ClusterDirectory {
    sorted: Vec<Cluster>,
    names: HashMap<ClusterId, String>,
}

impl ClusterDirectory {
    /// Build a directory from a server-ordered list, sorting by display name.
    #[must_use]
    pub fn new(mut clusters: Vec<Cluster>) -> Self {
        clusters.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
        let names = clusters
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        Self {
            sorted: clusters,
            names,
        }
    }

    /// Clusters sorted by display name.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.sorted
    }

    /// First cluster in display order.
    #[must_use]
    pub fn first(&self) -> Option<&Cluster> {
        self.sorted.first()
    }

    #[must_use]
    pub fn contains(&self, id: &ClusterId) -> bool {
        self.names.contains_key(id)
    }

    /// Display name for `id`, falling back to the raw id.
    #[must_use]
    pub fn name_of<'a>(&'a self, id: &'a ClusterId) -> &'a str {
        self.names.get(id).map_or(id.as_str(), String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ClusterId> {
        self.sorted.iter().map(|c| &c.id)
    }
}
