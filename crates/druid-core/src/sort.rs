//! Report table sort orders.
//!
//! A sort order is persisted as a `[columnIndex, "asc"|"desc"]` pair. Table
//! widgets may report a multi-column ordering (`[[3, "desc"], [0, "asc"]]`);
//! only the primary column is kept, and both shapes decode.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary sort column and direction of one report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "(usize, SortDirection)")]
pub struct SortOrder {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortOrder {
    #[must_use]
    pub const fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Descending on `column`, the default for a report's metric.
    #[must_use]
    pub const fn descending(column: usize) -> Self {
        Self::new(column, SortDirection::Desc)
    }

    #[must_use]
    pub const fn ascending(column: usize) -> Self {
        Self::new(column, SortDirection::Asc)
    }
}

impl From<SortOrder> for (usize, SortDirection) {
    fn from(order: SortOrder) -> Self {
        (order.column, order.direction)
    }
}

impl From<(usize, SortDirection)> for SortOrder {
    fn from((column, direction): (usize, SortDirection)) -> Self {
        Self { column, direction }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireOrder {
    Single((usize, SortDirection)),
    Multi(Vec<(usize, SortDirection)>),
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WireOrder::deserialize(deserializer)? {
            WireOrder::Single(pair) => Ok(pair.into()),
            WireOrder::Multi(pairs) => pairs
                .into_iter()
                .next()
                .map(SortOrder::from)
                .ok_or_else(|| serde::de::Error::custom("empty sort order")),
        }
    }
}
