//! Case rows and case update payloads.
//!
//! A case row is a server-defined record. Only a handful of fields are
//! interpreted here (`id`, `state`, `claimant`, `summary`); everything else
//! is rendered as-is. Any field may carry a `<field>_pretty` companion with
//! pre-rendered markup that renderers prefer over the raw value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Suffix of pre-rendered companion fields.
pub const PRETTY_SUFFIX: &str = "_pretty";

/// Server-assigned case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub u64);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case state as owned by the server.
///
/// The client never transitions states itself; it only asks the server to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseState {
    Unactioned,
    Claimed,
    Ticketed,
    Accepted,
    Rejected,
}

impl CaseState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unactioned => "unactioned",
            Self::Claimed => "claimed",
            Self::Ticketed => "ticketed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse either the wire name or the single-letter storage code.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "unactioned" | "p" => Some(Self::Unactioned),
            "claimed" | "c" => Some(Self::Claimed),
            "ticketed" | "t" => Some(Self::Ticketed),
            "accepted" | "a" => Some(Self::Accepted),
            "rejected" | "r" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analyst action on a case, as offered by a row's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseAction {
    Accept,
    Reject,
    Claim,
    Steal,
    Release,
    Note,
}

impl CaseAction {
    pub const ALL: [CaseAction; 6] = [
        Self::Claim,
        Self::Steal,
        Self::Release,
        Self::Accept,
        Self::Reject,
        Self::Note,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Claim => "claim",
            Self::Steal => "steal",
            Self::Release => "release",
            Self::Note => "note",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == raw)
    }

    /// Translation key of the menu label.
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
            Self::Claim => "CLAIM",
            Self::Steal => "STEAL",
            Self::Release => "RELEASE",
            Self::Note => "CREATE_NOTE",
        }
    }

    /// Whether this action makes sense for `row` when performed by `analyst`.
    ///
    /// Claiming needs an unclaimed case, stealing a case claimed by someone
    /// else, releasing a case claimed by the analyst. Claim and steal write
    /// the analyst as claimant, so neither is offered without one.
    /// Accept/reject apply to rows that carry a state and are not yet decided.
    #[must_use]
    pub fn applies_to(self, row: &CaseRow, analyst: Option<&str>) -> bool {
        let claimant = row.claimant();
        match self {
            Self::Claim => analyst.is_some() && claimant.is_none(),
            Self::Steal => analyst.is_some() && claimant.is_some() && claimant != analyst,
            Self::Release => claimant.is_some() && claimant == analyst,
            Self::Accept | Self::Reject => matches!(
                row.state(),
                Some(CaseState::Unactioned | CaseState::Claimed)
            ),
            Self::Note => true,
        }
    }

    /// Actions offered for `row`, in menu order.
    #[must_use]
    pub fn available(row: &CaseRow, analyst: Option<&str>) -> Vec<CaseAction> {
        Self::ALL
            .into_iter()
            .filter(|a| a.applies_to(row, analyst))
            .collect()
    }
}

impl fmt::Display for CaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One case record from a report's `results` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseRow(Map<String, Value>);

impl CaseRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert, mostly for tests and fixtures.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Raw field value; `null` counts as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Pre-rendered companion of `name`; `null` counts as absent.
    #[must_use]
    pub fn pretty(&self, name: &str) -> Option<&Value> {
        self.0
            .get(&format!("{name}{PRETTY_SUFFIX}"))
            .filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn id(&self) -> Option<CaseId> {
        self.field("id").and_then(Value::as_u64).map(CaseId)
    }

    #[must_use]
    pub fn state(&self) -> Option<CaseState> {
        self.field("state").and_then(Value::as_str).and_then(CaseState::parse)
    }

    #[must_use]
    pub fn claimant(&self) -> Option<&str> {
        self.field("claimant").and_then(Value::as_str)
    }

    /// Free-form summary map, if the row carries one as an object.
    #[must_use]
    pub fn summary(&self) -> Option<&Map<String, Value>> {
        self.field("summary").and_then(Value::as_object)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CaseRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One entry of a case update list.
///
/// `state` and `note` cover accept/reject/note; `datum`/`value` change a
/// single case field such as the claimant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CaseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl CaseUpdate {
    #[must_use]
    pub fn state(state: CaseState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Set a single case field to `value` (`null` clears it).
    #[must_use]
    pub fn field(datum: impl Into<String>, value: Value) -> Self {
        Self {
            datum: Some(datum.into()),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Attach a note; blank notes are dropped.
    #[must_use]
    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.note.is_none() && self.datum.is_none()
    }
}

/// Body of the generic case update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(rename = "caseId")]
    pub case_id: CaseId,
    pub updates: Vec<CaseUpdate>,
}

impl UpdateRequest {
    /// Single-entry update list for `case_id`.
    #[must_use]
    pub fn single(case_id: CaseId, update: CaseUpdate) -> Self {
        Self {
            case_id,
            updates: vec![update],
        }
    }
}
