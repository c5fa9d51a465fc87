#![forbid(unsafe_code)]

//! Case action dispatch.
//!
//! Each analyst action becomes a one-entry update list for the generic case
//! update endpoint, plus the pair of translation keys shown while the call is
//! in flight and when it fails. Transport is the host's job.

use std::fmt;

use druid_core::{CaseAction, CaseId, CaseState, CaseUpdate, UpdateRequest};
use serde_json::Value;

use crate::http::{HttpMethod, HttpRequest, RequestBody, RequestId};

/// Case field holding the analyst who claimed the case.
pub const CLAIMANT_DATUM: &str = "claimant";

/// Why an action could not be turned into an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A note action with nothing to say.
    EmptyNote,
    /// Claim or steal without a known acting analyst.
    NoAnalyst(CaseAction),
    /// The update list could not be serialized.
    Encode(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note is empty"),
            Self::NoAnalyst(action) => write!(f, "cannot {action} without an analyst"),
            Self::Encode(msg) => write!(f, "cannot encode update: {msg}"),
        }
    }
}

impl std::error::Error for ActionError {}

/// Translation keys for an action's progress toast and failure toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMessages {
    pub progress: &'static str,
    pub failure: &'static str,
}

#[must_use]
pub const fn messages(action: CaseAction) -> ActionMessages {
    let (progress, failure) = match action {
        CaseAction::Accept => ("ACCEPTING_CASE", "FAILED_TO_ACCEPT_CASE"),
        CaseAction::Reject => ("REJECTING_CASE", "FAILED_TO_REJECT_CASE"),
        CaseAction::Claim => ("CLAIMING_CASE", "FAILED_TO_CLAIM_CASE"),
        CaseAction::Steal => ("STEALING_CASE", "FAILED_TO_STEAL_CASE"),
        CaseAction::Release => ("RELEASING_CASE", "FAILED_TO_RELEASE_CASE"),
        CaseAction::Note => ("CREATING_NOTE", "FAILED_TO_CREATE_NOTE"),
    };
    ActionMessages { progress, failure }
}

/// Update entry for `action`.
///
/// Accept and reject set the state; claim and steal set the claimant to
/// `analyst`; release clears it. Every action carries `note` when it is
/// not blank, and a bare note action requires one.
pub fn build_update(action: CaseAction, analyst: Option<&str>, note: Option<&str>) -> Result<CaseUpdate, ActionError> {
    let update = match action {
        CaseAction::Accept => CaseUpdate::state(CaseState::Accepted),
        CaseAction::Reject => CaseUpdate::state(CaseState::Rejected),
        CaseAction::Claim | CaseAction::Steal => {
            let analyst = analyst.ok_or(ActionError::NoAnalyst(action))?;
            CaseUpdate::field(CLAIMANT_DATUM, Value::String(analyst.to_owned()))
        }
        CaseAction::Release => CaseUpdate::field(CLAIMANT_DATUM, Value::Null),
        CaseAction::Note => CaseUpdate::default(),
    }
    .with_note(note);

    if update.is_empty() {
        return Err(ActionError::EmptyNote);
    }
    Ok(update)
}

/// Full update payload for one case.
pub fn build_request(
    case: CaseId,
    action: CaseAction,
    analyst: Option<&str>,
    note: Option<&str>,
) -> Result<UpdateRequest, ActionError> {
    build_update(action, analyst, note).map(|update| UpdateRequest::single(case, update))
}

/// JSON `PATCH` carrying `update` to `url`.
pub fn to_http(id: RequestId, url: &str, update: &UpdateRequest) -> Result<HttpRequest, ActionError> {
    let body = serde_json::to_string(update).map_err(|e| ActionError::Encode(e.to_string()))?;
    Ok(HttpRequest::with_body(id, HttpMethod::Patch, url, RequestBody::Json(body)))
}
