#![forbid(unsafe_code)]

//! JSON shapes exchanged with the JavaScript host.
//!
//! The host sends [`WireEvent`]s (one JSON object per event, discriminated by
//! `type`) and receives a [`WireOutputs`] batch after each step.
//!
//! ```json
//! {"type":"response","request":3,"body":"{\"cluster\":\"cedar\"}"}
//! {"type":"response","request":4,"status":500}
//! {"type":"sort","cluster":"cedar","report":"bursts","order":[2,"asc"]}
//! {"type":"action","cluster":"cedar","case":17,"action":"note","note":"looks fine"}
//! ```

use druid_core::{CaseAction, CaseId, ClusterId, SortOrder};
use druid_i18n::LanguagePreferences;
use druid_runtime::{
    HostContext, HostEvent, HttpRequest, NotificationSupport, OsNotification, PermissionApi,
    PermissionState, RequestId, TransportError,
};
use druid_widgets::ToastHandle;
use serde::{Deserialize, Serialize};

use crate::{WebBackendError, WebOutputs};

/// One host event as sent from JavaScript.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    /// Request completion. `error` wins over `status`; a missing status
    /// counts as success.
    Response {
        request: u64,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        status: Option<u16>,
        #[serde(default)]
        error: Option<String>,
    },
    Permission {
        state: String,
    },
    Focus {
        focused: bool,
    },
    Push {
        data: String,
    },
    Tab {
        cluster: ClusterId,
    },
    Accordion {
        cluster: ClusterId,
        report: String,
    },
    Sort {
        cluster: ClusterId,
        report: String,
        order: SortOrder,
    },
    Search {
        cluster: ClusterId,
        report: String,
        query: String,
    },
    Action {
        cluster: ClusterId,
        case: CaseId,
        action: CaseAction,
        #[serde(default)]
        note: Option<String>,
    },
    Refresh,
    Dismiss {
        toast: usize,
    },
}

impl WireEvent {
    /// Parse one event object.
    pub fn parse(json: &str) -> Result<Self, WebBackendError> {
        serde_json::from_str(json).map_err(|err| WebBackendError::InvalidEvent(err.to_string()))
    }
}

impl From<WireEvent> for HostEvent {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Response {
                request,
                body,
                status,
                error,
            } => {
                let result = match (error, status) {
                    (Some(msg), _) => Err(TransportError::Network(msg)),
                    (None, Some(code)) if !(200..300).contains(&code) => Err(TransportError::Status(code)),
                    _ => Ok(body.unwrap_or_default()),
                };
                HostEvent::Response {
                    request: RequestId(request),
                    result,
                }
            }
            WireEvent::Permission { state } => HostEvent::Permission(PermissionState::parse(&state)),
            WireEvent::Focus { focused } => HostEvent::Focus(focused),
            WireEvent::Push { data } => HostEvent::Push(data),
            WireEvent::Tab { cluster } => HostEvent::TabShown(cluster),
            WireEvent::Accordion { cluster, report } => HostEvent::AccordionShown { cluster, report },
            WireEvent::Sort { cluster, report, order } => HostEvent::SortChanged { cluster, report, order },
            WireEvent::Search { cluster, report, query } => HostEvent::SearchChanged { cluster, report, query },
            WireEvent::Action {
                cluster,
                case,
                action,
                note,
            } => HostEvent::CaseAction {
                cluster,
                case,
                action,
                note,
            },
            WireEvent::Refresh => HostEvent::RefreshRequested,
            WireEvent::Dismiss { toast } => HostEvent::ToastDismissed(ToastHandle::from_index(toast)),
        }
    }
}

/// How the host exposes `Notification`, as detected in JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireNotificationApi {
    Promise,
    Callback,
    #[default]
    None,
}

/// Page facts collected by the host before startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostOptions {
    pub notifications: WireNotificationApi,
    /// `navigator.language`.
    pub language: Option<String>,
    /// `navigator.languages`.
    pub languages: Option<Vec<String>>,
    pub focused: bool,
    /// `Notification.permission` at load.
    pub permission: Option<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            notifications: WireNotificationApi::None,
            language: None,
            languages: None,
            focused: true,
            permission: None,
        }
    }
}

impl HostOptions {
    /// Parse host options; an empty string means defaults.
    pub fn parse(json: &str) -> Result<Self, WebBackendError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|err| WebBackendError::InvalidConfig(format!("host options: {err}")))
    }

    #[must_use]
    pub fn into_context(self) -> HostContext {
        let notifications = match self.notifications {
            WireNotificationApi::Promise => NotificationSupport::promise(),
            WireNotificationApi::Callback => NotificationSupport::callback(),
            WireNotificationApi::None => NotificationSupport::unsupported(),
        };
        HostContext {
            notifications,
            languages: LanguagePreferences {
                primary: self.language,
                languages: self.languages,
            },
            focused: self.focused,
            permission: self
                .permission
                .as_deref()
                .map_or(PermissionState::Default, PermissionState::parse),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRequest {
    pub id: u64,
    pub method: &'static str,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<&'static str>,
}

impl From<&HttpRequest> for WireRequest {
    fn from(req: &HttpRequest) -> Self {
        Self {
            id: req.id.0,
            method: req.method.as_str(),
            url: req.url.clone(),
            body: req.body.as_ref().map(|b| b.as_str().to_owned()),
            content_type: req.body.as_ref().map(|b| b.content_type()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNotification {
    pub body: String,
    pub close_after_ms: u64,
}

impl From<&OsNotification> for WireNotification {
    fn from(n: &OsNotification) -> Self {
        Self {
            body: n.body.clone(),
            close_after_ms: u64::try_from(n.close_after.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Side effects of one or more steps, in the order the host should apply them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOutputs {
    pub logs: Vec<String>,
    pub requests: Vec<WireRequest>,
    pub notifications: Vec<WireNotification>,
    /// `"promise"` or `"callback"` per pending permission prompt.
    pub permission_requests: Vec<&'static str>,
    pub subscriptions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl From<&WebOutputs> for WireOutputs {
    fn from(out: &WebOutputs) -> Self {
        Self {
            logs: out.logs.clone(),
            requests: out.requests.iter().map(WireRequest::from).collect(),
            notifications: out.notifications.iter().map(WireNotification::from).collect(),
            permission_requests: out
                .permission_requests
                .iter()
                .map(|api| match api {
                    PermissionApi::Promise => "promise",
                    PermissionApi::Callback => "callback",
                })
                .collect(),
            subscriptions: out.subscriptions.clone(),
            html: out.html.clone(),
        }
    }
}

impl WireOutputs {
    pub fn to_json(&self) -> Result<String, WebBackendError> {
        serde_json::to_string(self).map_err(|err| WebBackendError::InvalidEvent(err.to_string()))
    }
}
