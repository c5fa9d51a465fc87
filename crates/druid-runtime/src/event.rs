#![forbid(unsafe_code)]

//! Events pushed into the runtime by the host.

use std::time::Duration;

use druid_core::{CaseAction, CaseId, ClusterId, SortOrder};
use druid_widgets::ToastHandle;

use crate::http::{RequestId, TransportError};
use crate::notifications::PermissionState;

/// Everything the host can tell the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Completion of a request the runtime asked for. `Ok` carries the body.
    Response {
        request: RequestId,
        result: Result<String, TransportError>,
    },
    /// Answer to a notification permission request.
    Permission(PermissionState),
    /// The page gained or lost focus.
    Focus(bool),
    /// A message arrived on the server push channel.
    Push(String),
    /// The user opened a cluster tab.
    TabShown(ClusterId),
    /// The user expanded a report accordion.
    AccordionShown { cluster: ClusterId, report: String },
    /// The user re-sorted a report table.
    SortChanged {
        cluster: ClusterId,
        report: String,
        order: SortOrder,
    },
    /// The user typed into a report table's search box.
    SearchChanged {
        cluster: ClusterId,
        report: String,
        query: String,
    },
    /// The user picked an entry from a case's action menu.
    CaseAction {
        cluster: ClusterId,
        case: CaseId,
        action: CaseAction,
        note: Option<String>,
    },
    /// The user clicked the manual refresh link.
    RefreshRequested,
    /// The user closed a toast.
    ToastDismissed(ToastHandle),
    /// Host clock moved to this monotonic time.
    Tick(Duration),
}
