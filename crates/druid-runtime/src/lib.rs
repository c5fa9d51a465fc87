#![forbid(unsafe_code)]

//! Host-driven runtime for the Druid Manager dashboard.
//!
//! The runtime owns page state and decides what happens next; the host (a
//! browser through `druid-web`, or a test) performs I/O and reports back.
//!
//! - [`Dashboard`]: the report pipeline as an Elm-style [`Model`].
//! - [`PreferenceStore`]: the write-through preferences cookie.
//! - [`NotificationBridge`]: push message presentation.
//! - [`case_actions`]: analyst actions to case update payloads.
//! - [`admin`]: admin page helpers.

pub mod admin;
pub mod case_actions;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod http;
pub mod logging;
pub mod notifications;
pub mod preferences;
pub mod program;
pub mod state_persistence;
pub mod strings;

pub use admin::{AdminEndpoints, AdminError, AdminPreferences, generate_api_key};
pub use case_actions::ActionError;
pub use config::DashboardConfig;
pub use dashboard::{ClusterLoad, Dashboard, HostContext, PipelineState};
pub use event::HostEvent;
pub use http::{HttpMethod, HttpRequest, RequestBody, RequestId, TransportError};
pub use notifications::{
    NotificationBridge, NotificationSupport, PermissionApi, PermissionState, PushOutcome,
};
pub use preferences::{ClusterPreferences, PreferenceStore, Preferences};
pub use program::{Cmd, Model, OsNotification};
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileCookieJar;
pub use state_persistence::{CookieJar, MemoryCookieJar, StorageError, StorageResult};
