#![forbid(unsafe_code)]

//! Web host for the Druid Manager dashboard.
//!
//! The runtime never touches the browser. This crate closes the loop:
//!
//! - [`StepProgram`] drives a [`Model`](druid_runtime::Model) step by step and
//!   collects the side effects it asks for into [`WebOutputs`].
//! - [`wire`] defines the JSON shapes exchanged with JavaScript.
//! - On `wasm32`, a `wasm-bindgen` class (`DruidDashboard`) wraps the
//!   dashboard with a `document.cookie` preferences jar.
//!
//! Native builds keep everything except the JS class, so the whole host
//! protocol is testable without a browser.

use core::fmt;
use core::time::Duration;

use druid_core::ReportSpecs;
use druid_runtime::{
    CookieJar, Dashboard, DashboardConfig, HttpRequest, OsNotification, PermissionApi,
};

pub mod step_program;
pub mod wire;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use step_program::{StepProgram, StepResult};
pub use wire::{HostOptions, WireEvent, WireOutputs};

/// Web host error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebBackendError {
    /// Operation is not supported by this host.
    Unsupported(&'static str),
    /// `init` was called twice.
    AlreadyInitialized,
    /// `step` or an event arrived before `init`.
    NotInitialized,
    /// An event from the host could not be decoded.
    InvalidEvent(String),
    /// Startup configuration could not be decoded.
    InvalidConfig(String),
}

impl fmt::Display for WebBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Self::AlreadyInitialized => write!(f, "program already initialized"),
            Self::NotInitialized => write!(f, "program not initialized"),
            Self::InvalidEvent(msg) => write!(f, "invalid host event: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for WebBackendError {}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: Duration::ZERO }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }
}

/// Host milliseconds (`performance.now()` style) as a [`Duration`].
///
/// Negative and NaN inputs clamp to zero; infinite or oversized ones
/// saturate at [`Duration::MAX`].
#[must_use]
pub fn duration_from_millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

/// Side effects captured since the last [`StepProgram::take_outputs`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WebOutputs {
    /// Log lines the model asked the host to print.
    pub logs: Vec<String>,
    /// Requests to perform; answer each with a `response` event.
    pub requests: Vec<HttpRequest>,
    /// OS notifications to show.
    pub notifications: Vec<OsNotification>,
    /// Permission prompts to open.
    pub permission_requests: Vec<PermissionApi>,
    /// Push channel URLs to subscribe to.
    pub subscriptions: Vec<String>,
    /// Page markup from the latest render, if a render happened.
    pub html: Option<String>,
}

impl WebOutputs {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
            && self.requests.is_empty()
            && self.notifications.is_empty()
            && self.permission_requests.is_empty()
            && self.subscriptions.is_empty()
            && self.html.is_none()
    }
}

/// Build a dashboard from the JSON blobs the page embeds at load.
///
/// `config_json` may be empty to use the defaults.
pub fn build_dashboard<J: CookieJar>(
    config_json: &str,
    specs_json: &str,
    host: HostOptions,
    jar: J,
) -> Result<Dashboard<J>, WebBackendError> {
    let config = if config_json.trim().is_empty() {
        DashboardConfig::default()
    } else {
        DashboardConfig::from_json(config_json)
            .map_err(|err| WebBackendError::InvalidConfig(format!("dashboard config: {err}")))?
    };
    let specs = ReportSpecs::from_json(specs_json)
        .map_err(|err| WebBackendError::InvalidConfig(format!("report specs: {err}")))?;
    tracing::debug!(reports = specs.len(), "dashboard configured");
    Ok(Dashboard::new(config, specs, jar, host.into_context()))
}
