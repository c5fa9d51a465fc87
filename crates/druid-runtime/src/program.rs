#![forbid(unsafe_code)]
//! Elm-style program contract for the dashboard.
//!
//! A [`Model`] owns all page state. The host feeds it [`HostEvent`]s; every
//! `update` returns a [`Cmd`] describing side effects (requests, OS
//! notifications, log lines) for the host to carry out. Nothing here blocks
//! or performs I/O, so a model can be driven step by step from JavaScript
//! or from a test.
//!
//! # Example
//!
//! ```ignore
//! use druid_runtime::program::{Cmd, Model};
//! use druid_runtime::event::HostEvent;
//! use druid_widgets::Element;
//!
//! struct Clicks(u32);
//!
//! impl Model for Clicks {
//!     type Message = HostEvent;
//!
//!     fn update(&mut self, msg: HostEvent) -> Cmd<HostEvent> {
//!         if let HostEvent::RefreshRequested = msg {
//!             self.0 += 1;
//!         }
//!         Cmd::log(format!("clicks={}", self.0))
//!     }
//!
//!     fn view(&self) -> Element {
//!         Element::new("p").with_text(self.0.to_string())
//!     }
//! }
//! ```

use std::time::Duration;

use druid_widgets::Element;

use crate::event::HostEvent;
use crate::http::HttpRequest;
use crate::notifications::PermissionApi;

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages the model reacts to. Must be buildable from host events.
    type Message: From<HostEvent> + 'static;

    /// Startup commands, called once before any event.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Core state transition.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Current page tree.
    fn view(&self) -> Element;
}

/// Native OS notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsNotification {
    pub body: String,
    /// Close the notification this long after it is shown.
    pub close_after: Duration,
}

/// Side effects requested by a model.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message back to the model.
    Msg(M),
    /// Write a log line to the host console.
    Log(String),
    /// Perform an HTTP request and answer with a `Response` event.
    Http(HttpRequest),
    /// Ask for notification permission, answered by a `Permission` event.
    RequestPermission(PermissionApi),
    /// Open the server push channel; messages arrive as `Push` events.
    Subscribe { url: String },
    /// Show a native OS notification.
    Notify(OsNotification),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Http(req) => f.debug_tuple("Http").field(req).finish(),
            Self::RequestPermission(api) => f.debug_tuple("RequestPermission").field(api).finish(),
            Self::Subscribe { url } => f.debug_struct("Subscribe").field("url", url).finish(),
            Self::Notify(n) => f.debug_tuple("Notify").field(n).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    #[inline]
    pub fn http(request: HttpRequest) -> Self {
        Self::Http(request)
    }

    /// Create a batch of commands, flattening trivial cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Http(_) => "Http",
            Self::RequestPermission(_) => "RequestPermission",
            Self::Subscribe { .. } => "Subscribe",
            Self::Notify(_) => "Notify",
        }
    }

    /// Flatten batches into a list of leaf commands, in execution order.
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }

    /// Every HTTP request in this command tree, in execution order.
    #[must_use]
    pub fn requests(&self) -> Vec<&HttpRequest> {
        match self {
            Self::Http(req) => vec![req],
            Self::Batch(cmds) => cmds.iter().flat_map(Self::requests).collect(),
            _ => Vec::new(),
        }
    }
}
