#![forbid(unsafe_code)]

//! Server push notifications.
//!
//! On startup the bridge asks for notification permission and opens the push
//! subscription. Each pushed message is classified:
//!
//! | message          | focus / permission            | presentation          |
//! |------------------|-------------------------------|-----------------------|
//! | refresh sentinel | any                           | none                  |
//! | other            | focused, or not granted       | in-page banner        |
//! | other            | unfocused and granted         | OS notification (15s) |
//!
//! Every message, sentinel or not, also refreshes the page content. Browsers
//! without notification support get the manual refresh link instead and no
//! subscription.

use std::time::Duration;

use crate::program::{Cmd, OsNotification};

/// Browser notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PermissionState {
    /// Not decided yet.
    #[default]
    Default,
    Granted,
    Denied,
}

impl PermissionState {
    /// Parse `Notification.permission`; unknown values count as undecided.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "granted" => Self::Granted,
            "denied" => Self::Denied,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// Shape of the browser's `Notification.requestPermission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionApi {
    /// Returns a promise (current browsers).
    Promise,
    /// Takes a callback (older Safari).
    Callback,
}

/// Notification capabilities of the host browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSupport {
    pub supported: bool,
    pub api: PermissionApi,
}

impl NotificationSupport {
    #[must_use]
    pub const fn promise() -> Self {
        Self {
            supported: true,
            api: PermissionApi::Promise,
        }
    }

    #[must_use]
    pub const fn callback() -> Self {
        Self {
            supported: true,
            api: PermissionApi::Callback,
        }
    }

    #[must_use]
    pub const fn unsupported() -> Self {
        Self {
            supported: false,
            api: PermissionApi::Promise,
        }
    }
}

/// How a pushed message is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Refresh sentinel: refresh, show nothing.
    RefreshOnly,
    /// Show the message in the page banner, then refresh.
    Banner(String),
    /// Raise an OS notification, then refresh.
    Os(OsNotification),
}

impl PushOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RefreshOnly => "refresh",
            Self::Banner(_) => "banner",
            Self::Os(_) => "os",
        }
    }
}

/// Notification state for one page.
#[derive(Debug, Clone)]
pub struct NotificationBridge {
    support: NotificationSupport,
    permission: PermissionState,
    focused: bool,
    sentinel: String,
    close_after: Duration,
}

impl NotificationBridge {
    pub fn new(support: NotificationSupport, sentinel: impl Into<String>, close_after: Duration) -> Self {
        Self {
            support,
            permission: PermissionState::Default,
            focused: true,
            sentinel: sentinel.into(),
            close_after,
        }
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.support.supported
    }

    #[must_use]
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn set_permission(&mut self, permission: PermissionState) {
        tracing::info!(permission = permission.as_str(), "notification permission");
        self.permission = permission;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Commands to run at page load.
    ///
    /// Empty when notifications are unsupported; the caller shows the manual
    /// refresh link in that case.
    pub fn startup<M>(&self, url: &str) -> Cmd<M> {
        if !self.support.supported {
            tracing::info!("notifications unsupported, falling back to manual refresh");
            return Cmd::none();
        }
        Cmd::batch(vec![
            Cmd::RequestPermission(self.support.api),
            Cmd::Subscribe {
                url: url.to_owned(),
            },
        ])
    }

    /// Decide how to present a pushed message.
    #[must_use]
    pub fn classify(&self, data: &str) -> PushOutcome {
        if data == self.sentinel {
            return PushOutcome::RefreshOnly;
        }
        if self.focused || self.permission != PermissionState::Granted {
            return PushOutcome::Banner(data.to_owned());
        }
        PushOutcome::Os(OsNotification {
            body: data.to_owned(),
            close_after: self.close_after,
        })
    }
}
