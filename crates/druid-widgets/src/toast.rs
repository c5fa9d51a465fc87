#![forbid(unsafe_code)]

//! Status/alert toasts.
//!
//! Toasts live in an arena: every issued toast gets the next slot index as
//! its [`ToastHandle`], and clearing a toast tombstones its slot instead of
//! removing it. Slots are never reused or compacted, so a handle stays valid
//! (pointing either at its own toast or at a tombstone) for the life of the
//! surface, no matter how show/clear calls from concurrent operations
//! interleave.
//!
//! # Example
//!
//! ```ignore
//! let mut surface = StatusSurface::new();
//! let busy = surface.status("Retrieving cluster info...");
//! // ... request completes ...
//! surface.clear(busy);
//! ```

use std::time::Duration;

use druid_i18n::Translator;

use crate::dom::Element;

/// Id of the element toasts are prepended to.
pub const TOAST_CONTAINER_ID: &str = "toast-container";

/// Visual category of a toast. Styling only; all kinds behave alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Alert,
    Error,
}

impl ToastKind {
    /// Background classes of the toast element.
    #[must_use]
    pub const fn classes(self) -> &'static str {
        match self {
            Self::Info => "bg-info",
            Self::Alert => "bg-warning",
            Self::Error => "text-white bg-danger",
        }
    }

    /// Translation key of the default header title.
    #[must_use]
    pub const fn title_key(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Alert => "ALERT",
            Self::Error => "ERROR",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Error => "error",
        }
    }
}

/// Per-toast options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastConfig {
    /// Dismiss automatically after this long. `None` means the toast stays
    /// until cleared.
    pub autohide: Option<Duration>,
    /// Render a close button.
    pub closable: bool,
    /// Id of the container element.
    pub parent: String,
    /// Header title override; the localized kind title otherwise.
    pub title: Option<String>,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            autohide: None,
            closable: true,
            parent: TOAST_CONTAINER_ID.to_owned(),
            title: None,
        }
    }
}

impl ToastConfig {
    /// In-flight operation message: no close button, cleared by its owner.
    #[must_use]
    pub fn status() -> Self {
        Self {
            closable: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn autohide(mut self, after: Duration) -> Self {
        self.autohide = Some(after);
        self
    }

    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Stable index of an issued toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToastHandle(usize);

impl ToastHandle {
    /// Handle for a raw slot index, e.g. one round-tripped through JS.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One live toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub config: ToastConfig,
    /// Surface time at which the toast was shown.
    pub shown_at: Duration,
}

impl Toast {
    #[must_use]
    pub fn is_expired(&self, now: Duration) -> bool {
        self.config
            .autohide
            .is_some_and(|after| now.saturating_sub(self.shown_at) >= after)
    }

    /// Element for this toast, with `id` `toast-<handle>`.
    #[must_use]
    pub fn render(&self, handle: ToastHandle, tr: &Translator) -> Element {
        let title = self
            .config
            .title
            .clone()
            .unwrap_or_else(|| tr.text(self.kind.title_key()));
        let mut header = Element::new("div")
            .with_class("toast-header")
            .with_child(Element::new("strong").with_class("me-auto").with_text(title))
            .with_child(Element::new("small"));
        if self.config.closable {
            header.push_child(
                Element::new("button")
                    .with_class("btn-close")
                    .with_attr("type", "button")
                    .with_attr("data-bs-dismiss", "toast")
                    .with_attr("aria-label", "Close"),
            );
        }
        Element::new("div")
            .with_id(format!("toast-{}", handle.index()))
            .with_class("toast show")
            .with_class(self.kind.classes())
            .with_attr("role", "alert")
            .with_attr("aria-live", "assertive")
            .with_attr("aria-atomic", "true")
            .with_child(header)
            .with_child(
                Element::new("div")
                    .with_class("toast-body")
                    .with_text(self.message.clone()),
            )
    }
}

/// Arena of issued toasts.
#[derive(Debug, Clone, Default)]
pub struct StatusSurface {
    slots: Vec<Option<Toast>>,
    now: Duration,
}

impl StatusSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast and return its handle.
    pub fn show(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        config: ToastConfig,
    ) -> ToastHandle {
        let handle = ToastHandle(self.slots.len());
        let message = message.into();
        tracing::debug!(handle = handle.0, kind = kind.as_str(), %message, "toast shown");
        self.slots.push(Some(Toast {
            kind,
            message,
            config,
            shown_at: self.now,
        }));
        handle
    }

    /// Persistent info toast without a close button.
    pub fn status(&mut self, message: impl Into<String>) -> ToastHandle {
        self.show(ToastKind::Info, message, ToastConfig::status())
    }

    /// Error toast, dismissible, never auto-hidden.
    pub fn error(&mut self, message: impl Into<String>) -> ToastHandle {
        self.show(ToastKind::Error, message, ToastConfig::default())
    }

    /// Warning toast, dismissible, never auto-hidden.
    pub fn warning(&mut self, message: impl Into<String>) -> ToastHandle {
        self.show(ToastKind::Alert, message, ToastConfig::default())
    }

    /// Tombstone the toast behind `handle`.
    ///
    /// Returns `false` if the handle was already cleared or never issued;
    /// that is not an error and no other slot is touched.
    pub fn clear(&mut self, handle: ToastHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.0) else {
            return false;
        };
        if slot.take().is_none() {
            return false;
        }
        tracing::debug!(handle = handle.0, "toast cleared");
        true
    }

    #[must_use]
    pub fn get(&self, handle: ToastHandle) -> Option<&Toast> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_live(&self, handle: ToastHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of handles issued so far, tombstones included.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Live toasts, newest first.
    pub fn live(&self) -> impl Iterator<Item = (ToastHandle, &Toast)> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (ToastHandle(i), t)))
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the surface clock to `now` and clear every auto-hidden toast
    /// that expired. Returns the cleared handles.
    pub fn advance_to(&mut self, now: Duration) -> Vec<ToastHandle> {
        self.now = self.now.max(now);
        let expired: Vec<ToastHandle> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|t| t.is_expired(self.now))
                    .map(|_| ToastHandle(i))
            })
            .collect();
        for handle in &expired {
            self.clear(*handle);
        }
        expired
    }

    /// Container element `parent` holding its live toasts, newest first.
    #[must_use]
    pub fn render(&self, parent: &str, tr: &Translator) -> Element {
        Element::new("div").with_id(parent).with_children(
            self.live()
                .filter(|(_, t)| t.config.parent == parent)
                .map(|(h, t)| t.render(h, tr)),
        )
    }
}
