#![forbid(unsafe_code)]

//! Druid Manager dashboard public facade.
//!
//! Re-exports the common types of the internal crates and a prelude for
//! hosts embedding the dashboard.

use std::fmt;

// --- Model re-exports ------------------------------------------------------

pub use druid_core::{
    CaseAction, CaseId, CaseRow, CaseState, CaseUpdate, Cluster, ClusterDirectory, ClusterId,
    ColumnSpec, ColumnType, ModelError, ReportSet, ReportSpec, ReportSpecs, SortDirection,
    SortOrder, UpdateRequest,
};

// --- Text re-exports -------------------------------------------------------

pub use druid_i18n::{Catalog, LanguagePreferences, StringTable, Translator};

// --- Widget re-exports -----------------------------------------------------

pub use druid_widgets::{Element, ReportTable, StatusSurface, ToastHandle, ToastKind};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use druid_runtime::{
    ActionError, AdminError, AdminPreferences, Cmd, CookieJar, Dashboard, DashboardConfig,
    HostContext, HostEvent, HttpRequest, MemoryCookieJar, Model, PipelineState, PreferenceStore,
    StorageError, TransportError,
};

#[cfg(feature = "web")]
pub use druid_web::{StepProgram, WebBackendError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for dashboard hosts.
#[derive(Debug)]
pub enum Error {
    /// Server payload did not match the expected shape.
    Model(ModelError),
    #[cfg(feature = "runtime")]
    Storage(StorageError),
    #[cfg(feature = "runtime")]
    Action(ActionError),
    #[cfg(feature = "runtime")]
    Admin(AdminError),
    #[cfg(feature = "runtime")]
    Transport(TransportError),
    #[cfg(feature = "web")]
    Web(WebBackendError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Action(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Admin(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Transport(err) => write!(f, "{err}"),
            #[cfg(feature = "web")]
            Self::Web(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Action(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Admin(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Transport(err) => Some(err),
            #[cfg(feature = "web")]
            Self::Web(err) => Some(err),
        }
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

#[cfg(feature = "runtime")]
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ActionError> for Error {
    fn from(err: ActionError) -> Self {
        Self::Action(err)
    }
}

#[cfg(feature = "runtime")]
impl From<AdminError> for Error {
    fn from(err: AdminError) -> Self {
        Self::Admin(err)
    }
}

#[cfg(feature = "runtime")]
impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

#[cfg(feature = "web")]
impl From<WebBackendError> for Error {
    fn from(err: WebBackendError) -> Self {
        Self::Web(err)
    }
}

/// Standard result type for dashboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CaseAction, CaseId, ClusterId, Element, Error, ReportSpecs, Result, SortOrder, Translator,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Cmd, CookieJar, Dashboard, DashboardConfig, HostEvent, Model};

    #[cfg(feature = "web")]
    pub use crate::StepProgram;

    pub use crate::{core, i18n, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;

    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use druid_core as core;
pub use druid_i18n as i18n;
pub use druid_widgets as widgets;
#[cfg(feature = "runtime")]
pub use druid_runtime as runtime;
#[cfg(feature = "web")]
pub use druid_web as web;
