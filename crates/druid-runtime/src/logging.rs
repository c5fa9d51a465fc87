#![forbid(unsafe_code)]

//! Log subscriber setup for native hosts.
//!
//! The library only emits `tracing` events. Binaries and test harnesses call
//! [`init_logging`] (feature `logging`) to print them; the web host collects
//! `Cmd::Log` lines instead.

use std::fmt;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "DRUID_LOG";

/// Filter directive from `DRUID_LOG`, then `RUST_LOG`, then `info`.
#[must_use]
pub fn filter_directive() -> String {
    directive_from(|key| std::env::var(key).ok())
}

fn directive_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "info".to_owned())
}

#[derive(Debug)]
pub enum LoggingError {
    /// The filter directive did not parse.
    InvalidFilter(String),
    /// Another global subscriber is already installed.
    SubscriberAlreadySet(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::SubscriberAlreadySet(msg) => write!(f, "subscriber already set: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Install the global subscriber: fmt output filtered by [`filter_directive`].
///
/// With `json` (and the `tracing-json` feature) lines are JSON objects.
#[cfg(feature = "logging")]
pub fn init_logging(json: bool) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::util::TryInitError;

    let directive = filter_directive();
    let filter = EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;
    let already = |e: TryInitError| LoggingError::SubscriberAlreadySet(e.to_string());

    #[cfg(feature = "tracing-json")]
    if json {
        return tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(already);
    }
    #[cfg(not(feature = "tracing-json"))]
    if json {
        tracing::warn!("JSON logs need the tracing-json feature, using text");
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(already)
}
