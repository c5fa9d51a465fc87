#![forbid(unsafe_code)]

//! Requests the runtime asks the host to perform.
//!
//! The runtime never does I/O. It emits [`HttpRequest`] values through
//! [`Cmd::Http`](crate::program::Cmd::Http); the host performs them and
//! answers with [`HostEvent::Response`](crate::event::HostEvent::Response)
//! carrying the same [`RequestId`].

use std::fmt;

/// Correlates a request with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Json(String),
    Form(String),
}

impl RequestBody {
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::Form(_) => "application/x-www-form-urlencoded",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json(s) | Self::Form(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub id: RequestId,
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(id: RequestId, url: impl Into<String>) -> Self {
        Self {
            id,
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn delete(id: RequestId, url: impl Into<String>) -> Self {
        Self {
            id,
            method: HttpMethod::Delete,
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(id: RequestId, method: HttpMethod, url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            id,
            method,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// Failure reported by the host for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Non-success HTTP status.
    Status(u16),
    /// The request never completed (offline, aborted, CORS...).
    Network(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Percent-encode `s` for a URL query value or form field.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through.
#[must_use]
pub fn url_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// `application/x-www-form-urlencoded` body from ordered fields.
#[must_use]
pub fn form_encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
