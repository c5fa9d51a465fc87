#![forbid(unsafe_code)]

//! Admin page helpers: remembered tab, API key generation, and the
//! component / API key management requests.

use std::fmt;

use druid_core::ClusterId;
use serde_json::{Map, Value};

use crate::config::DashboardConfig;
use crate::http::{HttpMethod, HttpRequest, RequestBody, RequestId, form_encode, url_encode};
use crate::state_persistence::CookieJar;

/// Admin tab shown when none is remembered.
pub const DEFAULT_ADMIN_TAB: &str = "authz";

/// Length of a generated API key.
pub const API_KEY_LEN: usize = 64;

const API_KEY_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// Fewer random bytes than key characters.
    NotEnoughEntropy { needed: usize, got: usize },
    /// A required form field was blank.
    MissingField(&'static str),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughEntropy { needed, got } => {
                write!(f, "need {needed} random bytes, got {got}")
            }
            Self::MissingField(field) => write!(f, "missing field: {field}"),
        }
    }
}

impl std::error::Error for AdminError {}

/// The admin page's own cookie blob, `{ "activeTab": ... }`.
///
/// Unknown keys in the stored blob are kept on write.
#[derive(Debug)]
pub struct AdminPreferences<J: CookieJar> {
    jar: J,
    cookie: String,
    prefs: Map<String, Value>,
}

impl<J: CookieJar> AdminPreferences<J> {
    pub fn load(jar: J, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        let prefs = match jar.get(&cookie) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!(cookie = %cookie, "ignoring malformed admin preferences");
                    Map::new()
                }
            },
            Ok(None) => Map::new(),
            Err(err) => {
                tracing::warn!(cookie = %cookie, error = %err, "admin preferences unavailable");
                Map::new()
            }
        };
        Self { jar, cookie, prefs }
    }

    /// Load from the admin cookie named in `config`.
    pub fn from_config(jar: J, config: &DashboardConfig) -> Self {
        Self::load(jar, config.admin_prefs_cookie.clone())
    }

    #[must_use]
    pub fn active_tab(&self) -> &str {
        self.prefs
            .get("activeTab")
            .and_then(Value::as_str)
            .filter(|tab| !tab.is_empty())
            .unwrap_or(DEFAULT_ADMIN_TAB)
    }

    pub fn set_active_tab(&mut self, tab: &str) {
        self.prefs.insert("activeTab".to_owned(), Value::String(tab.to_owned()));
        let raw = Value::Object(self.prefs.clone()).to_string();
        if let Err(err) = self.jar.set(&self.cookie, &raw) {
            tracing::warn!(cookie = %self.cookie, error = %err, "failed to persist admin preferences");
        }
    }
}

/// 64-character API key drawn from `A-Z a-z 0-9 + /`.
///
/// Each character takes one byte of `random` modulo 64, so a uniform byte
/// source gives uniform characters.
pub fn generate_api_key(random: &[u8]) -> Result<String, AdminError> {
    if random.len() < API_KEY_LEN {
        return Err(AdminError::NotEnoughEntropy {
            needed: API_KEY_LEN,
            got: random.len(),
        });
    }
    Ok(random[..API_KEY_LEN]
        .iter()
        .map(|b| API_KEY_ALPHABET[usize::from(b % 64)] as char)
        .collect())
}

/// Component id as the server derives it: `<cluster>_<service>`.
#[must_use]
pub fn component_id(cluster: &ClusterId, service: &str) -> String {
    format!("{cluster}_{service}")
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::MissingField(field));
    }
    Ok(value)
}

fn join(base: &str, tail: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), url_encode(tail))
}

/// Register a component.
pub fn add_component(
    id: RequestId,
    url: &str,
    name: &str,
    cluster: &ClusterId,
    service: &str,
) -> Result<HttpRequest, AdminError> {
    let body = form_encode(&[
        ("name", required("name", name)?),
        ("cluster", required("cluster", cluster.as_str())?),
        ("service", required("service", service)?),
    ]);
    Ok(HttpRequest::with_body(id, HttpMethod::Post, url, RequestBody::Form(body)))
}

pub fn delete_component(id: RequestId, url: &str, component: &str) -> Result<HttpRequest, AdminError> {
    Ok(HttpRequest::delete(id, join(url, required("component", component)?)))
}

/// Register an API key for a component.
pub fn add_api_key(
    id: RequestId,
    url: &str,
    access: &str,
    secret: &str,
    component: &str,
) -> Result<HttpRequest, AdminError> {
    let body = form_encode(&[
        ("apikey_name", required("apikey_name", access)?),
        ("apikey", required("apikey", secret)?),
        ("component", required("component", component)?),
    ]);
    Ok(HttpRequest::with_body(id, HttpMethod::Post, url, RequestBody::Form(body)))
}

pub fn delete_api_key(id: RequestId, url: &str, access: &str) -> Result<HttpRequest, AdminError> {
    Ok(HttpRequest::delete(id, join(url, required("apikey_name", access)?)))
}

/// Component and API key requests against the configured endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AdminEndpoints<'a> {
    components_url: &'a str,
    apikeys_url: &'a str,
}

impl<'a> AdminEndpoints<'a> {
    #[must_use]
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self {
            components_url: &config.components_url,
            apikeys_url: &config.apikeys_url,
        }
    }

    pub fn add_component(
        &self,
        id: RequestId,
        name: &str,
        cluster: &ClusterId,
        service: &str,
    ) -> Result<HttpRequest, AdminError> {
        add_component(id, self.components_url, name, cluster, service)
    }

    pub fn delete_component(&self, id: RequestId, component: &str) -> Result<HttpRequest, AdminError> {
        delete_component(id, self.components_url, component)
    }

    pub fn add_api_key(
        &self,
        id: RequestId,
        access: &str,
        secret: &str,
        component: &str,
    ) -> Result<HttpRequest, AdminError> {
        add_api_key(id, self.apikeys_url, access, secret, component)
    }

    pub fn delete_api_key(&self, id: RequestId, access: &str) -> Result<HttpRequest, AdminError> {
        delete_api_key(id, self.apikeys_url, access)
    }
}
