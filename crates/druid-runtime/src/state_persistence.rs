//! Cookie-backed storage for preference blobs.
//!
//! Preferences persist as whole JSON blobs, one cookie per blob. The runtime
//! only sees the [`CookieJar`] trait; hosts supply the backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            PreferenceStore / AdminPreferences                 │
//! │   - In-memory blob, mutated by accessors                      │
//! │   - Write-through: every setter re-serializes the blob        │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       CookieJar                               │
//! │   - MemoryCookieJar: in-memory (testing, native hosts)        │
//! │   - FileCookieJar: JSON file (requires state-persistence)     │
//! │   - document.cookie jar (druid-web, wasm32 only)              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned; callers log and carry on |
//! | `StorageError::Serialization` | JSON encode/decode | Returned; blob treated as empty |
//! | `StorageError::Unavailable` | Cookies disabled | Returned; preferences live in memory only |
//!
//! Concurrent tabs writing the same cookie race; the last writer wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while reading or writing cookies.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Backend is not available (cookies disabled, no document).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_) | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Cookie Jar Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A place to keep named cookie values.
///
/// Values passed in and out are decoded; encoding for the wire is the
/// backend's business.
pub trait CookieJar {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read cookie `name`. `Ok(None)` when it isn't set.
    fn get(&self, name: &str) -> StorageResult<Option<String>>;

    /// Set cookie `name` to `value` with `SameSite=Strict`, no expiry.
    fn set(&self, name: &str, value: &str) -> StorageResult<()>;

    /// Remove cookie `name`.
    fn remove(&self, name: &str) -> StorageResult<()>;
}

impl<J: CookieJar + ?Sized> CookieJar for Rc<J> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str) -> StorageResult<()> {
        (**self).set(name, value)
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        (**self).remove(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cookie wire format
// ─────────────────────────────────────────────────────────────────────────────

/// Percent-encode a cookie value.
///
/// Everything outside the URL unreserved set becomes `%XX`, so separators
/// (`;` `,` space) and non-ASCII never reach the cookie header raw.
#[must_use]
pub fn encode_cookie_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Reverse [`encode_cookie_value`]. Malformed escapes are kept literally;
/// escapes that decode to invalid UTF-8 leave the raw text untouched.
#[must_use]
pub fn decode_cookie_value(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            tracing::debug!(error = %err, "cookie value is not UTF-8 after decoding, keeping raw text");
            raw.to_owned()
        }
    }
}

/// `document.cookie` assignment for `name=value`.
#[must_use]
pub fn cookie_assignment(name: &str, value: &str) -> String {
    format!("{name}={}; path=/; SameSite=Strict", encode_cookie_value(value))
}

/// `document.cookie` assignment that deletes `name`.
#[must_use]
pub fn cookie_removal(name: &str) -> String {
    format!("{name}=; path=/; SameSite=Strict; expires=Thu, 01 Jan 1970 00:00:00 GMT")
}

/// Find cookie `name` in a `document.cookie` style header and decode it.
#[must_use]
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| decode_cookie_value(value.trim()))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Jar (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory cookie jar for tests and native hosts.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<HashMap<String, String>>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar pre-populated with one cookie.
    #[must_use]
    pub fn with_cookie(name: &str, value: &str) -> Self {
        let jar = Self::new();
        jar.cookies.borrow_mut().insert(name.to_owned(), value.to_owned());
        jar
    }

    /// Number of cookies set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.borrow().is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn name(&self) -> &str {
        "MemoryCookieJar"
    }

    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self.cookies.borrow().get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> StorageResult<()> {
        self.cookies
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        self.cookies.borrow_mut().remove(name);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Jar (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_jar {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// Cookie jar persisted as a JSON object of name to value.
    ///
    /// Writes go to `{path}.tmp` first and are renamed into place.
    #[derive(Debug, Clone)]
    pub struct FileCookieJar {
        path: PathBuf,
    }

    impl FileCookieJar {
        /// The file does not need to exist; it is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn load(&self) -> StorageResult<BTreeMap<String, String>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            Ok(serde_json::from_reader(reader)?)
        }

        fn store(&self, cookies: &BTreeMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, cookies)?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            tracing::debug!(path = %self.path.display(), cookies = cookies.len(), "saved cookie jar");
            Ok(())
        }
    }

    impl CookieJar for FileCookieJar {
        fn name(&self) -> &str {
            "FileCookieJar"
        }

        fn get(&self, name: &str) -> StorageResult<Option<String>> {
            Ok(self.load()?.remove(name))
        }

        fn set(&self, name: &str, value: &str) -> StorageResult<()> {
            let mut cookies = self.load().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "cookie file unreadable, starting fresh");
                BTreeMap::new()
            });
            cookies.insert(name.to_owned(), value.to_owned());
            self.store(&cookies)
        }

        fn remove(&self, name: &str) -> StorageResult<()> {
            let mut cookies = self.load()?;
            if cookies.remove(name).is_some() {
                self.store(&cookies)?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_jar::FileCookieJar;
