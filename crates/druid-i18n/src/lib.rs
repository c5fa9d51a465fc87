#![forbid(unsafe_code)]

//! Internationalization for the Druid Manager dashboard.
//!
//! - [`StringTable`]: one language's key to template map, loaded from the
//!   static per-language JSON resource.
//! - [`Translator`]: key lookup with `$N` positional substitution. Missing keys
//!   render as a visible `"KEY" NOT DEFINED` placeholder instead of failing.
//! - [`select_language`]: pick the UI language from the browser's declared
//!   preferences.

pub mod catalog;
pub mod language;

pub use catalog::{
    Catalog, Locale, StringTable, TableError, Translator, missing_placeholder, substitute,
};
pub use language::{LanguagePreferences, normalize_language, select_language};
