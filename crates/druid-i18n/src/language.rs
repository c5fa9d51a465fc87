//! UI language selection from browser preferences.
//!
//! Preference order: the browser's primary declared language if supported,
//! then the first supported entry of the full preference list, then the
//! fallback. The full list is an experimental browser API, so it may be
//! missing entirely.

use crate::catalog::Locale;

/// Language preferences as reported by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguagePreferences {
    /// `navigator.language`.
    pub primary: Option<String>,
    /// `navigator.languages`, when the browser exposes it.
    pub languages: Option<Vec<String>>,
}

impl LanguagePreferences {
    #[must_use]
    pub fn with_primary(mut self, primary: impl Into<String>) -> Self {
        self.primary = Some(primary.into());
        self
    }

    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }
}

/// Reduce a language tag to its lowercase two-letter primary subtag.
///
/// `"fr-CA"`, `"fr_CA.UTF-8"` and `"FR"` all become `"fr"`. Returns `None`
/// for blank input.
#[must_use]
pub fn normalize_language(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw);
    let primary = raw.split(['-', '_']).next().unwrap_or(raw).trim();
    if primary.is_empty() {
        return None;
    }
    Some(primary.to_ascii_lowercase())
}

fn supported_match(raw: &str, supported: &[&str]) -> Option<Locale> {
    let lang = normalize_language(raw)?;
    supported.contains(&lang.as_str()).then_some(lang)
}

/// Choose the UI language.
#[must_use]
pub fn select_language(prefs: &LanguagePreferences, supported: &[&str], fallback: &str) -> Locale {
    if let Some(lang) = prefs
        .primary
        .as_deref()
        .and_then(|p| supported_match(p, supported))
    {
        return lang;
    }
    prefs
        .languages
        .iter()
        .flatten()
        .find_map(|l| supported_match(l, supported))
        .unwrap_or_else(|| fallback.to_owned())
}
