//! String tables and translation.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Two-letter language code such as `"en"`.
pub type Locale = String;

/// Error raised when a language resource cannot be decoded.
#[derive(Debug)]
pub struct TableError(serde_json::Error);

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid string table: {}", self.0)
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Key to template map for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: HashMap<String, String>,
}

impl StringTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.strings.insert(key.into(), template.into());
    }

    /// Decode a `{ "KEY": "template", ... }` resource.
    ///
    /// Non-string values are skipped.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let value: HashMap<String, Value> = serde_json::from_str(json).map_err(TableError)?;
        let strings = value
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => {
                    tracing::debug!(key = %k, "skipping non-string translation entry");
                    None
                }
            })
            .collect();
        Ok(Self { strings })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StringTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            strings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Placeholder rendered for keys with no translation.
#[must_use]
pub fn missing_placeholder(key: &str) -> String {
    format!("\"{key}\" NOT DEFINED")
}

/// Replace `$N` placeholders in `template`.
///
/// `$1` is the first entry of `args`, `$2` the second, and so on; a position
/// may appear any number of times. `$0` is the key itself. Positions with no
/// argument are left as written. With no arguments the template is returned
/// untouched.
#[must_use]
pub fn substitute(key: &str, template: &str, args: &[&str]) -> String {
    if args.is_empty() {
        return template.to_owned();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());
        if digits == 0 {
            out.push('$');
            rest = after;
            continue;
        }
        let replacement = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| if n == 0 { Some(key) } else { args.get(n - 1).copied() });
        match replacement {
            Some(text) => out.push_str(text),
            None => out.push_str(&rest[pos..pos + 1 + digits]),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

/// Active-language lookup with positional substitution.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    locale: Locale,
    table: StringTable,
}

impl Translator {
    pub fn new(locale: impl Into<Locale>, table: StringTable) -> Self {
        Self {
            locale: locale.into(),
            table,
        }
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Raw template for `key`, if defined.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.table.get(key)
    }

    /// Translate `key`, substituting `$N` with `args`.
    ///
    /// Never fails: an undefined key yields [`missing_placeholder`].
    #[must_use]
    pub fn translate(&self, key: &str, args: &[&str]) -> String {
        match self.table.get(key) {
            Some(template) => substitute(key, template, args),
            None => {
                tracing::debug!(key, locale = %self.locale, "translation not defined");
                missing_placeholder(key)
            }
        }
    }

    /// Translate `key` with no arguments.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.translate(key, &[])
    }
}

/// Loaded string tables for every supported language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Locale, StringTable>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_locale(&mut self, locale: impl Into<Locale>, table: StringTable) {
        self.tables.insert(locale.into(), table);
    }

    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.tables.contains_key(locale)
    }

    /// Translator for `locale`, or for `fallback` when `locale` isn't loaded.
    ///
    /// If neither is loaded the translator is empty and every key renders
    /// as a placeholder.
    #[must_use]
    pub fn translator(&self, locale: &str, fallback: &str) -> Translator {
        let chosen = if self.tables.contains_key(locale) {
            locale
        } else {
            fallback
        };
        let table = self.tables.get(chosen).cloned().unwrap_or_default();
        Translator::new(chosen, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn english() -> Translator {
        let table: StringTable = [
            ("EVENT_UPDATE", "Updated from $1 to $2"),
            ("REPORT_HEADER", "$1 - reported $2"),
            ("ECHO", "$1 and $1 again, key $0"),
            ("PRICE", "Costs $ 5, not $3"),
            ("NO_REPORTS", "There are no current reports for this cluster."),
        ]
        .into_iter()
        .collect();
        Translator::new("en", table)
    }

    #[test]
    fn substitutes_positional_arguments_in_order() {
        assert_eq!(
            english().translate("EVENT_UPDATE", &["A", "B"]),
            "Updated from A to B"
        );
    }

    #[test]
    fn reuses_same_position() {
        assert_eq!(
            english().translate("ECHO", &["x"]),
            "x and x again, key ECHO"
        );
    }

    #[test]
    fn missing_key_is_flagged_not_fatal() {
        let text = english().translate("NOPE", &["a"]);
        assert!(text.contains("NOPE"));
        assert!(text.contains("NOT DEFINED"));
    }

    #[test]
    fn unmatched_positions_and_bare_dollars_survive() {
        assert_eq!(english().translate("PRICE", &["x"]), "Costs $ 5, not $3");
    }

    #[test]
    fn no_arguments_leaves_template_untouched() {
        assert_eq!(english().translate("ECHO", &[]), "$1 and $1 again, key $0");
    }

    #[test]
    fn table_from_json_skips_non_strings() {
        let table = StringTable::from_json(r#"{"OK": "Okay", "N": 3}"#).unwrap();
        assert_eq!(table.get("OK"), Some("Okay"));
        assert_eq!(table.get("N"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_from_json_rejects_garbage() {
        assert!(StringTable::from_json("[1, 2]").is_err());
    }

    #[test]
    fn catalog_falls_back() {
        let mut catalog = Catalog::new();
        catalog.add_locale("en", [("OK", "Okay")].into_iter().collect());
        catalog.add_locale("fr", [("OK", "D'accord")].into_iter().collect());
        assert_eq!(catalog.translator("fr", "en").text("OK"), "D'accord");
        let de = catalog.translator("de", "en");
        assert_eq!(de.locale(), "en");
        assert_eq!(de.text("OK"), "Okay");
    }

    proptest! {
        #[test]
        fn templates_without_dollars_pass_through(
            template in "[^$]{0,40}",
            args in proptest::collection::vec("[a-z]{0,5}", 0..4),
        ) {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            prop_assert_eq!(substitute("K", &template, &args), template);
        }

        #[test]
        fn every_in_range_position_is_replaced(n in 1usize..6) {
            let args: Vec<String> = (0..n).map(|i| format!("<{i}>")).collect();
            let refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let template: String = (1..=n).map(|i| format!("${i} ")).collect();
            let out = substitute("K", &template, &refs);
            prop_assert!(!out.contains('$'));
            for arg in &args {
                prop_assert!(out.contains(arg.as_str()));
            }
        }
    }
}
