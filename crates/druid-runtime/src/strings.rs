#![forbid(unsafe_code)]

//! Built-in string tables.

use druid_i18n::{Catalog, LanguagePreferences, StringTable, Translator, select_language};

use crate::config::DashboardConfig;

const BUILTIN: [(&str, &str); 2] = [
    ("en", include_str!("../assets/i18n/en.json")),
    ("fr", include_str!("../assets/i18n/fr.json")),
];

/// Catalog of the string tables shipped with the crate.
#[must_use]
pub fn builtin_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for (locale, json) in BUILTIN {
        match StringTable::from_json(json) {
            Ok(table) => catalog.add_locale(locale, table),
            Err(err) => tracing::error!(locale, error = %err, "bundled string table is invalid"),
        }
    }
    catalog
}

/// Translator for the browser's preferred supported language.
#[must_use]
pub fn translator_for(config: &DashboardConfig, catalog: &Catalog, languages: &LanguagePreferences) -> Translator {
    let locale = select_language(languages, &config.languages(), &config.fallback_language);
    tracing::debug!(locale = %locale, "selected UI language");
    catalog.translator(&locale, &config.fallback_language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_have_the_same_keys() {
        let tables: Vec<StringTable> = BUILTIN
            .iter()
            .map(|(_, json)| StringTable::from_json(json).unwrap())
            .collect();
        assert!(tables[0].len() > 20);
        assert_eq!(tables[0].len(), tables[1].len());
    }

    #[test]
    fn french_browser_gets_french() {
        let catalog = builtin_catalog();
        let prefs = LanguagePreferences::default().with_primary("fr-CA");
        let tr = translator_for(&DashboardConfig::default(), &catalog, &prefs);
        assert_eq!(tr.locale(), "fr");
        assert_eq!(tr.translate("REPORT_HEADER", &["Rafales", "hier"]), "Rafales - signalé hier");
    }

    #[test]
    fn unsupported_language_falls_back() {
        let catalog = builtin_catalog();
        let prefs = LanguagePreferences::default().with_primary("de");
        let tr = translator_for(&DashboardConfig::default(), &catalog, &prefs);
        assert_eq!(tr.locale(), "en");
        assert_eq!(tr.text("NO_REPORTS"), "There are no current reports for this cluster.");
    }
}
