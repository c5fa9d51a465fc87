//! Translation E2E tests.
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p druid-i18n --test translation_e2e
//! ```
//!
//! # Invariants
//!
//! 1. **Totality**: translation never fails, whatever the key or arguments
//! 2. **Visible gaps**: undefined keys render as `"KEY" NOT DEFINED`
//! 3. **Fallback**: an unsupported browser language gets the fallback table

#![cfg(test)]

use druid_i18n::{
    Catalog, LanguagePreferences, StringTable, missing_placeholder, select_language, substitute,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const EN: &str = r#"{
    "RETRIEVING_CASE_REPORTS": "Retrieving reports for $1...",
    "EVENT_CLAIM": "$1 claimed case $2"
}"#;

const FR: &str = r#"{
    "RETRIEVING_CASE_REPORTS": "Récupération des rapports pour $1...",
    "EVENT_CLAIM": "$1 a réclamé le cas $2"
}"#;

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_locale("en", StringTable::from_json(EN).unwrap());
    catalog.add_locale("fr", StringTable::from_json(FR).unwrap());
    catalog
}

// ============================================================================
// 1. Catalog selection
// ============================================================================

#[test]
fn browser_language_picks_the_table() {
    let prefs = LanguagePreferences::default().with_languages(["de-AT", "fr-BE"]);
    let locale = select_language(&prefs, &["en", "fr"], "en");
    let tr = catalog().translator(&locale, "en");
    assert_eq!(tr.locale(), "fr");
    assert_eq!(
        tr.translate("EVENT_CLAIM", &["alice", "17"]),
        "alice a réclamé le cas 17"
    );
}

#[test]
fn unknown_locale_uses_fallback_table() {
    let tr = catalog().translator("de", "en");
    assert_eq!(tr.locale(), "en");
    assert_eq!(tr.translate("RETRIEVING_CASE_REPORTS", &["Cedar"]), "Retrieving reports for Cedar...");
}

#[test]
fn missing_key_is_visible() {
    let tr = catalog().translator("en", "en");
    assert_eq!(tr.translate("NOPE", &["x"]), missing_placeholder("NOPE"));
    assert_eq!(tr.text("NOPE"), "\"NOPE\" NOT DEFINED");
    assert_eq!(tr.lookup("NOPE"), None);
}

#[test]
fn malformed_table_is_an_error() {
    assert!(StringTable::from_json("[1, 2]").is_err());
}

// ============================================================================
// 2. Substitution properties
// ============================================================================

proptest! {
    #[test]
    fn templates_without_dollar_are_untouched(
        template in "[^$]{0,40}",
        args in prop::collection::vec("[a-z]{0,6}", 0..4),
    ) {
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        prop_assert_eq!(substitute("KEY", &template, &refs), template);
    }

    #[test]
    fn substitution_is_total(
        template in ".{0,40}",
        args in prop::collection::vec(".{0,6}", 0..4),
    ) {
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let _ = substitute("KEY", &template, &refs);
    }

    #[test]
    fn each_position_gets_its_argument(args in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let template: String = (1..=args.len()).map(|i| format!("<${i}>")).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let expected: String = args.iter().map(|a| format!("<{a}>")).collect();
        prop_assert_eq!(substitute("KEY", &template, &refs), expected);
    }

    #[test]
    fn positions_past_the_arguments_are_kept(arg in "[a-z]{1,6}") {
        prop_assert_eq!(substitute("KEY", "$1 $2", &[arg.as_str()]), format!("{arg} $2"));
    }
}
