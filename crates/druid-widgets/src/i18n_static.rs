#![forbid(unsafe_code)]

//! Translation of static page elements.

use druid_i18n::{Translator, missing_placeholder};

use crate::dom::Element;
use crate::page::I18N_ATTR;

/// Replace the content of every element under `root` carrying
/// `data-i18n="KEY"` with the translation of `KEY`.
///
/// Translations are markup. Undefined keys get the missing-key placeholder.
/// Returns the number of elements translated.
pub fn translate_static_elements(root: &mut Element, tr: &Translator) -> usize {
    let mut count = 0;
    root.for_each_with_attr_mut(I18N_ATTR, &mut |el| {
        let key = el.attr(I18N_ATTR).unwrap_or_default().to_owned();
        let text = match tr.lookup(&key) {
            Some(text) => text.to_owned(),
            None => {
                tracing::debug!(key = %key, "static element has no translation");
                missing_placeholder(&key)
            }
        };
        el.set_markup(text);
        count += 1;
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use druid_i18n::StringTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn translates_marked_elements_only() {
        let tr = Translator::new(
            "fr",
            [("ABOUT", "À propos"), ("VERSION", "Version : $1")]
                .into_iter()
                .collect::<StringTable>(),
        );
        let mut root = Element::new("div")
            .with_child(Element::new("h1").with_id("a").with_attr(I18N_ATTR, "ABOUT"))
            .with_child(Element::new("p").with_id("b").with_attr(I18N_ATTR, "GONE"))
            .with_child(Element::new("p").with_id("c").with_text("untouched"));
        assert_eq!(translate_static_elements(&mut root, &tr), 2);
        assert_eq!(root.find_by_id("a").unwrap().text_content(), "À propos");
        assert_eq!(
            root.find_by_id("b").unwrap().text_content(),
            "\"GONE\" NOT DEFINED"
        );
        assert_eq!(root.find_by_id("c").unwrap().text_content(), "untouched");
    }
}
