#![forbid(unsafe_code)]

//! Dashboard page skeleton.
//!
//! The fixed containers the pipeline fills in: toasts, the notification
//! banner, the manual refresh link, and the tab/pane containers.

use crate::dom::Element;
use crate::toast::TOAST_CONTAINER_ID;

pub const NOTIFICATION_ID: &str = "notification";
pub const REFRESH_LINK_ID: &str = "refresh_content_link";
pub const TABS_CONTAINER_ID: &str = "tabs_container";
pub const PANES_CONTAINER_ID: &str = "panes_container";

/// Attribute naming the translation key of a static element.
pub const I18N_ATTR: &str = "data-i18n";

/// Empty dashboard page.
#[must_use]
pub fn dashboard_skeleton() -> Element {
    Element::new("div")
        .with_id("dashboard")
        .with_child(
            Element::new("div")
                .with_id(TOAST_CONTAINER_ID)
                .with_class("toast-container position-fixed top-0 end-0 p-3"),
        )
        .with_child(
            Element::new("div")
                .with_id(NOTIFICATION_ID)
                .with_class("alert alert-info")
                .with_attr("role", "alert")
                .with_attr("hidden", ""),
        )
        .with_child(
            Element::new("a")
                .with_id(REFRESH_LINK_ID)
                .with_attr("href", "#")
                .with_attr(I18N_ATTR, "REFRESH_CONTENT")
                .with_attr("hidden", ""),
        )
        .with_child(
            Element::new("ul")
                .with_id(TABS_CONTAINER_ID)
                .with_class("nav nav-tabs")
                .with_attr("role", "tablist"),
        )
        .with_child(
            Element::new("div")
                .with_id(PANES_CONTAINER_ID)
                .with_class("tab-content"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_has_every_container() {
        let page = dashboard_skeleton();
        for id in [
            TOAST_CONTAINER_ID,
            NOTIFICATION_ID,
            REFRESH_LINK_ID,
            TABS_CONTAINER_ID,
            PANES_CONTAINER_ID,
        ] {
            assert!(page.find_by_id(id).is_some(), "missing #{id}");
        }
        assert!(page.find_by_id(NOTIFICATION_ID).unwrap().is_hidden());
        assert!(page.find_by_id(REFRESH_LINK_ID).unwrap().is_hidden());
    }
}
