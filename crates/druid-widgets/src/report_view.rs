#![forbid(unsafe_code)]

//! Cluster tabs, cluster panes and report accordions.
//!
//! Every element gets a predictable id so later events (a refresh, an
//! accordion toggle) can find it again:
//!
//! | element              | id                              |
//! |----------------------|---------------------------------|
//! | tab button           | `<cluster>-tab`                 |
//! | tab pane             | `<cluster>-pane`                |
//! | accordion container  | `<cluster>_accordions`          |
//! | accordion heading    | `heading-<cluster>-<report>`    |
//! | accordion button     | `collapse-button-<cluster>-<report>` |
//! | accordion body       | `collapse-<cluster>-<report>`   |

use druid_core::epoch::format_local;
use druid_core::{Cluster, ClusterId};
use druid_i18n::Translator;

use crate::dom::Element;

#[must_use]
pub fn tab_id(cluster: &ClusterId) -> String {
    format!("{cluster}-tab")
}

#[must_use]
pub fn pane_id(cluster: &ClusterId) -> String {
    format!("{cluster}-pane")
}

#[must_use]
pub fn accordions_id(cluster: &ClusterId) -> String {
    format!("{cluster}_accordions")
}

#[must_use]
pub fn heading_id(cluster: &ClusterId, report: &str) -> String {
    format!("heading-{cluster}-{report}")
}

#[must_use]
pub fn collapse_button_id(cluster: &ClusterId, report: &str) -> String {
    format!("collapse-button-{cluster}-{report}")
}

#[must_use]
pub fn collapse_id(cluster: &ClusterId, report: &str) -> String {
    format!("collapse-{cluster}-{report}")
}

/// Tab list item for `cluster`.
#[must_use]
pub fn cluster_tab(cluster: &Cluster) -> Element {
    Element::new("li")
        .with_class("nav-item")
        .with_attr("role", "presentation")
        .with_child(
            Element::new("button")
                .with_id(tab_id(&cluster.id))
                .with_class("nav-link")
                .with_attr("data-bs-toggle", "tab")
                .with_attr("data-bs-target", format!("#{}", pane_id(&cluster.id)))
                .with_attr("role", "tab")
                .with_attr("data-cluster", cluster.id.as_str())
                .with_attr("aria-controls", cluster.id.as_str())
                .with_attr("aria-selected", "false")
                .with_text(cluster.name.clone()),
        )
}

/// Tab pane for `cluster`, holding an empty accordion container.
#[must_use]
pub fn cluster_pane(cluster: &ClusterId) -> Element {
    Element::new("div")
        .with_id(pane_id(cluster))
        .with_class("tab-pane fade")
        .with_attr("role", "tabpanel")
        .with_attr("aria-labelledby", tab_id(cluster))
        .with_child(
            Element::new("div")
                .with_id(accordions_id(cluster))
                .with_class("accordion"),
        )
}

/// Mark the tab button and pane of `cluster` as shown.
///
/// `root` must contain both; missing elements are skipped.
pub fn activate_cluster(root: &mut Element, cluster: &ClusterId) {
    if let Some(tab) = root.find_by_id_mut(&tab_id(cluster)) {
        tab.add_class("active");
        tab.set_attr("aria-selected", "true");
    }
    if let Some(pane) = root.find_by_id_mut(&pane_id(cluster)) {
        pane.add_class("show");
        pane.add_class("active");
    }
}

/// Mark the tab button and pane of `cluster` as hidden.
pub fn deactivate_cluster(root: &mut Element, cluster: &ClusterId) {
    if let Some(tab) = root.find_by_id_mut(&tab_id(cluster)) {
        tab.remove_class("active");
        tab.set_attr("aria-selected", "false");
    }
    if let Some(pane) = root.find_by_id_mut(&pane_id(cluster)) {
        pane.remove_class("show");
        pane.remove_class("active");
    }
}

/// Accordion header text, "<title> - reported <local time>".
///
/// An epoch that can't be represented is shown as the raw number.
#[must_use]
pub fn report_header(tr: &Translator, title: &str, epoch: i64, utc_offset_seconds: i32) -> String {
    let when = format_local(epoch, utc_offset_seconds).unwrap_or_else(|err| {
        tracing::warn!(epoch, error = %err, "report epoch out of range");
        epoch.to_string()
    });
    tr.translate("REPORT_HEADER", &[title, &when])
}

/// Accordion item for one report. `body` is placed inside the collapse
/// region, wrapped in `accordion-body`.
#[must_use]
pub fn report_accordion(cluster: &ClusterId, report: &str, header: &str, body: Element) -> Element {
    let collapse = collapse_id(cluster, report);
    Element::new("div")
        .with_class("accordion-item")
        .with_child(
            Element::new("h2")
                .with_id(heading_id(cluster, report))
                .with_class("accordion-header")
                .with_child(
                    Element::new("button")
                        .with_id(collapse_button_id(cluster, report))
                        .with_class("accordion-button collapsed")
                        .with_attr("type", "button")
                        .with_attr("data-bs-toggle", "collapse")
                        .with_attr("data-bs-target", format!("#{collapse}"))
                        .with_attr("aria-expanded", "false")
                        .with_attr("aria-controls", collapse.clone())
                        .with_markup(header.to_owned()),
                ),
        )
        .with_child(
            Element::new("div")
                .with_id(collapse)
                .with_class("accordion-collapse collapse")
                .with_attr("aria-labelledby", heading_id(cluster, report))
                .with_attr("data-bs-parent", format!("#{}", accordions_id(cluster)))
                .with_attr("data-ccf-report", report)
                .with_attr("data-ccf-cluster", cluster.as_str())
                .with_child(accordion_body(body)),
        )
}

/// `accordion-body` wrapper around a report table.
#[must_use]
pub fn accordion_body(table: Element) -> Element {
    Element::new("div").with_class("accordion-body").with_child(table)
}

/// Expand or collapse the accordion of `report` without animation.
///
/// Returns `false` if the accordion isn't in `root`.
pub fn set_expanded(root: &mut Element, cluster: &ClusterId, report: &str, expanded: bool) -> bool {
    let Some(button) = root.find_by_id_mut(&collapse_button_id(cluster, report)) else {
        return false;
    };
    if expanded {
        button.remove_class("collapsed");
    } else {
        button.add_class("collapsed");
    }
    button.set_attr("aria-expanded", if expanded { "true" } else { "false" });
    let Some(body) = root.find_by_id_mut(&collapse_id(cluster, report)) else {
        return false;
    };
    if expanded {
        body.add_class("show");
    } else {
        body.remove_class("show");
    }
    true
}

/// Replace the table inside the accordion body of `report`.
///
/// Returns `false` if the accordion isn't in `root`.
pub fn replace_table(root: &mut Element, cluster: &ClusterId, report: &str, table: Element) -> bool {
    match root.find_by_id_mut(&collapse_id(cluster, report)) {
        Some(collapse) => {
            collapse.clear_children();
            collapse.push_child(accordion_body(table));
            true
        }
        None => false,
    }
}

/// Message shown in a cluster pane with no current reports.
#[must_use]
pub fn no_reports(tr: &Translator) -> Element {
    Element::new("p")
        .with_class("no-reports")
        .with_text(tr.text("NO_REPORTS"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use druid_i18n::StringTable;
    use pretty_assertions::assert_eq;

    fn translator() -> Translator {
        let table: StringTable = [
            ("REPORT_HEADER", "$1 - reported $2"),
            ("NO_REPORTS", "There are no current reports for this cluster."),
        ]
        .into_iter()
        .collect();
        Translator::new("en", table)
    }

    #[test]
    fn header_uses_local_time() {
        assert_eq!(
            report_header(&translator(), "Bursts", 1_637_552_520, 0),
            "Bursts - reported 2021-11-22 03:42"
        );
    }

    #[test]
    fn tab_and_pane_ids() {
        let cedar = Cluster::new("cedar", "Cedar");
        let tab = cluster_tab(&cedar);
        assert!(tab.find_by_id("cedar-tab").is_some());
        assert_eq!(tab.text_content(), "Cedar");
        let pane = cluster_pane(&cedar.id);
        assert!(pane.find_by_id("cedar_accordions").is_some());
    }

    #[test]
    fn activation_toggles_classes() {
        let cedar = ClusterId::from("cedar");
        let mut root = Element::new("div")
            .with_child(cluster_tab(&Cluster::new("cedar", "Cedar")))
            .with_child(cluster_pane(&cedar));
        activate_cluster(&mut root, &cedar);
        assert!(root.find_by_id("cedar-tab").unwrap().has_class("active"));
        assert!(root.find_by_id("cedar-pane").unwrap().has_class("show"));
        deactivate_cluster(&mut root, &cedar);
        assert!(!root.find_by_id("cedar-pane").unwrap().has_class("active"));
    }

    #[test]
    fn expand_and_replace_table() {
        let cedar = ClusterId::from("cedar");
        let mut root = report_accordion(
            &cedar,
            "bursts",
            "Bursts",
            Element::new("table").with_id("old"),
        );
        assert!(set_expanded(&mut root, &cedar, "bursts", true));
        assert!(!root.find_by_id("collapse-button-cedar-bursts").unwrap().has_class("collapsed"));
        assert!(root.find_by_id("collapse-cedar-bursts").unwrap().has_class("show"));
        assert!(replace_table(&mut root, &cedar, "bursts", Element::new("table").with_id("new")));
        assert!(root.find_by_id("old").is_none());
        assert!(root.find_by_id("new").is_some());
        assert!(!set_expanded(&mut root, &cedar, "oldjobs", true));
    }

    #[test]
    fn no_reports_message() {
        assert_eq!(
            no_reports(&translator()).text_content(),
            "There are no current reports for this cluster."
        );
    }
}
