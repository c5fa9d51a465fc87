#![forbid(unsafe_code)]

//! Widgets for the Druid Manager dashboard.
//!
//! Widgets produce [`dom::Element`] trees. They never talk to the network or
//! to a live document; the runtime owns the page tree and the host mirrors
//! it.

pub mod dom;
pub mod i18n_static;
pub mod page;
pub mod report_table;
pub mod report_view;
pub mod toast;

pub use dom::{Element, Node};
pub use i18n_static::translate_static_elements;
pub use report_table::{CellContent, ReportTable, render_cell};
pub use toast::{StatusSurface, Toast, ToastConfig, ToastHandle, ToastKind};
