#![forbid(unsafe_code)]

//! Data model for the Druid Manager dashboard.
//!
//! Everything in this crate is plain data: clusters, the declarative report
//! specs that drive table rendering, the per-cluster report result sets
//! fetched from the server, case rows, and the update payloads sent back.
//! None of it touches the network or the DOM.

pub mod case;
pub mod cluster;
pub mod epoch;
pub mod error;
pub mod report;
pub mod sort;

pub use case::{CaseAction, CaseId, CaseRow, CaseState, CaseUpdate, UpdateRequest};
pub use cluster::{Cluster, ClusterDirectory, ClusterId};
pub use error::{ModelError, ModelResult};
pub use report::{ColumnSpec, ColumnType, ReportData, ReportSet, ReportSpec, ReportSpecs};
pub use sort::{SortDirection, SortOrder};
