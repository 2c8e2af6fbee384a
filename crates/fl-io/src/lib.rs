//! `fl-io`: network persistence and dispatch report writers.
//!
//! | Backend   | Network ([`NetworkStore`])       | Report ([`ReportWriter`])                  |
//! |-----------|----------------------------------|--------------------------------------------|
//! | CSV       | `nodes.csv`, `edges.csv`         | `routes.csv`, `vehicles.csv`, `skipped.csv`|
//! | JSON      | one node-link document           | one report document                        |
//!
//! # Usage
//!
//! ```rust,ignore
//! use fl_io::{CsvStore, NetworkStore};
//!
//! let store = CsvStore::new("./camden");
//! store.save(&network)?;
//! let again = store.load()?;
//! assert_eq!(again.edge_count(), network.edge_count());
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod row;
mod store;
pub mod writer;


pub use crate::csv::{CsvReportWriter, CsvStore};
pub use error::{IoError, IoResult};
pub use json::{JsonReportWriter, JsonStore, NodeLinkDocument};
pub use row::{EdgeRow, NodeRow, RouteStopRow, SkippedRow, VehicleRow};
pub use writer::{NetworkStore, ReportWriter};
