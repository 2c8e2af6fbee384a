//! The traits implemented by every backend.

use fl_dispatch::DispatchReport;
use fl_network::Network;

use crate::IoResult;

/// Saves and loads a whole [`Network`].
///
/// `save` then `load` reproduces the node count, edge count, and every
/// per-location and per-segment attribute.  Loading goes through
/// `NetworkBuilder`, so a file with duplicate or dangling ids fails with the
/// same errors as building the network by hand.
pub trait NetworkStore {
    fn save(&self, network: &Network) -> IoResult<()>;

    fn load(&self) -> IoResult<Network>;
}

/// Writes dispatch results.
pub trait ReportWriter {
    /// Write one run's report.
    fn write_report(&mut self, report: &DispatchReport) -> IoResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> IoResult<()>;
}
