//! CSV backend.
//!
//! A network is stored as two files in one directory:
//! - `nodes.csv`: `id,role,x,y,demand,urgency`
//! - `edges.csv`: `source,target,distance,speed_kph,base_travel_time,congestion_factor,weight,capacity`
//!
//! A report is stored as three files:
//! - `routes.csv`: `vehicle,seq,location`
//! - `vehicles.csv`: `vehicle,start,stops,travel_time,carried_load,capacity`
//! - `skipped.csv`: `vehicle,location,reason`
//!
//! The revision counter is not stored; a loaded network starts at `r0`
//! with the saved weights.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Reader, Writer};

use fl_core::Revision;
use fl_dispatch::DispatchReport;
use fl_network::Network;

use crate::row::{EdgeRow, NodeRow, RouteStopRow, SkippedRow, VehicleRow};
use crate::store::rebuild;
use crate::writer::{NetworkStore, ReportWriter};
use crate::IoResult;

pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";

// ── Network tables ────────────────────────────────────────────────────────────

/// Node and edge tables in a directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl NetworkStore for CsvStore {
    fn save(&self, network: &Network) -> IoResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let mut nodes = Writer::from_path(self.dir.join(NODES_FILE))?;
        for loc in network.locations() {
            nodes.serialize(NodeRow::from(loc))?;
        }
        nodes.flush()?;

        let mut edges = Writer::from_path(self.dir.join(EDGES_FILE))?;
        for seg in network.segments() {
            edges.serialize(EdgeRow::from(seg))?;
        }
        edges.flush()?;

        log::info!(
            "saved {} locations and {} segments to {}",
            network.node_count(),
            network.edge_count(),
            self.dir.display()
        );
        Ok(())
    }

    fn load(&self) -> IoResult<Network> {
        let nodes: Vec<NodeRow> = Reader::from_path(self.dir.join(NODES_FILE))?
            .deserialize()
            .collect::<Result<_, _>>()?;
        let edges: Vec<EdgeRow> = Reader::from_path(self.dir.join(EDGES_FILE))?
            .deserialize()
            .collect::<Result<_, _>>()?;
        let network = rebuild(nodes, edges, Revision::INITIAL)?;
        log::info!("loaded {} from {}", network.stats(), self.dir.display());
        Ok(network)
    }
}

// ── Report tables ─────────────────────────────────────────────────────────────

/// Writes dispatch reports to three CSV files.
pub struct CsvReportWriter {
    routes:   Writer<File>,
    vehicles: Writer<File>,
    skipped:  Writer<File>,
    finished: bool,
}

impl CsvReportWriter {
    /// Create (or truncate) the three CSV files in `dir`.
    pub fn new(dir: &Path) -> IoResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            routes:   Writer::from_path(dir.join("routes.csv"))?,
            vehicles: Writer::from_path(dir.join("vehicles.csv"))?,
            skipped:  Writer::from_path(dir.join("skipped.csv"))?,
            finished: false,
        })
    }
}

impl ReportWriter for CsvReportWriter {
    fn write_report(&mut self, report: &DispatchReport) -> IoResult<()> {
        for v in &report.vehicles {
            for stop in RouteStopRow::from_report(v) {
                self.routes.serialize(stop)?;
            }
            self.vehicles.serialize(VehicleRow::from(v))?;
        }
        for s in &report.skipped {
            self.skipped.serialize(SkippedRow::from(s))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> IoResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.routes.flush()?;
        self.vehicles.flush()?;
        self.skipped.flush()?;
        Ok(())
    }
}
