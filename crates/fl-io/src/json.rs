//! Node-link JSON backend.
//!
//! ```json
//! { "directed": true, "revision": 3,
//!   "nodes": [ { "id": 1, "role": "warehouse", "x": 0.0, "y": 0.0, "demand": 0.0, "urgency": 0 } ],
//!   "links": [ { "source": 1, "target": 2, "distance": 5.0, "speed_kph": null, ... } ] }
//! ```
//!
//! Unlike the CSV tables, the file keeps the network's revision.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fl_core::Revision;
use fl_dispatch::DispatchReport;
use fl_network::Network;

use crate::row::{EdgeRow, NodeRow};
use crate::store::rebuild;
use crate::writer::{NetworkStore, ReportWriter};
use crate::{IoError, IoResult};

/// The on-disk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub directed: bool,
    #[serde(default)]
    pub revision: Revision,
    pub nodes:    Vec<NodeRow>,
    pub links:    Vec<EdgeRow>,
}

impl From<&Network> for NodeLinkDocument {
    fn from(network: &Network) -> Self {
        Self {
            directed: true,
            revision: network.revision(),
            nodes:    network.locations().map(NodeRow::from).collect(),
            links:    network.segments().map(EdgeRow::from).collect(),
        }
    }
}

impl NodeLinkDocument {
    pub fn into_network(self) -> IoResult<Network> {
        if !self.directed {
            return Err(IoError::Format("undirected node-link documents are not supported".into()));
        }
        rebuild(self.nodes, self.links, self.revision)
    }
}

/// A single node-link JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NetworkStore for JsonStore {
    fn save(&self, network: &Network) -> IoResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, &NodeLinkDocument::from(network))?;
        out.flush()?;
        log::info!("saved {} to {}", network.stats(), self.path.display());
        Ok(())
    }

    fn load(&self) -> IoResult<Network> {
        let doc: NodeLinkDocument = serde_json::from_reader(BufReader::new(File::open(&self.path)?))?;
        let network = doc.into_network()?;
        log::info!("loaded {} from {}", network.stats(), self.path.display());
        Ok(network)
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Writes each report as a pretty-printed JSON document followed by a
/// newline.  One report per file is the usual case.
pub struct JsonReportWriter {
    out:      BufWriter<File>,
    finished: bool,
}

impl JsonReportWriter {
    pub fn new(path: &Path) -> IoResult<Self> {
        Ok(Self { out: BufWriter::new(File::create(path)?), finished: false })
    }
}

impl ReportWriter for JsonReportWriter {
    fn write_report(&mut self, report: &DispatchReport) -> IoResult<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> IoResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
