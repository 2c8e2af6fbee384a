//! Spatial data sources.
//!
//! A [`SpatialSource`] turns a place name into raw network structure:
//! locations with coordinates and directed segments with a length and a
//! nominal speed.  Roles, demands and capacities are not the source's
//! concern; [`Network::ensure_metadata`] fills them in afterwards.
//!
//! Two sources ship with the crate:
//!
//! | Source          | Notes                                               |
//! |-----------------|-----------------------------------------------------|
//! | [`GridSource`]  | Synthetic street grid; no I/O, fully seeded         |
//! | `OsmPbfSource`  | OSM PBF extract (feature = `"osm"` only)            |
//!
//! [`service_area`] then trims a loaded network down to a strongly
//! connected neighbourhood of a manageable size.

use fl_core::{FleetRng, LocationId, NodeIdx};

use crate::component::{bfs_subgraph, largest_strongly_connected};
use crate::{Network, NetworkBuilder, NetworkResult, Role};

/// Hop limit for the breadth-first neighbourhood in [`service_area`].
pub const SERVICE_AREA_DEPTH: usize = 10;

/// Supplies raw network structure for a named place.
pub trait SpatialSource {
    fn load(&self, place: &str) -> NetworkResult<NetworkBuilder>;
}

// ── GridSource ────────────────────────────────────────────────────────────────

/// A `rows × cols` street grid.
///
/// Location `(r, c)` gets id `r * cols + c` and coordinates
/// `(c * spacing_m, r * spacing_m)`.  Adjacent locations are joined by a
/// two-way road; with probability `one_way_probability` one direction is
/// dropped, which leaves some locations unable to reach others.
#[derive(Clone, Debug)]
pub struct GridSource {
    pub rows:                usize,
    pub cols:                usize,
    pub spacing_m:           f64,
    pub speed_kph:           f64,
    pub one_way_probability: f64,
    pub seed:                u64,
}

impl Default for GridSource {
    fn default() -> Self {
        Self {
            rows:                8,
            cols:                8,
            spacing_m:           250.0,
            speed_kph:           crate::network::DEFAULT_SPEED_KPH,
            one_way_probability: 0.15,
            seed:                0,
        }
    }
}

impl GridSource {
    fn id(&self, r: usize, c: usize) -> LocationId {
        LocationId((r * self.cols + c) as u64)
    }
}

impl SpatialSource for GridSource {
    /// The place name only labels the log line; the grid is the same for
    /// every name.
    fn load(&self, place: &str) -> NetworkResult<NetworkBuilder> {
        let mut rng = FleetRng::new(self.seed);
        let mut b = NetworkBuilder::with_capacity(self.rows * self.cols, self.rows * self.cols * 4);

        for r in 0..self.rows {
            for c in 0..self.cols {
                let (x, y) = (c as f64 * self.spacing_m, r as f64 * self.spacing_m);
                b.add_location(self.id(r, c), Role::Unassigned, x, y, 0.0)?;
            }
        }

        for r in 0..self.rows {
            for c in 0..self.cols {
                let here = self.id(r, c);
                let neighbours = [
                    (c + 1 < self.cols).then(|| self.id(r, c + 1)),
                    (r + 1 < self.rows).then(|| self.id(r + 1, c)),
                ];
                for there in neighbours.into_iter().flatten() {
                    if rng.gen_bool(self.one_way_probability) {
                        let (from, to) = if rng.gen_bool(0.5) { (here, there) } else { (there, here) };
                        b.add_timed_segment(from, to, self.spacing_m, self.speed_kph)?;
                    } else {
                        b.add_road(here, there, self.spacing_m, self.speed_kph)?;
                    }
                }
            }
        }

        log::info!(
            "grid source for {place:?}: {} locations, {} segments",
            b.node_count(),
            b.edge_count()
        );
        Ok(b)
    }
}

// ── Service area ──────────────────────────────────────────────────────────────

/// Trim `network` to a strongly connected area of at most
/// `2 * target_nodes` locations around a randomly chosen start.
///
/// Returns an empty network if `network` is empty.
pub fn service_area(network: &Network, target_nodes: usize, rng: &mut FleetRng) -> NetworkResult<Network> {
    if network.is_empty() {
        return Ok(Network::empty());
    }
    let start_idx = NodeIdx(rng.gen_range(0..network.node_count()) as u32);
    let start = network.location_at(start_idx).id;
    let area = bfs_subgraph(network, start, SERVICE_AREA_DEPTH, target_nodes * 2)?;
    let core = largest_strongly_connected(&area);
    log::info!(
        "service area around {start}: {} of {} locations kept",
        core.node_count(),
        network.node_count()
    );
    Ok(core)
}
