//! OSM PBF source: enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use fl_network::osm::OsmPbfSource;
//! use fl_network::SpatialSource;
//!
//! let builder = OsmPbfSource::new("camden.osm.pbf").load("Camden, London")?;
//! ```
//!
//! # What is loaded
//!
//! Only drivable `highway=*` ways are included (see [`car_speed_kph`]).
//! One-way roads add a single directed segment; two-way roads add both
//! directions.  Location ids are the raw OSM node ids; `x` is longitude and
//! `y` latitude.  Segment lengths are haversine metres between consecutive
//! way nodes.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use osmpbf::{Element, ElementReader};

use fl_core::{LocationId, Point};

use crate::{NetworkBuilder, NetworkError, NetworkResult, Role, SpatialSource};

/// Reads a local OSM PBF extract.  The place name passed to
/// [`SpatialSource::load`] is informational; the file decides the area.
pub struct OsmPbfSource {
    path: PathBuf,
}

impl OsmPbfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpatialSource for OsmPbfSource {
    fn load(&self, place: &str) -> NetworkResult<NetworkBuilder> {
        // ── Phase 1: collect all OSM nodes + road ways in one sequential pass ──
        let reader = ElementReader::from_path(&self.path).map_err(|e| NetworkError::Osm(e.to_string()))?;

        let mut all_nodes: HashMap<i64, Point> = HashMap::new();
        let mut road_ways: Vec<OsmWay> = Vec::new();

        reader
            .for_each(|elem| match elem {
                Element::Node(n) => {
                    all_nodes.insert(n.id(), Point::new(n.lon(), n.lat()));
                }
                Element::DenseNode(n) => {
                    all_nodes.insert(n.id(), Point::new(n.lon(), n.lat()));
                }
                Element::Way(w) => {
                    let tags: Vec<(&str, &str)> = w.tags().collect();
                    let highway = tags.iter().find(|(k, _)| *k == "highway").map(|(_, v)| *v);

                    if let Some(default_kph) = highway.and_then(car_speed_kph) {
                        let speed_kph = maxspeed_kph(&tags).unwrap_or(default_kph);
                        let oneway = is_oneway(highway.unwrap_or(""), &tags);
                        let refs: Vec<i64> = w.refs().collect();
                        road_ways.push(OsmWay { refs, speed_kph, oneway });
                    }
                }
                _ => {}
            })
            .map_err(|e| NetworkError::Osm(e.to_string()))?;

        // ── Phase 2: keep only road-referenced nodes ──────────────────────────
        let road_node_ids: HashSet<i64> = road_ways.iter().flat_map(|w| w.refs.iter().copied()).collect();

        let mut builder = NetworkBuilder::with_capacity(road_node_ids.len(), road_node_ids.len() * 2);
        let mut positions: HashMap<i64, Point> = HashMap::with_capacity(road_node_ids.len());

        // Sorted so location insertion order does not depend on hash order.
        let mut sorted_ids: Vec<i64> = road_node_ids.into_iter().collect();
        sorted_ids.sort_unstable();
        for osm_id in sorted_ids {
            if let Some(&pos) = all_nodes.get(&osm_id) {
                builder.add_location(osm_location_id(osm_id), Role::Unassigned, pos.x, pos.y, 0.0)?;
                positions.insert(osm_id, pos);
            }
        }
        drop(all_nodes);

        // ── Phase 3: segments from way node sequences ─────────────────────────
        for way in &road_ways {
            for window in way.refs.windows(2) {
                let (osm_a, osm_b) = (window[0], window[1]);
                if osm_a == osm_b {
                    continue;
                }
                if let (Some(&pa), Some(&pb)) = (positions.get(&osm_a), positions.get(&osm_b)) {
                    let len_m = haversine_m(pa, pb);
                    let (a, b) = (osm_location_id(osm_a), osm_location_id(osm_b));
                    builder.add_timed_segment(a, b, len_m, way.speed_kph)?;
                    if !way.oneway {
                        builder.add_timed_segment(b, a, len_m, way.speed_kph)?;
                    }
                }
            }
        }

        log::info!(
            "loaded {place:?} from {}: {} locations, {} segments",
            self.path.display(),
            builder.node_count(),
            builder.edge_count()
        );
        Ok(builder)
    }
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:      Vec<i64>,
    speed_kph: f64,
    oneway:    bool,
}

fn osm_location_id(osm_id: i64) -> LocationId {
    LocationId(osm_id as u64)
}

/// Great-circle distance in metres between two `(lon, lat)` points.
fn haversine_m(a: Point, b: Point) -> f64 {
    const R: f64 = 6_371_000.0; // mean Earth radius, metres

    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat * 0.5).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lon * 0.5).sin().powi(2);
    2.0 * R * h.sqrt().atan2((1.0 - h).sqrt())
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

/// Assumed car speed (km/h) for a road class, or `None` if this `highway`
/// value is not drivable by car.
fn car_speed_kph(highway: &str) -> Option<f64> {
    match highway {
        "motorway" | "motorway_link"         => Some(100.0),
        "trunk"    | "trunk_link"            => Some(80.0),
        "primary"  | "primary_link"          => Some(60.0),
        "secondary"| "secondary_link"        => Some(50.0),
        "tertiary" | "tertiary_link"         => Some(40.0),
        "residential" | "living_street"      => Some(30.0),
        "service"  | "unclassified"          => Some(20.0),
        "footway" | "path" | "cycleway"
        | "pedestrian" | "steps" | "track"   => None,
        _                                    => Some(crate::network::DEFAULT_SPEED_KPH),
    }
}

/// Parse `maxspeed` as km/h, accepting the `"<n> mph"` form.
fn maxspeed_kph(tags: &[(&str, &str)]) -> Option<f64> {
    let raw = tags.iter().find(|(k, _)| *k == "maxspeed").map(|(_, v)| v.trim())?;
    match raw.strip_suffix("mph") {
        Some(mph) => mph.trim().parse::<f64>().ok().map(|v| v * 1.609_344),
        None => raw.parse::<f64>().ok(),
    }
    .filter(|v| *v > 0.0)
}

/// Whether a way should be treated as one-way for car traffic.
///
/// Motorways and motorway links are implicitly one-way in OSM convention.
fn is_oneway(highway: &str, tags: &[(&str, &str)]) -> bool {
    let explicit = tags.iter().any(|(k, v)| *k == "oneway" && matches!(*v, "yes" | "1" | "true"));
    let implicit = matches!(highway, "motorway" | "motorway_link");
    explicit || implicit
}
