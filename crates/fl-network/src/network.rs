//! Logistics network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing
//! segments.  Given a `NodeIdx n`, its outgoing segments occupy the slice:
//!
//! ```text
//! segments[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! `edge_from`/`edge_to` mirror the segment endpoints as dense indices so
//! Dijkstra's inner loop never touches a hash map.
//!
//! # Two phases
//!
//! [`NetworkBuilder`] owns all structural mutation (`add_location`,
//! `add_segment`).  [`NetworkBuilder::build`] freezes the structure into a
//! [`Network`]; after that only attributes change (roles, capacities,
//! demands, and traffic weights).  Structural edits are therefore always
//! complete and visible before the first path query.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest location.  Used to
//! pick a start hub close to a vehicle's demand group.

use std::collections::HashMap;
use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fl_core::{EdgeIdx, FleetRng, LocationId, NodeIdx, Point, Revision};

use crate::{NetworkError, NetworkResult};

/// Number of `Hub` locations chosen by [`Network::assign_roles`].
pub const HUB_COUNT: usize = 3;

/// Relative probability of urgency 0, 1 and 2 for generated customers.
pub const URGENCY_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// Speed assumed for segments added without one (km/h).
pub const DEFAULT_SPEED_KPH: f64 = 30.0;

// ── Location ──────────────────────────────────────────────────────────────────

/// Function of a location in the logistics network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    Warehouse,
    Hub,
    Customer,
    #[default]
    Unassigned,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Warehouse  => "warehouse",
            Role::Hub        => "hub",
            Role::Customer   => "customer",
            Role::Unassigned => "unassigned",
        })
    }
}

/// A node of the network.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub id:     LocationId,
    pub role:   Role,
    pub pos:    Point,
    /// Quantity to deliver here.  Non-negative.
    pub demand: f64,
    /// Ordinal priority, 0 (routine) to 2 (critical).  `None` until roles
    /// are assigned; only meaningful for customers.
    pub urgency: Option<u8>,
}

impl Location {
    pub fn new(id: LocationId, role: Role, pos: Point, demand: f64) -> Self {
        Self { id, role, pos, demand, urgency: None }
    }

    pub fn with_urgency(mut self, urgency: u8) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// A customer at or above `min_urgency`.
    #[inline]
    pub fn is_urgent(&self, min_urgency: u8) -> bool {
        self.role == Role::Customer && self.urgency.is_some_and(|u| u >= min_urgency)
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// A directed road segment.
///
/// `weight == base_travel_time * congestion_factor` always holds; the two
/// mutable fields are private so only the traffic model can change them,
/// and it always changes both together.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub source:   LocationId,
    pub target:   LocationId,
    /// Physical length.  Metres for data-source segments.
    pub distance: f64,
    /// Nominal speed, if the segment was built from a length/speed pair.
    pub speed_kph: Option<f64>,
    /// Free-flow travel time.  Minutes for timed segments, `distance` for
    /// segments added without a speed.
    pub base_travel_time: f64,
    /// Static throughput property.  Not enforced by routing.
    pub capacity: Option<u32>,
    pub(crate) congestion_factor: f64,
    pub(crate) weight:            f64,
}

impl Segment {
    /// Segment without a speed: `base_travel_time = distance`, weight is
    /// `distance * traffic_factor`.
    pub fn untimed(
        source: LocationId,
        target: LocationId,
        distance: f64,
        traffic_factor: f64,
    ) -> NetworkResult<Self> {
        Self::from_parts(source, target, distance, None, distance, traffic_factor, None)
    }

    /// Segment from a length (metres) and nominal speed (km/h); the base
    /// travel time is in minutes.
    pub fn timed(
        source: LocationId,
        target: LocationId,
        length_m: f64,
        speed_kph: f64,
    ) -> NetworkResult<Self> {
        if !(speed_kph.is_finite() && speed_kph > 0.0) {
            return Err(invalid(source, target, format!("speed must be positive, got {speed_kph}")));
        }
        let metres_per_minute = speed_kph * 1000.0 / 60.0;
        Self::from_parts(
            source,
            target,
            length_m,
            Some(speed_kph),
            length_m / metres_per_minute,
            1.0,
            None,
        )
    }

    /// Fully specified segment, as stored by persistence.  The weight is
    /// recomputed from `base_travel_time * congestion_factor`.
    pub fn from_parts(
        source: LocationId,
        target: LocationId,
        distance: f64,
        speed_kph: Option<f64>,
        base_travel_time: f64,
        congestion_factor: f64,
        capacity: Option<u32>,
    ) -> NetworkResult<Self> {
        for (name, value) in [
            ("distance", distance),
            ("base travel time", base_travel_time),
            ("congestion factor", congestion_factor),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(source, target, format!("{name} must be finite and non-negative, got {value}")));
            }
        }
        if capacity == Some(0) {
            return Err(invalid(source, target, "capacity must be positive".into()));
        }
        Ok(Self {
            source,
            target,
            distance,
            speed_kph,
            base_travel_time,
            capacity,
            congestion_factor,
            weight: base_travel_time * congestion_factor,
        })
    }

    /// Current routing cost.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Multiplier currently applied to `base_travel_time`.
    #[inline]
    pub fn congestion_factor(&self) -> f64 {
        self.congestion_factor
    }

    /// Overwrite the congestion factor and the derived weight together.
    #[inline]
    pub(crate) fn set_congestion(&mut self, factor: f64) {
        self.congestion_factor = factor;
        self.weight = self.base_travel_time * factor;
    }
}

fn invalid(source: LocationId, target: LocationId, reason: String) -> NetworkError {
    NetworkError::InvalidSegment { source_id: source, target_id: target, reason }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// High-level graph metrics.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkStats {
    pub node_count:  usize,
    pub edge_count:  usize,
    pub is_directed: bool,
    /// `edges / (nodes * (nodes - 1))`; 0 for fewer than two nodes.
    pub density:     f64,
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} edges, directed={}, density={:.4}",
            self.node_count, self.edge_count, self.is_directed, self.density
        )
    }
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: an `[x, y]` point with the
/// associated dense index.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    idx:   NodeIdx,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed logistics graph in CSR format plus a spatial index.
///
/// Do not construct directly; use [`NetworkBuilder`].  The network is `Sync`
/// and routing only needs `&Network`, so any number of vehicles can query it
/// in parallel once the weights for a run are set.
#[derive(Clone)]
pub struct Network {
    /// Locations indexed by `NodeIdx`.
    pub(crate) locations: Vec<Location>,
    pub(crate) index:     HashMap<LocationId, NodeIdx>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub(crate) node_out_start: Vec<u32>,
    pub(crate) edge_from:      Vec<NodeIdx>,
    pub(crate) edge_to:        Vec<NodeIdx>,
    /// Segment attributes indexed by `EdgeIdx`.
    pub(crate) segments:       Vec<Segment>,

    pub(crate) revision: Revision,

    spatial_idx: RTree<NodeEntry>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Network {
    /// Construct an empty network with no nodes or segments.
    pub fn empty() -> Self {
        NetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    pub fn edge_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Current weight generation.  Bumped by every traffic update.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn stats(&self) -> NetworkStats {
        let n = self.node_count();
        let e = self.edge_count();
        let density = if n < 2 { 0.0 } else { e as f64 / (n as f64 * (n as f64 - 1.0)) };
        NetworkStats { node_count: n, edge_count: e, is_directed: true, density }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Dense index of `id`.
    pub fn node_idx(&self, id: LocationId) -> NetworkResult<NodeIdx> {
        self.index.get(&id).copied().ok_or(NetworkError::UnknownLocation(id))
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn location(&self, id: LocationId) -> NetworkResult<&Location> {
        let idx = self.node_idx(id)?;
        Ok(&self.locations[idx.index()])
    }

    #[inline]
    pub fn location_at(&self, idx: NodeIdx) -> &Location {
        &self.locations[idx.index()]
    }

    /// All locations in insertion order.
    pub fn locations(&self) -> std::slice::Iter<'_, Location> {
        self.locations.iter()
    }

    /// All segments, grouped by source in insertion order of the sources.
    pub fn segments(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// The segment `source -> target`, if present.
    pub fn segment(&self, source: LocationId, target: LocationId) -> Option<&Segment> {
        let from = self.index.get(&source)?;
        let to = self.index.get(&target)?;
        self.out_edges(*from)
            .find(|e| self.edge_to[e.index()] == *to)
            .map(|e| &self.segments[e.index()])
    }

    #[inline]
    pub fn segment_at(&self, edge: EdgeIdx) -> &Segment {
        &self.segments[edge.index()]
    }

    #[inline]
    pub fn edge_target(&self, edge: EdgeIdx) -> NodeIdx {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn edge_source(&self, edge: EdgeIdx) -> NodeIdx {
        self.edge_from[edge.index()]
    }

    /// The warehouse, if roles have been assigned.
    pub fn warehouse(&self) -> Option<LocationId> {
        self.locations.iter().find(|l| l.role == Role::Warehouse).map(|l| l.id)
    }

    pub fn hubs(&self) -> Vec<LocationId> {
        self.ids_with_role(Role::Hub)
    }

    pub fn ids_with_role(&self, role: Role) -> Vec<LocationId> {
        self.locations.iter().filter(|l| l.role == role).map(|l| l.id).collect()
    }

    /// Customers with urgency ≥ `min_urgency`, ascending by id.
    pub fn urgent_customers(&self, min_urgency: u8) -> Vec<LocationId> {
        let mut ids: Vec<LocationId> = self
            .locations
            .iter()
            .filter(|l| l.is_urgent(min_urgency))
            .map(|l| l.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeIdx`s of all outgoing segments from `node`.
    ///
    /// This is a contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeIdx(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeIdx) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The location nearest to `pos`, or `None` for an empty network.
    pub fn nearest_location(&self, pos: Point) -> Option<LocationId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| self.locations[e.idx.index()].id)
    }

    /// The nearest location to `pos` that has `role`.
    pub fn nearest_with_role(&self, pos: Point, role: Role) -> Option<LocationId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .map(|e| &self.locations[e.idx.index()])
            .find(|l| l.role == role)
            .map(|l| l.id)
    }

    /// Up to `k` nearest locations to `pos`, sorted by ascending distance.
    pub fn k_nearest_locations(&self, pos: Point, k: usize) -> Vec<LocationId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| self.locations[e.idx.index()].id)
            .collect()
    }

    // ── Attribute assignment ──────────────────────────────────────────────

    /// Give a role-less network one warehouse, [`HUB_COUNT`] hubs, and
    /// customers with random urgency.
    ///
    /// Locations are shuffled with `rng` first, so the choice is
    /// reproducible from the seed.  Warehouse and hubs get urgency 0;
    /// customers draw from [`URGENCY_WEIGHTS`].  Returns `false` and changes
    /// nothing if any location already has a role.
    pub fn assign_roles(&mut self, rng: &mut FleetRng) -> bool {
        if self.locations.iter().any(|l| l.role != Role::Unassigned) {
            return false;
        }

        let mut order: Vec<usize> = (0..self.locations.len()).collect();
        rng.shuffle(&mut order);

        for (rank, &i) in order.iter().enumerate() {
            let loc = &mut self.locations[i];
            match rank {
                0 => {
                    loc.role = Role::Warehouse;
                    loc.urgency = Some(0);
                }
                r if r <= HUB_COUNT => {
                    loc.role = Role::Hub;
                    loc.urgency = Some(0);
                }
                _ => {
                    loc.role = Role::Customer;
                    loc.urgency = Some(rng.weighted_index(&URGENCY_WEIGHTS).unwrap_or(0) as u8);
                }
            }
        }
        true
    }

    /// Draw a capacity uniformly from `min..=max` for every segment that has
    /// none.  Returns the number of segments updated.
    pub fn assign_capacities(&mut self, rng: &mut FleetRng, min: u32, max: u32) -> NetworkResult<usize> {
        if min == 0 || min > max {
            return Err(NetworkError::InvalidCapacityRange { min, max });
        }
        let mut assigned = 0;
        for seg in self.segments.iter_mut().filter(|s| s.capacity.is_none()) {
            seg.capacity = Some(rng.gen_range(min..=max));
            assigned += 1;
        }
        Ok(assigned)
    }

    /// Fill in whatever metadata a freshly loaded network lacks: roles when
    /// no location has one, capacities where missing.
    pub fn ensure_metadata(&mut self, rng: &mut FleetRng, capacity_range: (u32, u32)) -> NetworkResult<()> {
        if self.assign_roles(rng) {
            log::debug!("assigned roles to {} locations", self.node_count());
        }
        let n = self.assign_capacities(rng, capacity_range.0, capacity_range.1)?;
        if n > 0 {
            log::debug!("assigned capacities to {n} segments");
        }
        Ok(())
    }

    /// Set the demand of one location.
    pub fn set_demand(&mut self, id: LocationId, demand: f64) -> NetworkResult<()> {
        check_demand(id, demand)?;
        let idx = self.node_idx(id)?;
        self.locations[idx.index()].demand = demand;
        Ok(())
    }
}

fn check_demand(id: LocationId, demand: f64) -> NetworkResult<()> {
    if demand.is_finite() && demand >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidLocation {
            id,
            reason: format!("demand must be finite and non-negative, got {demand}"),
        })
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// Locations must be added before the segments that reference them.  Every
/// mutating call validates first and inserts second, so an `Err` leaves the
/// builder exactly as it was.
///
/// # Example
///
/// ```
/// use fl_core::LocationId;
/// use fl_network::{NetworkBuilder, Role};
///
/// let mut b = NetworkBuilder::new();
/// b.add_location(LocationId(1), Role::Warehouse, 0.0, 0.0, 0.0).unwrap();
/// b.add_location(LocationId(2), Role::Customer, 5.0, 0.0, 3.0).unwrap();
/// b.add_segment(LocationId(1), LocationId(2), 5.0, 1.0).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// ```
pub struct NetworkBuilder {
    locations: Vec<Location>,
    index:     HashMap<LocationId, NodeIdx>,
    raw_edges: Vec<RawEdge>,
    /// (from, to) → position in `raw_edges`, so re-adding a pair replaces it.
    edge_slot: HashMap<(NodeIdx, NodeIdx), usize>,
    revision:  Revision,
}

struct RawEdge {
    from:    NodeIdx,
    to:      NodeIdx,
    segment: Segment,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and segments.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            locations: Vec::with_capacity(nodes),
            index:     HashMap::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            edge_slot: HashMap::with_capacity(edges),
            revision:  Revision::INITIAL,
        }
    }

    /// Add a location.
    ///
    /// # Errors
    ///
    /// [`NetworkError::DuplicateLocation`] if `id` exists,
    /// [`NetworkError::InvalidLocation`] for a negative or non-finite demand.
    pub fn add_location(
        &mut self,
        id: LocationId,
        role: Role,
        x: f64,
        y: f64,
        demand: f64,
    ) -> NetworkResult<NodeIdx> {
        self.insert_location(Location::new(id, role, Point::new(x, y), demand))
    }

    /// Add a fully specified location (used by loaders that carry urgency).
    pub fn insert_location(&mut self, location: Location) -> NetworkResult<NodeIdx> {
        if self.index.contains_key(&location.id) {
            return Err(NetworkError::DuplicateLocation(location.id));
        }
        check_demand(location.id, location.demand)?;
        if !(location.pos.x.is_finite() && location.pos.y.is_finite()) {
            return Err(NetworkError::InvalidLocation {
                id:     location.id,
                reason: format!("coordinates must be finite, got {}", location.pos),
            });
        }
        Ok(self.push_location_unchecked(location))
    }

    /// Add a directed segment with `weight = distance * traffic_factor`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::UnknownLocation`] if either endpoint is absent,
    /// [`NetworkError::InvalidSegment`] for negative or non-finite values.
    pub fn add_segment(
        &mut self,
        source: LocationId,
        target: LocationId,
        distance: f64,
        traffic_factor: f64,
    ) -> NetworkResult<()> {
        self.insert_segment(Segment::untimed(source, target, distance, traffic_factor)?)
    }

    /// Add a directed segment from a length (metres) and speed (km/h).
    pub fn add_timed_segment(
        &mut self,
        source: LocationId,
        target: LocationId,
        length_m: f64,
        speed_kph: f64,
    ) -> NetworkResult<()> {
        self.insert_segment(Segment::timed(source, target, length_m, speed_kph)?)
    }

    /// Convenience: timed segments in **both directions**.
    pub fn add_road(
        &mut self,
        a: LocationId,
        b: LocationId,
        length_m: f64,
        speed_kph: f64,
    ) -> NetworkResult<()> {
        let forward = Segment::timed(a, b, length_m, speed_kph)?;
        let backward = Segment::timed(b, a, length_m, speed_kph)?;
        // Resolve both endpoints up front so neither direction lands alone.
        self.endpoints(a, b)?;
        self.insert_segment(forward)?;
        self.insert_segment(backward)
    }

    /// Add a prepared segment.  Re-adding an existing `(source, target)`
    /// pair replaces the earlier segment's attributes.
    pub fn insert_segment(&mut self, segment: Segment) -> NetworkResult<()> {
        let (from, to) = self.endpoints(segment.source, segment.target)?;
        self.push_segment_unchecked(from, to, segment);
        Ok(())
    }

    /// Start the built network at `revision` instead of zero.
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize { self.locations.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    fn endpoints(&self, source: LocationId, target: LocationId) -> NetworkResult<(NodeIdx, NodeIdx)> {
        let from = *self.index.get(&source).ok_or(NetworkError::UnknownLocation(source))?;
        let to = *self.index.get(&target).ok_or(NetworkError::UnknownLocation(target))?;
        Ok((from, to))
    }

    pub(crate) fn push_location_unchecked(&mut self, location: Location) -> NodeIdx {
        let idx = NodeIdx(self.locations.len() as u32);
        self.index.insert(location.id, idx);
        self.locations.push(location);
        idx
    }

    pub(crate) fn push_segment_unchecked(&mut self, from: NodeIdx, to: NodeIdx, segment: Segment) {
        match self.edge_slot.get(&(from, to)) {
            Some(&slot) => self.raw_edges[slot].segment = segment,
            None => {
                self.edge_slot.insert((from, to), self.raw_edges.len());
                self.raw_edges.push(RawEdge { from, to, segment });
            }
        }
    }

    /// Consume the builder and produce a [`Network`].
    ///
    /// Time complexity: O(E log E) for segment sort + O(N log N) for R-tree
    /// bulk load, where N = nodes, E = segments.
    pub fn build(self) -> Network {
        let node_count = self.locations.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among a node's outgoing segments.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from: Vec<NodeIdx> = raw.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeIdx> = raw.iter().map(|e| e.to).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let segments: Vec<Segment> = raw.into_iter().map(|e| e.segment).collect();

        let entries: Vec<NodeEntry> = self
            .locations
            .iter()
            .enumerate()
            .map(|(i, loc)| NodeEntry {
                point: [loc.pos.x, loc.pos.y],
                idx:   NodeIdx(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Network {
            locations: self.locations,
            index: self.index,
            node_out_start,
            edge_from,
            edge_to,
            segments,
            revision: self.revision,
            spatial_idx,
        }
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
