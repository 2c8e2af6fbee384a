//! Fleet-level dispatch: traffic, partitioning, start locations, routing.
//!
//! # Run phases
//!
//! 1. **Traffic** (`&mut Network`, optional): redraw congestion at the
//!    configured intensity.  This is the only write and it completes before
//!    any path query.
//! 2. **Partition**: urgent customers, ascending by id, are split into one
//!    group per vehicle by the configured [`Partition`].
//! 3. **Start**: each vehicle starts at the warehouse, or at the hub nearest
//!    its group's centroid.
//! 4. **Route** (`&Network` only): one [`CapacitatedRouter`] per vehicle.
//!    With the `parallel` feature the routers run on Rayon's thread pool;
//!    they share nothing mutable, so results are identical either way.
//! 5. **Report**: routes, travel times, loads, and every dropped stop.

use fl_core::{DispatchConfig, FleetRng, LocationId, Point, Revision, StartPolicy, VehicleId};
use fl_network::{DijkstraRouter, Network, Role, ShortestPath};

use crate::partition::partitioner_for;
use crate::{CapacitatedRouter, DispatchError, DispatchResult, Partition, SkipReason, Vehicle};

/// Offset used to derive the traffic stream from the run seed.
const TRAFFIC_STREAM: u64 = 1;

// ── Report types ──────────────────────────────────────────────────────────────

/// Final state of one vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleReport {
    pub vehicle:       VehicleId,
    pub capacity:      f64,
    /// Stops in order, starting with the start location.
    pub route_history: Vec<LocationId>,
    pub travel_time:   f64,
    pub carried_load:  f64,
}

impl From<Vehicle> for VehicleReport {
    fn from(v: Vehicle) -> Self {
        Self {
            vehicle:       v.id,
            capacity:      v.capacity,
            route_history: v.route_history,
            travel_time:   v.travel_time,
            carried_load:  v.load,
        }
    }
}

/// A stop some vehicle dropped without visiting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedStop {
    pub vehicle:  VehicleId,
    pub location: LocationId,
    pub reason:   SkipReason,
}

/// Everything a dispatch run produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchReport {
    /// Weight generation every route was computed against.
    pub revision: Revision,
    pub vehicles: Vec<VehicleReport>,
    pub skipped:  Vec<SkippedStop>,
}

impl DispatchReport {
    pub fn total_travel_time(&self) -> f64 {
        self.vehicles.iter().map(|v| v.travel_time).sum()
    }

    pub fn total_load(&self) -> f64 {
        self.vehicles.iter().map(|v| v.carried_load).sum()
    }

    /// Number of stops visited across the fleet.
    pub fn served(&self) -> usize {
        self.vehicles.iter().map(|v| v.route_history.len() - 1).sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedStop> + '_ {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }

    /// `false` if the network's weights changed after this run.
    pub fn is_current(&self, network: &Network) -> bool {
        self.revision == network.revision()
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Runs a whole fleet over one network.
///
/// # Type parameter
///
/// `P` is the shortest-path engine, [`DijkstraRouter`] by default.  Swap it
/// at compile time for a different algorithm.
pub struct Dispatcher<P: ShortestPath = DijkstraRouter> {
    engine:      P,
    partitioner: Box<dyn Partition>,
    config:      DispatchConfig,
}

impl Dispatcher<DijkstraRouter> {
    /// Dispatcher with Dijkstra routing and the configured partitioner.
    pub fn new(config: DispatchConfig) -> DispatchResult<Self> {
        Self::with_engine(DijkstraRouter, config)
    }
}

impl<P: ShortestPath> Dispatcher<P> {
    pub fn with_engine(engine: P, config: DispatchConfig) -> DispatchResult<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            partitioner: partitioner_for(config.partition),
            config,
        })
    }

    /// Replace the partitioner chosen from the config.
    pub fn with_partitioner(mut self, partitioner: Box<dyn Partition>) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Redraw congestion if the config asks for it.  Returns the new
    /// revision, or `None` when the weights were left alone.
    pub fn apply_traffic(&self, network: &mut Network) -> DispatchResult<Option<Revision>> {
        let Some(intensity) = self.config.traffic_intensity else {
            return Ok(None);
        };
        let mut rng = FleetRng::new(self.config.seed).child(TRAFFIC_STREAM);
        let revision = network.simulate_traffic(intensity, &mut rng)?;
        log::info!("traffic at intensity {intensity}: network now at {revision}");
        Ok(Some(revision))
    }

    /// Apply traffic, then dispatch.
    pub fn run(&self, network: &mut Network) -> DispatchResult<DispatchReport> {
        self.apply_traffic(network)?;
        self.dispatch(network)
    }

    /// Route the fleet over urgent customers under the network's current
    /// weights.
    pub fn dispatch(&self, network: &Network) -> DispatchResult<DispatchReport> {
        let stops = network.urgent_customers(self.config.min_urgency);
        let groups = self.partition(network, &stops)?;
        self.dispatch_groups(network, &groups)
    }

    /// Split `stops` into one group per vehicle.
    pub fn partition(&self, network: &Network, stops: &[LocationId]) -> DispatchResult<Vec<Vec<LocationId>>> {
        let points = stops
            .iter()
            .map(|&id| network.location(id).map(|l| l.pos))
            .collect::<Result<Vec<Point>, _>>()?;
        let k = self.config.vehicle_count;
        let assignment = self.partitioner.partition(&points, k, self.config.seed)?;
        if assignment.labels().len() != points.len() || assignment.group_count() != k {
            return Err(DispatchError::PartitionMismatch {
                points:   points.len(),
                labels:   assignment.labels().len(),
                vehicles: k,
                groups:   assignment.group_count(),
            });
        }
        log::debug!(
            "{}: {} stops into groups of {:?}",
            self.partitioner.name(),
            stops.len(),
            assignment.group_sizes()
        );
        Ok(assignment.groups(stops))
    }

    /// Route one vehicle per entry of `groups`.  Vehicle `i` serves
    /// `groups[i]`.
    pub fn dispatch_groups(&self, network: &Network, groups: &[Vec<LocationId>]) -> DispatchResult<DispatchReport> {
        let revision = network.revision();
        let jobs: Vec<(VehicleId, LocationId, &[LocationId])> = groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let id = VehicleId(i as u32);
                self.start_for(network, group).map(|start| (id, start, group.as_slice()))
            })
            .collect::<DispatchResult<_>>()?;

        let routed = self.route_all(network, &jobs)?;

        let mut vehicles = Vec::with_capacity(routed.len());
        let mut skipped = Vec::new();
        for (vehicle, dropped) in routed {
            skipped.extend(dropped.into_iter().map(|(location, reason)| SkippedStop {
                vehicle: vehicle.id,
                location,
                reason,
            }));
            vehicles.push(VehicleReport::from(vehicle));
        }

        let report = DispatchReport { revision, vehicles, skipped };
        for s in report.skipped_for(SkipReason::Unreachable) {
            log::warn!("{}: no path to {}, stop skipped", s.vehicle, s.location);
        }
        log::info!(
            "dispatched {} vehicles at {revision}: {} stops served, {} skipped, total travel time {:.2}",
            report.vehicles.len(),
            report.served(),
            report.skipped.len(),
            report.total_travel_time()
        );
        Ok(report)
    }

    fn start_for(&self, network: &Network, group: &[LocationId]) -> DispatchResult<LocationId> {
        let warehouse = network.warehouse();
        let start = match self.config.start {
            StartPolicy::Warehouse => warehouse,
            StartPolicy::NearestHub => {
                let points: Vec<Point> = group
                    .iter()
                    .filter_map(|&id| network.location(id).ok().map(|l| l.pos))
                    .collect();
                Point::centroid(&points)
                    .and_then(|c| network.nearest_with_role(c, Role::Hub))
                    .or(warehouse)
            }
        };
        start.ok_or(DispatchError::NoStartLocation)
    }

    fn route_one(
        &self,
        network: &Network,
        (id, start, stops): (VehicleId, LocationId, &[LocationId]),
    ) -> DispatchResult<(Vehicle, Vec<(LocationId, SkipReason)>)> {
        let vehicle = Vehicle::new(id, self.config.vehicle_capacity, start)?;
        if network.node_idx(start).is_err() {
            return Err(DispatchError::StartNotInNetwork { vehicle: id, location: start });
        }
        CapacitatedRouter::new(network, &self.engine, vehicle, stops)?.run()
    }

    #[cfg(not(feature = "parallel"))]
    fn route_all(
        &self,
        network: &Network,
        jobs: &[(VehicleId, LocationId, &[LocationId])],
    ) -> DispatchResult<Vec<(Vehicle, Vec<(LocationId, SkipReason)>)>> {
        jobs.iter().map(|&job| self.route_one(network, job)).collect()
    }

    #[cfg(feature = "parallel")]
    fn route_all(
        &self,
        network: &Network,
        jobs: &[(VehicleId, LocationId, &[LocationId])],
    ) -> DispatchResult<Vec<(Vehicle, Vec<(LocationId, SkipReason)>)>> {
        use rayon::prelude::*;

        let route = || -> DispatchResult<Vec<_>> {
            // `collect` keeps input order, so vehicle i stays at index i.
            jobs.par_iter().map(|&job| self.route_one(network, job)).collect()
        };
        match self.config.num_threads {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| DispatchError::ThreadPool(e.to_string()))?
                .install(route),
            None => route(),
        }
    }
}
