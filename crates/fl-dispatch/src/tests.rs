//! Unit tests for fl-dispatch.

use fl_core::{LocationId, Point};
use fl_network::{Location, Network, NetworkBuilder, Role};

// ── Helpers ───────────────────────────────────────────────────────────────────

const W: LocationId = LocationId(1);
const H: LocationId = LocationId(2);
const A: LocationId = LocationId(3);
const B: LocationId = LocationId(4);
const Z: LocationId = LocationId(5);

fn place(b: &mut NetworkBuilder, id: LocationId, role: Role, x: f64, y: f64, demand: f64, urgency: u8) {
    let loc = Location::new(id, role, Point::new(x, y), demand).with_urgency(urgency);
    b.insert_location(loc).unwrap();
}

/// W(0,0) warehouse, H(5,0) hub, A(10,0) and B(5,5) customers with demand 5,
/// Z(20,20) an isolated customer.  Segments W→H, H→A, H→B, each distance 5;
/// with `two_way` the reverse segments exist too.
fn depot(two_way: bool) -> Network {
    let mut b = NetworkBuilder::new();
    place(&mut b, W, Role::Warehouse, 0.0, 0.0, 0.0, 0);
    place(&mut b, H, Role::Hub, 5.0, 0.0, 0.0, 0);
    place(&mut b, A, Role::Customer, 10.0, 0.0, 5.0, 2);
    place(&mut b, B, Role::Customer, 5.0, 5.0, 5.0, 1);
    place(&mut b, Z, Role::Customer, 20.0, 20.0, 1.0, 1);
    for (s, t) in [(W, H), (H, A), (H, B)] {
        b.add_segment(s, t, 5.0, 1.0).unwrap();
        if two_way {
            b.add_segment(t, s, 5.0, 1.0).unwrap();
        }
    }
    b.build()
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicle {
    use fl_core::VehicleId;

    use super::*;
    use crate::{DispatchError, Vehicle};

    #[test]
    fn new_vehicle_is_empty_at_start() {
        let v = Vehicle::new(VehicleId(0), 50.0, W).unwrap();
        assert_eq!(v.current, W);
        assert_eq!(v.start(), W);
        assert_eq!(v.route_history, vec![W]);
        assert_eq!(v.load, 0.0);
        assert_eq!(v.travel_time, 0.0);
        assert_eq!(v.stops(), 0);
    }

    #[test]
    fn capacity_must_be_positive() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Vehicle::new(VehicleId(0), bad, W),
                Err(DispatchError::InvalidCapacity(_))
            ));
        }
    }

    #[test]
    fn visit_accumulates() {
        let mut v = Vehicle::new(VehicleId(1), 10.0, W).unwrap();
        assert!(v.can_carry(10.0));
        assert!(!v.can_carry(10.5));
        v.visit(A, 4.0, 6.0);
        v.visit(B, 2.5, 4.0);
        assert_eq!(v.route_history, vec![W, A, B]);
        assert_eq!(v.current, B);
        assert_eq!(v.travel_time, 6.5);
        assert_eq!(v.load, 10.0);
        assert_eq!(v.remaining_capacity(), 0.0);
        assert!(v.can_carry(0.0));
    }
}

// ── CapacitatedRouter ─────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use fl_core::VehicleId;
    use fl_network::{DijkstraRouter, NetworkError};

    use super::*;
    use crate::{CapacitatedRouter, DispatchError, RouterState, SkipReason, Vehicle};

    fn route(
        net: &Network,
        capacity: f64,
        stops: &[LocationId],
    ) -> (Vehicle, Vec<(LocationId, SkipReason)>) {
        let v = Vehicle::new(VehicleId(0), capacity, W).unwrap();
        CapacitatedRouter::new(net, &DijkstraRouter, v, stops).unwrap().run().unwrap()
    }

    #[test]
    fn serves_both_customers_when_capacity_allows() {
        let net = depot(true);
        let (v, skipped) = route(&net, 100.0, &[A, B]);
        // A and B tie at cost 10 from W; the lower id goes first.
        assert_eq!(v.route_history, vec![W, A, B]);
        assert_eq!(v.travel_time, 10.0 + 10.0);
        assert_eq!(v.load, 10.0);
        assert!(skipped.is_empty());
    }

    #[test]
    fn hub_as_a_stop_gives_warehouse_hub_customers() {
        let net = depot(true);
        let (v, skipped) = route(&net, 100.0, &[H, A, B]);
        assert_eq!(v.route_history, vec![W, H, A, B]);
        assert_eq!(v.travel_time, 5.0 + 5.0 + 10.0);
        assert!(skipped.is_empty());
    }

    #[test]
    fn one_way_segments_strand_the_second_customer() {
        let net = depot(false);
        let (v, skipped) = route(&net, 100.0, &[A, B]);
        assert_eq!(v.route_history.len(), 2);
        assert_eq!(v.travel_time, 10.0);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].1, SkipReason::Unreachable);
        let visited = v.route_history[1];
        assert_ne!(visited, skipped[0].0);
    }

    #[test]
    fn capacity_below_every_demand_stays_home() {
        let net = depot(false);
        let (v, skipped) = route(&net, 4.0, &[A, B]);
        assert_eq!(v.route_history, vec![W]);
        assert_eq!(v.load, 0.0);
        assert_eq!(v.travel_time, 0.0);
        assert_eq!(skipped, vec![(A, SkipReason::OverCapacity), (B, SkipReason::OverCapacity)]);
    }

    #[test]
    fn over_capacity_stop_is_not_retried() {
        let net = depot(true);
        // After A (5), B (5) no longer fits in 8.
        let (v, skipped) = route(&net, 8.0, &[A, B]);
        assert_eq!(v.route_history, vec![W, A]);
        assert_eq!(v.load, 5.0);
        assert_eq!(skipped, vec![(B, SkipReason::OverCapacity)]);
    }

    #[test]
    fn isolated_stop_skipped_without_crash() {
        let net = depot(true);
        let (v, skipped) = route(&net, 100.0, &[A, Z, B]);
        assert!(!v.route_history.contains(&Z));
        assert_eq!(v.route_history, vec![W, A, B]);
        assert_eq!(skipped, vec![(Z, SkipReason::Unreachable)]);
    }

    #[test]
    fn all_unreachable_terminates_in_one_step() {
        let net = depot(false);
        let v = Vehicle::new(VehicleId(0), 100.0, A).unwrap();
        let mut r = CapacitatedRouter::new(&net, &DijkstraRouter, v, &[W, B, Z]).unwrap();
        assert_eq!(r.step().unwrap(), RouterState::Exhausted);
        assert_eq!(r.decisions(), 3);
        assert!(r.unvisited().is_empty());
        assert!(r.skipped().iter().all(|(_, why)| *why == SkipReason::Unreachable));
        assert_eq!(r.step().unwrap(), RouterState::Exhausted);
        assert_eq!(r.decisions(), 3);
    }

    #[test]
    fn state_machine_transitions() {
        let net = depot(true);
        let v = Vehicle::new(VehicleId(0), 100.0, W).unwrap();
        let mut r = CapacitatedRouter::new(&net, &DijkstraRouter, v, &[B]).unwrap();
        assert_eq!(r.state(), RouterState::Selecting);
        assert_eq!(r.step().unwrap(), RouterState::Moving { next: B, cost: 10.0 });
        assert_eq!(r.vehicle().current, W);
        assert_eq!(r.step().unwrap(), RouterState::Selecting);
        assert_eq!(r.vehicle().current, B);
        assert_eq!(r.step().unwrap(), RouterState::Exhausted);
        assert_eq!(r.decisions(), 1);
    }

    #[test]
    fn empty_group_is_immediately_exhausted() {
        let net = depot(true);
        let (v, skipped) = route(&net, 100.0, &[]);
        assert_eq!(v.route_history, vec![W]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn duplicate_stops_collapse() {
        let net = depot(true);
        let (v, _) = route(&net, 100.0, &[B, B, A, B]);
        assert_eq!(v.route_history, vec![W, A, B]);
    }

    #[test]
    fn unknown_stop_rejected_up_front() {
        let net = depot(true);
        let v = Vehicle::new(VehicleId(0), 100.0, W).unwrap();
        let err = CapacitatedRouter::new(&net, &DijkstraRouter, v, &[A, LocationId(77)]).err();
        assert!(matches!(
            err,
            Some(DispatchError::Network(NetworkError::UnknownLocation(LocationId(77))))
        ));
    }
}

// ── Router properties ─────────────────────────────────────────────────────────

#[cfg(test)]
mod router_properties {
    use fl_core::VehicleId;
    use fl_network::DijkstraRouter;
    use proptest::prelude::*;

    use super::*;
    use crate::{CapacitatedRouter, Vehicle};

    /// Random graph on `n` locations with random demands and segments.
    fn arb_case() -> impl Strategy<Value = (Network, Vec<LocationId>, f64)> {
        (3u64..10).prop_flat_map(|n| {
            (
                prop::collection::vec(0.0f64..20.0, n as usize),
                prop::collection::vec((0..n, 0..n, 0.1f64..10.0), 0..25),
                prop::collection::vec(1..n, 0..n as usize),
                1.0f64..60.0,
            )
                .prop_map(move |(demands, edges, stops, capacity)| {
                    let mut b = NetworkBuilder::new();
                    for (i, d) in demands.iter().enumerate() {
                        let role = if i == 0 { Role::Warehouse } else { Role::Customer };
                        place(&mut b, LocationId(i as u64), role, i as f64, 0.0, *d, 1);
                    }
                    for (u, v, dist) in edges {
                        b.add_segment(LocationId(u), LocationId(v), dist, 1.0).unwrap();
                    }
                    let stops = stops.into_iter().map(LocationId).collect();
                    (b.build(), stops, capacity)
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn load_never_exceeds_capacity((net, stops, capacity) in arb_case()) {
            let v = Vehicle::new(VehicleId(0), capacity, LocationId(0)).unwrap();
            let mut r = CapacitatedRouter::new(&net, &DijkstraRouter, v, &stops).unwrap();
            let distinct = r.unvisited().len();
            let mut steps = 0usize;
            while r.step().unwrap() != crate::RouterState::Exhausted {
                prop_assert!(r.vehicle().load <= r.vehicle().capacity);
                steps += 1;
                prop_assert!(steps <= 2 * distinct + 1, "router did not terminate");
            }
            // Every distinct stop was decided exactly once.
            prop_assert_eq!(r.decisions(), distinct);
            prop_assert_eq!(r.vehicle().stops() + r.skipped().len(), distinct);
        }
    }
}

// ── Partitioners ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod partition {
    use fl_core::Point;

    use crate::{DispatchError, KMeansPartitioner, Partition, SweepPartitioner};

    fn two_blobs() -> Vec<Point> {
        let mut pts = Vec::new();
        for i in 0..6 {
            let d = i as f64 * 0.1;
            pts.push(Point::new(d, d));
            pts.push(Point::new(100.0 + d, 100.0 - d));
        }
        pts
    }

    #[test]
    fn kmeans_separates_blobs() {
        let pts = two_blobs();
        let a = KMeansPartitioner::default().partition(&pts, 2, 7).unwrap();
        assert_eq!(a.group_count(), 2);
        let labels = a.labels();
        for i in (0..pts.len()).step_by(2) {
            assert_eq!(labels[i], labels[0]);
            assert_eq!(labels[i + 1], labels[1]);
        }
        assert_ne!(labels[0], labels[1]);
        assert_eq!(a.group_sizes(), vec![6, 6]);
    }

    #[test]
    fn kmeans_deterministic_for_seed() {
        let pts: Vec<Point> = (0..40).map(|i| Point::new((i * 37 % 23) as f64, (i * 11 % 17) as f64)).collect();
        let p = KMeansPartitioner::default();
        assert_eq!(p.partition(&pts, 4, 99).unwrap(), p.partition(&pts, 4, 99).unwrap());
    }

    #[test]
    fn more_groups_than_points() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let a = KMeansPartitioner::default().partition(&pts, 5, 1).unwrap();
        assert_eq!(a.group_count(), 5);
        assert_eq!(a.group_sizes(), vec![1, 1, 0, 0, 0]);
        let groups = a.groups(&['a', 'b']);
        assert_eq!(groups[0], vec!['a']);
        assert_eq!(groups[1], vec!['b']);
        assert!(groups[2..].iter().all(Vec::is_empty));
    }

    #[test]
    fn duplicate_points_still_labelled() {
        let pts = vec![Point::new(3.0, 3.0); 10];
        let a = KMeansPartitioner::default().partition(&pts, 3, 4).unwrap();
        assert_eq!(a.labels().len(), 10);
        assert!(a.labels().iter().all(|&l| l < 3));
    }

    #[test]
    fn zero_groups_rejected() {
        let pts = vec![Point::new(0.0, 0.0)];
        assert!(matches!(
            KMeansPartitioner::default().partition(&pts, 0, 1),
            Err(DispatchError::InvalidVehicleCount)
        ));
        assert!(matches!(SweepPartitioner.partition(&pts, 0, 1), Err(DispatchError::InvalidVehicleCount)));
    }

    #[test]
    fn no_points_gives_empty_groups() {
        let a = SweepPartitioner.partition(&[], 3, 0).unwrap();
        assert_eq!(a.group_count(), 3);
        assert_eq!(a.groups::<u8>(&[]), vec![Vec::<u8>::new(); 3]);
    }

    #[test]
    fn sweep_slices_are_balanced_and_angular() {
        // Eight points on a circle, in angular order from -157.5°.
        let pts: Vec<Point> = (0..8)
            .map(|i| {
                let a = -7.0 * std::f64::consts::PI / 8.0 + i as f64 * std::f64::consts::FRAC_PI_4;
                Point::new(a.cos(), a.sin())
            })
            .collect();
        let a = SweepPartitioner.partition(&pts, 3, 0).unwrap();
        assert_eq!(a.group_sizes(), vec![3, 3, 2]);
        assert_eq!(a.labels(), &[0, 0, 0, 1, 1, 1, 2, 2]);
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatcher {
    use std::collections::HashSet;

    use fl_core::{DispatchConfig, FleetRng, PartitionStrategy, StartPolicy, VehicleId};
    use fl_network::GridSource;
    use fl_network::SpatialSource;

    use super::*;
    use crate::{Assignment, DispatchError, DispatchResult, Dispatcher, Partition, SkipReason};

    fn config(vehicles: usize) -> DispatchConfig {
        DispatchConfig {
            vehicle_count: vehicles,
            traffic_intensity: None,
            ..DispatchConfig::default()
        }
    }

    #[test]
    fn single_vehicle_serves_urgent_customers() {
        let net = depot(true);
        let report = Dispatcher::new(config(1)).unwrap().dispatch(&net).unwrap();
        assert_eq!(report.vehicles.len(), 1);
        let v = &report.vehicles[0];
        assert_eq!(v.vehicle, VehicleId(0));
        // Z is urgent too but unreachable.
        assert_eq!(v.route_history, vec![W, A, B]);
        assert_eq!(v.carried_load, 10.0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].location, Z);
        assert_eq!(report.skipped[0].reason, SkipReason::Unreachable);
        assert_eq!(report.served(), 2);
    }

    #[test]
    fn min_urgency_filters_demand() {
        let net = depot(true);
        let cfg = DispatchConfig { min_urgency: 2, ..config(1) };
        let report = Dispatcher::new(cfg).unwrap().dispatch(&net).unwrap();
        assert_eq!(report.vehicles[0].route_history, vec![W, A]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn run_applies_traffic_first() {
        let mut net = depot(true);
        let cfg = DispatchConfig { traffic_intensity: Some(2.0), ..config(1) };
        let report = Dispatcher::new(cfg).unwrap().run(&mut net).unwrap();
        assert_eq!(net.revision().0, 1);
        assert!(report.is_current(&net));
        // Two legs of two segments each, every factor in [1.6, 2.4].
        let t = report.total_travel_time();
        assert!((20.0 * 1.6 - 1e-9..=20.0 * 2.4 + 1e-9).contains(&t), "travel time {t}");
    }

    #[test]
    fn same_seed_same_report() {
        let cfg = DispatchConfig { traffic_intensity: Some(1.5), ..config(2) };
        let mut a = depot(true);
        let mut b = depot(true);
        let ra = Dispatcher::new(cfg.clone()).unwrap().run(&mut a).unwrap();
        let rb = Dispatcher::new(cfg).unwrap().run(&mut b).unwrap();
        assert_eq!(ra, rb);
    }

    #[test]
    fn nearest_hub_start() {
        let mut b = NetworkBuilder::new();
        place(&mut b, W, Role::Warehouse, 0.0, 0.0, 0.0, 0);
        place(&mut b, H, Role::Hub, 100.0, 0.0, 0.0, 0);
        place(&mut b, A, Role::Customer, 101.0, 0.0, 1.0, 1);
        b.add_segment(W, A, 50.0, 1.0).unwrap();
        b.add_segment(H, A, 1.0, 1.0).unwrap();
        let net = b.build();

        let cfg = DispatchConfig { start: StartPolicy::NearestHub, ..config(1) };
        let report = Dispatcher::new(cfg).unwrap().dispatch(&net).unwrap();
        assert_eq!(report.vehicles[0].route_history, vec![H, A]);
        assert_eq!(report.vehicles[0].travel_time, 1.0);

        let report = Dispatcher::new(config(1)).unwrap().dispatch(&net).unwrap();
        assert_eq!(report.vehicles[0].route_history, vec![W, A]);
    }

    #[test]
    fn missing_warehouse_is_an_error() {
        let mut b = NetworkBuilder::new();
        place(&mut b, A, Role::Customer, 0.0, 0.0, 1.0, 1);
        let net = b.build();
        assert!(matches!(
            Dispatcher::new(config(1)).unwrap().dispatch(&net),
            Err(DispatchError::NoStartLocation)
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(matches!(Dispatcher::new(config(0)), Err(DispatchError::Config(_))));
        let cfg = DispatchConfig { vehicle_capacity: -1.0, ..config(1) };
        assert!(Dispatcher::new(cfg).is_err());
    }

    #[test]
    fn report_totals_sum_over_vehicles() {
        let net = depot(true);
        let report = Dispatcher::new(config(2)).unwrap().dispatch(&net).unwrap();
        let load: f64 = report.vehicles.iter().map(|v| v.carried_load).sum();
        assert_eq!(report.total_load(), load);
        // A and B carry 5 each; Z is unreachable and adds nothing.
        assert_eq!(report.total_load(), 10.0);
    }

    /// Puts everything in a single group whatever `k` is.
    struct OneGroup;

    impl Partition for OneGroup {
        fn name(&self) -> &'static str {
            "one-group"
        }

        fn partition(&self, points: &[Point], _k: usize, _seed: u64) -> DispatchResult<Assignment> {
            Ok(Assignment::new(vec![0; points.len()], 1))
        }
    }

    #[test]
    fn wrong_group_count_is_reported() {
        let net = depot(true);
        let dispatcher = Dispatcher::new(config(2)).unwrap().with_partitioner(Box::new(OneGroup));
        match dispatcher.dispatch(&net) {
            Err(DispatchError::PartitionMismatch { points, labels, vehicles, groups }) => {
                assert_eq!((points, labels), (3, 3));
                assert_eq!((vehicles, groups), (2, 1));
            }
            other => panic!("expected PartitionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn fleet_covers_every_urgent_customer_once() {
        for strategy in [PartitionStrategy::KMeans, PartitionStrategy::Sweep] {
            let source = GridSource { rows: 7, cols: 7, one_way_probability: 0.0, seed: 5, ..Default::default() };
            let mut net = source.load("grid").unwrap().build();
            let mut rng = FleetRng::new(3);
            net.ensure_metadata(&mut rng, (10, 50)).unwrap();
            for id in net.ids_with_role(Role::Customer) {
                net.set_demand(id, 3.0).unwrap();
            }

            let cfg = DispatchConfig { partition: strategy, vehicle_capacity: 12.0, ..config(3) };
            let report = Dispatcher::new(cfg).unwrap().run(&mut net).unwrap();
            assert_eq!(report.vehicles.len(), 3);

            let urgent: HashSet<LocationId> = net.urgent_customers(1).into_iter().collect();
            let mut seen = HashSet::new();
            for v in &report.vehicles {
                assert!(v.carried_load <= v.capacity);
                for id in &v.route_history[1..] {
                    assert!(seen.insert(*id), "{id} visited twice");
                }
            }
            for s in &report.skipped {
                assert!(seen.insert(s.location), "{} decided twice", s.location);
            }
            assert_eq!(seen, urgent);
        }
    }
}
