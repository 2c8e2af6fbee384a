//! Capacitated greedy router: one vehicle, one demand group.
//!
//! # State machine
//!
//! ```text
//!            ┌──────── over capacity: skip candidate ───────┐
//!            ▼                                              │
//!   ──► Selecting ── nearest feasible candidate ──► Moving ─┘ (visit, back to Selecting)
//!            │
//!            └── unvisited empty / all unreachable ──► Exhausted
//! ```
//!
//! In `Selecting` the router asks the [`ShortestPath`] engine for the cost
//! from the vehicle's location to every unvisited stop and takes the
//! cheapest.  Equal costs go to the lowest `LocationId`.  A candidate whose
//! demand does not fit is dropped for good (not retried later).  When every
//! remaining stop is unreachable they are all dropped at once, so a run
//! never makes more decisions than there were stops.

use fl_core::LocationId;
use fl_network::{Network, ShortestPath};

use crate::{DispatchResult, Vehicle};

/// Where the router is in its loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouterState {
    /// Choosing the next stop from the unvisited set.
    Selecting,
    /// A feasible stop was chosen and is about to be visited.
    Moving { next: LocationId, cost: f64 },
    /// Nothing left to visit; the vehicle's route is final.
    Exhausted,
}

/// Why a stop was dropped without being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkipReason {
    /// No path from the vehicle's location when the stop was considered.
    Unreachable,
    /// The stop's demand exceeded the vehicle's remaining capacity.
    OverCapacity,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SkipReason::Unreachable  => "unreachable",
            SkipReason::OverCapacity => "over capacity",
        })
    }
}

/// Greedy nearest-feasible-neighbour routing for a single [`Vehicle`].
///
/// The router borrows the network immutably, so several routers can run
/// side by side on the same weights.
pub struct CapacitatedRouter<'a, P: ShortestPath + ?Sized> {
    network:   &'a Network,
    engine:    &'a P,
    vehicle:   Vehicle,
    /// Remaining stops, ascending by id.
    unvisited: Vec<LocationId>,
    skipped:   Vec<(LocationId, SkipReason)>,
    state:     RouterState,
    decisions: usize,
}

impl<'a, P: ShortestPath + ?Sized> CapacitatedRouter<'a, P> {
    /// Set up a router for `vehicle` over `stops`.
    ///
    /// Duplicate stops are collapsed.  Every stop must exist in `network`.
    pub fn new(network: &'a Network, engine: &'a P, vehicle: Vehicle, stops: &[LocationId]) -> DispatchResult<Self> {
        network.node_idx(vehicle.current)?;
        let mut unvisited = stops.to_vec();
        unvisited.sort_unstable();
        unvisited.dedup();
        for &id in &unvisited {
            network.node_idx(id)?;
        }
        Ok(Self {
            network,
            engine,
            vehicle,
            unvisited,
            skipped: Vec::new(),
            state: RouterState::Selecting,
            decisions: 0,
        })
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn unvisited(&self) -> &[LocationId] {
        &self.unvisited
    }

    pub fn skipped(&self) -> &[(LocationId, SkipReason)] {
        &self.skipped
    }

    /// Visits plus skips made so far.
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    /// Advance one transition and return the new state.
    ///
    /// Calling `step` in `Exhausted` is a no-op.
    pub fn step(&mut self) -> DispatchResult<RouterState> {
        self.state = match self.state {
            RouterState::Selecting => self.select()?,
            RouterState::Moving { next, cost } => {
                self.move_to(next, cost)?;
                RouterState::Selecting
            }
            RouterState::Exhausted => RouterState::Exhausted,
        };
        Ok(self.state)
    }

    /// Step until `Exhausted` and hand back the final vehicle state and the
    /// stops that were dropped.
    pub fn run(mut self) -> DispatchResult<(Vehicle, Vec<(LocationId, SkipReason)>)> {
        while self.step()? != RouterState::Exhausted {}
        Ok((self.vehicle, self.skipped))
    }

    fn select(&mut self) -> DispatchResult<RouterState> {
        if self.unvisited.is_empty() {
            return Ok(RouterState::Exhausted);
        }

        let costs = self.engine.costs_from(self.network, self.vehicle.current, &self.unvisited)?;

        // `unvisited` is sorted, so the first strict minimum is the lowest id.
        let mut best: Option<(usize, f64)> = None;
        for (i, &c) in costs.iter().enumerate() {
            if c.is_finite() && best.is_none_or(|(_, b)| c < b) {
                best = Some((i, c));
            }
        }

        let Some((i, cost)) = best else {
            log::debug!(
                "{}: {} remaining stops unreachable from {}",
                self.vehicle.id,
                self.unvisited.len(),
                self.vehicle.current
            );
            for id in std::mem::take(&mut self.unvisited) {
                self.skip(id, SkipReason::Unreachable);
            }
            return Ok(RouterState::Exhausted);
        };

        let candidate = self.unvisited[i];
        let demand = self.network.location(candidate)?.demand;
        if self.vehicle.can_carry(demand) {
            Ok(RouterState::Moving { next: candidate, cost })
        } else {
            self.unvisited.remove(i);
            self.skip(candidate, SkipReason::OverCapacity);
            Ok(RouterState::Selecting)
        }
    }

    fn move_to(&mut self, next: LocationId, cost: f64) -> DispatchResult<()> {
        let demand = self.network.location(next)?.demand;
        if let Ok(i) = self.unvisited.binary_search(&next) {
            self.unvisited.remove(i);
        }
        self.vehicle.visit(next, cost, demand);
        self.decisions += 1;
        Ok(())
    }

    fn skip(&mut self, id: LocationId, reason: SkipReason) {
        self.skipped.push((id, reason));
        self.decisions += 1;
    }
}
