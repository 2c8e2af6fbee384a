//! Per-vehicle dispatch state.

use fl_core::{LocationId, VehicleId};

use crate::{DispatchError, DispatchResult};

/// One capacity-limited vehicle for the duration of a dispatch run.
///
/// A vehicle holds only location identifiers, never network data, so a
/// traffic update is visible to every route computed after it.
///
/// Invariant: `0 <= load <= capacity` after every call to [`visit`](Self::visit).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id: VehicleId,

    /// Maximum load.  Positive.
    pub capacity: f64,

    /// Where the vehicle is now.  Starts at its start location.
    pub current: LocationId,

    /// Demand delivered so far.
    pub load: f64,

    /// Stops in visiting order, starting with the start location.
    pub route_history: Vec<LocationId>,

    /// Sum of the path costs of every move.
    pub travel_time: f64,
}

impl Vehicle {
    /// A new, empty vehicle parked at `start`.
    pub fn new(id: VehicleId, capacity: f64, start: LocationId) -> DispatchResult<Self> {
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(DispatchError::InvalidCapacity(capacity));
        }
        Ok(Self {
            id,
            capacity,
            current: start,
            load: 0.0,
            route_history: vec![start],
            travel_time: 0.0,
        })
    }

    #[inline]
    pub fn start(&self) -> LocationId {
        self.route_history[0]
    }

    #[inline]
    pub fn remaining_capacity(&self) -> f64 {
        self.capacity - self.load
    }

    /// `true` if a stop with `demand` fits in the remaining capacity.
    #[inline]
    pub fn can_carry(&self, demand: f64) -> bool {
        self.load + demand <= self.capacity
    }

    /// Number of stops made, excluding the start.
    pub fn stops(&self) -> usize {
        self.route_history.len() - 1
    }

    /// Move to `location`, which costs `cost`, and take on `demand`.
    ///
    /// The caller has already checked [`can_carry`](Self::can_carry).
    pub(crate) fn visit(&mut self, location: LocationId, cost: f64, demand: f64) {
        debug_assert!(self.can_carry(demand), "{} over capacity at {location}", self.id);
        self.current = location;
        self.route_history.push(location);
        self.travel_time += cost;
        self.load += demand;
    }
}
