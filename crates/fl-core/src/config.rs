//! Run configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to the network pipeline and the dispatcher.
//! Every field has a default, so a partial file is enough.

use crate::{FleetError, FleetResult};

// ── Traffic ───────────────────────────────────────────────────────────────────

/// Named congestion intensities.
///
/// Intensity is a multiplier on free-flow travel time: 1.0 is an empty road,
/// 2.5 and above is rush hour.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrafficLevel {
    FreeFlow,
    Moderate,
    Peak,
}

impl TrafficLevel {
    pub fn intensity(self) -> f64 {
        match self {
            TrafficLevel::FreeFlow => 1.0,
            TrafficLevel::Moderate => 1.5,
            TrafficLevel::Peak     => 2.5,
        }
    }
}

// ── Dispatch strategy selectors ───────────────────────────────────────────────

/// Which demand partitioner splits urgent customers across vehicles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PartitionStrategy {
    /// Lloyd's k-means on location coordinates.
    #[default]
    KMeans,
    /// Angular sweep around the demand centroid.
    Sweep,
}

/// Where each vehicle starts its route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StartPolicy {
    /// Every vehicle leaves the single warehouse.
    #[default]
    Warehouse,
    /// Each vehicle leaves the hub closest to its group's centroid, falling
    /// back to the warehouse when the network has no hubs.
    NearestHub,
}

// ── DispatchConfig ────────────────────────────────────────────────────────────

/// Top-level configuration for one dispatch run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Number of vehicles, and therefore of demand groups.
    pub vehicle_count: usize,

    /// Load cap shared by every vehicle in the fleet.
    pub vehicle_capacity: f64,

    /// Customers with urgency at or above this level form the demand set.
    pub min_urgency: u8,

    /// Congestion intensity applied before routing.  `None` keeps whatever
    /// weights the network already carries.
    pub traffic_intensity: Option<f64>,

    pub partition: PartitionStrategy,

    pub start: StartPolicy,

    /// Inclusive range for randomly assigned segment capacities.
    pub segment_capacity_range: (u32, u32),

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    /// Ignored unless `fl-dispatch` is built with `parallel`.
    pub num_threads: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            seed:                   42,
            vehicle_count:          3,
            vehicle_capacity:       100.0,
            min_urgency:            1,
            traffic_intensity:      Some(TrafficLevel::Moderate.intensity()),
            partition:              PartitionStrategy::KMeans,
            start:                  StartPolicy::Warehouse,
            segment_capacity_range: (10, 50),
            num_threads:            None,
        }
    }
}

impl DispatchConfig {
    /// Reject values no run can make sense of.
    pub fn validate(&self) -> FleetResult<()> {
        if self.vehicle_count == 0 {
            return Err(FleetError::Config("vehicle_count must be at least 1".into()));
        }
        if !(self.vehicle_capacity.is_finite() && self.vehicle_capacity > 0.0) {
            return Err(FleetError::Config(format!(
                "vehicle_capacity must be positive, got {}",
                self.vehicle_capacity
            )));
        }
        if let Some(i) = self.traffic_intensity {
            if !(i.is_finite() && i > 0.0) {
                return Err(FleetError::Config(format!(
                    "traffic_intensity must be positive, got {i}"
                )));
            }
        }
        let (lo, hi) = self.segment_capacity_range;
        if lo == 0 || lo > hi {
            return Err(FleetError::Config(format!(
                "segment_capacity_range must satisfy 1 <= min <= max, got ({lo}, {hi})"
            )));
        }
        if self.num_threads == Some(0) {
            return Err(FleetError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
