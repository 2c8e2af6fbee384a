//! Plain record types shared by the CSV and JSON backends.
//!
//! Optional values (`urgency`, `speed_kph`, `capacity`) are empty CSV cells
//! and `null` in JSON.

use serde::{Deserialize, Serialize};

use fl_core::LocationId;
use fl_dispatch::{SkipReason, SkippedStop, VehicleReport};
use fl_network::{Location, NetworkResult, Role, Segment};

/// One location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id:      LocationId,
    pub role:    Role,
    pub x:       f64,
    pub y:       f64,
    pub demand:  f64,
    pub urgency: Option<u8>,
}

impl From<&Location> for NodeRow {
    fn from(l: &Location) -> Self {
        Self {
            id:      l.id,
            role:    l.role,
            x:       l.pos.x,
            y:       l.pos.y,
            demand:  l.demand,
            urgency: l.urgency,
        }
    }
}

impl NodeRow {
    pub fn into_location(self) -> Location {
        let loc = Location::new(self.id, self.role, fl_core::Point::new(self.x, self.y), self.demand);
        match self.urgency {
            Some(u) => loc.with_urgency(u),
            None => loc,
        }
    }
}

/// One directed segment.  `weight` is written for readers of the file; on
/// load it is recomputed from `base_travel_time * congestion_factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub source:            LocationId,
    pub target:            LocationId,
    pub distance:          f64,
    pub speed_kph:         Option<f64>,
    pub base_travel_time:  f64,
    pub congestion_factor: f64,
    pub weight:            f64,
    pub capacity:          Option<u32>,
}

impl From<&Segment> for EdgeRow {
    fn from(s: &Segment) -> Self {
        Self {
            source:            s.source,
            target:            s.target,
            distance:          s.distance,
            speed_kph:         s.speed_kph,
            base_travel_time:  s.base_travel_time,
            congestion_factor: s.congestion_factor(),
            weight:            s.weight(),
            capacity:          s.capacity,
        }
    }
}

impl EdgeRow {
    pub fn into_segment(self) -> NetworkResult<Segment> {
        let seg = Segment::from_parts(
            self.source,
            self.target,
            self.distance,
            self.speed_kph,
            self.base_travel_time,
            self.congestion_factor,
            self.capacity,
        )?;
        if (seg.weight() - self.weight).abs() > 1e-9 * self.weight.abs().max(1.0) {
            log::warn!(
                "segment {} -> {}: stored weight {} disagrees with base * factor = {}; using the latter",
                self.source,
                self.target,
                self.weight,
                seg.weight()
            );
        }
        Ok(seg)
    }
}

/// One stop of one vehicle's route.  `seq` 0 is the start location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStopRow {
    pub vehicle:  u32,
    pub seq:      usize,
    pub location: LocationId,
}

impl RouteStopRow {
    pub fn from_report(v: &VehicleReport) -> impl Iterator<Item = RouteStopRow> + '_ {
        v.route_history.iter().enumerate().map(|(seq, &location)| RouteStopRow {
            vehicle: v.vehicle.0,
            seq,
            location,
        })
    }
}

/// Per-vehicle totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleRow {
    pub vehicle:      u32,
    pub start:        LocationId,
    pub stops:        usize,
    pub travel_time:  f64,
    pub carried_load: f64,
    pub capacity:     f64,
}

impl From<&VehicleReport> for VehicleRow {
    fn from(v: &VehicleReport) -> Self {
        Self {
            vehicle:      v.vehicle.0,
            start:        v.route_history.first().copied().unwrap_or(LocationId::INVALID),
            stops:        v.route_history.len().saturating_sub(1),
            travel_time:  v.travel_time,
            carried_load: v.carried_load,
            capacity:     v.capacity,
        }
    }
}

/// A dropped stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub vehicle:  u32,
    pub location: LocationId,
    pub reason:   SkipReason,
}

impl From<&SkippedStop> for SkippedRow {
    fn from(s: &SkippedStop) -> Self {
        Self { vehicle: s.vehicle.0, location: s.location, reason: s.reason }
    }
}
