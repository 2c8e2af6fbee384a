//! Network-subsystem error type.

use thiserror::Error;

use fl_core::LocationId;

/// Errors produced by `fl-network`.
///
/// Construction errors (`DuplicateLocation`, `UnknownLocation`, `Invalid*`)
/// are raised before anything is inserted, so a failed call never leaves a
/// partial node or segment behind.  `NoPath` is an expected query outcome;
/// routing code turns it into an infinite cost instead of failing.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("location {0} already exists")]
    DuplicateLocation(LocationId),

    #[error("location {0} not found in network")]
    UnknownLocation(LocationId),

    #[error("no path from {from} to {to}")]
    NoPath { from: LocationId, to: LocationId },

    #[error("invalid location {id}: {reason}")]
    InvalidLocation { id: LocationId, reason: String },

    #[error("invalid segment {source_id} -> {target_id}: {reason}")]
    InvalidSegment {
        source_id: LocationId,
        target_id: LocationId,
        reason:    String,
    },

    #[error("traffic intensity must be finite and positive, got {0}")]
    InvalidIntensity(f64),

    #[error("capacity range must satisfy 1 <= min <= max, got ({min}, {max})")]
    InvalidCapacityRange { min: u32, max: u32 },

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
