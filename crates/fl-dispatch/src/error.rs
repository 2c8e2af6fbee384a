use fl_core::{FleetError, LocationId, VehicleId};
use fl_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("vehicle count must be at least 1 when there is demand to serve")]
    InvalidVehicleCount,

    #[error("vehicle capacity must be finite and positive, got {0}")]
    InvalidCapacity(f64),

    #[error("no start location: the network has no warehouse")]
    NoStartLocation,

    #[error("vehicle {vehicle} starts at {location}, which is not in the network")]
    StartNotInNetwork { vehicle: VehicleId, location: LocationId },

    #[error("partition returned {labels} labels in {groups} groups, expected {points} labels in {vehicles} groups")]
    PartitionMismatch {
        points:   usize,
        labels:   usize,
        vehicles: usize,
        groups:   usize,
    },

    #[error("thread pool: {0}")]
    ThreadPool(String),

    #[error("network: {0}")]
    Network(#[from] NetworkError),

    #[error("configuration: {0}")]
    Config(#[from] FleetError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
