//! `fl-core`: foundational types for the `rust_fleet` dispatch framework.
//!
//! This crate is a dependency of every other `fl-*` crate.  It intentionally
//! has no `fl-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `LocationId`, `VehicleId`, `NodeIdx`, `EdgeIdx`       |
//! | [`geo`]         | `Point`, Euclidean distance, centroid                 |
//! | [`revision`]    | `Revision` weight-generation counter                  |
//! | [`rng`]         | `FleetRng` (seeded, explicitly threaded)              |
//! | [`config`]      | `DispatchConfig`, `TrafficLevel`, strategy selectors  |
//! | [`error`]       | `FleetError`, `FleetResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod revision;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DispatchConfig, PartitionStrategy, StartPolicy, TrafficLevel};
pub use error::{FleetError, FleetResult};
pub use geo::Point;
pub use ids::{EdgeIdx, LocationId, NodeIdx, VehicleId};
pub use revision::Revision;
pub use rng::FleetRng;
