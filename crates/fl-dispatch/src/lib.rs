//! `fl-dispatch`: vehicles, demand partitioning, and capacitated routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                          |
//! |---------------|-------------------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle`: per-vehicle load, position and route history           |
//! | [`partition`] | `Partition` trait, `KMeansPartitioner`, `SweepPartitioner`        |
//! | [`router`]    | `CapacitatedRouter` state machine, `SkipReason`                   |
//! | [`dispatch`]  | `Dispatcher<P>`, `DispatchReport`, `VehicleReport`, `SkippedStop` |
//! | [`error`]     | `DispatchError`, `DispatchResult<T>`                              |
//!
//! # Routing model
//!
//! Each vehicle runs a greedy nearest-feasible-neighbour loop over its
//! demand group: go to the cheapest reachable stop whose demand still fits,
//! drop stops that do not fit or cannot be reached, and stop when nothing is
//! left.  Dropped stops are never retried by another vehicle; they are
//! reported in [`DispatchReport::skipped`].
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Routes vehicles on Rayon's thread pool.                  |
//! | `serde`    | Derives `Serialize`/`Deserialize` on report types.       |

pub mod dispatch;
pub mod error;
pub mod partition;
pub mod router;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use dispatch::{DispatchReport, Dispatcher, SkippedStop, VehicleReport};
pub use error::{DispatchError, DispatchResult};
pub use partition::{Assignment, KMeansPartitioner, Partition, SweepPartitioner, partitioner_for};
pub use router::{CapacitatedRouter, RouterState, SkipReason};
pub use vehicle::Vehicle;
