//! `fl-network`: logistics network graph, traffic model, and path queries.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`network`]   | `Network` (CSR + R-tree), `NetworkBuilder`, `Location`, `Segment` |
//! | [`traffic`]   | `Network::simulate_traffic`, `Network::reset_traffic`         |
//! | [`router`]    | `ShortestPath` trait, `Route`, `DijkstraRouter`               |
//! | [`component`] | BFS neighbourhoods, strongly connected components             |
//! | [`source`]    | `SpatialSource` trait, `GridSource`, `service_area`           |
//! | [`osm`]       | `OsmPbfSource` (feature = `"osm"` only)                       |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.              |
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod component;
pub mod error;
pub mod network;
pub mod router;
pub mod source;
pub mod traffic;

#[cfg(feature = "osm")]
pub mod osm;


pub use component::{bfs_subgraph, largest_strongly_connected, strongly_connected_components};
pub use error::{NetworkError, NetworkResult};
pub use network::{Location, Network, NetworkBuilder, NetworkStats, Role, Segment};
pub use router::{DijkstraRouter, Route, ShortestPath, UNREACHABLE};
pub use source::{GridSource, SpatialSource, service_area};
