//! Shortest-path strategy trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Routing code calls path queries through the [`ShortestPath`] trait, so
//! applications can swap in other engines (A*, contraction hierarchies,
//! precomputed matrices) without touching the dispatcher.
//!
//! # Costs
//!
//! Costs are sums of current segment weights (`f64`).  Weights are
//! non-negative by construction, so Dijkstra needs no negative-edge
//! handling.  "No path" is an ordinary outcome: [`ShortestPath::path_cost`]
//! returns [`NetworkError::NoPath`], and the sentinel-returning helpers map
//! it to [`UNREACHABLE`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use fl_core::{EdgeIdx, LocationId, NodeIdx, Revision};

use crate::{Network, NetworkError, NetworkResult};

/// Cost reported for a target that cannot be reached.
pub const UNREACHABLE: f64 = f64::INFINITY;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a route query: visited locations in order and total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Locations from source to target, both inclusive.
    pub locations: Vec<LocationId>,
    /// Sum of segment weights along the route.
    pub cost: f64,
    /// Weight generation the route was computed against.
    pub revision: Revision,
}

impl Route {
    /// `true` if the source and target are the same location.
    pub fn is_trivial(&self) -> bool {
        self.locations.len() <= 1
    }

    /// Number of segments traversed.
    pub fn hops(&self) -> usize {
        self.locations.len().saturating_sub(1)
    }

    /// `false` once a traffic update has replaced the weights this route
    /// was computed with.
    pub fn is_current(&self, network: &Network) -> bool {
        self.revision == network.revision()
    }
}

// ── ShortestPath trait ────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one engine can serve several
/// vehicles routed on Rayon worker threads.
pub trait ShortestPath: Send + Sync {
    /// Minimum total weight from `source` to `target`.
    ///
    /// `source == target` costs 0.  Returns [`NetworkError::NoPath`] if
    /// `target` is unreachable and [`NetworkError::UnknownLocation`] if
    /// either id is not in the network.
    fn path_cost(&self, network: &Network, source: LocationId, target: LocationId) -> NetworkResult<f64>;

    /// The locations along a minimum-weight path.  Among equal-cost paths
    /// the choice is implementation-defined.
    fn path_route(&self, network: &Network, source: LocationId, target: LocationId) -> NetworkResult<Route>;

    /// Like [`path_cost`](Self::path_cost), but an unreachable target yields
    /// [`UNREACHABLE`] instead of an error.
    fn cost_or_unreachable(&self, network: &Network, source: LocationId, target: LocationId) -> NetworkResult<f64> {
        match self.path_cost(network, source, target) {
            Err(NetworkError::NoPath { .. }) => Ok(UNREACHABLE),
            other => other,
        }
    }

    /// Costs from `source` to each of `targets`, in the same order, with
    /// [`UNREACHABLE`] for targets that cannot be reached.
    fn costs_from(&self, network: &Network, source: LocationId, targets: &[LocationId]) -> NetworkResult<Vec<f64>> {
        targets
            .iter()
            .map(|&t| self.cost_or_unreachable(network, source, t))
            .collect()
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR graph using current weights.
///
/// Point-to-point queries stop as soon as the target is settled;
/// [`costs_from`](ShortestPath::costs_from) runs a single search that stops
/// once every requested target is settled.  Heap ties are broken by node
/// index, so results are deterministic for a given network.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl ShortestPath for DijkstraRouter {
    fn path_cost(&self, network: &Network, source: LocationId, target: LocationId) -> NetworkResult<f64> {
        let from = network.node_idx(source)?;
        let to = network.node_idx(target)?;
        let search = dijkstra(network, from, |node| node == to);
        search.dist_to(to).ok_or(NetworkError::NoPath { from: source, to: target })
    }

    fn path_route(&self, network: &Network, source: LocationId, target: LocationId) -> NetworkResult<Route> {
        let from = network.node_idx(source)?;
        let to = network.node_idx(target)?;
        let search = dijkstra(network, from, |node| node == to);
        let cost = search.dist_to(to).ok_or(NetworkError::NoPath { from: source, to: target })?;
        Ok(Route {
            locations: search.reconstruct(network, to),
            cost,
            revision: network.revision(),
        })
    }

    fn costs_from(&self, network: &Network, source: LocationId, targets: &[LocationId]) -> NetworkResult<Vec<f64>> {
        let from = network.node_idx(source)?;
        let target_idx: Vec<NodeIdx> = targets
            .iter()
            .map(|&t| network.node_idx(t))
            .collect::<NetworkResult<_>>()?;

        let mut wanted = vec![false; network.node_count()];
        let mut remaining = 0usize;
        for t in &target_idx {
            if !wanted[t.index()] {
                wanted[t.index()] = true;
                remaining += 1;
            }
        }

        let search = dijkstra(network, from, |node| {
            if wanted[node.index()] {
                remaining -= 1;
            }
            remaining == 0
        });

        Ok(target_idx
            .iter()
            .map(|&t| search.dist_to(t).unwrap_or(UNREACHABLE))
            .collect())
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Totally ordered wrapper so `f64` costs can live in a `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Settled state of one search.
struct Search {
    /// `dist[v]` = best known cost to reach `v`.
    dist:      Vec<f64>,
    /// `settled[v]` once `dist[v]` is final.
    settled:   Vec<bool>,
    /// `prev_edge[v]` = segment that reached `v`; `INVALID` for the source
    /// and unreached nodes.
    prev_edge: Vec<EdgeIdx>,
}

impl Search {
    fn dist_to(&self, node: NodeIdx) -> Option<f64> {
        self.settled[node.index()].then(|| self.dist[node.index()])
    }

    fn reconstruct(&self, network: &Network, to: NodeIdx) -> Vec<LocationId> {
        let mut nodes = vec![network.location_at(to).id];
        let mut cur = to;
        loop {
            let e = self.prev_edge[cur.index()];
            if e == EdgeIdx::INVALID {
                break;
            }
            cur = network.edge_source(e);
            nodes.push(network.location_at(cur).id);
        }
        nodes.reverse();
        nodes
    }
}

/// Run Dijkstra from `from`, calling `stop` once per settled node; the
/// search ends when it returns `true` or the frontier is exhausted.
fn dijkstra(network: &Network, from: NodeIdx, mut stop: impl FnMut(NodeIdx) -> bool) -> Search {
    let n = network.node_count();
    let mut search = Search {
        dist:      vec![UNREACHABLE; n],
        settled:   vec![false; n],
        prev_edge: vec![EdgeIdx::INVALID; n],
    };
    search.dist[from.index()] = 0.0;

    // Min-heap: (cost, node). Secondary key NodeIdx ensures deterministic
    // tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeIdx)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if search.settled[node.index()] {
            continue;
        }
        search.settled[node.index()] = true;
        if stop(node) {
            break;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_target(edge);
            if search.settled[neighbor.index()] {
                continue;
            }
            let new_cost = cost + network.segment_at(edge).weight();
            if new_cost < search.dist[neighbor.index()] {
                search.dist[neighbor.index()] = new_cost;
                search.prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    search
}
