//! Sub-network extraction.
//!
//! Map extracts are large and rarely strongly connected.  A service area is
//! carved out in two steps:
//!
//! 1. [`bfs_subgraph`] keeps a bounded breadth-first neighbourhood of a
//!    start location.
//! 2. [`largest_strongly_connected`] keeps the largest strongly connected
//!    component of that neighbourhood, so every location can reach every
//!    other one.
//!
//! Both return a new [`Network`] induced on the kept locations, with all
//! attributes (roles, demands, weights, revision) carried over.

use std::collections::VecDeque;

use fl_core::{EdgeIdx, LocationId, NodeIdx};

use crate::{Network, NetworkBuilder, NetworkResult};

/// Induced sub-network of the first `max_nodes` locations reached by a
/// breadth-first search from `start` along outgoing segments, visiting at
/// most `depth_limit` hops.
pub fn bfs_subgraph(
    network: &Network,
    start: LocationId,
    depth_limit: usize,
    max_nodes: usize,
) -> NetworkResult<Network> {
    let start = network.node_idx(start)?;
    let mut seen = vec![false; network.node_count()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([(start, 0usize)]);
    seen[start.index()] = true;

    while let Some((node, depth)) = queue.pop_front() {
        if order.len() == max_nodes {
            break;
        }
        order.push(node);
        if depth == depth_limit {
            continue;
        }
        for edge in network.out_edges(node) {
            let next = network.edge_target(edge);
            if !seen[next.index()] {
                seen[next.index()] = true;
                queue.push_back((next, depth + 1));
            }
        }
    }

    Ok(induced(network, &order))
}

/// Induced sub-network on the largest strongly connected component.
///
/// Ties are broken in favour of the component containing the location that
/// was inserted first.  An empty network yields an empty network.
pub fn largest_strongly_connected(network: &Network) -> Network {
    let components = strongly_connected_components(network);
    let best = components
        .into_iter()
        .max_by(|a, b| {
            a.len()
                .cmp(&b.len())
                // Prefer the smaller minimum index on equal size.
                .then_with(|| min_index(b).cmp(&min_index(a)))
        })
        .unwrap_or_default();
    let mut keep = best;
    keep.sort_unstable();
    induced(network, &keep)
}

fn min_index(component: &[NodeIdx]) -> NodeIdx {
    component.iter().copied().min().unwrap_or(NodeIdx::INVALID)
}

/// Tarjan's algorithm, iterative so deep road chains cannot overflow the
/// stack.  Returns components in reverse topological order.
pub fn strongly_connected_components(network: &Network) -> Vec<Vec<NodeIdx>> {
    const UNVISITED: u32 = u32::MAX;

    let n = network.node_count();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0u32; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<NodeIdx> = Vec::new();
    let mut components = Vec::new();
    let mut counter = 0u32;

    // Explicit call stack: (node, offset of the next outgoing edge to try).
    let mut frames: Vec<(NodeIdx, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        frames.push((NodeIdx(root as u32), 0));

        while let Some(&(node, offset)) = frames.last() {
            let v = node.index();
            if offset == 0 && index[v] == UNVISITED {
                index[v] = counter;
                lowlink[v] = counter;
                counter += 1;
                stack.push(node);
                on_stack[v] = true;
            }

            let first = network.node_out_start[v] as usize;
            let end = network.node_out_start[v + 1] as usize;
            if first + offset < end {
                if let Some(top) = frames.last_mut() {
                    top.1 += 1;
                }
                let w = network.edge_target(EdgeIdx((first + offset) as u32));
                if index[w.index()] == UNVISITED {
                    frames.push((w, 0));
                } else if on_stack[w.index()] {
                    lowlink[v] = lowlink[v].min(index[w.index()]);
                }
                continue;
            }

            // All edges done: pop the frame and propagate lowlink.
            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                let p = parent.index();
                lowlink[p] = lowlink[p].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w.index()] = false;
                    component.push(w);
                    if w == node {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

fn induced(network: &Network, keep: &[NodeIdx]) -> Network {
    // Kept nodes are renumbered densely in `keep` order.
    let mut new_idx = vec![NodeIdx::INVALID; network.node_count()];
    for (i, k) in keep.iter().enumerate() {
        new_idx[k.index()] = NodeIdx(i as u32);
    }

    let mut b = NetworkBuilder::with_capacity(keep.len(), keep.len() * 2)
        .with_revision(network.revision());
    for &k in keep {
        b.push_location_unchecked(network.location_at(k).clone());
    }
    for &k in keep {
        for edge in network.out_edges(k) {
            let to = new_idx[network.edge_target(edge).index()];
            if to != NodeIdx::INVALID {
                b.push_segment_unchecked(new_idx[k.index()], to, network.segment_at(edge).clone());
            }
        }
    }
    b.build()
}
