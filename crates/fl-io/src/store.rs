//! Rebuilding a network from stored records.

use fl_core::Revision;
use fl_network::{Network, NetworkBuilder};

use crate::row::{EdgeRow, NodeRow};
use crate::IoResult;

/// Build a network from rows through the validating builder.
pub(crate) fn rebuild(
    nodes: impl IntoIterator<Item = NodeRow>,
    edges: impl IntoIterator<Item = EdgeRow>,
    revision: Revision,
) -> IoResult<Network> {
    let mut b = NetworkBuilder::new().with_revision(revision);
    for node in nodes {
        b.insert_location(node.into_location())?;
    }
    for edge in edges {
        b.insert_segment(edge.into_segment()?)?;
    }
    Ok(b.build())
}
