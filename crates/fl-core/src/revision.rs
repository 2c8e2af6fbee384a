//! Weight-generation counter.
//!
//! Every traffic update overwrites all segment weights.  The network carries
//! a monotonically increasing `Revision` that is bumped on each such update,
//! and every query result is stamped with the revision it was computed
//! against.  A reader holding an older stamp knows its cost was computed
//! under a previous weight generation and must be re-issued.

use std::fmt;

/// A network weight-generation number.  Revision 0 is the freshly built
/// network with free-flow (or construction-time) weights.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Revision(pub u64);

impl Revision {
    pub const INITIAL: Revision = Revision(0);

    /// The revision following `self`.
    #[inline]
    pub fn next(self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
