//! Traffic model: time-varying congestion on segment weights.
//!
//! # Update rule
//!
//! For intensity `i`, every segment independently draws a multiplier
//! `m ~ U[0.8 i, 1.2 i]` and sets
//!
//! ```text
//! congestion_factor = m
//! weight            = base_travel_time * m
//! ```
//!
//! Every update overwrites all segments and bumps the network
//! [`Revision`], so results computed before the update can be recognised as
//! stale.  Updates need `&mut Network`; the borrow checker therefore
//! serialises them against in-flight path queries.

use fl_core::{FleetRng, Revision};

use crate::{Network, NetworkError, NetworkResult};

/// Lower bound of the multiplier band, as a fraction of intensity.
pub const BAND_LOW: f64 = 0.8;
/// Upper bound of the multiplier band, as a fraction of intensity.
pub const BAND_HIGH: f64 = 1.2;

impl Network {
    /// Redraw every segment's congestion factor for `intensity`.
    ///
    /// Intensity is nominally in `[1.0, 3.0]`: 1.0 is free flow, 2.5 and
    /// above is peak congestion.  Returns the new revision.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidIntensity`] unless `intensity` is finite and
    /// positive.  Nothing is changed on error.
    pub fn simulate_traffic(&mut self, intensity: f64, rng: &mut FleetRng) -> NetworkResult<Revision> {
        if !(intensity.is_finite() && intensity > 0.0) {
            return Err(NetworkError::InvalidIntensity(intensity));
        }
        let (low, high) = (intensity * BAND_LOW, intensity * BAND_HIGH);
        for seg in &mut self.segments {
            seg.set_congestion(rng.gen_range(low..=high));
        }
        self.revision = self.revision.next();
        log::debug!(
            "traffic update {}: intensity {intensity}, {} segments",
            self.revision,
            self.segments.len()
        );
        Ok(self.revision)
    }

    /// Restore free-flow weights (`congestion_factor = 1`).  Returns the new
    /// revision.
    pub fn reset_traffic(&mut self) -> Revision {
        for seg in &mut self.segments {
            seg.set_congestion(1.0);
        }
        self.revision = self.revision.next();
        self.revision
    }
}
