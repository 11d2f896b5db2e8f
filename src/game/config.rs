//! Round Configuration
//!
//! Static round parameters plus the candidate set every round draws from.

use std::time::Duration;

use crate::core::location::{ObjectLocation, Extent};

/// Default status broadcast interval.
pub const DEFAULT_STATUS_TICK: Duration = Duration::from_secs(30);

/// Parameters a round is started with.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    /// Full superset of object locations a round draws from.
    pub candidates: Vec<ObjectLocation>,
    /// Object size, for placement and for clearing found objects.
    pub object_extent: Extent,
    /// Absolute count, or a fraction of the candidates when below 1.
    pub hunt_fraction: f64,
    /// Hard deadline for a round.
    pub round_duration: Duration,
    /// Interval between status broadcasts.
    pub status_tick: Duration,
    /// Delay before the next round starts on its own. Zero disables.
    pub autorestart_delay: Duration,
    /// Broadcast the leaderboard even when a round is force-stopped.
    pub announce_forced_results: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            object_extent: Extent::ZERO,
            hunt_fraction: 1.0,
            round_duration: Duration::from_secs(300),
            status_tick: DEFAULT_STATUS_TICK,
            autorestart_delay: Duration::ZERO,
            announce_forced_results: false,
        }
    }
}

impl RoundConfig {
    /// Number of objects the next round will place.
    pub fn hunt_amount(&self) -> usize {
        resolve_hunt_amount(self.hunt_fraction, self.candidates.len())
    }

    /// Is auto-restart enabled?
    pub fn autorestart_enabled(&self) -> bool {
        !self.autorestart_delay.is_zero()
    }
}

/// Resolve how many objects a round places.
///
/// A `hunt_fraction` below 1 is a share of the candidates, rounded up;
/// anything else is an absolute count, capped at `candidate_count`.
/// The result is always within `0..=candidate_count`.
pub fn resolve_hunt_amount(hunt_fraction: f64, candidate_count: usize) -> usize {
    if hunt_fraction.is_nan() || hunt_fraction <= 0.0 {
        return 0;
    }

    let amount = if hunt_fraction < 1.0 {
        (hunt_fraction * candidate_count as f64).ceil()
    } else {
        hunt_fraction.floor()
    };

    // Float-to-int casts saturate, so oversized fractions clamp here.
    (amount as usize).min(candidate_count)
}
