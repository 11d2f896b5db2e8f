//! Round State Definitions
//!
//! The single mutable round entity and the identifiers it keys on.
//! Uses BTreeMap/BTreeSet so iteration order never depends on hashing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::location::ObjectLocation;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (the game's player UUID).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(Self)
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        self.0.to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Short hex form for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.as_bytes()[..4])
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Round lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// No round in progress, no timers armed.
    #[default]
    Idle,
    /// Objects placed, finds are being credited.
    Running,
    /// Round finished; an auto-restart may be pending.
    Ended,
}

// =============================================================================
// PLAYER TALLY
// =============================================================================

/// Per-player find record for the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    /// Display name as reported by the most recent find.
    pub name: String,
    /// Objects found this round.
    pub count: u32,
    /// Position of this player's first find in the round (ties keep this order).
    pub first_find: u32,
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// The mutable state of the current round.
///
/// Exactly one of these exists per hunt; only the round machine mutates it.
#[derive(Clone, Debug, Default)]
pub struct RoundState {
    /// Lifecycle phase.
    pub phase: RoundPhase,

    /// Sequence number, incremented on every round start.
    /// Timer firings carry the number they were armed for.
    pub round: u64,

    /// Candidate set captured when the round started; cleared at round end.
    pub candidates: Vec<ObjectLocation>,

    /// Locations placed for this round.
    pub active: BTreeSet<ObjectLocation>,

    /// Bonus ("golden") location, one of `active`.
    pub bonus: Option<ObjectLocation>,

    /// Player who found the bonus location.
    pub bonus_finder: Option<PlayerId>,

    /// Locations already claimed. Always a subset of `active`.
    pub found: BTreeSet<ObjectLocation>,

    /// Find counts keyed by player.
    pub tallies: BTreeMap<PlayerId, PlayerTally>,

    /// Wall-clock start of the round (ms since epoch).
    pub started_at_ms: u64,
}

impl RoundState {
    /// Objects still hidden.
    pub fn remaining(&self) -> usize {
        self.active.len() - self.found.len()
    }

    /// True once every active location has been found.
    pub fn is_complete(&self) -> bool {
        self.found.len() == self.active.len()
    }

    /// Is `location` part of the current round and not yet claimed?
    pub fn is_claimable(&self, location: &ObjectLocation) -> bool {
        self.phase == RoundPhase::Running
            && self.active.contains(location)
            && !self.found.contains(location)
    }

    /// Credit one find to `player`; returns the player's new count.
    pub fn credit(&mut self, player: PlayerId, name: &str) -> u32 {
        let next_order = self.tallies.len() as u32;
        let tally = self.tallies.entry(player).or_insert_with(|| PlayerTally {
            name: name.to_string(),
            count: 0,
            first_find: next_order,
        });
        tally.name = name.to_string();
        tally.count += 1;
        tally.count
    }

    /// Count for a single player (0 if they have found nothing).
    pub fn count_for(&self, player: &PlayerId) -> u32 {
        self.tallies.get(player).map(|t| t.count).unwrap_or(0)
    }

    /// Scores in first-find order.
    pub fn scores_in_find_order(&self) -> Vec<(PlayerId, u32)> {
        let mut entries: Vec<_> = self.tallies.iter()
            .map(|(id, t)| (t.first_find, *id, t.count))
            .collect();
        entries.sort_by_key(|(order, _, _)| *order);
        entries.into_iter().map(|(_, id, count)| (id, count)).collect()
    }

    /// Display name recorded for a player.
    pub fn name_of(&self, player: &PlayerId) -> Option<&str> {
        self.tallies.get(player).map(|t| t.name.as_str())
    }

    /// Drop all per-round progress. Keeps `round` and `candidates`.
    pub fn reset_progress(&mut self) {
        self.active.clear();
        self.found.clear();
        self.tallies.clear();
        self.bonus = None;
        self.bonus_finder = None;
        self.started_at_ms = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
