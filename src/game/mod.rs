//! Round Engine
//!
//! The egg hunt round: configuration, state, scoring and lifecycle.
//! Deterministic given a seed and the clock values handlers are called with.
//!
//! ## Module Structure
//!
//! - `config`: Round parameters and hunt-amount resolution
//! - `state`: Round state and player identifiers
//! - `round`: The round state machine and its timers
//! - `leaderboard`: Competition ranking
//! - `messages`: Broadcast and whisper text
//! - `effects`: World and chat requests produced by the machine

pub mod config;
pub mod state;
pub mod round;
pub mod leaderboard;
pub mod messages;
pub mod effects;

// Re-export key types
pub use config::{RoundConfig, resolve_hunt_amount};
pub use state::{RoundState, RoundPhase, PlayerId, PlayerTally};
pub use round::{RoundMachine, RoundSnapshot, Scheduler, TimerKind, EndReason};
pub use leaderboard::{rank, Standing};
pub use effects::{Effect, PlacedObject, Appearance};
