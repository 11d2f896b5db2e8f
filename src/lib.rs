//! # Egg Hunt Server
//!
//! Timed egg hunt minigame for voxel building game servers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EGG HUNT SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives                           │
//! │  ├── location.rs - Object coordinates and extents            │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── time.rs     - Wall clock and m:ss formatting            │
//! │                                                              │
//! │  game/           - Round engine (deterministic)              │
//! │  ├── config.rs   - Round parameters, hunt amount             │
//! │  ├── state.rs    - Round state and tallies                   │
//! │  ├── round.rs    - Round state machine and timers            │
//! │  ├── leaderboard.rs - Competition ranking                    │
//! │  ├── messages.rs - Chat text                                 │
//! │  └── effects.rs  - World/chat requests                       │
//! │                                                              │
//! │  world/          - Save data and template scan               │
//! │                                                              │
//! │  service/        - I/O (non-deterministic)                   │
//! │  ├── settings.rs - File + env configuration                  │
//! │  ├── store.rs    - Candidate persistence                     │
//! │  ├── protocol.rs - Host messages                             │
//! │  ├── command.rs  - Chat subcommands                          │
//! │  ├── scheduler.rs- Tokio timers                              │
//! │  └── runtime.rs  - Service event loop                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules never read the clock or spawn anything:
//! - Handlers take the current time as an argument
//! - Timers go through the [`game::Scheduler`] trait
//! - No HashMap (BTreeMap/BTreeSet for sorted iteration)
//! - All randomness from a Xorshift128+ seeded per round
//!
//! Given the same session seed, the same candidates and the same sequence of
//! calls, a round places the same objects and produces the same messages.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod world;
pub mod service;

// Re-export commonly used types
pub use core::location::{ObjectLocation, Extent};
pub use core::rng::DeterministicRng;
pub use game::config::{RoundConfig, resolve_hunt_amount};
pub use game::round::{RoundMachine, Scheduler, TimerKind};
pub use game::state::{PlayerId, RoundPhase};
pub use service::{HuntService, HuntSettings};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
