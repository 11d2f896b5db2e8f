//! Core primitives.
//!
//! Coordinates, seeded randomness, and clock formatting shared by the round
//! engine and the service layer. Nothing here performs I/O.

pub mod location;
pub mod rng;
pub mod time;

// Re-export core types
pub use location::{ObjectLocation, Extent, LocationParseError};
pub use rng::DeterministicRng;
pub use time::time_format;
