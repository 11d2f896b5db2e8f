//! Hunt Service
//!
//! Everything that touches the outside world: settings, candidate
//! persistence, the host protocol, chat commands, real timers, and the loop
//! that drives the round engine.
//!
//! ## Module Structure
//!
//! - `settings`: File and environment configuration
//! - `store`: JSON candidate store
//! - `protocol`: Host message types
//! - `command`: `egghunt` subcommand parsing
//! - `scheduler`: Tokio-backed round timers
//! - `runtime`: The service event loop

pub mod settings;
pub mod store;
pub mod protocol;
pub mod command;
pub mod scheduler;
pub mod runtime;

pub use settings::{HuntSettings, AuthorizedUser, SettingsError};
pub use store::{CandidateStore, StoreError};
pub use protocol::{Stimulus, Outbound, PlayerRef, ProtocolError};
pub use command::{HuntCommand, CommandError};
pub use scheduler::{TokioScheduler, TimerFired};
pub use runtime::{HuntService, ServiceError};
