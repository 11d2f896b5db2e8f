//! World Model
//!
//! Save-data types exchanged with the world collaborator and the template
//! scan that turns a save into a candidate set.

pub mod save;

pub use save::{SaveData, Brick, BrickColor, TemplateSignature, ScanError, scan_candidates};
