//! Hunt Settings
//!
//! Operator configuration, read from a JSON file and overridden by
//! `EGG_HUNT_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::location::{Extent, LocationParseError, ObjectLocation};
use crate::game::config::RoundConfig;
use crate::game::state::PlayerId;
use crate::world::save::TemplateSignature;

/// A player allowed to run hunt commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Player id.
    pub id: PlayerId,
    /// Display name (informational only).
    #[serde(default)]
    pub name: String,
}

/// Operator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntSettings {
    /// Brick asset used for hunt and template objects.
    pub egg_asset: String,
    /// Object size as `"x,y,z"`; empty means zero.
    pub egg_size: String,
    /// Absolute object count, or a fraction of the candidates when below 1.
    pub amount: f64,
    /// Round length (seconds).
    pub game_length_secs: u64,
    /// Status broadcast interval (seconds). 0 disables status broadcasts.
    pub status_interval_secs: u64,
    /// Delay before the next round starts on its own (seconds). 0 disables.
    pub autorestart_delay_secs: u64,
    /// Players allowed to run commands besides the host.
    pub auth: Vec<AuthorizedUser>,
    /// Where the candidate set is persisted.
    pub storage_path: PathBuf,
    /// Broadcast results when a round is force-stopped.
    pub announce_forced_results: bool,
    /// Fixed session seed; derived from the clock when absent.
    pub rng_seed: Option<u64>,
}

impl Default for HuntSettings {
    fn default() -> Self {
        Self {
            egg_asset: "PB_DefaultMicroBrick".to_string(),
            egg_size: "5,5,6".to_string(),
            amount: 0.5,
            game_length_secs: 300,
            status_interval_secs: 30,
            autorestart_delay_secs: 0,
            auth: Vec::new(),
            storage_path: PathBuf::from("egg-hunt-store.json"),
            announce_forced_results: false,
            rng_seed: None,
        }
    }
}

/// Upper bound for every duration setting (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

fn bounded_secs(field: &'static str, secs: u64) -> Result<Duration, SettingsError> {
    if secs > MAX_DURATION_SECS {
        return Err(SettingsError::DurationTooLong { field, secs });
    }
    Ok(Duration::from_secs(secs))
}

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for [`HuntSettings`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// `egg_size` is malformed.
    #[error("invalid egg_size: {0}")]
    EggSize(#[from] LocationParseError),

    /// A duration setting is beyond [`MAX_DURATION_SECS`].
    #[error("{field} of {secs}s exceeds the {max}s limit", max = MAX_DURATION_SECS)]
    DurationTooLong {
        /// Setting name.
        field: &'static str,
        /// Offending value.
        secs: u64,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

impl HuntSettings {
    /// Read settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` (defaults when `None`), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|var| std::env::var(var).ok())?;
        settings.round_config(Vec::new())?;
        Ok(settings)
    }

    /// Apply `EGG_HUNT_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, SettingsError> {
            value.trim().parse().map_err(|_| SettingsError::Env { var, value })
        }

        if let Some(v) = lookup("EGG_HUNT_ASSET") {
            self.egg_asset = v;
        }
        if let Some(v) = lookup("EGG_HUNT_SIZE") {
            self.egg_size = v;
        }
        if let Some(v) = lookup("EGG_HUNT_AMOUNT") {
            self.amount = parsed("EGG_HUNT_AMOUNT", v)?;
        }
        if let Some(v) = lookup("EGG_HUNT_GAME_LENGTH") {
            self.game_length_secs = parsed("EGG_HUNT_GAME_LENGTH", v)?;
        }
        if let Some(v) = lookup("EGG_HUNT_STATUS_INTERVAL") {
            self.status_interval_secs = parsed("EGG_HUNT_STATUS_INTERVAL", v)?;
        }
        if let Some(v) = lookup("EGG_HUNT_AUTORESTART_DELAY") {
            self.autorestart_delay_secs = parsed("EGG_HUNT_AUTORESTART_DELAY", v)?;
        }
        if let Some(v) = lookup("EGG_HUNT_STORAGE") {
            self.storage_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("EGG_HUNT_SEED") {
            self.rng_seed = Some(parsed("EGG_HUNT_SEED", v)?);
        }
        if let Some(v) = lookup("EGG_HUNT_ANNOUNCE_FORCED") {
            self.announce_forced_results = v == "true" || v == "1";
        }
        Ok(())
    }

    /// Parsed object extent.
    pub fn object_extent(&self) -> Result<Extent, SettingsError> {
        Ok(self.egg_size.parse()?)
    }

    /// Round configuration for the given candidate set.
    pub fn round_config(&self, candidates: Vec<ObjectLocation>) -> Result<RoundConfig, SettingsError> {
        Ok(RoundConfig {
            candidates,
            object_extent: self.object_extent()?,
            hunt_fraction: self.amount,
            round_duration: bounded_secs("game_length_secs", self.game_length_secs)?,
            status_tick: bounded_secs("status_interval_secs", self.status_interval_secs)?,
            autorestart_delay: bounded_secs("autorestart_delay_secs", self.autorestart_delay_secs)?,
            announce_forced_results: self.announce_forced_results,
        })
    }

    /// Signature the `load` command scans for.
    pub fn template_signature(&self) -> Result<TemplateSignature, SettingsError> {
        Ok(TemplateSignature {
            asset: self.egg_asset.clone(),
            size: self.object_extent()?,
        })
    }

    /// May `player` run hunt commands? Hosts always may.
    pub fn is_authorized(&self, player: &PlayerId, is_host: bool) -> bool {
        is_host || self.auth.iter().any(|a| a.id == *player)
    }
}
