//! Host Protocol
//!
//! Newline-delimited JSON spoken with the game host: inbound stimuli
//! (interactions and chat commands), outbound world and chat requests.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::location::{ObjectLocation, Extent};
use crate::game::effects::Effect;
use crate::game::state::PlayerId;
use crate::world::save::SaveData;

// =============================================================================
// HOST -> HUNT
// =============================================================================

/// A player as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
}

/// Messages from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stimulus {
    /// A player interacted with a world object.
    Interact {
        /// Who interacted.
        player: PlayerRef,
        /// Object position.
        position: ObjectLocation,
    },

    /// A player ran `egghunt <subcommand>`.
    Command {
        /// Who ran it.
        speaker: PlayerRef,
        /// Speaker is the server host.
        #[serde(default)]
        is_host: bool,
        /// Subcommand word; may be empty.
        #[serde(default)]
        subcommand: String,
        /// Current world save, attached by the host for `load`.
        #[serde(default)]
        save: Option<SaveData>,
    },

    /// The host is unloading the hunt.
    Shutdown,
}

// =============================================================================
// HUNT -> HOST
// =============================================================================

/// Requests to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Load bricks into the world.
    LoadSave {
        /// Bricks to load.
        save: SaveData,
        /// Suppress the host's own load notice.
        quiet: bool,
    },

    /// Clear bricks in a region.
    ClearRegion {
        /// Region center.
        center: ObjectLocation,
        /// Region half-size.
        extent: Extent,
    },

    /// Chat message to everyone.
    Broadcast {
        /// Message text.
        text: String,
    },

    /// Message to one player.
    Whisper {
        /// Recipient.
        player: PlayerId,
        /// Message text.
        text: String,
    },
}

impl Outbound {
    /// Translate a round effect into a host request. Objects are built from
    /// `asset`.
    pub fn from_effect(effect: Effect, asset: &str) -> Self {
        match effect {
            Effect::PlaceObjects { objects, extent } => Outbound::LoadSave {
                save: SaveData::for_hunt_objects(&objects, extent, asset),
                quiet: true,
            },
            Effect::PlaceTemplates { locations, extent, owner, owner_name } => Outbound::LoadSave {
                save: SaveData::for_templates(&locations, extent, asset, owner, &owner_name),
                quiet: true,
            },
            Effect::ClearRegion { center, extent } => Outbound::ClearRegion { center, extent },
            Effect::Announce { text } => Outbound::Broadcast { text },
            Effect::Notify { player, text } => Outbound::Whisper { player, text },
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Line is not a valid message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Stimulus {
    /// Parse one JSON line.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Outbound {
    /// Serialize to one JSON line (no trailing newline).
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}
