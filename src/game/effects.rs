//! Round Effects
//!
//! Requests the round machine hands to its collaborators: world mutations
//! and chat output. Emitted in order and dispatched in that same order.

use serde::{Serialize, Deserialize};

use crate::core::location::{ObjectLocation, Extent};
use crate::game::state::PlayerId;

/// Number of colors in the hunt palette.
pub const PALETTE_SIZE: usize = 10;

/// Visual style of a placed hunt object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Appearance {
    /// Ordinary object, colored from the hunt palette.
    Palette {
        /// Index into the hunt palette.
        color_index: u8,
    },
    /// The bonus object: gold, metallic.
    Golden,
}

/// One object to instantiate in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Where the object goes.
    pub location: ObjectLocation,
    /// How it looks.
    pub appearance: Appearance,
}

/// A side effect requested by the round machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Place the round's objects.
    PlaceObjects {
        /// Objects to place; exactly one is `Golden` when non-empty.
        objects: Vec<PlacedObject>,
        /// Object size.
        extent: Extent,
    },

    /// Re-place the white template objects the candidate set is scanned from.
    PlaceTemplates {
        /// Candidate locations.
        locations: Vec<ObjectLocation>,
        /// Object size.
        extent: Extent,
        /// Player recorded as owner of the template objects.
        owner: PlayerId,
        /// Owner display name.
        owner_name: String,
    },

    /// Remove anything in the box around `center`. Idempotent.
    ClearRegion {
        /// Region center.
        center: ObjectLocation,
        /// Region half-size.
        extent: Extent,
    },

    /// Broadcast to every player.
    Announce {
        /// Message text.
        text: String,
    },

    /// Whisper to one player.
    Notify {
        /// Recipient.
        player: PlayerId,
        /// Message text.
        text: String,
    },
}

impl Effect {
    /// Broadcast effect.
    pub fn announce(text: impl Into<String>) -> Self {
        Effect::Announce { text: text.into() }
    }

    /// Whisper effect.
    pub fn notify(player: PlayerId, text: impl Into<String>) -> Self {
        Effect::Notify { player, text: text.into() }
    }

    /// Clear effect.
    pub fn clear(center: ObjectLocation, extent: Extent) -> Self {
        Effect::ClearRegion { center, extent }
    }
}
