//! World Coordinates
//!
//! Integer voxel coordinates for hunt objects and the extent of the region
//! each object occupies.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A 3D integer coordinate identifying one hunt object.
///
/// Two locations are the same object if and only if all three coordinates
/// match. Serialized as a plain `[x, y, z]` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct ObjectLocation {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl ObjectLocation {
    /// Create a location from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinates as an array.
    #[inline]
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for ObjectLocation {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<ObjectLocation> for [i32; 3] {
    fn from(loc: ObjectLocation) -> Self {
        loc.to_array()
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Half-size of an object along each axis.
///
/// Used both when placing objects and as the bounding region cleared
/// around a found object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 3]", into = "[u32; 3]")]
pub struct Extent {
    /// Size along X.
    pub x: u32,
    /// Size along Y.
    pub y: u32,
    /// Size along Z.
    pub z: u32,
}

impl Extent {
    /// Zero extent.
    pub const ZERO: Extent = Extent::new(0, 0, 0);

    /// Create an extent.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Sizes as an array.
    #[inline]
    pub const fn to_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[u32; 3]> for Extent {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Extent> for [u32; 3] {
    fn from(e: Extent) -> Self {
        e.to_array()
    }
}

/// Failure to parse an `"x,y,z"` extent string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationParseError {
    /// Wrong number of comma-separated components.
    #[error("expected 3 components, got {0}")]
    ComponentCount(usize),
    /// A component was not a non-negative integer.
    #[error("invalid component {0:?}")]
    InvalidComponent(String),
}

impl FromStr for Extent {
    type Err = LocationParseError;

    /// Parses `"x,y,z"`. An empty (or all-whitespace) string is a zero extent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Extent::ZERO);
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(LocationParseError::ComponentCount(parts.len()));
        }

        let mut out = [0u32; 3];
        for (slot, part) in out.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| LocationParseError::InvalidComponent((*part).to_string()))?;
        }
        Ok(Extent::from(out))
    }
}
