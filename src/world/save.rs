//! World Save Data
//!
//! The subset of the world save format the hunt reads and writes: bricks with
//! an asset, size, color, material and position. Used to scan template
//! objects into a candidate set and to describe the objects a round places.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::location::{ObjectLocation, Extent};
use crate::game::effects::{Appearance, PlacedObject, PALETTE_SIZE};
use crate::game::state::PlayerId;

/// Only save format version the scanner understands.
pub const SUPPORTED_SAVE_VERSION: u16 = 10;

/// Template objects are white...
pub const TEMPLATE_COLOR: [u8; 3] = [255, 255, 255];
/// ...glowing...
pub const TEMPLATE_MATERIAL: &str = "BMC_Glow";
/// ...at this intensity.
pub const TEMPLATE_MATERIAL_INTENSITY: u32 = 10;

/// Pastel palette for ordinary hunt objects (sRGB + alpha). Converted with
/// [`linear_rgba`] before it goes into a save.
pub const HUNT_PALETTE: [[u8; 4]; PALETTE_SIZE] = [
    [253, 206, 222, 255],
    [158, 248, 223, 255],
    [255, 252, 184, 255],
    [252, 196, 112, 255],
    [119, 248, 253, 255],
    [224, 187, 228, 255],
    [149, 125, 173, 255],
    [210, 145, 188, 255],
    [254, 200, 216, 255],
    [255, 223, 211, 255],
];

/// Convert an sRGB color to the linear color space save palettes use.
/// Alpha is unchanged.
pub fn linear_rgba(rgba: [u8; 4]) -> [u8; 4] {
    fn channel(c: u8) -> u8 {
        let n = f64::from(c) / 255.0;
        let linear = if n <= 0.04045 {
            n / 12.92
        } else {
            ((n + 0.055) / 1.055).powf(2.4)
        };
        (linear * 255.0).round() as u8
    }
    [channel(rgba[0]), channel(rgba[1]), channel(rgba[2]), rgba[3]]
}

/// Color of the bonus object.
pub const GOLDEN_COLOR: [u8; 3] = [255, 200, 0];

/// Intensity for ordinary hunt objects.
pub const DEFAULT_MATERIAL_INTENSITY: u32 = 5;

/// Materials for placed hunt objects: ordinary, then bonus.
pub const HUNT_MATERIALS: [&str; 2] = ["BMC_Plastic", "BMC_Metallic"];

/// Brick color: palette index or inline RGB(A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrickColor {
    /// Index into `SaveData::colors`.
    Index(u32),
    /// Inline color; alpha, if present, is ignored.
    Rgb(Vec<u8>),
}

/// One brick in a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brick {
    /// Index into `SaveData::brick_assets`.
    pub asset_name_index: u32,
    /// Brick size.
    pub size: Extent,
    /// Brick center.
    pub position: ObjectLocation,
    /// Brick color.
    pub color: BrickColor,
    /// Index into `SaveData::materials`.
    #[serde(default)]
    pub material_index: u32,
    /// Material intensity.
    #[serde(default)]
    pub material_intensity: u32,
    /// 1-based index into `SaveData::brick_owners`; 0 is the public owner.
    #[serde(default)]
    pub owner_index: u32,
    /// Brick components, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub components: serde_json::Value,
}

/// Owner record for bricks in a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickOwner {
    /// Owner's player id.
    pub id: PlayerId,
    /// Owner's display name.
    pub name: String,
    /// Number of bricks owned.
    pub bricks: u32,
}

/// World save contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveData {
    /// Format version.
    pub version: u16,
    /// Asset names referenced by bricks.
    #[serde(default)]
    pub brick_assets: Vec<String>,
    /// Material names referenced by bricks.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Color palette referenced by bricks.
    #[serde(default)]
    pub colors: Vec<Vec<u8>>,
    /// Owners referenced by bricks.
    #[serde(default)]
    pub brick_owners: Vec<BrickOwner>,
    /// Bricks.
    #[serde(default)]
    pub bricks: Vec<Brick>,
}

impl SaveData {
    /// Save that places a round's hunt objects, each interactable.
    pub fn for_hunt_objects(objects: &[PlacedObject], extent: Extent, asset: &str) -> Self {
        let bricks = objects.iter()
            .map(|obj| {
                let (color, material_index, material_intensity) = match obj.appearance {
                    Appearance::Golden => (BrickColor::Rgb(GOLDEN_COLOR.to_vec()), 1, 0),
                    Appearance::Palette { color_index } => {
                        (BrickColor::Index(u32::from(color_index)), 0, DEFAULT_MATERIAL_INTENSITY)
                    }
                };
                Brick {
                    asset_name_index: 0,
                    size: extent,
                    position: obj.location,
                    color,
                    material_index,
                    material_intensity,
                    owner_index: 0,
                    components: serde_json::json!({
                        "BCD_Interact": { "bPlayInteractSound": true }
                    }),
                }
            })
            .collect();

        Self {
            version: SUPPORTED_SAVE_VERSION,
            brick_assets: vec![asset.to_string()],
            materials: HUNT_MATERIALS.iter().map(|m| m.to_string()).collect(),
            colors: HUNT_PALETTE.iter().map(|&c| linear_rgba(c).to_vec()).collect(),
            brick_owners: Vec::new(),
            bricks,
        }
    }

    /// Save that restores the white template objects a candidate set is
    /// scanned from, owned by `owner`.
    pub fn for_templates(
        locations: &[ObjectLocation],
        extent: Extent,
        asset: &str,
        owner: PlayerId,
        owner_name: &str,
    ) -> Self {
        let bricks = locations.iter()
            .map(|&position| Brick {
                asset_name_index: 0,
                size: extent,
                position,
                color: BrickColor::Rgb(TEMPLATE_COLOR.to_vec()),
                material_index: 0,
                material_intensity: TEMPLATE_MATERIAL_INTENSITY,
                owner_index: 1,
                components: serde_json::Value::Null,
            })
            .collect();

        Self {
            version: SUPPORTED_SAVE_VERSION,
            brick_assets: vec![asset.to_string()],
            materials: vec![TEMPLATE_MATERIAL.to_string()],
            colors: Vec::new(),
            brick_owners: vec![BrickOwner {
                id: owner,
                name: owner_name.to_string(),
                bricks: locations.len() as u32,
            }],
            bricks,
        }
    }
}

/// Reasons a save cannot be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Save format version other than [`SUPPORTED_SAVE_VERSION`].
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u16),
}

/// What a template object looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSignature {
    /// Brick asset name.
    pub asset: String,
    /// Brick size.
    pub size: Extent,
}

impl TemplateSignature {
    /// Does `brick` (from `save`) look like a template object?
    ///
    /// Indices that point past their table never match.
    pub fn matches(&self, save: &SaveData, brick: &Brick) -> bool {
        let asset = save.brick_assets.get(brick.asset_name_index as usize);
        let material = save.materials.get(brick.material_index as usize);
        let color = match &brick.color {
            BrickColor::Index(i) => save.colors.get(*i as usize).map(Vec::as_slice),
            BrickColor::Rgb(rgb) => Some(rgb.as_slice()),
        };

        asset == Some(&self.asset)
            && material.map(String::as_str) == Some(TEMPLATE_MATERIAL)
            && brick.material_intensity == TEMPLATE_MATERIAL_INTENSITY
            && color.is_some_and(|c| c.len() >= 3 && c[..3] == TEMPLATE_COLOR)
            && brick.size == self.size
    }
}

/// Collect the positions of every template object in a save.
pub fn scan_candidates(save: &SaveData, signature: &TemplateSignature) -> Result<Vec<ObjectLocation>, ScanError> {
    if save.version != SUPPORTED_SAVE_VERSION {
        return Err(ScanError::UnsupportedVersion(save.version));
    }

    Ok(save.bricks.iter()
        .filter(|b| signature.matches(save, b))
        .map(|b| b.position)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature() -> TemplateSignature {
        TemplateSignature {
            asset: "PB_DefaultMicroBrick".to_string(),
            size: Extent::new(5, 5, 6),
        }
    }

    fn template_brick(x: i32) -> Brick {
        Brick {
            asset_name_index: 0,
            size: Extent::new(5, 5, 6),
            position: ObjectLocation::new(x, 0, 6),
            color: BrickColor::Index(0),
            material_index: 1,
            material_intensity: TEMPLATE_MATERIAL_INTENSITY,
            owner_index: 0,
            components: serde_json::Value::Null,
        }
    }

    fn save(bricks: Vec<Brick>) -> SaveData {
        SaveData {
            version: SUPPORTED_SAVE_VERSION,
            brick_assets: vec!["PB_DefaultMicroBrick".into(), "PB_DefaultBrick".into()],
            materials: vec!["BMC_Plastic".into(), "BMC_Glow".into()],
            colors: vec![vec![255, 255, 255, 255], vec![10, 20, 30, 255]],
            brick_owners: Vec::new(),
            bricks,
        }
    }

    #[test]
    fn test_scan_finds_templates() {
        let save = save(vec![template_brick(0), template_brick(40)]);
        let found = scan_candidates(&save, &signature()).unwrap();
        assert_eq!(found, vec![ObjectLocation::new(0, 0, 6), ObjectLocation::new(40, 0, 6)]);
    }

    #[test]
    fn test_scan_rejects_non_templates() {
        let mut wrong_asset = template_brick(1);
        wrong_asset.asset_name_index = 1;
        let mut wrong_material = template_brick(2);
        wrong_material.material_index = 0;
        let mut wrong_intensity = template_brick(3);
        wrong_intensity.material_intensity = 5;
        let mut wrong_color = template_brick(4);
        wrong_color.color = BrickColor::Index(1);
        let mut wrong_size = template_brick(5);
        wrong_size.size = Extent::new(5, 5, 5);
        let mut dangling = template_brick(6);
        dangling.color = BrickColor::Index(42);

        let save = save(vec![
            wrong_asset, wrong_material, wrong_intensity, wrong_color, wrong_size, dangling,
        ]);
        assert!(scan_candidates(&save, &signature()).unwrap().is_empty());
    }

    #[test]
    fn test_inline_color() {
        let mut brick = template_brick(7);
        brick.color = BrickColor::Rgb(vec![255, 255, 255]);
        let save = save(vec![brick]);
        assert_eq!(scan_candidates(&save, &signature()).unwrap().len(), 1);
    }

    #[test]
    fn test_unsupported_version() {
        let mut save = save(vec![template_brick(0)]);
        save.version = 9;
        assert_eq!(
            scan_candidates(&save, &signature()),
            Err(ScanError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn test_save_json_shape() {
        let json = r#"{
            "version": 10,
            "brick_assets": ["PB_DefaultMicroBrick"],
            "materials": ["BMC_Glow"],
            "colors": [[255, 255, 255, 255]],
            "bricks": [
                {"asset_name_index": 0, "size": [5, 5, 6], "position": [1, 2, 3],
                 "color": 0, "material_index": 0, "material_intensity": 10},
                {"asset_name_index": 0, "size": [5, 5, 6], "position": [4, 5, 6],
                 "color": [255, 255, 255], "material_index": 0, "material_intensity": 10}
            ]
        }"#;
        let save: SaveData = serde_json::from_str(json).unwrap();
        let found = scan_candidates(&save, &signature()).unwrap();
        assert_eq!(found, vec![ObjectLocation::new(1, 2, 3), ObjectLocation::new(4, 5, 6)]);
    }

    #[test]
    fn test_linear_rgba() {
        assert_eq!(linear_rgba([0, 0, 0, 255]), [0, 0, 0, 255]);
        assert_eq!(linear_rgba([255, 255, 255, 128]), [255, 255, 255, 128]);
        assert_eq!(linear_rgba([10, 128, 253, 255]), [1, 55, 250, 255]);
        assert_eq!(linear_rgba(HUNT_PALETTE[0]), [250, 157, 186, 255]);
    }

    #[test]
    fn test_hunt_object_save() {
        let objects = [
            PlacedObject {
                location: ObjectLocation::new(0, 0, 6),
                appearance: Appearance::Palette { color_index: 3 },
            },
            PlacedObject {
                location: ObjectLocation::new(10, 0, 6),
                appearance: Appearance::Golden,
            },
        ];
        let save = SaveData::for_hunt_objects(&objects, Extent::new(5, 5, 6), "PB_DefaultMicroBrick");

        assert_eq!(save.colors.len(), PALETTE_SIZE);
        assert_eq!(save.colors[0], linear_rgba(HUNT_PALETTE[0]).to_vec());
        assert_eq!(save.bricks.len(), 2);
        assert_eq!(save.bricks[0].color, BrickColor::Index(3));
        assert_eq!(save.bricks[0].material_index, 0);
        assert_eq!(save.bricks[1].color, BrickColor::Rgb(GOLDEN_COLOR.to_vec()));
        assert_eq!(save.materials[save.bricks[1].material_index as usize], "BMC_Metallic");
        assert!(save.bricks.iter().all(|b| !b.components.is_null()));

        // Placed objects are never mistaken for templates.
        assert!(scan_candidates(&save, &signature()).unwrap().is_empty());
    }

    #[test]
    fn test_template_save_rescans_to_same_candidates() {
        let locations = vec![ObjectLocation::new(1, 2, 3), ObjectLocation::new(-4, 5, 6)];
        let owner = PlayerId::new([9; 16]);
        let save = SaveData::for_templates(&locations, Extent::new(5, 5, 6), "PB_DefaultMicroBrick", owner, "Builder");

        assert_eq!(save.brick_owners[0].bricks, 2);
        assert_eq!(scan_candidates(&save, &signature()).unwrap(), locations);
    }
}
