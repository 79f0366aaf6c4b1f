//! Static tile map data and its validation.

use serde::Deserialize;
use thiserror::Error;
use tilewalk_core::{ScreenSize, TileLayer};

/// Side length of a square tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 16;
/// Number of tile columns in the default spritesheet image.
pub const DEFAULT_SHEET_COLUMNS: u32 = 25;
/// Logical resolution of the demo screen.
pub const DEFAULT_SCREEN: ScreenSize = ScreenSize::new(240, 240);

const MAILBOX_COLUMNS: u32 = DEFAULT_SCREEN.width() / DEFAULT_TILE_SIZE;

#[rustfmt::skip]
const MAILBOX_GROUND: [u32; 225] = [
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 218, 243, 243, 243, 243, 243, 243, 243, 243, 243, 218, 243, 244, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 244, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 219, 243, 243, 243, 219, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
    243, 218, 243, 243, 243, 243, 243, 243, 243, 243, 243, 244, 243, 243, 243,
    243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243, 243,
];

#[rustfmt::skip]
const MAILBOX_OVERLAY: [u32; 225] = [
    0, 0, 0, 0, 0,   0,   0,   0,   0,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,  26,  27,  28,  29,  30,  31, 0, 0, 0, 0,
    0, 0, 0, 0, 0,  51,  52,  53,  54,  55,  56, 0, 0, 0, 0,
    0, 0, 0, 0, 0,  76,  77,  78,  79,  80,  81, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 101, 102, 103, 104, 105, 106, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 126, 127, 128, 129, 130, 131, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 303, 303, 245, 242, 303, 303, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,   0,   0, 245, 242,   0,   0, 0, 0, 0, 0,
];

#[rustfmt::skip]
const MAILBOX_SOLID: [u8; 225] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Per-cell flags marking which cells block movement.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SolidMask {
    cells: Vec<bool>,
}

impl SolidMask {
    /// Builds a mask from raw flags where `1` marks a solid cell.
    ///
    /// Any other value is treated as passable.
    #[must_use]
    pub fn from_flags(flags: &[u8]) -> Self {
        Self {
            cells: flags.iter().map(|flag| *flag == 1).collect(),
        }
    }

    /// Creates a mask with every cell passable.
    #[must_use]
    pub fn passable(len: usize) -> Self {
        Self {
            cells: vec![false; len],
        }
    }

    /// Number of cells covered by the mask.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the mask covers no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell is solid. Cells outside the mask are passable.
    #[must_use]
    pub fn is_solid(&self, cell: usize) -> bool {
        self.cells.get(cell).copied().unwrap_or(false)
    }

    /// Indices of every solid cell in row-major order.
    pub fn solid_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(cell, &solid)| solid.then_some(cell))
    }
}

/// Layout of the shared spritesheet image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    tile_size: u32,
    columns: u32,
}

impl SheetLayout {
    /// Side length of a sheet cell in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of cells in each row of the sheet image.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }
}

/// Validated tile map: layers, collision mask and grid geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    sheet: SheetLayout,
    screen_columns: u32,
    layers: Vec<TileLayer>,
    solid: SolidMask,
}

impl Level {
    /// Validates and assembles a level.
    ///
    /// Every layer must match the mask length; tile indices themselves are
    /// not checked against the sheet.
    pub fn new(
        tile_size: u32,
        sheet_columns: u32,
        screen_columns: u32,
        layers: Vec<TileLayer>,
        solid: SolidMask,
    ) -> Result<Self, LevelError> {
        if tile_size == 0 {
            return Err(LevelError::ZeroTileSize);
        }
        if sheet_columns == 0 {
            return Err(LevelError::ZeroSheetColumns);
        }
        if screen_columns == 0 {
            return Err(LevelError::ZeroScreenColumns);
        }
        if layers.is_empty() {
            return Err(LevelError::NoLayers);
        }

        let expected = solid.len();
        for (layer, tiles) in layers.iter().enumerate() {
            if tiles.len() != expected {
                return Err(LevelError::LayerLengthMismatch {
                    layer,
                    expected,
                    actual: tiles.len(),
                });
            }
        }

        Ok(Self {
            sheet: SheetLayout {
                tile_size,
                columns: sheet_columns,
            },
            screen_columns,
            layers,
            solid,
        })
    }

    /// Built-in mailbox scene: a grass field with a mailbox and a path.
    #[must_use]
    pub fn mailbox() -> Self {
        Self {
            sheet: SheetLayout {
                tile_size: DEFAULT_TILE_SIZE,
                columns: DEFAULT_SHEET_COLUMNS,
            },
            screen_columns: MAILBOX_COLUMNS,
            layers: vec![
                TileLayer::from_indices(&MAILBOX_GROUND),
                TileLayer::from_indices(&MAILBOX_OVERLAY),
            ],
            solid: SolidMask::from_flags(&MAILBOX_SOLID),
        }
    }

    /// Builds a level from a deserialized descriptor.
    pub fn from_descriptor(descriptor: LevelDescriptor) -> Result<Self, LevelError> {
        let LevelDescriptor {
            tile_size,
            sheet_columns,
            screen_columns,
            layers,
            solid,
        } = descriptor;
        let solid = match solid {
            Some(flags) => SolidMask::from_flags(&flags),
            None => SolidMask::passable(layers.first().map_or(0, TileLayer::len)),
        };
        Self::new(tile_size, sheet_columns, screen_columns, layers, solid)
    }

    /// Layout of the spritesheet referenced by the layers.
    #[must_use]
    pub const fn sheet(&self) -> SheetLayout {
        self.sheet
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.sheet.tile_size
    }

    /// Number of tile columns laid out across the screen.
    #[must_use]
    pub const fn screen_columns(&self) -> u32 {
        self.screen_columns
    }

    /// Tile layers in draw order.
    #[must_use]
    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// Collision mask parallel to the layers.
    #[must_use]
    pub fn solid(&self) -> &SolidMask {
        &self.solid
    }

    /// Number of cells in each layer.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.solid.len()
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::mailbox()
    }
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_sheet_columns() -> u32 {
    DEFAULT_SHEET_COLUMNS
}

fn default_screen_columns() -> u32 {
    MAILBOX_COLUMNS
}

/// Serialized level layout as stored in level files.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LevelDescriptor {
    /// Side length of a tile in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Number of tile columns in the spritesheet image.
    #[serde(default = "default_sheet_columns")]
    pub sheet_columns: u32,
    /// Number of tile columns laid out across the screen.
    #[serde(default = "default_screen_columns")]
    pub screen_columns: u32,
    /// Tile layers in draw order.
    pub layers: Vec<TileLayer>,
    /// Optional collision flags; `1` marks a solid cell.
    #[serde(default)]
    pub solid: Option<Vec<u8>>,
}

/// Reasons a level description may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// Tiles must have a positive size.
    #[error("tile size must be positive")]
    ZeroTileSize,
    /// The spritesheet must have at least one column.
    #[error("sheet column count must be positive")]
    ZeroSheetColumns,
    /// The screen must have at least one tile column.
    #[error("screen column count must be positive")]
    ZeroScreenColumns,
    /// A level needs at least one layer to draw.
    #[error("level contains no tile layers")]
    NoLayers,
    /// A layer does not cover the same cells as the collision mask.
    #[error("layer {layer} has {actual} cells but the collision mask has {expected}")]
    LayerLengthMismatch {
        /// Zero-based layer position.
        layer: usize,
        /// Cell count of the collision mask.
        expected: usize,
        /// Cell count of the offending layer.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_level_has_thirty_four_solid_cells() {
        let level = Level::mailbox();
        assert_eq!(level.cell_count(), 225);
        assert_eq!(level.solid().solid_cells().count(), 34);
        assert!(level.solid().is_solid(20));
        assert!(!level.solid().is_solid(97));
    }

    #[test]
    fn mask_treats_only_one_as_solid() {
        let mask = SolidMask::from_flags(&[0, 1, 2, 1]);
        assert_eq!(mask.solid_cells().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!mask.is_solid(10));
    }

    #[test]
    fn rejects_layer_length_mismatch() {
        let error = Level::new(
            16,
            25,
            2,
            vec![TileLayer::from_indices(&[1, 2, 3])],
            SolidMask::passable(4),
        )
        .expect_err("mismatched layer must be rejected");

        assert_eq!(
            error,
            LevelError::LayerLengthMismatch {
                layer: 0,
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn rejects_zero_geometry() {
        let layers = vec![TileLayer::from_indices(&[1])];
        assert_eq!(
            Level::new(0, 25, 1, layers.clone(), SolidMask::passable(1)),
            Err(LevelError::ZeroTileSize)
        );
        assert_eq!(
            Level::new(16, 0, 1, layers.clone(), SolidMask::passable(1)),
            Err(LevelError::ZeroSheetColumns)
        );
        assert_eq!(
            Level::new(16, 25, 0, layers, SolidMask::passable(1)),
            Err(LevelError::ZeroScreenColumns)
        );
        assert_eq!(
            Level::new(16, 25, 1, Vec::new(), SolidMask::passable(1)),
            Err(LevelError::NoLayers)
        );
    }

    #[test]
    fn accepts_indices_beyond_the_sheet() {
        let level = Level::new(
            16,
            25,
            1,
            vec![TileLayer::from_indices(&[u32::MAX])],
            SolidMask::passable(1),
        )
        .expect("tile indices are not validated");
        assert_eq!(level.layers()[0].get(0).map(|tile| tile.get()), Some(u32::MAX));
    }

    #[test]
    fn descriptor_without_mask_is_fully_passable() {
        let descriptor = LevelDescriptor {
            tile_size: 16,
            sheet_columns: 25,
            screen_columns: 2,
            layers: vec![TileLayer::from_indices(&[243, 243, 243, 243])],
            solid: None,
        };
        let level = Level::from_descriptor(descriptor).expect("valid descriptor");
        assert_eq!(level.solid().len(), 4);
        assert_eq!(level.solid().solid_cells().count(), 0);
    }
}
