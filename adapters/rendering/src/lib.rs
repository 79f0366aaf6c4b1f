#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilewalk adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;
use tilewalk_core::{InputCode, ScreenSize, SpriteSize, TileIndex, TileLayer};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement codes held this frame, in the adapter's polling order.
    pub pressed: Vec<InputCode>,
    /// Dimensions of the loaded player sprite, once known.
    pub player_sprite: Option<SpriteSize>,
}

/// Region of the spritesheet copied for one tile, in sheet pixels.
///
/// Offsets are 64-bit so any tile index maps to a region without wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceRect {
    /// Left edge within the sheet.
    pub x: u64,
    /// Top edge within the sheet.
    pub y: u64,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

/// One draw call: copy `source` from the sheet to `destination` on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileBlit {
    /// Index of the layer the blit belongs to.
    pub layer: usize,
    /// Row-major cell index within the layer.
    pub cell: usize,
    /// Top-left corner on the logical screen.
    pub destination: Vec2,
    /// Region of the spritesheet to copy.
    pub source: SourceRect,
}

/// Grid geometry shared by the tile layers and the spritesheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGridPresentation {
    /// Side length of a tile in pixels.
    pub tile_size: u32,
    /// Number of cells in each row of the spritesheet.
    pub sheet_columns: u32,
    /// Number of tiles laid out across the screen.
    pub screen_columns: u32,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError`] when any dimension is zero.
    pub fn new(
        tile_size: u32,
        sheet_columns: u32,
        screen_columns: u32,
    ) -> Result<Self, RenderingError> {
        if tile_size == 0 {
            return Err(RenderingError::ZeroTileSize);
        }
        if sheet_columns == 0 {
            return Err(RenderingError::ZeroSheetColumns);
        }
        if screen_columns == 0 {
            return Err(RenderingError::ZeroScreenColumns);
        }

        Ok(Self {
            tile_size,
            sheet_columns,
            screen_columns,
        })
    }

    /// Region of the spritesheet holding the provided tile.
    ///
    /// Indices beyond the sheet are not rejected; they select whatever region
    /// the arithmetic lands on.
    #[must_use]
    pub const fn source_rect(&self, tile: TileIndex) -> SourceRect {
        let index = tile.get() as u64;
        let columns = self.sheet_columns as u64;
        let tile_size = self.tile_size as u64;
        SourceRect {
            x: (index % columns) * tile_size,
            y: (index / columns) * tile_size,
            width: self.tile_size,
            height: self.tile_size,
        }
    }

    /// Top-left screen position of the provided cell.
    #[must_use]
    pub fn destination(&self, cell: usize) -> Vec2 {
        let columns = self.screen_columns as usize;
        let tile = self.tile_size as f32;
        Vec2::new((cell % columns) as f32 * tile, (cell / columns) as f32 * tile)
    }

    /// Blits for every cell of every layer, in draw order.
    #[must_use]
    pub fn blits(&self, layers: &[TileLayer]) -> Vec<TileBlit> {
        layers
            .iter()
            .enumerate()
            .flat_map(|(layer, tiles)| {
                tiles.iter().enumerate().map(move |(cell, tile)| TileBlit {
                    layer,
                    cell,
                    destination: self.destination(cell),
                    source: self.source_rect(tile),
                })
            })
            .collect()
    }
}

/// Player sprite placement for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Top-left corner of the sprite on the logical screen.
    pub position: Vec2,
}

/// Text drawn in the top-left corner after everything else.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DebugOverlay {
    /// Measured ticks per second.
    pub ticks_per_second: f32,
    /// Player coordinates, shown when present.
    pub player_position: Option<Vec2>,
}

impl DebugOverlay {
    /// Lines of text to print, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("TPS: {:.2}", self.ticks_per_second)];
        if let Some(position) = self.player_position {
            lines.push(format!("PlayerX: {:.6}", position.x));
            lines.push(format!("PlayerY: {:.6}", position.y));
        }
        lines
    }
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid geometry for the layers.
    pub tile_grid: TileGridPresentation,
    /// Tile layers in draw order.
    pub layers: Vec<TileLayer>,
    /// Logical resolution of the screen.
    pub screen: ScreenSize,
    /// Player sprite placement; `None` hides the player.
    pub player: Option<PlayerPresentation>,
    /// Debug text drawn last.
    pub overlay: DebugOverlay,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tile_grid: TileGridPresentation,
        layers: Vec<TileLayer>,
        screen: ScreenSize,
        player: Option<PlayerPresentation>,
        overlay: DebugOverlay,
    ) -> Self {
        Self {
            tile_grid,
            layers,
            screen,
            player,
            overlay,
        }
    }

    /// Blits for all layers of the scene.
    #[must_use]
    pub fn tile_blits(&self) -> Vec<TileBlit> {
        self.tile_grid.blits(&self.layers)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Integer factor between logical and window pixels.
    pub scale: u32,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scale: u32, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scale: scale.max(1),
            scene,
        }
    }

    /// Initial window size in physical pixels, saturating at `u32::MAX`.
    #[must_use]
    pub const fn window_size(&self) -> ScreenSize {
        ScreenSize::new(
            self.scene.screen.width().saturating_mul(self.scale),
            self.scene.screen.height().saturating_mul(self.scale),
        )
    }
}

/// Rendering backend capable of presenting Tilewalk scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the input captured by the adapter, and may mutate the scene before it
    /// is drawn.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot load its assets.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// Tiles must cover at least one pixel.
    #[error("tile_size must be positive")]
    ZeroTileSize,
    /// The spritesheet must have at least one column.
    #[error("sheet_columns must be positive")]
    ZeroSheetColumns,
    /// The screen must have at least one tile column.
    #[error("screen_columns must be positive")]
    ZeroScreenColumns,
}
