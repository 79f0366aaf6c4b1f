#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilewalk demo.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume pressed-key snapshots and event streams and
//! respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Window title used when no override is configured.
pub const DEFAULT_WINDOW_TITLE: &str = "character collision";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Records the pixel dimensions of the player sprite once its image is loaded.
    ConfigurePlayerSprite {
        /// Width and height of the sprite's bounding box.
        size: SpriteSize,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves the player by the summed per-frame delta, then clamps it to the screen.
    MovePlayer {
        /// Offset requested by the movement system for this frame.
        delta: PixelDelta,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Number of ticks processed so far, including this one.
        tick: u64,
    },
    /// Confirms that the player sprite dimensions changed.
    PlayerSpriteConfigured {
        /// Dimensions now used for boundary clamping.
        size: SpriteSize,
    },
    /// Reports the outcome of a movement request.
    PlayerMoved {
        /// Position before the delta was applied.
        from: PixelPosition,
        /// Position after the delta was applied but before clamping.
        requested: PixelPosition,
        /// Position after clamping to the screen rectangle.
        to: PixelPosition,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y coordinates.
    Up,
    /// Movement toward increasing y coordinates.
    Down,
    /// Movement toward decreasing x coordinates.
    Left,
    /// Movement toward increasing x coordinates.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Offset of a single step of `distance` pixels in this direction.
    #[must_use]
    pub fn delta(self, distance: f32) -> PixelDelta {
        match self {
            Self::Up => PixelDelta::new(0.0, -distance),
            Self::Down => PixelDelta::new(0.0, distance),
            Self::Left => PixelDelta::new(-distance, 0.0),
            Self::Right => PixelDelta::new(distance, 0.0),
        }
    }
}

/// Keyboard codes recognised by the movement system.
///
/// Each direction has two equivalent bindings: an arrow key and a letter key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputCode {
    /// Right arrow.
    ArrowRight,
    /// Left arrow.
    ArrowLeft,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// `D`, alias for [`InputCode::ArrowRight`].
    D,
    /// `A`, alias for [`InputCode::ArrowLeft`].
    A,
    /// `W`, alias for [`InputCode::ArrowUp`].
    W,
    /// `S`, alias for [`InputCode::ArrowDown`].
    S,
}

impl InputCode {
    /// Every recognised code in the order adapters poll them.
    pub const ALL: [InputCode; 8] = [
        InputCode::ArrowRight,
        InputCode::ArrowLeft,
        InputCode::ArrowUp,
        InputCode::ArrowDown,
        InputCode::D,
        InputCode::A,
        InputCode::W,
        InputCode::S,
    ];

    /// Direction bound to the code.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::ArrowRight | Self::D => Direction::Right,
            Self::ArrowLeft | Self::A => Direction::Left,
            Self::ArrowUp | Self::W => Direction::Up,
            Self::ArrowDown | Self::S => Direction::Down,
        }
    }
}

/// Top-left corner of a bounding box measured in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPosition {
    x: f32,
    y: f32,
}

impl PixelPosition {
    /// The screen origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in pixels.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in pixels.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position shifted by `delta`.
    #[must_use]
    pub fn offset(self, delta: PixelDelta) -> Self {
        Self::new(self.x + delta.dx(), self.y + delta.dy())
    }
}

/// Relative movement measured in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelDelta {
    dx: f32,
    dy: f32,
}

impl PixelDelta {
    /// A delta that leaves positions unchanged.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new delta.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }

    /// Component-wise sum of two deltas.
    #[must_use]
    pub fn plus(self, other: PixelDelta) -> Self {
        Self::new(self.dx + other.dx, self.dy + other.dy)
    }
}

/// Pixel dimensions of a sprite image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteSize {
    width: u32,
    height: u32,
}

impl SpriteSize {
    /// Creates a new sprite size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Sprite width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Sprite height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Logical resolution of the visible screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenSize {
    width: u32,
    height: u32,
}

impl ScreenSize {
    /// Creates a new screen size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Screen width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Screen height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Index of a cell within the spritesheet.
///
/// Any value is accepted; indices beyond the sheet simply address pixels
/// outside the image.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileIndex(u32);

impl TileIndex {
    /// Creates a new tile index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Row-major grid of spritesheet indices composited as one visual plane.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileLayer {
    tiles: Vec<TileIndex>,
}

impl TileLayer {
    /// Creates a layer from the provided indices.
    #[must_use]
    pub fn new(tiles: Vec<TileIndex>) -> Self {
        Self { tiles }
    }

    /// Creates a layer from raw numeric indices.
    #[must_use]
    pub fn from_indices(indices: &[u32]) -> Self {
        Self::new(indices.iter().copied().map(TileIndex::new).collect())
    }

    /// Number of cells in the layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the layer holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile stored at the provided cell, if the cell exists.
    #[must_use]
    pub fn get(&self, cell: usize) -> Option<TileIndex> {
        self.tiles.get(cell).copied()
    }

    /// Iterator over the cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.tiles.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Direction, InputCode, PixelDelta, PixelPosition, ScreenSize, SpriteSize, TileIndex,
        TileLayer,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn every_code_maps_to_a_direction_twice() {
        for direction in Direction::ALL {
            let bindings = InputCode::ALL
                .iter()
                .filter(|code| code.direction() == direction)
                .count();
            assert_eq!(bindings, 2, "{direction:?} should have two bindings");
        }
    }

    #[test]
    fn direction_deltas_follow_screen_axes() {
        assert_eq!(Direction::Right.delta(3.0), PixelDelta::new(3.0, 0.0));
        assert_eq!(Direction::Left.delta(3.0), PixelDelta::new(-3.0, 0.0));
        assert_eq!(Direction::Up.delta(3.0), PixelDelta::new(0.0, -3.0));
        assert_eq!(Direction::Down.delta(3.0), PixelDelta::new(0.0, 3.0));
    }

    #[test]
    fn offset_applies_both_components() {
        let moved = PixelPosition::new(100.0, 100.0)
            .offset(Direction::Right.delta(3.0).plus(Direction::Up.delta(3.0)));
        assert_eq!(moved, PixelPosition::new(103.0, 97.0));
    }

    #[test]
    fn tile_layer_preserves_row_major_order() {
        let layer = TileLayer::from_indices(&[243, 218, 0, 303]);
        let collected: Vec<u32> = layer.iter().map(|tile| tile.get()).collect();
        assert_eq!(collected, vec![243, 218, 0, 303]);
        assert_eq!(layer.get(3), Some(TileIndex::new(303)));
        assert_eq!(layer.get(4), None);
    }

    #[test]
    fn input_code_round_trips_through_bincode() {
        assert_round_trip(&InputCode::W);
    }

    #[test]
    fn tile_layer_round_trips_through_bincode() {
        assert_round_trip(&TileLayer::from_indices(&[26, 27, 28]));
    }

    #[test]
    fn sizes_round_trip_through_bincode() {
        assert_round_trip(&SpriteSize::new(16, 16));
        assert_round_trip(&ScreenSize::new(240, 240));
    }
}
