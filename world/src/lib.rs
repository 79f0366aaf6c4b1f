#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Tilewalk.
//!
//! The [`World`] is constructed explicitly and handed to [`apply`] and the
//! [`query`] functions by reference; nothing about the game lives in a
//! process-wide global.

mod level;

use tilewalk_core::{Command, Event, PixelPosition, ScreenSize, SpriteSize};

pub use level::{
    Level, LevelDescriptor, LevelError, SheetLayout, SolidMask, DEFAULT_SCREEN,
    DEFAULT_SHEET_COLUMNS, DEFAULT_TILE_SIZE,
};

const DEFAULT_PLAYER_SIZE: SpriteSize = SpriteSize::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE);

/// Player avatar: top-left position plus the sprite's bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    position: PixelPosition,
    size: SpriteSize,
}

impl Player {
    /// Top-left corner of the sprite's bounding box.
    #[must_use]
    pub const fn position(&self) -> PixelPosition {
        self.position
    }

    /// Dimensions of the sprite used for clamping.
    #[must_use]
    pub const fn size(&self) -> SpriteSize {
        self.size
    }
}

/// Represents the authoritative Tilewalk world state.
#[derive(Debug)]
pub struct World {
    level: Level,
    screen: ScreenSize,
    player: Player,
    tick_index: u64,
}

impl World {
    /// Creates a world showing the built-in mailbox level on the default screen.
    #[must_use]
    pub fn new() -> Self {
        Self::with_level(Level::mailbox(), DEFAULT_SCREEN)
    }

    /// Creates a world for the provided level and screen.
    ///
    /// The player starts at the screen origin with a one-tile sprite until the
    /// adapter reports the real sprite size.
    #[must_use]
    pub fn with_level(level: Level, screen: ScreenSize) -> Self {
        let size = DEFAULT_PLAYER_SIZE;
        Self {
            level,
            screen,
            player: Player {
                position: clamp_to_screen(PixelPosition::ORIGIN, size, screen),
                size,
            },
            tick_index: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Constrains a sprite's top-left corner so its bounding box stays on screen.
///
/// The floor is applied before the ceiling, so a screen narrower than the
/// sprite pins it to `screen - sprite` (a negative coordinate).
#[must_use]
pub fn clamp_to_screen(
    position: PixelPosition,
    sprite: SpriteSize,
    screen: ScreenSize,
) -> PixelPosition {
    let max_x = screen.width() as f32 - sprite.width() as f32;
    let max_y = screen.height() as f32 - sprite.height() as f32;

    PixelPosition::new(
        position.x().max(0.0).min(max_x),
        position.y().max(0.0).min(max_y),
    )
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlayerSprite { size } => {
            world.player.size = size;
            world.player.position = clamp_to_screen(world.player.position, size, world.screen);
            out_events.push(Event::PlayerSpriteConfigured { size });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                dt,
                tick: world.tick_index,
            });
        }
        Command::MovePlayer { delta } => {
            let from = world.player.position;
            let requested = from.offset(delta);
            let to = clamp_to_screen(requested, world.player.size, world.screen);
            world.player.position = to;
            out_events.push(Event::PlayerMoved {
                from,
                requested,
                to,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilewalk_core::{PixelPosition, ScreenSize, TileLayer};

    use super::{Level, Player, SheetLayout, SolidMask, World};

    /// Provides read-only access to the level being shown.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Tile layers in draw order.
    #[must_use]
    pub fn tile_layers(world: &World) -> &[TileLayer] {
        world.level.layers()
    }

    /// Layout of the spritesheet the layers index into.
    #[must_use]
    pub fn sheet_layout(world: &World) -> SheetLayout {
        world.level.sheet()
    }

    /// Collision flags parallel to the tile layers.
    #[must_use]
    pub fn solid_mask(world: &World) -> &SolidMask {
        world.level.solid()
    }

    /// Logical screen resolution used for clamping.
    #[must_use]
    pub fn screen(world: &World) -> ScreenSize {
        world.screen
    }

    /// Snapshot of the player avatar.
    #[must_use]
    pub fn player(world: &World) -> Player {
        world.player
    }

    /// Current top-left position of the player sprite.
    #[must_use]
    pub fn player_position(world: &World) -> PixelPosition {
        world.player.position
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewalk_core::PixelDelta;

    const SPRITE: SpriteSize = SpriteSize::new(16, 16);

    #[test]
    fn clamp_keeps_positions_inside_screen() {
        let clamped = clamp_to_screen(PixelPosition::new(-3.0, 250.0), SPRITE, DEFAULT_SCREEN);
        assert_eq!(clamped, PixelPosition::new(0.0, 224.0));
    }

    #[test]
    fn clamp_is_idempotent() {
        let samples = [
            PixelPosition::new(-50.0, -50.0),
            PixelPosition::new(0.0, 0.0),
            PixelPosition::new(123.5, 17.25),
            PixelPosition::new(224.0, 224.0),
            PixelPosition::new(900.0, -1.0),
        ];
        for sample in samples {
            let once = clamp_to_screen(sample, SPRITE, DEFAULT_SCREEN);
            let twice = clamp_to_screen(once, SPRITE, DEFAULT_SCREEN);
            assert_eq!(once, twice, "clamp should be idempotent for {sample:?}");
        }
    }

    #[test]
    fn clamp_pins_oversized_sprite_towards_top_left() {
        let screen = ScreenSize::new(8, 8);
        let clamped = clamp_to_screen(PixelPosition::new(3.0, 3.0), SPRITE, screen);
        assert_eq!(clamped, PixelPosition::new(-8.0, -8.0));
        assert_eq!(clamp_to_screen(clamped, SPRITE, screen), clamped);
    }

    #[test]
    fn move_reports_requested_and_clamped_positions() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                delta: PixelDelta::new(-3.0, 0.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                from: PixelPosition::ORIGIN,
                requested: PixelPosition::new(-3.0, 0.0),
                to: PixelPosition::ORIGIN,
            }]
        );
    }

    #[test]
    fn configuring_a_larger_sprite_reclamps_the_player() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                delta: PixelDelta::new(500.0, 500.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ConfigurePlayerSprite {
                size: SpriteSize::new(40, 20),
            },
            &mut events,
        );

        assert_eq!(query::player_position(&world), PixelPosition::new(200.0, 220.0));
        assert_eq!(query::player(&world).size(), SpriteSize::new(40, 20));
    }
}
