#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static collision registry for solid tiles and the player body.
//!
//! Geometry for solid tiles is registered once when the space is built and
//! stays fixed until the level changes. Each step re-syncs the player body
//! from the world and recomputes overlaps. Nothing here moves the player:
//! callers read contacts, they are never applied back to the world.

use std::time::Duration;

use glam::Vec2;
use tilewalk_core::Event;
use tilewalk_world::{query, Level, Player, World};

/// Collision type tag assigned to the player body.
pub const PLAYER_COLLISION_TYPE: u32 = 1;

/// Solver iterations requested for the space.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Surface response parameters attached to a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Restitution; zero means no bounce.
    pub elasticity: f32,
}

impl Material {
    /// Material used for solid tiles.
    pub const SOLID_TILE: Self = Self {
        friction: 1.0,
        elasticity: 0.0,
    };

    /// Material used for the player.
    pub const PLAYER: Self = Self {
        friction: 0.0,
        elasticity: 0.0,
    };
}

/// Axis-aligned box measured in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl Aabb {
    /// Creates a box from its top-left corner and size.
    #[must_use]
    pub fn from_origin_and_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Point inside or on the box closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Immovable box registered for one solid tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody {
    /// Row-major index of the tile cell.
    pub cell: usize,
    /// Screen-space bounds of the tile.
    pub bounds: Aabb,
    /// Surface parameters.
    pub material: Material,
}

/// Dynamic circle that follows the player sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBody {
    /// Centre of the circle in screen pixels.
    pub center: Vec2,
    /// Circle radius in pixels.
    pub radius: f32,
    /// Body mass.
    pub mass: f32,
    /// Moment of inertia; infinite so the body never rotates.
    pub moment: f32,
    /// Collision type tag.
    pub collision_type: u32,
    /// Surface parameters.
    pub material: Material,
}

/// Overlap between the player circle and one solid tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Row-major index of the solid tile.
    pub cell: usize,
    /// Closest point on the tile to the player centre.
    pub point: Vec2,
    /// How far the circle reaches into the tile.
    pub depth: f32,
}

/// Collision space holding the static tile geometry and the player body.
#[derive(Clone, Debug)]
pub struct CollisionSpace {
    statics: Vec<StaticBody>,
    player: PlayerBody,
    contacts: Vec<Contact>,
    iterations: u32,
    elapsed: Duration,
    steps: u64,
}

impl CollisionSpace {
    /// Builds the space for the world's level and syncs the player body.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let level = query::level(world);
        let player = query::player(world);
        let mut space = Self {
            statics: static_bodies(level),
            player: player_body(level.tile_size(), &player),
            contacts: Vec::new(),
            iterations: DEFAULT_ITERATIONS,
            elapsed: Duration::ZERO,
            steps: 0,
        };
        space.refresh_contacts();
        tracing::info!(
            static_bodies = space.statics.len(),
            iterations = space.iterations,
            "collision_space_built"
        );
        space
    }

    /// Replaces the static geometry after a level change.
    pub fn rebuild(&mut self, world: &World) {
        let level = query::level(world);
        self.statics = static_bodies(level);
        self.player = player_body(level.tile_size(), &query::player(world));
        self.refresh_contacts();
        tracing::debug!(
            static_bodies = self.statics.len(),
            "collision_space_rebuilt"
        );
    }

    /// Steps the space once for every tick reported in `events`.
    pub fn handle(&mut self, events: &[Event], world: &World) {
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                self.step(&query::player(world), *dt);
            }
        }
    }

    /// Advances the simulation clock by `dt` and recomputes contacts.
    pub fn step(&mut self, player: &Player, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.steps = self.steps.saturating_add(1);
        self.player.center = sprite_center(player);
        self.refresh_contacts();
    }

    /// Solver iterations the space was configured with.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Static bodies in row-major cell order.
    #[must_use]
    pub fn static_bodies(&self) -> &[StaticBody] {
        &self.statics
    }

    /// Number of registered static bodies.
    #[must_use]
    pub fn static_body_count(&self) -> usize {
        self.statics.len()
    }

    /// The player's dynamic body.
    #[must_use]
    pub const fn player_body(&self) -> &PlayerBody {
        &self.player
    }

    /// Contacts found by the most recent step.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Total simulated time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    fn refresh_contacts(&mut self) {
        let center = self.player.center;
        let radius = self.player.radius;
        self.contacts.clear();
        self.contacts
            .extend(self.statics.iter().filter_map(|body| {
                let point = body.bounds.closest_point(center);
                let distance = point.distance(center);
                (distance < radius).then(|| Contact {
                    cell: body.cell,
                    point,
                    depth: radius - distance,
                })
            }));
    }
}

fn static_bodies(level: &Level) -> Vec<StaticBody> {
    let tile = level.tile_size() as f32;
    let columns = level.screen_columns() as usize;
    level
        .solid()
        .solid_cells()
        .map(|cell| {
            let origin = Vec2::new((cell % columns) as f32 * tile, (cell / columns) as f32 * tile);
            StaticBody {
                cell,
                bounds: Aabb::from_origin_and_size(origin, Vec2::splat(tile)),
                material: Material::SOLID_TILE,
            }
        })
        .collect()
}

fn player_body(tile_size: u32, player: &Player) -> PlayerBody {
    PlayerBody {
        center: sprite_center(player),
        radius: tile_size as f32 / 2.0,
        mass: 1.0,
        moment: f32::INFINITY,
        collision_type: PLAYER_COLLISION_TYPE,
        material: Material::PLAYER,
    }
}

fn sprite_center(player: &Player) -> Vec2 {
    let position = player.position();
    let size = player.size();
    Vec2::new(
        position.x() + size.width() as f32 / 2.0,
        position.y() + size.height() as f32 / 2.0,
    )
}
