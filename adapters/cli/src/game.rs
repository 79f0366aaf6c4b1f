use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use glam::Vec2;
use tilewalk_core::{Command, Event, SpriteSize};
use tilewalk_rendering::{
    DebugOverlay, FrameInput, PlayerPresentation, Scene, TileGridPresentation,
};
use tilewalk_system_collision::CollisionSpace;
use tilewalk_system_movement::Movement;
use tilewalk_world::{self as world, query, World};

/// Program variant selected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Variant {
    /// Player movement, screen clamp and the collision space.
    Collision,
    /// Player movement and screen clamp only.
    Clamp,
    /// Tile map only.
    Tiles,
}

impl Variant {
    pub(crate) const fn has_player(self) -> bool {
        !matches!(self, Self::Tiles)
    }

    pub(crate) const fn has_collision(self) -> bool {
        matches!(self, Self::Collision)
    }

    pub(crate) const fn default_title(self) -> &'static str {
        match self {
            Self::Collision | Self::Clamp => tilewalk_core::DEFAULT_WINDOW_TITLE,
            Self::Tiles => "Tiles (Ebiten Demo)",
        }
    }
}

/// Ticks scheduled for one rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StepPlan {
    pub(crate) ticks_to_run: u32,
    pub(crate) remaining_accumulator: Duration,
    pub(crate) dropped_backlog: Duration,
}

pub(crate) fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

pub(crate) fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

/// Fixed-timestep clock driving the world at a constant tick rate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedClock {
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
    max_frame_delta: Duration,
    accumulator: Duration,
}

impl FixedClock {
    pub(crate) const MAX_TICKS_PER_FRAME: u32 = 5;
    pub(crate) const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

    pub(crate) fn new(ticks_per_second: u32) -> Self {
        Self {
            fixed_dt: Duration::from_secs(1) / ticks_per_second.max(1),
            max_ticks_per_frame: Self::MAX_TICKS_PER_FRAME,
            max_frame_delta: Self::MAX_FRAME_DELTA,
            accumulator: Duration::ZERO,
        }
    }

    pub(crate) const fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let frame_dt = clamp_frame_delta(frame_dt, self.max_frame_delta);
        self.accumulator = self.accumulator.saturating_add(frame_dt);
        let plan = plan_sim_steps(self.accumulator, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = plan.remaining_accumulator;
        plan
    }
}

/// Measures how many ticks ran per second of wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TickRateMeter {
    elapsed: Duration,
    ticks: u32,
    rate: f32,
}

impl TickRateMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub(crate) fn record(&mut self, frame_dt: Duration, ticks: u32) -> f32 {
        self.elapsed += frame_dt;
        self.ticks = self.ticks.saturating_add(ticks);
        if self.elapsed >= Self::WINDOW {
            self.rate = self.ticks as f32 / self.elapsed.as_secs_f32();
            self.elapsed = Duration::ZERO;
            self.ticks = 0;
        }
        self.rate
    }

    pub(crate) const fn rate(&self) -> f32 {
        self.rate
    }
}

/// Owns the world and the systems, and drives them from rendered frames.
#[derive(Debug)]
pub(crate) struct Game {
    variant: Variant,
    world: World,
    movement: Movement,
    collision: Option<CollisionSpace>,
    clock: FixedClock,
    meter: TickRateMeter,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Game {
    pub(crate) fn new(variant: Variant, world: World, movement: Movement, clock: FixedClock) -> Self {
        let collision = variant
            .has_collision()
            .then(|| CollisionSpace::from_world(&world));
        Self {
            variant,
            world,
            movement,
            collision,
            clock,
            meter: TickRateMeter::default(),
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Runs the ticks owed for one rendered frame.
    pub(crate) fn advance(&mut self, frame_dt: Duration, input: &FrameInput) {
        if let Some(size) = input.player_sprite {
            self.configure_player_sprite(size);
        }

        let plan = self.clock.advance(frame_dt);
        for _ in 0..plan.ticks_to_run {
            self.tick(input);
        }
        if plan.dropped_backlog > Duration::ZERO {
            tracing::debug!(
                dropped_ms = plan.dropped_backlog.as_secs_f64() * 1_000.0,
                "tick_backlog_dropped"
            );
        }
        let _ = self.meter.record(frame_dt, plan.ticks_to_run);
    }

    /// Copies the world state into the scene drawn this frame.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let position = query::player_position(&self.world);
        let position = Vec2::new(position.x(), position.y());

        scene.player = self
            .variant
            .has_player()
            .then_some(PlayerPresentation { position });
        scene.overlay = DebugOverlay {
            ticks_per_second: self.meter.rate(),
            player_position: self.variant.has_collision().then_some(position),
        };
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn collision(&self) -> Option<&CollisionSpace> {
        self.collision.as_ref()
    }

    fn configure_player_sprite(&mut self, size: SpriteSize) {
        if query::player(&self.world).size() == size {
            return;
        }
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::ConfigurePlayerSprite { size },
            &mut self.events,
        );
    }

    fn tick(&mut self, input: &FrameInput) {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.clock.fixed_dt(),
            },
            &mut self.events,
        );

        if self.variant.has_player() {
            self.commands.clear();
            self.movement
                .handle(&self.events, &input.pressed, &mut self.commands);
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }

        if let Some(space) = self.collision.as_mut() {
            space.handle(&self.events, &self.world);
        }
    }
}

/// Builds the first scene for the world's level.
pub(crate) fn initial_scene(world: &World) -> Result<Scene> {
    let sheet = query::sheet_layout(world);
    let level = query::level(world);
    let tile_grid = TileGridPresentation::new(
        sheet.tile_size(),
        sheet.columns(),
        level.screen_columns(),
    )?;

    Ok(Scene::new(
        tile_grid,
        query::tile_layers(world).to_vec(),
        query::screen(world),
        None,
        DebugOverlay::default(),
    ))
}
