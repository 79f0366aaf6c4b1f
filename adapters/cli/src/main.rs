#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tilewalk demo.

mod game;
mod level;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tilewalk_rendering::{Color, Presentation, RenderingBackend};
use tilewalk_rendering_macroquad::MacroquadBackend;
use tilewalk_system_collision::CollisionSpace;
use tilewalk_system_movement::{BindingPolicy, Movement, DEFAULT_SPEED};
use tilewalk_world::{query, World, DEFAULT_SCREEN};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use self::game::{FixedClock, Game, Variant};

/// How held keys that share a direction combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Every held key moves the player.
    Additive,
    /// At most one step per direction per tick.
    PerDirection,
}

impl From<PolicyArg> for BindingPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Additive => Self::Additive,
            PolicyArg::PerDirection => Self::PerDirection,
        }
    }
}

/// Tile map demo with a keyboard-driven player.
#[derive(Debug, Parser)]
#[command(name = "tilewalk", version, about)]
struct Args {
    /// Program variant to run.
    #[arg(long, value_enum, default_value_t = Variant::Collision)]
    variant: Variant,

    /// How held keys that share a direction combine.
    #[arg(long, value_enum, default_value_t = PolicyArg::Additive)]
    binding_policy: PolicyArg,

    /// Sprite manifest naming the spritesheet and the player image.
    #[arg(long, default_value = "assets/manifest.toml")]
    manifest: PathBuf,

    /// Level file replacing the built-in mailbox scene.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Window pixels per logical pixel.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Simulation ticks per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    ticks_per_second: u32,

    /// Pixels moved per tick for each held key.
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: f32,

    /// Synchronise presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,

    /// Present frames as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,

    /// Log frame rate metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Window title; defaults to one matching the variant.
    #[arg(long)]
    title: Option<String>,
}

impl Args {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Tilewalk command-line interface.
fn main() {
    init_tracing();

    if let Err(err) = run(Args::parse()) {
        error!(error = %format_args!("{err:#}"), "startup_failed");
        std::process::exit(1);
    }
    info!("shutdown");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    let vsync = args.vsync_enabled();
    let Args {
        variant,
        binding_policy,
        manifest,
        level: level_path,
        scale,
        ticks_per_second,
        speed,
        show_fps,
        title,
        ..
    } = args;

    let level = level::load_level(level_path.as_deref())?;
    let world = World::with_level(level, DEFAULT_SCREEN);
    let mut scene = game::initial_scene(&world)?;
    let movement = Movement::new(binding_policy.into(), speed);
    let mut game = Game::new(variant, world, movement, FixedClock::new(ticks_per_second));
    game.populate_scene(&mut scene);

    info!(
        variant = ?variant,
        policy = ?binding_policy,
        ticks_per_second,
        player = ?query::player_position(game.world()),
        static_bodies = game.collision().map_or(0, CollisionSpace::static_body_count),
        "startup"
    );

    let title = title.unwrap_or_else(|| variant.default_title().to_owned());
    let presentation = Presentation::new(title, Color::BLACK, scale, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(vsync)
        .with_show_fps(show_fps)
        .with_manifest_path(manifest);

    backend.run(presentation, move |frame_dt, input, scene| {
        game.advance(frame_dt, &input);
        game.populate_scene(scene);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_settings() {
        let args = Args::try_parse_from(["tilewalk"]).expect("defaults parse");

        assert_eq!(args.variant, Variant::Collision);
        assert_eq!(args.binding_policy, PolicyArg::Additive);
        assert_eq!(args.scale, 2);
        assert_eq!(args.ticks_per_second, 60);
        assert_eq!(args.speed, 3.0);
        assert!(args.vsync_enabled());
        assert!(args.level.is_none());
        assert_eq!(args.manifest, PathBuf::from("assets/manifest.toml"));
    }

    #[test]
    fn variant_and_policy_flags_parse() {
        let args = Args::try_parse_from([
            "tilewalk",
            "--variant",
            "tiles",
            "--binding-policy",
            "per-direction",
        ])
        .expect("flags parse");

        assert_eq!(args.variant, Variant::Tiles);
        assert_eq!(
            BindingPolicy::from(args.binding_policy),
            BindingPolicy::PerDirection
        );
    }

    #[test]
    fn last_vsync_flag_wins() {
        let args =
            Args::try_parse_from(["tilewalk", "--vsync", "--no-vsync"]).expect("flags parse");
        assert!(!args.vsync_enabled());

        let args =
            Args::try_parse_from(["tilewalk", "--no-vsync", "--vsync"]).expect("flags parse");
        assert!(args.vsync_enabled());
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(Args::try_parse_from(["tilewalk", "--scale", "0"]).is_err());
        assert!(Args::try_parse_from(["tilewalk", "--ticks-per-second", "0"]).is_err());
    }
}
