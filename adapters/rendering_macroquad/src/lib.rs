#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tilewalk.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

mod sprites;

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};
use tilewalk_core::InputCode;
use tilewalk_rendering::{DebugOverlay, FrameInput, Presentation, RenderingBackend, Scene};

use self::sprites::{SpriteAtlas, SpriteKey};

const DEFAULT_MANIFEST_PATH: &str = "assets/manifest.toml";
const OVERLAY_FONT_SIZE: f32 = 16.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Overrides the sprite manifest loaded at startup.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            manifest_path,
        } = self;

        let window_size = presentation.window_size();
        let Presentation {
            window_title,
            clear_color,
            scene,
            ..
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.width()).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.height()).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (atlas_init_sender, atlas_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = match SpriteAtlas::from_manifest_path(&manifest_path)
                .context("failed to initialise sprite atlas")
            {
                Ok(atlas) => atlas,
                Err(error) => {
                    let _ = atlas_init_sender.send(Err(error));
                    return;
                }
            };
            let player_sprite = sprite_atlas.dimensions(SpriteKey::Player);
            tracing::info!(
                sprites = sprite_atlas.texture_count(),
                sheet = ?sprite_atlas.dimensions(SpriteKey::Tiles),
                player = ?player_sprite,
                "assets_loaded"
            );
            let _ = atlas_init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    pressed: poll_pressed(),
                    player_sprite,
                };

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                if let Err(error) = draw_scene(&scene, &metrics, &sprite_atlas) {
                    tracing::error!(error = %error, "draw_failed");
                    break;
                }

                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                    }) = fps_counter.record_frame(frame_dt)
                    {
                        tracing::info!(
                            fps = per_second,
                            fps_10s = trailing_ten_seconds,
                            "frame_metrics"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        atlas_init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

/// Keyboard key polled for each movement code.
fn key_code(code: InputCode) -> KeyCode {
    match code {
        InputCode::ArrowRight => KeyCode::Right,
        InputCode::ArrowLeft => KeyCode::Left,
        InputCode::ArrowUp => KeyCode::Up,
        InputCode::ArrowDown => KeyCode::Down,
        InputCode::D => KeyCode::D,
        InputCode::A => KeyCode::A,
        InputCode::W => KeyCode::W,
        InputCode::S => KeyCode::S,
    }
}

fn poll_pressed() -> Vec<InputCode> {
    pressed_codes(is_key_down)
}

fn pressed_codes(mut is_down: impl FnMut(KeyCode) -> bool) -> Vec<InputCode> {
    InputCode::ALL
        .into_iter()
        .filter(|code| is_down(key_code(*code)))
        .collect()
}

/// Maps logical screen pixels onto the window, preserving aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let world_width = scene.screen.width() as f32;
        let world_height = scene.screen.height() as f32;
        let scale = if world_width == 0.0 || world_height == 0.0 {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let offset_x = ((screen_width - world_width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - world_height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, point: Vec2) -> MacroquadVec2 {
        MacroquadVec2::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    fn scaled(&self, width: f32, height: f32) -> MacroquadVec2 {
        MacroquadVec2::new(width * self.scale, height * self.scale)
    }
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics, atlas: &SpriteAtlas) -> Result<()> {
    draw_tiles(scene, metrics, atlas)?;
    if let Some(player) = scene.player {
        let size = atlas
            .dimensions(SpriteKey::Player)
            .context("player sprite missing from atlas")?;
        atlas.draw(
            SpriteKey::Player,
            metrics.to_screen(player.position),
            metrics.scaled(size.width() as f32, size.height() as f32),
        )?;
    }
    draw_overlay(&scene.overlay, metrics);
    Ok(())
}

fn draw_tiles(scene: &Scene, metrics: &SceneMetrics, atlas: &SpriteAtlas) -> Result<()> {
    let tile = scene.tile_grid.tile_size as f32;
    let dest_size = metrics.scaled(tile, tile);
    for blit in scene.tile_blits() {
        atlas.draw_region(
            SpriteKey::Tiles,
            metrics.to_screen(blit.destination),
            dest_size,
            Some(blit.source),
        )?;
    }
    Ok(())
}

fn draw_overlay(overlay: &DebugOverlay, metrics: &SceneMetrics) {
    let origin = metrics.to_screen(Vec2::ZERO);
    for (row, line) in overlay.lines().iter().enumerate() {
        let _ = macroquad::text::draw_text(
            line,
            origin.x + 2.0,
            origin.y + OVERLAY_FONT_SIZE * (row as f32 + 1.0),
            OVERLAY_FONT_SIZE,
            macroquad::color::WHITE,
        );
    }
}

fn to_macroquad_color(color: tilewalk_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
