use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::{
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use tilewalk_core::SpriteSize;
use tilewalk_rendering::SourceRect;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
pub(crate) const ALL_SPRITE_KEYS: [SpriteKey; 2] = [SpriteKey::Tiles, SpriteKey::Player];

/// Images named by the sprite manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SpriteKey {
    /// Spritesheet holding every tile, laid out on a square grid.
    Tiles,
    /// Player avatar.
    Player,
}

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Draws the whole sprite with its top-left corner at `position`.
    pub(crate) fn draw(
        &self,
        key: SpriteKey,
        position: MacroquadVec2,
        dest_size: MacroquadVec2,
    ) -> Result<()> {
        self.draw_region(key, position, dest_size, None)
    }

    /// Draws one region of the sprite, stretched to `dest_size`.
    pub(crate) fn draw_region(
        &self,
        key: SpriteKey,
        position: MacroquadVec2,
        dest_size: MacroquadVec2,
        source: Option<SourceRect>,
    ) -> Result<()> {
        let texture = self
            .texture(key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let draw_params = DrawTextureParams {
            dest_size: Some(dest_size),
            source: source.map(|region| {
                Rect::new(
                    region.x as f32,
                    region.y as f32,
                    region.width as f32,
                    region.height as f32,
                )
            }),
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(texture, position.x, position.y, WHITE, draw_params);
        Ok(())
    }

    /// Pixel dimensions of the provided sprite.
    #[must_use]
    pub(crate) fn dimensions(&self, key: SpriteKey) -> Option<SpriteSize> {
        self.texture(key)
            .map(|texture| SpriteSize::new(texture.width() as u32, texture.height() as u32))
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn texture(&self, key: SpriteKey) -> Option<Texture2D> {
        self.textures.get(&key).copied()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            if textures.insert(key, texture).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)?;
        if resolved.insert(key, base_path.join(relative_path)).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    let mut ordered = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key:?}");
        };
        ordered.push((key, path));
    }

    Ok(ordered)
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "Tiles" => Ok(SpriteKey::Tiles),
        "Player" => Ok(SpriteKey::Player),
        _ => bail!("unknown sprite key `{name}` in manifest"),
    }
}
