//! Image loading and state table construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::animation::{AnimationState, Background, StateAssets, StateTable, STATE_COUNT};
use crate::config::Config;
use crate::error::{AssetError, ConfigError, Error};
use crate::sprite::{extract, FrameSequence, ImageHandle, ImageId, SpriteSheet};

/// Decode an image file to RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgba8())
}

/// Every decoded image, addressed by [`ImageId`]. The renderer uploads one
/// texture per entry.
#[derive(Debug, Default)]
pub struct AssetStore {
    images: Vec<ImageHandle>,
    by_path: HashMap<PathBuf, ImageId>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the existing handle if it was loaded before.
    pub fn load(&mut self, path: &Path) -> Result<ImageHandle, AssetError> {
        if let Some(&id) = self.by_path.get(path) {
            return Ok(self.images[id.0].clone());
        }
        let pixels = load_image(path)?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        let handle = self.insert(pixels);
        self.by_path.insert(path.to_path_buf(), handle.id());
        Ok(handle)
    }

    /// Register an already-decoded image.
    pub fn insert(&mut self, pixels: RgbaImage) -> ImageHandle {
        let handle = ImageHandle::new(ImageId(self.images.len()), Arc::new(pixels));
        self.images.push(handle.clone());
        handle
    }

    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }
}

/// Load every sheet and background named in `config` and assemble the table.
pub fn build_state_table(config: &Config, store: &mut AssetStore) -> Result<StateTable, Error> {
    let cell_w = config.sprite.cell_width;
    let cell_h = config.sprite.cell_height;

    // Pass 1: states with their own sheet.
    let mut strips: [Option<FrameSequence>; STATE_COUNT] = Default::default();
    for state in AnimationState::ALL {
        let sc = config.states.get(state);
        let Some(sheet_path) = &sc.sheet else {
            continue;
        };
        let path = config.asset_path(sheet_path);
        let sheet = SpriteSheet::new(store.load(&path)?, &path);
        let frames = extract(&sheet, cell_w, cell_h, sc.columns, sc.rows)?;
        log::info!("{state}: {} frames from {}", frames.len(), path.display());
        strips[state.index()] = Some(frames);
    }

    // Pass 2: aliases and backgrounds.
    StateTable::from_fn(|state| {
        let sc = config.states.get(state);
        let frames = match (&strips[state.index()], sc.frames_from) {
            (Some(frames), _) => frames.clone(),
            (None, Some(target)) => match &strips[target.index()] {
                Some(source) => {
                    log::info!("{state}: frame 0 of {target}");
                    FrameSequence::single(source.first().clone())
                }
                None => return Err(ConfigError::AliasWithoutSheet { state, target }.into()),
            },
            (None, None) => return Err(ConfigError::FrameSource(state).into()),
        };

        let background = match &sc.background {
            Some(bg) => Background::Image(store.load(&config.asset_path(bg))?),
            None => Background::Fill(config.sprite.fill_color),
        };

        Ok(StateAssets {
            frames,
            background,
            cadence: sc.cadence,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Write a `w`x`h` PNG into `dir` and return its name.
    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255]));
        let path = dir.join(name);
        img.save(&path).unwrap();
        PathBuf::from(name)
    }

    fn config_in(dir: &Path) -> Config {
        Config {
            assets_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn write_default_assets(dir: &Path) {
        for name in ["Dancing", "Jumping", "Sleeping", "Celebrating"] {
            write_png(dir, &format!("{name}.png"), 90, 60);
            write_png(dir, &format!("{}_background.png", name.to_lowercase()), 8, 6);
        }
    }

    #[test]
    fn load_image_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_image(&missing) {
            Err(AssetError::Load { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_image_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(load_image(&path), Err(AssetError::Load { .. })));
    }

    #[test]
    fn store_dedups_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let name = write_png(dir.path(), "a.png", 4, 4);
        let path = dir.path().join(name);

        let mut store = AssetStore::new();
        let a = store.load(&path).unwrap();
        let b = store.load(&path).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(store.images().len(), 1);
    }

    #[test]
    fn builds_default_table() {
        let dir = tempfile::tempdir().unwrap();
        write_default_assets(dir.path());

        let mut store = AssetStore::new();
        let table = build_state_table(&config_in(dir.path()), &mut store).unwrap();

        assert_eq!(store.images().len(), 8);
        for (state, assets) in table.iter() {
            match state {
                AnimationState::Idle => {
                    assert_eq!(assets.frames.len(), 1);
                    assert!(matches!(assets.background, Background::Fill([50, 50, 50])));
                }
                _ => {
                    assert_eq!(assets.frames.len(), 6);
                    assert!(matches!(assets.background, Background::Image(_)));
                }
            }
        }

        let idle = &table.get(AnimationState::Idle).frames[0];
        let dance = &table.get(AnimationState::Dancing).frames[0];
        assert_eq!(idle.image_id(), dance.image_id());
        assert_eq!(idle.rect(), dance.rect());
    }

    #[test]
    fn missing_sheet_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_default_assets(dir.path());
        std::fs::remove_file(dir.path().join("Sleeping.png")).unwrap();

        let err = build_state_table(&config_in(dir.path()), &mut AssetStore::new()).unwrap_err();
        assert!(err.to_string().contains("Sleeping.png"), "{err}");
    }

    #[test]
    fn undersized_sheet_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_default_assets(dir.path());
        write_png(dir.path(), "Jumping.png", 60, 60);

        let err = build_state_table(&config_in(dir.path()), &mut AssetStore::new()).unwrap_err();
        assert!(matches!(err, Error::Asset(AssetError::Undersized { .. })));
    }
}
