//! Runtime configuration.
//!
//! Everything has a built-in default, so the viewer runs without a config
//! file. A TOML file only needs the keys it changes:
//!
//! ```toml
//! [timing]
//! tick_rate = 60
//!
//! [states.sleeping]
//! cadence = 40
//! background = "night.png"
//! ```

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::AnimationState;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base directory for relative asset paths. A relative value is resolved
    /// against the config file's directory.
    pub assets_dir: PathBuf,
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub sprite: SpriteConfig,
    pub states: StatesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            window: WindowConfig::default(),
            timing: TimingConfig::default(),
            sprite: SpriteConfig::default(),
            states: StatesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "State Machine Sprite Animation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_rate: 60 }
    }
}

impl TimingConfig {
    /// Seconds per tick.
    pub fn tick_period(&self) -> f64 {
        1.0 / f64::from(self.tick_rate.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub cell_width: u32,
    pub cell_height: u32,
    /// On-screen size = cell size * scale.
    pub scale: u32,
    /// Clear color for states without a background image.
    pub fill_color: [u8; 3],
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            cell_width: 30,
            cell_height: 30,
            scale: 10,
            fill_color: [50, 50, 50],
        }
    }
}

impl SpriteConfig {
    /// Size of the character on screen, in pixels.
    pub fn display_size(&self) -> (u32, u32) {
        (
            self.cell_width.saturating_mul(self.scale),
            self.cell_height.saturating_mul(self.scale),
        )
    }
}

/// Where a state's frames and background come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Sprite sheet for this state's strip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<PathBuf>,
    /// Use frame 0 of another state's strip instead of a sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_from: Option<AnimationState>,
    /// Background image; flat fill when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<PathBuf>,
    pub columns: u32,
    pub rows: u32,
    pub cadence: NonZeroU32,
    pub key: char,
}

impl StateConfig {
    fn strip(name: &str, cadence: u32, key: char) -> Self {
        Self {
            sheet: Some(PathBuf::from(format!("{name}.png"))),
            frames_from: None,
            background: Some(PathBuf::from(format!("{}_background.png", name.to_lowercase()))),
            columns: 3,
            rows: 2,
            cadence: NonZeroU32::new(cadence).unwrap_or(NonZeroU32::MIN),
            key,
        }
    }

    fn apply(&mut self, patch: StatePatch) {
        match (patch.sheet, patch.frames_from) {
            (Some(sheet), from) => {
                self.sheet = Some(sheet);
                self.frames_from = from;
            }
            (None, Some(from)) => {
                self.sheet = None;
                self.frames_from = Some(from);
            }
            (None, None) => {}
        }
        // An empty path switches the state to the flat fill.
        if let Some(bg) = patch.background {
            self.background = (!bg.as_os_str().is_empty()).then_some(bg);
        }
        if let Some(columns) = patch.columns {
            self.columns = columns;
        }
        if let Some(rows) = patch.rows {
            self.rows = rows;
        }
        if let Some(cadence) = patch.cadence {
            self.cadence = cadence;
        }
        if let Some(key) = patch.key {
            self.key = key;
        }
    }
}

/// Partial [`StateConfig`] as written in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatePatch {
    sheet: Option<PathBuf>,
    frames_from: Option<AnimationState>,
    background: Option<PathBuf>,
    columns: Option<u32>,
    rows: Option<u32>,
    cadence: Option<NonZeroU32>,
    key: Option<char>,
}

/// The per-state table. Deserializes from a partial map merged over the
/// defaults, so `[states.jumping] cadence = 7` keeps jumping's sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, StatePatch>")]
pub struct StatesConfig {
    pub idle: StateConfig,
    pub dancing: StateConfig,
    pub jumping: StateConfig,
    pub sleeping: StateConfig,
    pub celebrating: StateConfig,
}

impl Default for StatesConfig {
    fn default() -> Self {
        Self {
            idle: StateConfig {
                sheet: None,
                frames_from: Some(AnimationState::Dancing),
                background: None,
                columns: 1,
                rows: 1,
                cadence: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
                key: 'i',
            },
            dancing: StateConfig::strip("Dancing", 10, 'd'),
            jumping: StateConfig::strip("Jumping", 5, 'j'),
            sleeping: StateConfig::strip("Sleeping", 15, 's'),
            celebrating: StateConfig::strip("Celebrating", 10, 'c'),
        }
    }
}

impl TryFrom<BTreeMap<String, StatePatch>> for StatesConfig {
    type Error = String;

    fn try_from(patches: BTreeMap<String, StatePatch>) -> Result<Self, Self::Error> {
        let mut states = Self::default();
        for (name, patch) in patches {
            let state = AnimationState::from_name(&name)
                .ok_or_else(|| format!("unknown state `{name}`"))?;
            states.get_mut(state).apply(patch);
        }
        Ok(states)
    }
}

impl StatesConfig {
    pub fn get(&self, state: AnimationState) -> &StateConfig {
        match state {
            AnimationState::Idle => &self.idle,
            AnimationState::Dancing => &self.dancing,
            AnimationState::Jumping => &self.jumping,
            AnimationState::Sleeping => &self.sleeping,
            AnimationState::Celebrating => &self.celebrating,
        }
    }

    fn get_mut(&mut self, state: AnimationState) -> &mut StateConfig {
        match state {
            AnimationState::Idle => &mut self.idle,
            AnimationState::Dancing => &mut self.dancing,
            AnimationState::Jumping => &mut self.jumping,
            AnimationState::Sleeping => &mut self.sleeping,
            AnimationState::Celebrating => &mut self.celebrating,
        }
    }
}

impl Config {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.assets_dir.is_relative() {
            if let Some(dir) = path.parent() {
                config.assets_dir = dir.join(&config.assets_dir);
            }
        }

        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the animation table can't be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_rate == 0 {
            return Err(ConfigError::Zero("timing.tick_rate"));
        }
        if self.sprite.scale == 0 {
            return Err(ConfigError::Zero("sprite.scale"));
        }
        if self.sprite.cell_width == 0 || self.sprite.cell_height == 0 {
            return Err(ConfigError::Zero("sprite cell size"));
        }
        if self.sprite.cell_width.checked_mul(self.sprite.scale).is_none()
            || self.sprite.cell_height.checked_mul(self.sprite.scale).is_none()
        {
            return Err(ConfigError::Overflow("sprite cell size * scale"));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Zero("window size"));
        }

        let mut keys: BTreeMap<char, AnimationState> = BTreeMap::new();
        for state in AnimationState::ALL {
            let sc = self.states.get(state);
            match (&sc.sheet, sc.frames_from) {
                (Some(_), None) => {}
                (None, Some(target)) => {
                    if target == state || self.states.get(target).sheet.is_none() {
                        return Err(ConfigError::AliasWithoutSheet { state, target });
                    }
                }
                _ => return Err(ConfigError::FrameSource(state)),
            }

            let key = sc.key.to_ascii_lowercase();
            if let Some(first) = keys.insert(key, state) {
                return Err(ConfigError::DuplicateKey {
                    key,
                    first,
                    second: state,
                });
            }
        }
        Ok(())
    }

    /// Resolve an asset path against [`Config::assets_dir`].
    pub fn asset_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.assets_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(text: &str) -> Config {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.sprite.display_size(), (300, 300));
        assert_eq!(config.states.dancing.cadence.get(), 10);
        assert_eq!(config.states.idle.frames_from, Some(AnimationState::Dancing));
        assert!((config.timing.tick_period() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn state_patch_keeps_unmentioned_fields() {
        let config = parse(
            r#"
            [states.jumping]
            cadence = 9
            "#,
        );
        let jumping = &config.states.jumping;
        assert_eq!(jumping.cadence.get(), 9);
        assert_eq!(jumping.sheet.as_deref(), Some(Path::new("Jumping.png")));
        assert_eq!((jumping.columns, jumping.rows), (3, 2));
        assert_eq!(jumping.key, 'j');
        assert_eq!(config.states.sleeping, StatesConfig::default().sleeping);
    }

    #[test]
    fn idle_can_get_its_own_sheet() {
        let config = parse(
            r#"
            [states.idle]
            sheet = "Idle.png"
            columns = 2
            rows = 1
            "#,
        );
        assert_eq!(config.states.idle.frames_from, None);
        config.validate().unwrap();
    }

    #[test]
    fn empty_background_means_flat_fill() {
        let config = parse(
            r#"
            [states.sleeping]
            background = ""
            "#,
        );
        assert_eq!(config.states.sleeping.background, None);
    }

    #[test]
    fn zero_cadence_is_a_parse_error() {
        let err = toml::from_str::<Config>("[states.dancing]\ncadence = 0\n");
        assert!(err.is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[timing]\nfps = 30\n").is_err());
        assert!(toml::from_str::<Config>("[states.dancing]\nspeed = 3\n").is_err());
        assert!(toml::from_str::<Config>("[states.moonwalk]\ncadence = 3\n").is_err());
    }

    #[test]
    fn alias_must_point_at_a_sheet() {
        let config = parse(
            r#"
            [states.jumping]
            frames_from = "idle"
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AliasWithoutSheet {
                state: AnimationState::Jumping,
                target: AnimationState::Idle,
            })
        ));
    }

    #[test]
    fn duplicate_keys_are_rejected_case_insensitively() {
        let config = parse(
            r#"
            [states.jumping]
            key = "D"
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateKey {
                key: 'd',
                first: AnimationState::Dancing,
                second: AnimationState::Jumping,
            })
        ));
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let config = parse("[timing]\ntick_rate = 0\n");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero("timing.tick_rate"))
        ));
    }

    #[test]
    fn huge_scale_is_rejected() {
        let config = parse("[sprite]\nscale = 200000000\n");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Overflow("sprite cell size * scale"))
        ));
        assert_eq!(config.sprite.display_size(), (u32::MAX, u32::MAX));
    }

    #[test]
    fn printed_config_parses_back() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse(&text), Config::default());
    }

    #[test]
    fn load_resolves_assets_dir_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "assets_dir = \"sprites\"").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.assets_dir, dir.path().join("sprites"));
        assert_eq!(
            config.asset_path(Path::new("Dancing.png")),
            dir.path().join("sprites").join("Dancing.png")
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }
}
