//! Configuration for glyphfall.
//!
//! Settings live in `config.toml` under the platform config directory. Every
//! field has a default, so a partial file (or none at all) is fine.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use glyphfall_core::{GlyphfallError, Rgba};
use glyphfall_rain::{Alphabet, FieldConfig};
use glyphfall_reveal::{DEFAULT_MAX_TILT, DEFAULT_THRESHOLD, RevealTiming};
use serde::{Deserialize, Serialize};

/// Environment variable that forces reduced motion when set to a truthy value.
pub const REDUCE_MOTION_ENV: &str = "GLYPHFALL_REDUCE_MOTION";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] GlyphfallError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Skip animations in favour of their final state.
    pub reduce_motion: bool,
    /// Page content file; the built-in page is used when unset.
    pub content: Option<PathBuf>,
    /// Where to write logs; logging is off when unset.
    pub log_file: Option<PathBuf>,
    pub rain: RainSettings,
    pub reveal: RevealSettings,
}

/// Rain field settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainSettings {
    pub glyph_size: f32,
    pub alphabet: Alphabet,
    pub color: String,
    pub fade_color: String,
    pub fade_alpha: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub fps: u32,
    pub reset_chance: f32,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            glyph_size: 14.0,
            alphabet: Alphabet::Binary,
            color: "#00ff41".to_string(),
            fade_color: "#000000".to_string(),
            fade_alpha: 0.05,
            min_speed: 0.5,
            max_speed: 1.0,
            fps: 30,
            reset_chance: 0.025,
        }
    }
}

impl RainSettings {
    /// Build and validate the rain field parameters.
    pub fn to_field_config(&self) -> Result<FieldConfig, ConfigError> {
        let color = parse_color("rain.color", &self.color)?;
        let fade = parse_color("rain.fade_color", &self.fade_color)?.with_alpha(self.fade_alpha);

        let config = FieldConfig {
            glyph_size: self.glyph_size,
            alphabet: self.alphabet.glyphs(),
            color,
            fade,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            target_fps: self.fps,
            reset_chance: self.reset_chance,
            ..FieldConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Reveal, typewriter and tilt settings. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    pub threshold: f32,
    pub max_tilt: f32,
    pub typewriter_delay: u64,
    pub typewriter_speed: u64,
    pub scroll_typewriter_delay: u64,
    pub scroll_typewriter_speed: u64,
    pub hero_start_delay: u64,
    pub hero_speed: u64,
    pub hero_pause_full: u64,
    pub hero_pause_empty: u64,
    pub fade: u64,
    pub slide: u64,
    pub stagger: u64,
    pub stagger_step: u64,
    pub pulse: u64,
    pub pulse_period: u64,
    pub skill: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        let timing = RevealTiming::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_tilt: DEFAULT_MAX_TILT,
            typewriter_delay: timing.once_delay,
            typewriter_speed: timing.once_speed,
            scroll_typewriter_delay: timing.scroll_delay,
            scroll_typewriter_speed: timing.scroll_speed,
            hero_start_delay: timing.cycle_start_delay,
            hero_speed: 100,
            hero_pause_full: timing.cycle_pause_full,
            hero_pause_empty: timing.cycle_pause_empty,
            fade: timing.fade,
            slide: timing.slide,
            stagger: timing.stagger,
            stagger_step: timing.stagger_step,
            pulse: timing.pulse,
            pulse_period: timing.pulse_period,
            skill: timing.skill,
        }
    }
}

impl RevealSettings {
    pub fn to_timing(&self) -> RevealTiming {
        RevealTiming {
            once_delay: self.typewriter_delay,
            once_speed: self.typewriter_speed.max(1),
            scroll_delay: self.scroll_typewriter_delay,
            scroll_speed: self.scroll_typewriter_speed.max(1),
            cycle_start_delay: self.hero_start_delay,
            cycle_pause_full: self.hero_pause_full.max(1),
            cycle_pause_empty: self.hero_pause_empty.max(1),
            fade: self.fade,
            slide: self.slide,
            stagger: self.stagger,
            stagger_step: self.stagger_step,
            pulse: self.pulse,
            pulse_period: self.pulse_period,
            skill: self.skill,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(
                GlyphfallError::invalid_config("reveal.threshold must be within 0..=1").into(),
            );
        }
        if !(self.max_tilt >= 0.0 && self.max_tilt <= 90.0) {
            return Err(
                GlyphfallError::invalid_config("reveal.max_tilt must be within 0..=90").into(),
            );
        }
        Ok(())
    }
}

impl Config {
    /// Location of the config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "glyphfall").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from `path` or the default location. A missing file, or a
    /// platform without a config directory, yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no config directory available");
                Ok(Self::default())
            }
        }
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rain.to_field_config()?;
        self.reveal.validate()
    }

    /// Reduced-motion preference from config and environment.
    pub fn prefers_reduced_motion(&self) -> bool {
        self.reduce_motion || env_flag(std::env::var(REDUCE_MOTION_ENV).ok().as_deref())
    }
}

fn parse_color(field: &str, value: &str) -> Result<Rgba, ConfigError> {
    Rgba::from_hex(value).ok_or_else(|| {
        GlyphfallError::invalid_config(format!("{field}: {value:?} is not a hex colour")).into()
    })
}

fn env_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            reduce_motion = true

            [rain]
            fps = 24
            alphabet = "katakana"
            "#,
        )
        .unwrap();

        assert!(config.reduce_motion);
        assert_eq!(config.rain.fps, 24);
        assert_eq!(config.rain.alphabet, Alphabet::Katakana);
        assert_eq!(config.rain.glyph_size, 14.0);
        assert_eq!(config.reveal, RevealSettings::default());
    }

    #[test]
    fn field_config_carries_colours() {
        let field = RainSettings::default().to_field_config().unwrap();
        assert_eq!(field.color, Rgba::rgb(0, 255, 65));
        assert_eq!(field.fade, Rgba::BLACK.with_alpha(0.05));
        assert_eq!(field.alphabet, vec!['0', '1']);
        assert_eq!(field.target_fps, 30);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_toml_str("[rain]\ncolor = \"green\"").unwrap_err();
        assert!(err.to_string().contains("rain.color"));

        let err = Config::from_toml_str("[rain]\nmin_speed = 2.0\nmax_speed = 1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml_str("[reveal]\nthreshold = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(matches!(
            Config::from_toml_str("reduce_motion = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn timing_follows_settings() {
        let settings = RevealSettings {
            typewriter_speed: 0,
            hero_pause_full: 1500,
            hero_pause_empty: 0,
            ..RevealSettings::default()
        };
        let timing = settings.to_timing();
        assert_eq!(timing.once_speed, 1);
        assert_eq!(timing.cycle_pause_full, 1500);
        assert_eq!(timing.cycle_pause_empty, 1);
        assert_eq!(timing.scroll_delay, 300);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.rain.fps = 20;
        config.content = Some(PathBuf::from("page.toml"));
        config.save(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[rain]\nfps = 12").unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().rain.fps, 12);

        fs::write(&path, "[rain]\nfps = \"fast\"").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_flag_values() {
        assert!(env_flag(Some("1")));
        assert!(env_flag(Some(" TRUE ")));
        assert!(!env_flag(Some("0")));
        assert!(!env_flag(None));
    }
}
