//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tg_core::{Size, TimelineConfig};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the events file.
    pub events_path: PathBuf,

    /// Size of the simulated viewport.
    pub viewport: ViewportConfig,

    /// Grid geometry and gesture settings.
    pub timeline: TimelineConfig,
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Default: 1024.
    pub width: f64,
    /// Default: 768.
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

impl ViewportConfig {
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            events_path: data_dir.join("events.json"),
            viewport: ViewportConfig::default(),
            timeline: TimelineConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`, then
    /// `TG_*` environment variables. Nested keys use a double underscore, as
    /// in `TG_TIMELINE__HOUR_PIXEL_HEIGHT`.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TG_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tg.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tg"))
}

/// Returns the platform-specific data directory for tg.
///
/// On Linux: `~/.local/share/tg`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_tg() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tg");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_events() {
        let config = Config::default();
        assert_eq!(config.events_path, dirs_data_path().unwrap().join("events.json"));
        assert_eq!(config.timeline, TimelineConfig::default());
    }

    #[test]
    fn test_config_file_overrides_nested_timeline_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tg.toml");
        std::fs::write(
            &path,
            "events_path = \"/tmp/cal.json\"\n\
             \n\
             [viewport]\n\
             width = 640.0\n\
             \n\
             [timeline]\n\
             hour_pixel_height = 48.0\n\
             graduation_minutes = 15\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.events_path, PathBuf::from("/tmp/cal.json"));
        assert!((config.viewport.width - 640.0).abs() < f64::EPSILON);
        assert!((config.viewport.height - 768.0).abs() < f64::EPSILON);
        assert!((config.timeline.hour_pixel_height - 48.0).abs() < f64::EPSILON);
        assert_eq!(config.timeline.graduation_minutes, 15);
        assert!((config.timeline.day_column_pixel_width - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.viewport, ViewportConfig::default());
    }
}
