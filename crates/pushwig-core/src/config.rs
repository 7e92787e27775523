//! Engine settings schema and loader
//!
//! Settings are stored as YAML. Default location: ~/.config/pushwig/settings.yaml
//!
//! The settings object is handed to the engine explicitly and reaches modes and
//! views only through the read-only context, never through a global.

use crate::modes::ModeId;
use crate::model::TrackKind;
use crate::views::ViewId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hold time after which a press becomes a long press (milliseconds)
    ///
    /// Controller families disagree on this value, so it is not hardcoded.
    pub long_press_ms: u64,

    /// Delay before the default mode and view are activated at startup
    pub startup_delay_ms: u64,

    /// Delay between a track bank scroll and re-selecting a track in the new window
    pub bank_settle_ms: u64,

    /// Delay between creating a track and inserting its favourite device
    pub device_insert_delay_ms: u64,

    /// Knob resolution
    pub knob_speed: KnobSpeed,

    /// Mode activated at startup
    pub default_mode: ModeId,

    /// View activated at startup
    pub default_view: ViewId,

    /// Favourite device per track kind
    pub favorites: Favorites,

    /// Long-pressing Mute latches mute chording until pressed again
    pub mute_lock_on_long_press: bool,

    /// Long-pressing Solo latches solo chording until pressed again
    pub solo_lock_on_long_press: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            long_press_ms: 400,
            startup_delay_ms: 100,
            bank_settle_ms: 75,
            device_insert_delay_ms: 300,
            knob_speed: KnobSpeed::default(),
            default_mode: ModeId::Track,
            default_view: ViewId::Play,
            favorites: Favorites::default(),
            mute_lock_on_long_press: true,
            solo_lock_on_long_press: true,
        }
    }
}

impl Settings {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn bank_settle(&self) -> Duration {
        Duration::from_millis(self.bank_settle_ms)
    }

    pub fn device_insert_delay(&self) -> Duration {
        Duration::from_millis(self.device_insert_delay_ms)
    }
}

/// Normalized value change per encoder step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobSpeed {
    /// Coarse resolution
    pub normal: f64,
    /// Fine resolution (slow modifier held)
    pub slow: f64,
}

impl Default for KnobSpeed {
    fn default() -> Self {
        Self {
            normal: 0.01,
            slow: 0.001,
        }
    }
}

impl KnobSpeed {
    /// Scale a raw encoder delta into a normalized value change
    pub fn scale(&self, delta: i32, slow: bool) -> f64 {
        let step = if slow { self.slow } else { self.normal };
        delta as f64 * step
    }
}

/// Favourite device names inserted into newly created tracks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Favorites {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl Favorites {
    /// Favourite for a track kind, if one is configured
    pub fn for_kind(&self, kind: TrackKind) -> Option<&str> {
        match kind {
            TrackKind::Instrument => self.instrument.as_deref(),
            TrackKind::Audio => self.audio.as_deref(),
            TrackKind::Effect => self.effect.as_deref(),
            TrackKind::Group | TrackKind::Master => None,
        }
    }
}

/// Get the default settings file path
///
/// Returns: ~/.config/pushwig/settings.yaml
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pushwig")
        .join("settings.yaml")
}

/// Load settings from a YAML file
///
/// If the file doesn't exist, returns defaults.
/// If the file exists but is invalid, logs a warning and returns defaults.
pub fn load_settings(path: &Path) -> Settings {
    log::info!("load_settings: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_settings: Settings file doesn't exist, using defaults");
        return Settings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                log::info!(
                    "load_settings: long press {}ms, default mode {:?}, default view {:?}",
                    settings.long_press_ms,
                    settings.default_mode,
                    settings.default_view
                );
                settings
            }
            Err(e) => {
                log::warn!("load_settings: Failed to parse settings: {}", e);
                Settings::default()
            }
        },
        Err(e) => {
            log::warn!("load_settings: Failed to read settings file: {}", e);
            Settings::default()
        }
    }
}

/// Save settings to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_settings(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_settings: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(settings).context("Failed to serialize settings to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write settings file: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.long_press(), Duration::from_millis(400));
        assert_eq!(settings.default_mode, ModeId::Track);
        assert_eq!(settings.favorites.for_kind(TrackKind::Instrument), None);
    }

    #[test]
    fn test_yaml_parsing_partial() {
        let yaml = r#"
long_press_ms: 650
default_mode: volume
default_view: session
favorites:
  instrument: "Polysynth"
knob_speed:
  slow: 0.0005
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.long_press_ms, 650);
        assert_eq!(settings.default_mode, ModeId::Volume);
        assert_eq!(settings.default_view, ViewId::Session);
        assert_eq!(settings.favorites.for_kind(TrackKind::Instrument), Some("Polysynth"));
        assert_eq!(settings.favorites.for_kind(TrackKind::Audio), None);
        // Untouched fields fall back to defaults
        assert_eq!(settings.knob_speed.normal, 0.01);
        assert_eq!(settings.knob_speed.slow, 0.0005);
        assert_eq!(settings.bank_settle_ms, 75);
    }

    #[test]
    fn test_knob_speed_scale() {
        let speed = KnobSpeed::default();
        assert!((speed.scale(3, false) - 0.03).abs() < 1e-9);
        assert!((speed.scale(-2, true) + 0.002).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert_eq!(load_settings(&missing).long_press_ms, 400);

        let invalid = dir.path().join("invalid.yaml");
        std::fs::write(&invalid, "long_press_ms: [not, a, number]").unwrap();
        assert_eq!(load_settings(&invalid).long_press_ms, 400);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        let mut settings = Settings::default();
        settings.long_press_ms = 550;
        settings.favorites.effect = Some("EQ+".to_string());
        save_settings(&settings, &path).unwrap();

        let loaded = load_settings(&path);
        assert_eq!(loaded.long_press_ms, 550);
        assert_eq!(loaded.favorites.for_kind(TrackKind::Effect), Some("EQ+"));
    }
}
