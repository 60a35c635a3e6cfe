//! Player preferences
//!
//! Persisted as JSON: a file for the native runner, LocalStorage on the web.
//! Missing fields fall back to their defaults so older files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Visual ===
    /// Streak banner above the playfield
    pub streak_banner: bool,
    /// Diagnostic text panel in the corner
    pub debug_overlay: bool,

    // === Accessibility ===
    /// Freeze pulsing glows and wave motion
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,

            streak_banner: true,
            debug_overlay: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective animation clock for decorative motion
    pub fn motion_time(&self, anim_time: f32) -> f32 {
        if self.reduced_motion { 0.0 } else { anim_time }
    }

    /// Clamp volumes into range
    pub fn sanitized(mut self) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        self.master_volume = clamp(self.master_volume);
        self.sfx_volume = clamp(self.sfx_volume);
        self.music_volume = clamp(self.music_volume);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "duckshot_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{"muted": true}"#).unwrap();
        assert!(s.muted);
        assert_eq!(s.master_volume, Settings::default().master_volume);
        assert!(s.streak_banner);
    }

    #[test]
    fn test_volumes_are_clamped() {
        let s = Settings::from_json(r#"{"master_volume": 3.5, "sfx_volume": -1.0}"#).unwrap();
        assert_eq!(s.master_volume, 1.0);
        assert_eq!(s.sfx_volume, 0.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("duckshot-settings-{}.json", std::process::id()));
        let settings = Settings {
            debug_overlay: true,
            reduced_motion: true,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load_from("/nonexistent/duckshot/settings.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_reduced_motion_freezes_clock() {
        let s = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(s.motion_time(4.2), 0.0);
        assert_eq!(Settings::default().motion_time(4.2), 4.2);
    }
}
