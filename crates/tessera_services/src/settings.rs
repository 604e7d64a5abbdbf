//! Settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessera_core::ecs::WorldConfig;
use thiserror::Error;

/// Default telemetry collector address.
pub const DEFAULT_TELEMETRY_ADDRESS: &str = "127.0.0.1:9100";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldConfig,
    pub telemetry: TelemetrySettings,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Fixed update rate in Hz.
    pub fixed_hz: u32,
    /// Cap on fixed updates run for one frame.
    pub max_fixed_steps: u32,
    /// Frames to run before exiting.
    pub frames: u64,
    /// Sleep between frames to track wall-clock time instead of running
    /// as fast as possible.
    pub realtime: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            address: DEFAULT_TELEMETRY_ADDRESS.to_string(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fixed_hz: tessera_core::time::TICK_RATE_HZ,
            max_fixed_steps: tessera_core::time::DEFAULT_MAX_TICKS_PER_FRAME,
            frames: 600,
            realtime: false,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.world.publish_interval_ms, 250);
        assert_eq!(settings.simulation.fixed_hz, 60);
        assert!(!settings.telemetry.enabled);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings = Settings::from_json(
            r#"{
                "world": { "id": "arena" },
                "telemetry": { "enabled": true },
                "simulation": { "frames": 10, "realtime": true }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.world.id.as_deref(), Some("arena"));
        assert_eq!(settings.world.publish_interval_ms, 250);
        assert!(settings.telemetry.enabled);
        assert_eq!(settings.telemetry.address, DEFAULT_TELEMETRY_ADDRESS);
        assert_eq!(settings.simulation.frames, 10);
        assert!(settings.simulation.realtime);
        assert_eq!(settings.simulation.max_fixed_steps, 5);
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("tessera-settings-does-not-exist.json");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("tessera-settings-does-not-exist.json"));
    }

    #[test]
    fn load_reports_malformed_json() {
        let path = std::env::temp_dir().join(format!(
            "tessera-settings-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ \"world\": ").unwrap();
        let err = Settings::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "tessera-settings-valid-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "simulation": { "fixed_hz": 30 } }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(settings.simulation.fixed_hz, 30);
    }
}
