//! Settings management for the tray
//!
//! Persistent defaults live in `<config_dir>/CodexBar/tray.json`; command
//! line flags override them for one run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::{PopupSize, SourceMode, DEFAULT_BAR_LENGTH, DEFAULT_MARGIN};
use crate::runner::CodexBarCommand;

/// Shortest refresh interval accepted, in seconds
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;

/// Popup edges are kept within this range, in logical pixels
pub const POPUP_EDGE_RANGE: (u32, u32) = (100, 4096);

pub const MAX_POPUP_MARGIN: i32 = 256;

pub const MAX_BAR_LENGTH: usize = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Tray settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// codexbar executable name or path
    pub binary: String,

    /// Restrict both commands to one provider
    pub provider: Option<String>,

    /// Data source passed as `--source`
    pub source: SourceMode,

    /// Seconds between automatic refreshes
    pub refresh_interval_secs: u64,

    /// Seconds before a codexbar command is killed
    pub command_timeout_secs: u64,

    /// Custom tray icon image
    pub icon: Option<PathBuf>,

    /// Open the dashboard on startup
    pub show_dashboard: bool,

    pub popup_width: u32,
    pub popup_height: u32,
    pub popup_margin: i32,

    /// Cells in the text usage bars
    pub bar_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: "codexbar".to_string(),
            provider: None,
            source: SourceMode::Cli,
            refresh_interval_secs: 30,
            command_timeout_secs: 30,
            icon: None,
            show_dashboard: false,
            popup_width: 430,
            popup_height: 560,
            popup_margin: DEFAULT_MARGIN,
            bar_length: DEFAULT_BAR_LENGTH,
        }
    }
}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub binary: Option<String>,
    pub provider: Option<String>,
    pub source: Option<SourceMode>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub icon: Option<PathBuf>,
    pub show_dashboard: bool,
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("CodexBar").join("tray.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("Could not determine config directory, using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings.clamped())
    }

    /// Pull layout values back into usable bounds
    fn clamped(self) -> Self {
        let (min_edge, max_edge) = POPUP_EDGE_RANGE;
        let clamped = Self {
            popup_width: self.popup_width.clamp(min_edge, max_edge),
            popup_height: self.popup_height.clamp(min_edge, max_edge),
            popup_margin: self.popup_margin.clamp(0, MAX_POPUP_MARGIN),
            bar_length: self.bar_length.min(MAX_BAR_LENGTH),
            ..self.clone()
        };
        if clamped != self {
            tracing::warn!(
                "Popup or bar settings out of range, using {}x{} margin {} bar {}",
                clamped.popup_width,
                clamped.popup_height,
                clamped.popup_margin,
                clamped.bar_length
            );
        }
        clamped
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command line values on top of these settings
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(binary) = overrides.binary {
            self.binary = binary;
        }
        if let Some(provider) = overrides.provider {
            self.provider = Some(provider);
        }
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(secs) = overrides.interval_secs {
            self.refresh_interval_secs = secs;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.command_timeout_secs = secs;
        }
        if let Some(icon) = overrides.icon {
            self.icon = Some(icon);
        }
        self.show_dashboard |= overrides.show_dashboard;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn popup_size(&self) -> PopupSize {
        let (_, max_edge) = POPUP_EDGE_RANGE;
        PopupSize::new(
            self.popup_width.min(max_edge) as i32,
            self.popup_height.min(max_edge) as i32,
        )
    }

    /// Command used by the refresh worker
    pub fn command(&self) -> CodexBarCommand {
        CodexBarCommand {
            binary: self.binary.clone(),
            provider: self.provider.clone().filter(|p| !p.is_empty()),
            source: self.source,
            timeout: self.command_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.binary, "codexbar");
        assert_eq!(settings.source, SourceMode::Cli);
        assert_eq!(settings.refresh_interval_secs, 30);
        assert_eq!(settings.popup_size(), PopupSize::new(430, 560));
        assert_eq!(settings.popup_margin, 8);
        assert_eq!(settings.bar_length, 10);
        assert!(!settings.show_dashboard);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("tray.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tray.json");

        let settings = Settings {
            provider: Some("claude".to_string()),
            source: SourceMode::OAuth,
            refresh_interval_secs: 120,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tray.json");
        std::fs::write(&path, r#"{"binary": "/opt/codexbar", "source": "web"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.binary, "/opt/codexbar");
        assert_eq!(settings.source, SourceMode::Web);
        assert_eq!(settings.command_timeout_secs, 30);
    }

    #[test]
    fn test_out_of_range_layout_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tray.json");
        std::fs::write(
            &path,
            r#"{"popup_width": 4294967295, "popup_height": 3, "popup_margin": -40, "bar_length": 1000000000}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.popup_size(), PopupSize::new(4096, 100));
        assert_eq!(settings.popup_margin, 0);
        assert_eq!(settings.bar_length, MAX_BAR_LENGTH);
        assert_eq!(settings.binary, "codexbar");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tray.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let base = Settings {
            provider: Some("codex".to_string()),
            show_dashboard: true,
            ..Settings::default()
        };
        let merged = base.with_overrides(SettingsOverrides {
            binary: Some("codexbar-dev".to_string()),
            source: Some(SourceMode::Api),
            interval_secs: Some(60),
            ..SettingsOverrides::default()
        });

        assert_eq!(merged.binary, "codexbar-dev");
        assert_eq!(merged.provider.as_deref(), Some("codex"));
        assert_eq!(merged.source, SourceMode::Api);
        assert_eq!(merged.refresh_interval_secs, 60);
        // The flag can only turn it on
        assert!(merged.show_dashboard);
    }

    #[test]
    fn test_interval_floor_and_command() {
        let settings = Settings {
            refresh_interval_secs: 0,
            command_timeout_secs: 0,
            provider: Some(String::new()),
            ..Settings::default()
        };
        assert_eq!(settings.refresh_interval(), Duration::from_secs(MIN_REFRESH_INTERVAL_SECS));

        let command = settings.command();
        assert_eq!(command.timeout, Duration::from_secs(1));
        assert_eq!(command.provider, None);
    }
}
