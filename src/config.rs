//! Player configuration loaded from `config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "melody-rs";
const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "MELODY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Where the recently-played and favorites lists are stored.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Interval between engine status ticks.
    pub tick_interval_ms: u64,
    /// Pause between a song finishing and the next one starting.
    pub auto_advance_delay_ms: u64,
    pub notification_display_name: String,
    pub notification_dbus_name: String,
    pub enable_media_controls: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".melody"));
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            tick_interval_ms: 250,
            auto_advance_delay_ms: 100,
            notification_display_name: "Melody".to_string(),
            notification_dbus_name: "melody_rs".to_string(),
            enable_media_controls: true,
        }
    }
}

impl PlayerConfig {
    /// `$MELODY_CONFIG` if set, otherwise `<config dir>/melody-rs/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config {}", path.display()));
            }
        };
        toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(10))
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "auto_advance_delay_ms = 0\nenable_media_controls = false\n").unwrap();

        let config = PlayerConfig::load_from(&path).unwrap();

        assert!(!config.enable_media_controls);
        assert_eq!(config.auto_advance_delay(), Duration::ZERO);
        assert_eq!(config.tick_interval_ms, 250);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "tick_interval_ms = \"fast\"").unwrap();

        let err = PlayerConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config"));
    }
}
