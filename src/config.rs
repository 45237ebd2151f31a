//! Configuration for the capture binary.
//!
//! Loads settings from config.json at startup: which display to open, which
//! window to bind, the capture region and how many frames to take.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::capture::{CaptureError, CaptureRegion, RegionPolicy};

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<CaptureConfig> = OnceLock::new();

/// A capture rectangle in window-local pixels.
/// Any field set to -1 means "whole window".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RegionConfig {
    /// Decodes the configured rectangle into a capture region.
    pub fn to_region(&self) -> Result<CaptureRegion, CaptureError> {
        CaptureRegion::from_sentinel(self.x, self.y, self.width, self.height)
    }
}

/// Complete capture configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// X display to open (e.g. ":0"); `None` uses `$DISPLAY`
    #[serde(default)]
    pub display: Option<String>,
    /// Server-assigned window id to bind; takes precedence over `title_prefix`
    #[serde(default)]
    pub window_id: Option<u32>,
    /// Case-sensitive title prefix of the window to bind
    #[serde(default)]
    pub title_prefix: Option<String>,
    /// Sub-region to capture; `None` captures the whole window
    #[serde(default)]
    pub region: Option<RegionConfig>,
    /// What to do with regions that leave the window bounds
    #[serde(default)]
    pub region_policy: RegionPolicy,
    /// Number of frames the binary captures per run
    #[serde(default = "default_capture_count")]
    pub capture_count: u32,
    /// Pause between consecutive captures (milliseconds)
    #[serde(default)]
    pub interval_ms: u64,
    /// Write each captured frame as a PNG into the captures directory
    #[serde(default = "default_save_png")]
    pub save_png: bool,
}

fn default_capture_count() -> u32 {
    1
}

fn default_save_png() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            display: None,
            window_id: None,
            title_prefix: None,
            region: None,
            region_policy: RegionPolicy::default(),
            capture_count: default_capture_count(),
            interval_ms: 0,
            save_png: default_save_png(),
        }
    }
}

impl CaptureConfig {
    /// The configured capture region, or the whole window if none is set.
    pub fn capture_region(&self) -> Result<CaptureRegion, CaptureError> {
        match &self.region {
            Some(region) => region.to_region(),
            None => Ok(CaptureRegion::FullWindow),
        }
    }
}

/// Candidate config locations, in lookup order.
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![crate::paths::get_local_config_path()];
    if let Some(user) = crate::paths::get_user_config_path() {
        candidates.push(user);
    }
    candidates
}

/// Parses a config file. Errors are reported as text for the log.
fn parse_config_file(path: &Path) -> Result<CaptureConfig, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Loads configuration from the first config.json found, or returns defaults.
fn load_config() -> CaptureConfig {
    for config_path in config_candidates() {
        crate::log(&format!("Looking for config at: {}", config_path.display()));

        if !config_path.exists() {
            continue;
        }

        match parse_config_file(&config_path) {
            Ok(config) => {
                crate::log(&format!("Config loaded from {}", config_path.display()));
                return config;
            }
            Err(e) => {
                crate::log(&format!("{}. Using defaults.", e));
                return CaptureConfig::default();
            }
        }
    }

    crate::log("config.json not found. Using default config.");
    CaptureConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static CaptureConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: CaptureConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.capture_count, 1);
        assert_eq!(config.interval_ms, 0);
        assert!(config.save_png);
        assert_eq!(config.region_policy, RegionPolicy::Reject);
        assert_eq!(config.capture_region().unwrap(), CaptureRegion::FullWindow);
    }

    #[test]
    fn test_parse_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "display": ":1",
                "title_prefix": "Firefox",
                "region": { "x": 10, "y": 20, "width": 30, "height": 40 },
                "region_policy": "pass_through",
                "capture_count": 3
            }"#,
        )
        .unwrap();

        let config = parse_config_file(&path).unwrap();
        assert_eq!(config.display.as_deref(), Some(":1"));
        assert_eq!(config.title_prefix.as_deref(), Some("Firefox"));
        assert_eq!(config.region_policy, RegionPolicy::PassThrough);
        assert_eq!(config.capture_count, 3);
        assert_eq!(
            config.capture_region().unwrap(),
            CaptureRegion::Rect(crate::capture::Rect::new(10, 20, 30, 40))
        );
    }

    #[test]
    fn test_sentinel_region_means_full_window() {
        let region = RegionConfig { x: -1, y: 0, width: 100, height: 100 };
        assert_eq!(region.to_region().unwrap(), CaptureRegion::FullWindow);
    }

    #[test]
    fn test_parse_invalid_json_reports_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = parse_config_file(&path).unwrap_err();
        assert!(err.contains("Failed to parse"));
    }
}
