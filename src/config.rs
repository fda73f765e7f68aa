//! Configuration file parser for ~/.config/reelswipe/config.toml.
//!
//! The file is optional; a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{CatalogConfig, DEFAULT_ITEM_CAP, DEFAULT_PAGE_SIZE};
use crate::gesture::{
    CellSize, GestureConfig, DEFAULT_CELL_HEIGHT_PX, DEFAULT_CELL_WIDTH_PX,
    DEFAULT_SWIPE_COOLDOWN, DEFAULT_SWIPE_THRESHOLD_PX, DEFAULT_TAP_TOLERANCE_PX,
};
use crate::social::DEFAULT_BACKEND_URL;
use crate::tmdb::DEFAULT_TMDB_BASE_URL;

/// Environment variable that overrides `tmdb_api_key`.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration. Any subset of keys may be given.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TMDB v3 API key. `TMDB_API_KEY` takes precedence.
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub backend_url: String,

    /// Items per catalog page.
    pub page_size: usize,
    /// Upper bound on items loaded through paging.
    pub item_cap: usize,

    pub swipe_threshold_px: f64,
    pub tap_tolerance_px: f64,
    pub swipe_cooldown_ms: u64,

    /// Pixel size assumed for one terminal cell when converting mouse input.
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            item_cap: DEFAULT_ITEM_CAP,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            tap_tolerance_px: DEFAULT_TAP_TOLERANCE_PX,
            swipe_cooldown_ms: DEFAULT_SWIPE_COOLDOWN.as_millis() as u64,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            cell_height_px: DEFAULT_CELL_HEIGHT_PX,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "tmdb_api_key",
                &self.tmdb_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("backend_url", &self.backend_url)
            .field("page_size", &self.page_size)
            .field("item_cap", &self.item_cap)
            .field("swipe_threshold_px", &self.swipe_threshold_px)
            .field("tap_tolerance_px", &self.tap_tolerance_px)
            .field("swipe_cooldown_ms", &self.swipe_cooldown_ms)
            .field("cell_width_px", &self.cell_width_px)
            .field("cell_height_px", &self.cell_height_px)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 10] = [
    "tmdb_api_key",
    "tmdb_base_url",
    "backend_url",
    "page_size",
    "item_cap",
    "swipe_threshold_px",
    "tap_tolerance_px",
    "swipe_cooldown_ms",
    "cell_width_px",
    "cell_height_px",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → defaults
    /// - Invalid TOML or wrong value types → `ConfigError::Parse`
    /// - Out-of-range numbers → replaced by their default, with a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        let config = config.sanitized();
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            item_cap = config.item_cap,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Replace values that would break paging or gesture detection.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.page_size == 0 {
            tracing::warn!("page_size must be positive, using default");
            self.page_size = defaults.page_size;
        }
        if self.item_cap < self.page_size {
            tracing::warn!(
                item_cap = self.item_cap,
                page_size = self.page_size,
                "item_cap below page_size, raising it to one page"
            );
            self.item_cap = self.page_size;
        }
        for (name, value, default) in [
            (
                "swipe_threshold_px",
                &mut self.swipe_threshold_px,
                defaults.swipe_threshold_px,
            ),
            (
                "tap_tolerance_px",
                &mut self.tap_tolerance_px,
                defaults.tap_tolerance_px,
            ),
            ("cell_width_px", &mut self.cell_width_px, defaults.cell_width_px),
            (
                "cell_height_px",
                &mut self.cell_height_px,
                defaults.cell_height_px,
            ),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                tracing::warn!(key = name, "Value must be a positive number, using default");
                *value = default;
            }
        }
        self
    }

    // ========================================================================
    // Resolved Settings
    // ========================================================================

    /// API key from the environment, else from the file.
    pub fn tmdb_api_key(&self) -> Option<SecretString> {
        Self::resolve_api_key(
            std::env::var(TMDB_API_KEY_ENV).ok(),
            self.tmdb_api_key.as_deref(),
        )
    }

    fn resolve_api_key(env: Option<String>, file: Option<&str>) -> Option<SecretString> {
        env.filter(|k| !k.trim().is_empty())
            .or_else(|| file.filter(|k| !k.trim().is_empty()).map(str::to_string))
            .map(|k| SecretString::from(k.trim().to_string()))
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            swipe_threshold_px: self.swipe_threshold_px,
            tap_tolerance_px: self.tap_tolerance_px,
            swipe_cooldown: Duration::from_millis(self.swipe_cooldown_ms),
        }
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            page_size: self.page_size,
            item_cap: self.item_cap,
        }
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize {
            width_px: self.cell_width_px,
            height_px: self.cell_height_px,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
