//! Renderer configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the config directory overrides them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [links]
//! wiki_route = "/blog"            # [[Link]] resolves to <wiki_route>/<slug>
//! image_endpoint = "/api/images"  # ![[file]] resolves to <image_endpoint>/<file>
//!
//! [lightbox]
//! close_delay_ms = 300            # Closing animation before the lightbox clears
//!
//! [reading]
//! words_per_minute = 200          # Reading time estimate
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [links]
//! wiki_route = "/tr/blog"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::markdown::RenderOptions;
use crate::reading_time::DEFAULT_WORDS_PER_MINUTE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Longest closing animation accepted by validation.
pub const MAX_CLOSE_DELAY_MS: u64 = 5_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Renderer configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Where wiki links and wiki image embeds point.
    pub links: LinksConfig,
    /// Lightbox timing.
    pub lightbox: LightboxConfig,
    /// Reading time estimate.
    pub reading: ReadingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    pub wiki_route: String,
    pub image_endpoint: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            wiki_route: "/blog".to_string(),
            image_endpoint: "/api/images".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    pub close_delay_ms: u64,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self { close_delay_ms: 300 }
    }
}

impl LightboxConfig {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

fn validate_route(key: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{key} must start with '/' (got {value:?})"
        )));
    }
    if value.len() > 1 && value.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{key} must not end with '/' (got {value:?})"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{key} must not contain whitespace (got {value:?})"
        )));
    }
    Ok(())
}

impl RendererConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_route("links.wiki_route", &self.links.wiki_route)?;
        validate_route("links.image_endpoint", &self.links.image_endpoint)?;
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be greater than 0".into(),
            ));
        }
        if self.lightbox.close_delay_ms > MAX_CLOSE_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "lightbox.close_delay_ms must be at most {MAX_CLOSE_DELAY_MS}"
            )));
        }
        Ok(())
    }

    /// Render options for this configuration.
    pub fn render_options(&self, enable_frames: bool) -> RenderOptions {
        RenderOptions::from_links(&self.links, enable_frames)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RendererConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RendererConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RendererConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<RendererConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Render Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Links
# ---------------------------------------------------------------------------
[links]
# Route prefix for [[Wiki Links]]. [[My Post]] links to <wiki_route>/my-post.
# Must start with "/" and have no trailing slash.
wiki_route = "/blog"

# Endpoint serving ![[file]] image embeds by file name.
image_endpoint = "/api/images"

# ---------------------------------------------------------------------------
# Lightbox
# ---------------------------------------------------------------------------
[lightbox]
# Milliseconds between closing the lightbox and clearing it, matching the
# fade-out animation. At most 5000.
close_delay_ms = 300

# ---------------------------------------------------------------------------
# Reading time
# ---------------------------------------------------------------------------
[reading]
# Average reading speed used for "N min read" labels. Must be > 0.
words_per_minute = 200
"##
}
