//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. The config is read once at
//! startup and the resulting [`SiteConfig`] is passed by reference to every
//! stage of the build; nothing reads it from global state.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"        # One subdirectory per post, each with index.md
//! template_root = "static"        # style.css here replaces the built-in stylesheet
//! output_root = "docs"            # Rendered site
//! manifest_path = "manifest.json" # State of the last build
//! site_title = "Posts"            # Title of the listing page
//! ```
//!
//! A missing `config.toml` is not an error: the stock defaults apply. Unknown
//! keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory whose immediate subdirectories are posts.
    pub content_root: PathBuf,
    /// Directory holding render assets (an optional `style.css`).
    pub template_root: PathBuf,
    /// Directory the site is written to.
    pub output_root: PathBuf,
    /// JSON file recording what the last build produced.
    pub manifest_path: PathBuf,
    /// Title of the listing page.
    pub site_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("content"),
            template_root: PathBuf::from("static"),
            output_root: PathBuf::from("docs"),
            manifest_path: PathBuf::from("manifest.json"),
            site_title: "Posts".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate that the paths describe a usable layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("content_root", &self.content_root),
            ("template_root", &self.template_root),
            ("output_root", &self.output_root),
            ("manifest_path", &self.manifest_path),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.content_root == self.output_root {
            return Err(ConfigError::Validation(
                "content_root and output_root must be different directories".into(),
            ));
        }
        if self.site_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site_title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load config from a `config.toml` file.
///
/// Returns the stock defaults if the file doesn't exist. Returns `Err` if it
/// exists but contains invalid TOML, unknown keys, or values that fail
/// validation.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory of posts. Every immediate subdirectory holding an index.md is a
# post; the subdirectory name becomes its slug and URL.
content_root = "content"

# Render root. A style.css placed here replaces the built-in stylesheet.
template_root = "static"

# Where the rendered site is written: <output_root>/<slug>/index.html per
# post plus <output_root>/index.html for the listing.
output_root = "docs"

# Record of the last build, used to re-render only what changed.
# Deleting it forces every post to be rebuilt on the next run.
manifest_path = "manifest.json"

# Title shown on the listing page.
site_title = "Posts"
"##
}
