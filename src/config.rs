//! Site configuration.
//!
//! Handles loading, validating, and layering `shelfmark.toml`. Resolution
//! order, later wins:
//!
//! 1. Stock defaults ([`SiteConfig::default`])
//! 2. `shelfmark.toml` in the working directory (or `--config <path>`)
//! 3. Environment: `SITE_URL` → `site.base_url`, `PORT` → `serve.port`
//! 4. Command-line flags (`--source`, `--output`, `--port`), applied by `main`
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Ali in Drafts"
//! description = "Reading notes and highlights captured in markdown."
//! tagline = "A space for drafts, doubts, and ideas that aren't done yet"
//! # base_url = "https://notes.example.com"   # absent = relative links
//!
//! [paths]
//! source = "posts"              # Markdown documents
//! output = "dist"               # Generated site
//! entries_dir = "posts"         # <output>/<entries_dir>/<slug>/
//! index_document = "index.html"
//! feed = "rss.xml"              # <output>/<feed>
//!
//! [markdown]
//! escape_html = false           # true = escape raw HTML in prose
//!
//! [covers]
//! auto_enrich = false           # look up blank `cover:` fields during build
//! timeout_secs = 5
//!
//! [serve]
//! port = 8080
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "shelfmark.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `shelfmark.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub paths: PathsConfig,
    pub markdown: MarkdownConfig,
    pub covers: CoversConfig,
    pub serve: ServeConfig,
}

/// Identity of the site, shown in the layout and the feed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    /// Line shown above the entry list on the home page.
    pub tagline: String,
    /// Absolute site URL without trailing slash. When absent, permalinks and
    /// the feed link are relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Ali in Drafts".to_string(),
            description: "Reading notes and highlights captured in markdown.".to_string(),
            tagline: "A space for drafts, doubts, and ideas that aren't done yet".to_string(),
            base_url: None,
        }
    }
}

/// Where documents are read from and artifacts are written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Subdirectory of the output holding one directory per entry.
    pub entries_dir: String,
    /// File name of each entry page and of the home page.
    pub index_document: String,
    /// Feed path relative to the output root.
    pub feed: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("posts"),
            output: PathBuf::from("dist"),
            entries_dir: "posts".to_string(),
            index_document: "index.html".to_string(),
            feed: "rss.xml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Escape raw HTML in prose instead of passing it through.
    pub escape_html: bool,
}

/// Cover lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoversConfig {
    /// Fill blank `cover:` fields during `build` without `--covers`.
    pub auto_enrich: bool,
    /// Per-request timeout for the catalog API.
    pub timeout_secs: u64,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            auto_enrich: false,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("paths.entries_dir", &self.paths.entries_dir),
            ("paths.index_document", &self.paths.index_document),
            ("paths.feed", &self.paths.feed),
        ] {
            if !is_safe_relative(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a non-empty relative path without '..' (got {value:?})"
                )));
            }
        }
        if self.covers.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "covers.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Apply `SITE_URL` and `PORT` from a variable lookup.
    ///
    /// Takes the lookup as a closure so tests don't touch process state.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("SITE_URL") {
            self.site.base_url = Some(url);
        }
        if let Some(port) = var("PORT") {
            self.serve.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("PORT must be a port number (got {port:?})"))
            })?;
        }
        self.normalize();
        Ok(())
    }

    /// Strip trailing slashes from the base URL; an empty URL means none.
    pub fn normalize(&mut self) {
        self.site.base_url = self
            .site
            .base_url
            .take()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
    }
}

fn is_safe_relative(value: &str) -> bool {
    let path = Path::new(value);
    !value.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
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

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into()?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to defaults if the file is absent.
///
/// Environment overrides are applied on top and the result re-validated.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = resolve_config(load_raw_config(path)?)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `shelfmark.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Shelfmark Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Environment overrides: SITE_URL (site.base_url), PORT (serve.port).

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Ali in Drafts"
description = "Reading notes and highlights captured in markdown."
# Shown above the list of entries on the home page.
tagline = "A space for drafts, doubts, and ideas that aren't done yet"
# Absolute URL of the published site. Without it, permalinks and the feed
# use relative paths.
# base_url = "https://notes.example.com"

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Directory of markdown documents, one per entry.
source = "posts"
# Where the site is written.
output = "dist"
# Entry pages live at <output>/<entries_dir>/<slug>/<index_document>.
entries_dir = "posts"
index_document = "index.html"
# Feed location, relative to <output>.
feed = "rss.xml"

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# Raw HTML in documents passes through unless this is true.
escape_html = false

# ---------------------------------------------------------------------------
# Cover lookup
# ---------------------------------------------------------------------------
[covers]
# Fill blank `cover:` fields during every build (same as `build --covers`).
# Successful lookups rewrite the source document's header.
auto_enrich = false
# Per-request timeout for the book catalog API.
timeout_secs = 5

# ---------------------------------------------------------------------------
# Preview server
# ---------------------------------------------------------------------------
[serve]
port = 8080
"##
}
