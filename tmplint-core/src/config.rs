//! Configuration loading from tmplint.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{IoResultExt, TmplintError};

/// Name of the configuration file looked up at the scan root.
pub const CONFIG_FILE_NAME: &str = "tmplint.toml";

/// Main configuration structure for tmplint.toml.
#[derive(Debug, Deserialize, Default)]
pub struct TmplintConfig {
    /// Dump paths containing any of these patterns are skipped.
    pub ignore: Option<Vec<String>>,
    /// Logging surface configuration.
    pub surface: Option<SurfaceConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Extra logging types on top of the built-in surface.
#[derive(Debug, Deserialize, Default)]
pub struct SurfaceConfig {
    /// Fully qualified type names, e.g. "Acme.Logging.LogFacade".
    pub extra_types: Option<Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl TmplintConfig {
    pub fn ignore_patterns(&self) -> &[String] {
        self.ignore.as_deref().unwrap_or_default()
    }

    pub fn extra_surface_types(&self) -> &[String] {
        self.surface
            .as_ref()
            .and_then(|s| s.extra_types.as_deref())
            .unwrap_or_default()
    }

    /// True if the config asks for JSON output.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from tmplint.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<TmplintConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg = toml::from_str(&content)
        .map_err(|e| TmplintError::config(&path, e.message()))
        .context("Invalid tmplint.toml")?;
    Ok(Some(cfg))
}
