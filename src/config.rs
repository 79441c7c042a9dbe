//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` on the command line
//! 2. `$XYDATA_CONFIG` environment variable
//! 3. `config.toml` in the platform config dir (`~/.config/xydata/` on Linux)
//! 4. Built-in defaults (everything is optional)
//!
//! A file named by 1 or 2 must exist. Only the platform file may be absent.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub front: FrontConfig,
    pub fit: FitConfig,
}

/// Thresholds for front detection, as fractions of the y range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontConfig {
    pub lower: f64,
    pub upper: f64,
}

/// Linear fit report settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Number of evenly spaced x values the fit is printed at.
    pub points: usize,
}

// --- Defaults ---

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            lower: 0.1,
            upper: 0.9,
        }
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { points: 10 }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let FrontConfig { lower, upper } = self.front;
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) {
            bail!("front thresholds must lie in [0, 1], got {lower} and {upper}");
        }
        if lower >= upper {
            bail!("front.lower ({lower}) must be below front.upper ({upper})");
        }
        if self.fit.points == 0 {
            bail!("fit.points must be at least 1");
        }
        Ok(())
    }
}

/// Load config from disk. Returns defaults if no config file exists, unless
/// the file was named explicitly or through `$XYDATA_CONFIG`.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let from_env = std::env::var_os("XYDATA_CONFIG").map(PathBuf::from);
    load_config_from(explicit, from_env.as_deref())
}

/// A named file must exist; only the platform default may be absent.
fn load_config_from(explicit: Option<&Path>, from_env: Option<&Path>) -> Result<Config> {
    if let Some(p) = explicit.or(from_env) {
        return read_config(p);
    }

    match default_config_path() {
        Some(p) if p.exists() => read_config(&p),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config =
        Config::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    log::debug!("using config {}", path.display());
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "xydata").map(|d| d.config_dir().join("config.toml"))
}
