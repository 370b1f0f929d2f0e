use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use triage_core::Weights;

use crate::state::ensure_triage_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA zone used to decide what "today" is.
    pub timezone: String,
    /// Default number of tasks returned by `suggest`.
    pub suggest_limit: usize,
    pub weights: Weights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            suggest_limit: 3,
            weights: Weights::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_triage_home()?.join("config.toml"))
}

/// Load from `path`, or the default location when `None`. A missing file
/// yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
