//! Where triage keeps its files: `$TRIAGE_HOME`, else `$HOME/.triage`.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

/// Environment variable that relocates the whole triage directory.
pub const HOME_OVERRIDE_VAR: &str = "TRIAGE_HOME";

/// Pick the triage directory from the override and `$HOME` values.
/// Empty values count as unset.
fn resolve_home(override_dir: Option<String>, home: Option<String>) -> Result<PathBuf> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    if let Some(dir) = non_empty(override_dir) {
        return Ok(PathBuf::from(dir));
    }
    match non_empty(home) {
        Some(home) => Ok(PathBuf::from(home).join(".triage")),
        None => bail!("neither {} nor HOME is set", HOME_OVERRIDE_VAR),
    }
}

pub fn triage_home() -> Result<PathBuf> {
    resolve_home(
        std::env::var(HOME_OVERRIDE_VAR).ok(),
        std::env::var("HOME").ok(),
    )
}

/// Resolve the triage directory and create it if missing.
pub fn ensure_triage_home() -> Result<PathBuf> {
    let dir = triage_home()?;
    if !dir.is_dir() {
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    }
    Ok(dir)
}
