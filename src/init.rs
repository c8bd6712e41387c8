use std::fs;
use std::path::Path;

use crate::errors::{EnvError, Result};
use crate::root::CONFIG_FILE;
use crate::{log, templates};

/// Detect Python tooling already present in `dir`
fn detect_env(dir: &Path) -> Vec<&'static str> {
    let mut env = Vec::new();

    if dir.join("venvs").is_dir() {
        env.push("venvs");
    }
    if dir.join(".venv").is_dir() {
        env.push(".venv");
    }
    if dir.join("requirements.txt").exists() {
        env.push("requirements.txt");
    }
    if dir.join("pyproject.toml").exists() {
        env.push("pyproject");
    }

    env
}

pub fn init(dir: &Path, template: &str) -> Result<()> {
    let target = dir.join(CONFIG_FILE);
    if target.exists() {
        return Err(EnvError::AlreadyInitialized);
    }

    let chosen = templates::find(template)
        .ok_or_else(|| EnvError::UnknownTemplate(template.to_string(), templates::names()))?;

    fs::write(&target, chosen.content.trim_start())?;
    tracing::debug!(path = %target.display(), template = chosen.name, "config written");

    let env = detect_env(dir);

    log::success(&format!("Created {}", CONFIG_FILE));
    log::info(&format!("  Template : {}", chosen.name));

    if !env.is_empty() {
        log::info(&format!("  Detected : {}", env.join(", ")));
    } else {
        log::info("  Detected : (no python env files found)");
    }

    Ok(())
}
