use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "wvenv.toml";

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    WvenvToml(PathBuf),
    PyProjectToml(PathBuf),
    /// No configuration found; built-in defaults rooted at the working directory
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::WvenvToml(p) | ConfigSource::PyProjectToml(p) => {
                p.display().to_string()
            }
            ConfigSource::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Find the project root by searching for wvenv configuration upwards from `start`.
/// Falls back to `start` itself with `ConfigSource::Defaults`.
pub fn find_project_root(start: &Path) -> Result<(PathBuf, ConfigSource)> {
    let mut current = start.to_path_buf();

    loop {
        let local = current.join(CONFIG_FILE);
        if local.is_file() {
            return Ok((current.clone(), ConfigSource::WvenvToml(local)));
        }

        let pyproject = current.join("pyproject.toml");
        if pyproject.is_file() && pyproject_has_wvenv(&pyproject)? {
            return Ok((current.clone(), ConfigSource::PyProjectToml(pyproject)));
        }

        if !current.pop() {
            break;
        }
    }

    tracing::debug!(start = %start.display(), "no wvenv configuration found, using defaults");
    Ok((start.to_path_buf(), ConfigSource::Defaults))
}

fn pyproject_has_wvenv(path: &Path) -> Result<bool> {
    let contents = fs::read_to_string(path)?;

    // A broken pyproject.toml is not ours to report here
    let Ok(value) = toml::from_str::<toml::Value>(&contents) else {
        return Ok(false);
    };

    Ok(value.get("tool").and_then(|t| t.get("wvenv")).is_some())
}
