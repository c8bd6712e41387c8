use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{EnvError, Result};
use crate::root::ConfigSource;

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub venv_name: String,
    pub workon_home: PathBuf,
    pub python: Vec<String>,
    pub environments: Vec<EnvironmentSpec>,
    pub directories: Vec<String>,
    pub manifest: PathBuf,
    pub bootstrap_packages: Vec<String>,
    pub custom_venvs: String,
    pub clean: CleanConfig,
}

/// One environment per model family, created as `<venv_name>_<name>`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSpec {
    pub name: String,

    /// Preferred interpreter version, e.g. "3.11" -> `python3.11`
    #[serde(default)]
    pub python: Option<String>,

    /// Python module run from the project root on activation
    #[serde(default)]
    pub entry: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    pub dir_names: Vec<String>,
    pub file_patterns: Vec<String>,
    pub purge: Vec<String>,
    /// Also walk `workon_home`; off by default since site-packages holds thousands of caches
    pub include_environments: bool,
}

pub fn default_python_candidates() -> Vec<String> {
    let names: &[&str] = if cfg!(windows) {
        &["python", "py", "python3"]
    } else {
        &["python3", "python"]
    };
    names.iter().map(|s| s.to_string()).collect()
}

impl EnvironmentSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            python: None,
            entry: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            venv_name: "wv-venv".to_string(),
            workon_home: PathBuf::from("venvs"),
            python: default_python_candidates(),
            environments: ["yolo", "vit", "ssd", "fast-rcc"]
                .into_iter()
                .map(EnvironmentSpec::new)
                .collect(),
            directories: [
                "generate_input",
                "generate_output",
                "models",
                "training_output",
                "dataset/train",
                "dataset/valid",
                "dataset/test",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            manifest: PathBuf::from("requirements.txt"),
            bootstrap_packages: vec!["wheel".to_string(), "tomli".to_string()],
            custom_venvs: "custom_venvs.txt".to_string(),
            clean: CleanConfig::default(),
        }
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            dir_names: vec!["__pycache__".to_string(), ".ipynb_checkpoints".to_string()],
            file_patterns: vec![
                "*.pyc".to_string(),
                "*.pyo".to_string(),
                ".vscode/*.cache".to_string(),
            ],
            purge: vec!["training_output".to_string()],
            include_environments: false,
        }
    }
}

impl Config {
    pub fn load(source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::Defaults => Ok(Config::default()),

            ConfigSource::WvenvToml(path) => {
                let contents = read(path)?;
                toml::from_str(&contents).map_err(|e| invalid(path, e))
            }

            ConfigSource::PyProjectToml(path) => {
                let contents = read(path)?;
                let value: toml::Value = toml::from_str(&contents).map_err(|e| invalid(path, e))?;

                let section = value
                    .get("tool")
                    .and_then(|t| t.get("wvenv"))
                    .ok_or_else(|| invalid(path, "missing [tool.wvenv] section"))?;

                section.clone().try_into().map_err(|e| invalid(path, e))
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.venv_name.trim().is_empty() {
            return Err(anyhow!("`venv_name` must not be empty"));
        }

        if self.python.is_empty() {
            return Err(anyhow!("`python` must list at least one interpreter name"));
        }

        let mut seen = HashSet::new();
        for env in &self.environments {
            if env.name.trim().is_empty() {
                return Err(anyhow!("environment with an empty name"));
            }
            if !seen.insert(env.name.as_str()) {
                return Err(anyhow!("environment '{}' is defined twice", env.name));
            }
        }

        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(contents)
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> EnvError {
    EnvError::InvalidConfig {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
