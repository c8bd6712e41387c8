use anyhow::Context;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, EnvironmentSpec};
use crate::custom::CustomVenvs;
use crate::errors::{EnvError, Result};
use crate::root::{self, ConfigSource};
use crate::venv;

/// Base name chosen by the last `setup`, stored inside `workon_home`
pub const BASE_NAME_FILE: &str = ".wvenv-base";

/// Configuration resolved against a concrete project root
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub source: ConfigSource,
    pub config: Config,
    pub workon_home: PathBuf,
    /// Prefix of configured environment directories; `venv_name` unless setup recorded another
    pub base_name: String,
}

impl Project {
    /// Discover the project from `start` and load its configuration.
    /// `WORKON_HOME` overrides the configured environment directory.
    pub fn discover(start: &Path) -> Result<Self> {
        let (root, source) = root::find_project_root(start)?;
        let config = Config::load(&source)?;
        config.validate()?;

        let workon_override = env::var_os("WORKON_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self::new(root, source, config, workon_override))
    }

    pub fn new(
        root: PathBuf,
        source: ConfigSource,
        config: Config,
        workon_override: Option<PathBuf>,
    ) -> Self {
        let workon = workon_override.unwrap_or_else(|| config.workon_home.clone());
        let workon_home = if workon.is_absolute() {
            workon
        } else {
            root.join(workon)
        };

        let base_name =
            recorded_base_name(&workon_home).unwrap_or_else(|| config.venv_name.clone());

        tracing::debug!(
            root = %root.display(),
            workon_home = %workon_home.display(),
            base_name = %base_name,
            source = %source.describe(),
            "project resolved"
        );

        Self {
            root,
            source,
            config,
            workon_home,
            base_name,
        }
    }

    /// Persist the base name used by `setup` so later commands resolve the same directories
    pub fn record_base_name(&self, name: &str) -> Result<()> {
        let path = self.workon_home.join(BASE_NAME_FILE);
        fs::write(&path, format!("{}\n", name))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), base_name = %name, "recorded base name");
        Ok(())
    }

    /// Full environment name, `<venv_name>_<suffix>`
    pub fn env_name(&self, base: &str, spec: &EnvironmentSpec) -> String {
        format!("{}_{}", base, spec.name)
    }

    pub fn env_dir(&self, base: &str, spec: &EnvironmentSpec) -> PathBuf {
        self.workon_home.join(self.env_name(base, spec))
    }

    pub fn find_environment(&self, name: &str) -> Option<&EnvironmentSpec> {
        let full = |spec: &EnvironmentSpec| self.env_name(&self.base_name, spec);
        self.config
            .environments
            .iter()
            .find(|spec| spec.name == name || full(spec) == name)
    }

    /// Map a configured name, custom entry or path to an environment directory.
    /// Existence is not checked here; see [`Project::require_venv`].
    pub fn resolve_env(&self, name: &str) -> (String, PathBuf) {
        if let Some(spec) = self.find_environment(name) {
            let base = &self.base_name;
            return (self.env_name(base, spec), self.env_dir(base, spec));
        }

        let as_path = Path::new(name);
        if as_path.is_absolute() || as_path.components().count() > 1 {
            return (name.to_string(), self.path(as_path));
        }

        (name.to_string(), self.workon_home.join(name))
    }

    pub fn require_venv(&self, name: &str) -> Result<(String, PathBuf)> {
        let (name, dir) = self.resolve_env(name);
        if !venv::is_venv(&dir) {
            return Err(EnvError::EnvironmentNotFound { name, path: dir });
        }
        Ok((name, dir))
    }

    pub fn custom_venvs(&self) -> CustomVenvs {
        CustomVenvs::new(self.workon_home.join(&self.config.custom_venvs))
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        }
    }
}

fn recorded_base_name(workon_home: &Path) -> Option<String> {
    let contents = fs::read_to_string(workon_home.join(BASE_NAME_FILE)).ok()?;
    let name = contents.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(workon: Option<&str>) -> Project {
        Project::new(
            PathBuf::from("/proj"),
            ConfigSource::Defaults,
            Config::default(),
            workon.map(PathBuf::from),
        )
    }

    #[test]
    fn env_dirs_live_under_workon_home() {
        let p = project(None);
        let spec = EnvironmentSpec::new("yolo");
        assert_eq!(
            p.env_dir("wv-venv", &spec),
            PathBuf::from("/proj/venvs/wv-venv_yolo")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_override_replaces_workon_home() {
        let p = project(Some("/elsewhere/envs"));
        assert_eq!(p.workon_home, PathBuf::from("/elsewhere/envs"));
        assert_eq!(
            p.custom_venvs().path(),
            Path::new("/elsewhere/envs/custom_venvs.txt")
        );
    }

    #[test]
    fn environments_match_by_suffix_or_full_name() {
        let p = project(None);
        assert_eq!(p.find_environment("vit").map(|s| s.name.as_str()), Some("vit"));
        assert_eq!(
            p.find_environment("wv-venv_ssd").map(|s| s.name.as_str()),
            Some("ssd")
        );
        assert!(p.find_environment("resnet").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn custom_names_and_paths_resolve() {
        let p = project(None);
        assert_eq!(
            p.resolve_env("yolo"),
            ("wv-venv_yolo".to_string(), PathBuf::from("/proj/venvs/wv-venv_yolo"))
        );
        assert_eq!(p.resolve_env("torch").1, PathBuf::from("/proj/venvs/torch"));
        assert_eq!(p.resolve_env("/opt/envs/tf").1, PathBuf::from("/opt/envs/tf"));
        assert_eq!(p.resolve_env("envs/tf").1, PathBuf::from("/proj/envs/tf"));
    }

    #[test]
    fn missing_environment_is_reported() {
        let p = project(None);
        assert!(matches!(
            p.require_venv("vit"),
            Err(EnvError::EnvironmentNotFound { .. })
        ));
    }

    #[test]
    fn recorded_base_name_wins_over_config() {
        let temp = tempfile::tempdir().unwrap();
        let open = || {
            Project::new(
                temp.path().to_path_buf(),
                ConfigSource::Defaults,
                Config::default(),
                None,
            )
        };

        let before = open();
        assert_eq!(before.base_name, "wv-venv");

        fs::create_dir_all(&before.workon_home).unwrap();
        before.record_base_name("demo").unwrap();

        let after = open();
        assert_eq!(after.base_name, "demo");
        assert_eq!(after.resolve_env("yolo").0, "demo_yolo");
        assert_eq!(
            after.find_environment("demo_vit").map(|s| s.name.as_str()),
            Some("vit")
        );
    }
}
