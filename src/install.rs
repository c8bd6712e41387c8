use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{EnvError, Result};
use crate::progress::Progress;
use crate::project::Project;
use crate::runner::Invocation;
use crate::{cache, locator, log, venv};

pub struct InstallOptions {
    pub env: Option<String>,
    pub manifest: Option<PathBuf>,
    pub extras: Vec<String>,
    pub each: bool,
    pub force: bool,
    pub system: bool,
    pub python: Option<PathBuf>,
}

/// Where packages go
#[derive(Debug)]
pub struct Target {
    pub label: String,
    pub python: PathBuf,
    /// Set for virtual environments; the install stamp lives here
    pub env_dir: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub enum Manifest {
    /// `pip install -r <file>`
    Requirements(PathBuf),
    /// Requirement strings read from `[project]` of a pyproject.toml
    Packages(Vec<String>),
}

pub fn run(project: &Project, opts: InstallOptions) -> Result<()> {
    let target = resolve_target(project, &opts)?;

    let manifest_path = project.path(opts.manifest.as_ref().unwrap_or(&project.config.manifest));
    if !manifest_path.is_file() {
        return Err(EnvError::ManifestNotFound(manifest_path));
    }

    log::info(&format!("Loading requirements from {}", manifest_path.display()));
    log::info(&format!("Using Python from: {}", target.python.display()));

    let manifest = read_manifest(&manifest_path, &opts.extras)?;
    let selection = match &manifest {
        Manifest::Requirements(_) => Vec::new(),
        Manifest::Packages(pkgs) => pkgs.clone(),
    };

    let hash = cache::compute_hash(&manifest_path, &selection)?;
    if let Some(dir) = &target.env_dir {
        if !opts.force && cache::is_current(dir, &hash) {
            log::skipped(&format!(
                "{} is up to date with {} (use --force to reinstall)",
                target.label,
                manifest_path.display()
            ));
            return Ok(());
        }
    }

    if opts.each {
        let packages = match &manifest {
            Manifest::Packages(pkgs) => pkgs.clone(),
            Manifest::Requirements(path) => requirement_lines(path)?,
        };
        install_each(&target, &packages)?;
    } else {
        install_batch(&target, &manifest)?;
    }

    if let Some(dir) = &target.env_dir {
        cache::record(dir, &hash)?;
    }

    log::success(&format!("All packages installed into {}", target.label));
    Ok(())
}

pub fn resolve_target(project: &Project, opts: &InstallOptions) -> Result<Target> {
    if let Some(name) = &opts.env {
        let (label, dir) = project.require_venv(name)?;
        return Ok(Target {
            label,
            python: venv::python_path(&dir),
            env_dir: Some(dir),
        });
    }

    if opts.system {
        if let Some(active) = venv::active_venv() {
            log::warn(&format!(
                "--system given; ignoring active environment {}",
                active.display()
            ));
        }
        let python =
            locator::resolve_interpreter(opts.python.as_deref(), project.config.python.clone())?;
        return Ok(Target {
            label: "system interpreter".to_string(),
            python,
            env_dir: None,
        });
    }

    if let Some(dir) = venv::active_venv() {
        if !venv::is_venv(&dir) {
            return Err(EnvError::EnvironmentNotFound {
                name: "VIRTUAL_ENV".to_string(),
                path: dir,
            });
        }
        return Ok(Target {
            label: dir.display().to_string(),
            python: venv::python_path(&dir),
            env_dir: Some(dir),
        });
    }

    Err(EnvError::NoTargetEnvironment)
}

/// pyproject.toml manifests are expanded into package lists; anything else is a requirements file
pub fn read_manifest(path: &Path, extras: &[String]) -> Result<Manifest> {
    let is_pyproject = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if !is_pyproject {
        if !extras.is_empty() {
            log::warn("--extras only applies to pyproject.toml manifests; ignoring");
        }
        return Ok(Manifest::Requirements(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (packages, unknown) = pyproject_requirements(&contents, extras)
        .map_err(|e| anyhow!("Invalid TOML file {}: {}", path.display(), e))?;

    for extra in unknown {
        log::warn(&format!("Extra '{}' not found in {}", extra, path.display()));
    }

    if packages.is_empty() {
        return Err(anyhow!("No requirements found in {}", path.display()).into());
    }

    Ok(Manifest::Packages(packages))
}

/// Base dependencies plus each requested extra; returns unknown extras separately
pub fn pyproject_requirements(
    contents: &str,
    extras: &[String],
) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    let value: toml::Value = toml::from_str(contents)?;
    let project = value.get("project");

    let strings = |v: Option<&toml::Value>| -> Vec<String> {
        v.and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| s.as_str())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut packages = strings(project.and_then(|p| p.get("dependencies")));
    let optional = project.and_then(|p| p.get("optional-dependencies"));

    let mut unknown = Vec::new();
    for extra in extras {
        match optional.and_then(|o| o.get(extra.as_str())) {
            Some(group) => {
                let group = strings(Some(group));
                tracing::debug!(extra = %extra, count = group.len(), "including extra");
                packages.extend(group);
            }
            None => unknown.push(extra.clone()),
        }
    }

    Ok((packages, unknown))
}

/// Package lines of a requirements file; comments and pip options are dropped
pub fn requirement_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let mut out = Vec::new();

    for line in contents.lines() {
        let line = match line.find(" #") {
            Some(idx) => &line[..idx],
            None => line,
        }
        .trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('-') {
            log::warn(&format!("skipping option line '{}' in per-package mode", line));
            continue;
        }
        out.push(line.to_string());
    }

    Ok(out)
}

fn pip(target: &Target) -> Invocation {
    Invocation::new(&target.python).args(["-m", "pip", "install"])
}

fn install_batch(target: &Target, manifest: &Manifest) -> Result<()> {
    let cmd = match manifest {
        Manifest::Requirements(path) => pip(target).arg("-r").arg(path),
        Manifest::Packages(pkgs) => {
            log::info(&format!("Installing {} packages...", pkgs.len()));
            pip(target).args(pkgs)
        }
    };

    cmd.run()
}

/// One pip call per package; failures are collected and the rest still run
fn install_each(target: &Target, packages: &[String]) -> Result<()> {
    let progress = Progress::new(packages.len());
    let mut failed = Vec::new();

    for pkg in packages {
        progress.start_step(pkg);

        match pip(target).arg(pkg).output() {
            Ok(r) if r.success() => progress.println(format!("✔ {}", pkg)),
            Ok(r) => {
                progress.println(format!("✘ {} (exit={})", pkg, r.exit_code));
                progress.suspend(|| log::print_command_output(pkg, &r));
                failed.push(pkg.clone());
            }
            Err(e) => {
                progress.println(format!("✘ {}: {}", pkg, e));
                failed.push(pkg.clone());
            }
        }

        progress.finish_step();
    }
    progress.finish();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(EnvError::InstallIncomplete(failed.len(), failed.join(", ")))
    }
}
