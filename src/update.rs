use crate::errors::{EnvError, Result};
use crate::project::Project;
use crate::{log, venv};

const TOOLING: &[&str] = &["pip", "setuptools"];

/// Targets for `update`: explicit names, or every configured and custom environment
pub fn targets(project: &Project, names: &[String], all: bool) -> Result<Vec<String>> {
    if !names.is_empty() && !all {
        return Ok(names.to_vec());
    }

    let mut out: Vec<String> = project
        .config
        .environments
        .iter()
        .map(|spec| spec.name.clone())
        .collect();

    if all {
        out.extend(project.custom_venvs().load()?);
        for name in names {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
    }

    Ok(out)
}

pub fn run(project: &Project, names: &[String], all: bool) -> Result<()> {
    let targets = targets(project, names, all)?;
    log::header("Environment Updater");

    let mut missing: Vec<EnvError> = Vec::new();
    let mut failed = None;

    for target in &targets {
        let (name, dir) = match project.require_venv(target) {
            Ok(found) => found,
            Err(e) => {
                log::failure(&e.to_string());
                missing.push(e);
                continue;
            }
        };

        log::info(&format!("\n[INFO] Updating {} environment...", name));
        let upgrade = venv::pip_install(&dir).arg("--upgrade").args(TOOLING);

        match upgrade.run() {
            Ok(()) => log::success(&format!("{} updated successfully", name)),
            Err(e) => {
                log::failure(&format!("{}: {}", name, e));
                failed.get_or_insert(e);
            }
        }
    }

    if !missing.is_empty() {
        if targets.len() > 1 {
            log::warn("Some environments could not be updated.");
        }
        return Err(missing.remove(0));
    }
    if let Some(e) = failed {
        return Err(e);
    }

    log::success("All environments updated successfully.");
    Ok(())
}
