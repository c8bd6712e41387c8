use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EnvironmentSpec;
use crate::errors::{EnvError, Result};
use crate::locator::{self, Locator};
use crate::progress::Progress;
use crate::project::Project;
use crate::{log, scaffold, tui, venv};

pub struct SetupOptions {
    pub name: Option<String>,
    pub python: Option<PathBuf>,
    pub yes: bool,
    pub dry_run: bool,
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Created,
    Existing,
}

/// A single environment to provision
struct Plan<'a> {
    spec: &'a EnvironmentSpec,
    name: String,
    dir: PathBuf,
    python: PathBuf,
}

pub fn run(project: &Project, opts: SetupOptions) -> Result<()> {
    let cfg = &project.config;
    let interactive = !opts.yes && locator::stdin_is_interactive();

    let base_name = match opts.name {
        Some(name) => name,
        None if interactive => tui::prompt_with_default(
            "Base name for your virtual environments:",
            &project.base_name,
        )?,
        None => project.base_name.clone(),
    };

    let base_python = match &opts.python {
        Some(path) => locator::validate_interpreter(path)?,
        None => locator::locate_or_prompt(&Locator::new(cfg.python.clone()), interactive)?,
    };
    log::success(&format!("Python interpreter: {}", base_python.display()));

    let plans: Vec<Plan> = cfg
        .environments
        .iter()
        .map(|spec| Plan {
            spec,
            name: project.env_name(&base_name, spec),
            dir: project.env_dir(&base_name, spec),
            python: pinned_interpreter(opts.python.is_some(), spec, &base_python),
        })
        .collect();

    if opts.dry_run {
        print_plan(project, &plans);
        return Ok(());
    }

    fs::create_dir_all(&project.workon_home)?;
    project.record_base_name(&base_name)?;
    project.custom_venvs().touch()?;

    scaffold::run(&project.root, &cfg.directories)?;

    log::header("Creating Virtual Environments");
    let progress = Progress::new(plans.len());
    let mut created = Vec::new();
    let mut failed = 0usize;

    for plan in &plans {
        progress.start_step(&plan.name);

        match create_environment(project, plan, &cfg.bootstrap_packages, &progress) {
            Ok(Outcome::Created) => {
                progress.println(format!("✔ Created {} at {}", plan.name, plan.dir.display()));
                created.push(plan.name.clone());
            }
            Ok(Outcome::Existing) => {
                progress.println(format!(
                    "• Environment '{}' already exists at {}",
                    plan.name,
                    plan.dir.display()
                ));
                created.push(plan.name.clone());
            }
            Err(e) => {
                progress.println(format!("✘ Failed to create {}: {}", plan.name, e));
                failed += 1;
            }
        }

        progress.finish_step();
    }
    progress.finish();

    log::header("Setup Summary");
    log::info(&format!(
        "Environments ready: {}/{}",
        created.len(),
        plans.len()
    ));
    if !created.is_empty() {
        log::success(&format!("Virtual environments: {}", created.join(", ")));
    }
    log::success(&format!("Environment home: {}", project.workon_home.display()));
    log::info("Run `wvenv switch` to activate an environment.");

    if failed > 0 {
        return Err(EnvError::SetupIncomplete(failed));
    }

    log::info("\nSetup completed successfully!");
    Ok(())
}

/// A pinned version (`python = "3.11"`) is honoured when that interpreter is
/// on PATH; an explicit `--python` always wins.
fn pinned_interpreter(explicit: bool, spec: &EnvironmentSpec, base: &Path) -> PathBuf {
    if explicit {
        return base.to_path_buf();
    }

    let Some(version) = spec.python.as_deref() else {
        return base.to_path_buf();
    };

    match Locator::new(vec![format!("python{}", version)]).resolve() {
        Some(found) => found,
        None => {
            log::warn(&format!(
                "python{} not found for '{}', using {}",
                version,
                spec.name,
                base.display()
            ));
            base.to_path_buf()
        }
    }
}

fn create_environment(
    project: &Project,
    plan: &Plan,
    bootstrap: &[String],
    progress: &Progress,
) -> Result<Outcome> {
    if plan.dir.exists() {
        return Ok(Outcome::Existing);
    }

    let create = venv::create_invocation(&plan.python, &plan.dir, &plan.name);
    let result = create.output()?;
    if !result.success() {
        progress.suspend(|| log::print_command_output(&plan.name, &result));
        return Err(EnvError::CommandFailed(create.to_string(), result.exit_code));
    }

    venv::write_activation_hooks(&plan.dir, &plan.name, &project.root, plan.spec.entry.as_deref())?;

    if !bootstrap.is_empty() {
        let install = venv::pip_install(&plan.dir).args(bootstrap);
        match install.output() {
            Ok(r) if r.success() => {
                tracing::debug!(env = %plan.name, "bootstrap packages installed");
            }
            Ok(r) => progress.println(format!(
                "⚠ {}: bootstrap packages failed to install (exit={})",
                plan.name, r.exit_code
            )),
            Err(e) => progress.println(format!(
                "⚠ {}: bootstrap packages failed to install: {}",
                plan.name, e
            )),
        }
    }

    Ok(Outcome::Created)
}

fn print_plan(project: &Project, plans: &[Plan]) {
    log::header("Setup Plan (dry run)");
    log::info(&format!("Environment home: {}", project.workon_home.display()));

    log::info("\nDirectories:");
    for dir in &project.config.directories {
        log::info(&format!("  {}", project.root.join(dir).display()));
    }

    log::info("\nEnvironments:");
    for plan in plans {
        let state = if plan.dir.exists() { "exists" } else { "create" };
        log::info(&format!(
            "  [{}] {}",
            state,
            venv::create_invocation(&plan.python, &plan.dir, &plan.name)
        ));
    }
}
