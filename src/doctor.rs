use crate::errors::Result;
use crate::locator::Locator;
use crate::project::Project;
use crate::root::ConfigSource;
use crate::{log, venv};

pub fn run(project: &Project) -> Result<()> {
    println!("wvenv doctor\n");

    // 1. Config detection
    match &project.source {
        ConfigSource::Defaults => {
            log::failure("No wvenv.toml found, using built-in defaults");
            log::info("  → Run: wvenv init");
        }
        source => log::success(&format!("Configuration loaded ({})", source.describe())),
    }

    // 2. Interpreter
    let locator = Locator::new(project.config.python.clone());
    match locator.resolve() {
        Some(path) => log::success(&format!("Python interpreter found ({})", path.display())),
        None => {
            log::failure(&format!(
                "No Python interpreter on PATH (tried: {})",
                locator.candidates().join(", ")
            ));
        }
    }

    match venv::active_venv() {
        Some(dir) => log::success(&format!("Active environment: {}", dir.display())),
        None => {
            if let Some(local) = venv::detect_local_venv(&project.root) {
                log::skipped(&format!("Local environment present: {}", local.display()));
            }
        }
    }

    // 3. Environments
    let base = &project.base_name;
    for spec in &project.config.environments {
        let dir = project.env_dir(base, spec);
        let name = project.env_name(base, spec);
        if venv::is_venv(&dir) {
            log::success(&format!("Environment {} ready", name));
        } else {
            log::failure(&format!("Environment {} missing ({})", name, dir.display()));
        }
    }

    let custom = project.custom_venvs();
    match custom.load() {
        Ok(entries) => log::skipped(&format!(
            "{} custom environment(s) recorded in {}",
            entries.len(),
            custom.path().display()
        )),
        Err(e) => log::failure(&format!("Custom environment list unreadable: {}", e)),
    }

    // 4. Directory scaffold
    let missing: Vec<&String> = project
        .config
        .directories
        .iter()
        .filter(|d| !project.root.join(d).is_dir())
        .collect();

    if missing.is_empty() {
        log::success("Project directories present");
    } else {
        log::failure(&format!(
            "Missing directories: {}",
            missing.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ));
        log::info("  → Run: wvenv scaffold");
    }

    println!("\nDoctor finished.");

    Ok(())
}
