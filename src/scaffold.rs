use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::log;

#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

impl ScaffoldReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.existing.len()
    }
}

/// Create every directory (with parents) under `root`. Directories already
/// present are left alone; nothing is rolled back if a later one fails.
pub fn scaffold(root: &Path, directories: &[String]) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();

    for dir in directories {
        let full = root.join(dir);

        if full.is_dir() {
            log::skipped(&format!("Already exists: {}", full.display()));
            report.existing.push(full);
            continue;
        }

        fs::create_dir_all(&full)
            .with_context(|| format!("Failed to create {}", full.display()))?;

        log::success(&format!("Created: {}", full.display()));
        report.created.push(full);
    }

    tracing::debug!(
        created = report.created.len(),
        existing = report.existing.len(),
        "scaffold finished"
    );

    Ok(report)
}

pub fn run(root: &Path, directories: &[String]) -> Result<()> {
    log::header("Project Directory Setup");
    log::info(&format!("Base location: {}", root.display()));

    let report = scaffold(root, directories)?;
    log::info(&format!(
        "\nCreated {} new directories (of {} total)",
        report.created.len(),
        report.total()
    ));

    Ok(())
}
