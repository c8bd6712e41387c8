use anyhow::anyhow;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CleanConfig;
use crate::errors::{EnvError, Result};
use crate::project::Project;
use crate::{locator, log, tui};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
}

#[derive(Debug, Default)]
pub struct CleanPlan {
    pub targets: Vec<CleanTarget>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CleanReport {
    pub removed: usize,
    pub failed: usize,
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).map_err(|e| anyhow!("Invalid clean pattern '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| anyhow!(e))?;
    Ok(set)
}

impl CleanPlan {
    /// Walk `root` collecting cache directories (not descended into), files
    /// matching the patterns, and the direct children of purge directories.
    /// Trees under `skip` are left alone.
    pub fn scan(root: &Path, cfg: &CleanConfig, skip: &[PathBuf]) -> Result<Self> {
        let files = build_globset(&cfg.file_patterns)?;
        let purge: Vec<PathBuf> = cfg.purge.iter().map(|p| root.join(p)).collect();
        let mut targets = Vec::new();

        // Purge directories are emptied wholesale below
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !purge.iter().chain(skip).any(|p| p == e.path()));

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if cfg.dir_names.iter().any(|d| *d == name) {
                    targets.push(CleanTarget {
                        path: path.to_path_buf(),
                        kind: TargetKind::Dir,
                    });
                    walker.skip_current_dir();
                }
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if files.is_match(relative) {
                targets.push(CleanTarget {
                    path: path.to_path_buf(),
                    kind: TargetKind::File,
                });
            }
        }

        for dir in &purge {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let kind = match entry.file_type() {
                    Ok(t) if t.is_dir() => TargetKind::Dir,
                    _ => TargetKind::File,
                };
                targets.push(CleanTarget {
                    path: entry.path(),
                    kind,
                });
            }
        }

        targets.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { targets })
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn execute(&self) -> CleanReport {
        let mut report = CleanReport::default();

        for target in &self.targets {
            let result = match target.kind {
                TargetKind::Dir => fs::remove_dir_all(&target.path),
                TargetKind::File => fs::remove_file(&target.path),
            };

            match result {
                Ok(()) => report.removed += 1,
                // Already gone (e.g. a parent was removed first)
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.removed += 1,
                Err(e) => {
                    log::warn(&format!("Failed to remove {}: {}", target.path.display(), e));
                    report.failed += 1;
                }
            }
        }

        report
    }
}

pub struct CleanOptions {
    pub yes: bool,
    pub dry_run: bool,
}

pub fn run(project: &Project, opts: CleanOptions) -> Result<()> {
    let root = &project.root;
    let cfg = &project.config.clean;
    log::info(&format!("Cleaning project at: {}", root.display()));

    let skip = if cfg.include_environments {
        Vec::new()
    } else {
        vec![project.workon_home.clone()]
    };
    let plan = CleanPlan::scan(root, cfg, &skip)?;
    if plan.is_empty() {
        log::success("Nothing to clean");
        return Ok(());
    }

    for target in &plan.targets {
        let suffix = if target.kind == TargetKind::Dir { "/" } else { "" };
        log::info(&format!("  {}{}", target.path.display(), suffix));
    }

    if opts.dry_run {
        log::info(&format!("\n{} item(s) would be removed (dry run)", plan.targets.len()));
        return Ok(());
    }

    if !opts.yes {
        if !locator::stdin_is_interactive() {
            return Err(EnvError::Cancelled);
        }
        let prompt = format!("Remove these {} item(s)?", plan.targets.len());
        if !tui::confirm(&prompt, false)? {
            return Err(EnvError::Cancelled);
        }
    }

    let report = plan.execute();
    if report.failed > 0 {
        return Err(EnvError::CleanIncomplete(report.failed));
    }

    log::success(&format!("Cleanup complete! Removed {} item(s)", report.removed));
    Ok(())
}
