use std::env;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::errors::{EnvError, Result};
use crate::{log, tui};

/// Probes an ordered list of interpreter names on a search path
#[derive(Debug, Clone)]
pub struct Locator {
    candidates: Vec<String>,
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl Locator {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            search_path: env::var_os("PATH"),
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Search `path` (PATH syntax) instead of the process PATH
    #[cfg(test)]
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// First candidate that resolves, in priority order
    pub fn resolve(&self) -> Option<PathBuf> {
        self.candidates.iter().find_map(|name| {
            let found = self.resolve_one(name);
            tracing::debug!(candidate = %name, found = ?found, "probed interpreter");
            found
        })
    }

    fn resolve_one(&self, name: &str) -> Option<PathBuf> {
        if looks_like_path(name) {
            return validate_interpreter(Path::new(name)).ok();
        }

        let paths = self.search_path.as_ref()?;
        which::which_in(name, Some(paths), &self.cwd).ok()
    }
}

fn looks_like_path(name: &str) -> bool {
    name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
}

/// Candidate list for an environment pinned to `version`: `python<version>` goes first
pub fn candidates_for(base: &[String], version: Option<&str>) -> Vec<String> {
    let mut out = Vec::with_capacity(base.len() + 1);
    if let Some(v) = version.map(str::trim).filter(|v| !v.is_empty()) {
        out.push(format!("python{}", v));
    }
    for name in base {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// The path must name an existing file; on POSIX it must also be executable.
pub fn validate_interpreter(path: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| EnvError::InvalidInterpreter {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let metadata = std::fs::metadata(path).map_err(|_| invalid("no such file"))?;
    if !metadata.is_file() {
        return Err(invalid("not a file"));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(invalid("not executable"));
        }
    }

    Ok(path.to_path_buf())
}

pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Resolve via the locator, falling back to asking the operator for an absolute path
pub fn locate_or_prompt(locator: &Locator, interactive: bool) -> Result<PathBuf> {
    if let Some(found) = locator.resolve() {
        return Ok(found);
    }

    let tried = locator.candidates().join(", ");
    if !interactive {
        return Err(EnvError::InterpreterNotFound(tried));
    }

    log::warn(&format!("No Python interpreter found on PATH (tried: {})", tried));
    let answer = tui::prompt_interpreter_path()?;
    let path = PathBuf::from(answer.trim());

    if !path.is_absolute() {
        return Err(EnvError::InvalidInterpreter {
            path,
            reason: "path must be absolute".to_string(),
        });
    }

    validate_interpreter(&path)
}

/// An explicit `--python` wins; otherwise locate (and maybe prompt)
pub fn resolve_interpreter(explicit: Option<&Path>, candidates: Vec<String>) -> Result<PathBuf> {
    match explicit {
        Some(path) => validate_interpreter(path),
        None => locate_or_prompt(&Locator::new(candidates), stdin_is_interactive()),
    }
}
