use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// User-added environments: one name or path per line, append-only.
/// No uniqueness is enforced and blank lines are skipped on read.
#[derive(Debug, Clone)]
pub struct CustomVenvs {
    path: PathBuf,
}

impl CustomVenvs {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the list file exists without touching existing content
    pub fn touch(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }

    pub fn load(&self) -> io::Result<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn append(&self, entry: &str) -> io::Result<()> {
        let entry = entry.trim();
        if entry.is_empty() || entry.contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "custom environment entry must be a single non-empty line",
            ));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", entry)?;
        tracing::debug!(entry, file = %self.path.display(), "custom environment recorded");
        Ok(())
    }
}
