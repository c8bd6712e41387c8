use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const STAMP_FILE: &str = ".wvenv-manifest.sha256";

/// Hash the manifest contents together with the requested package set
pub fn compute_hash(manifest: &Path, packages: &[String]) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(fs::read(manifest)?);

    for pkg in packages {
        hasher.update([0u8]);
        hasher.update(pkg.as_bytes());
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn stamp_path(env_dir: &Path) -> PathBuf {
    env_dir.join(STAMP_FILE)
}

pub fn is_current(env_dir: &Path, hash: &str) -> bool {
    fs::read_to_string(stamp_path(env_dir))
        .map(|prev| prev.trim() == hash)
        .unwrap_or(false)
}

pub fn record(env_dir: &Path, hash: &str) -> Result<()> {
    fs::write(stamp_path(env_dir), hash)?;
    Ok(())
}
