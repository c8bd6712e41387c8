use anyhow::Context;
use std::env;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::runner::Invocation;

const BIN_DIR: &str = if cfg!(windows) { "Scripts" } else { "bin" };

pub fn bin_dir(env_dir: &Path) -> PathBuf {
    env_dir.join(BIN_DIR)
}

pub fn python_path(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        bin_dir(env_dir).join("python.exe")
    } else {
        bin_dir(env_dir).join("python")
    }
}

pub fn activate_script(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        bin_dir(env_dir).join("activate.bat")
    } else {
        bin_dir(env_dir).join("activate")
    }
}

fn post_activate_script(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        bin_dir(env_dir).join("post_activate.bat")
    } else {
        bin_dir(env_dir).join("post_activate")
    }
}

/// A directory counts as a virtual environment once it has an interpreter
pub fn is_venv(env_dir: &Path) -> bool {
    python_path(env_dir).is_file()
}

/// The environment activated in the calling shell, if any
pub fn active_venv() -> Option<PathBuf> {
    env::var_os("VIRTUAL_ENV")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Look for a conventional in-project environment directory
pub fn detect_local_venv(root: &Path) -> Option<PathBuf> {
    [".venv", "venv"]
        .iter()
        .map(|name| root.join(name))
        .find(|dir| is_venv(dir))
}

/// `python -m venv <dir> --prompt <name>`
pub fn create_invocation(python: &Path, env_dir: &Path, prompt: &str) -> Invocation {
    Invocation::new(python)
        .args(["-m", "venv"])
        .arg(env_dir)
        .arg("--prompt")
        .arg(prompt)
}

/// `python -m pip install <packages..>` using the environment's interpreter
pub fn pip_install(env_dir: &Path) -> Invocation {
    Invocation::new(python_path(env_dir)).args(["-m", "pip", "install"])
}

/// Environment overrides that make `env_dir` the active environment for a child process
pub fn activation_env(env_dir: &Path) -> Result<Vec<(String, OsString)>> {
    let mut paths = vec![bin_dir(env_dir)];
    if let Some(current) = env::var_os("PATH") {
        paths.extend(env::split_paths(&current));
    }
    let path = env::join_paths(paths).context("PATH contains an invalid entry")?;

    Ok(vec![
        ("VIRTUAL_ENV".to_string(), env_dir.as_os_str().to_os_string()),
        ("PATH".to_string(), path),
    ])
}

/// Append identifying exports to the activation script and, when the
/// environment has an entry module, hook a post-activation script that runs it.
pub fn write_activation_hooks(
    env_dir: &Path,
    env_name: &str,
    project_root: &Path,
    entry: Option<&str>,
) -> Result<()> {
    let activate = activate_script(env_dir);
    let mut file = OpenOptions::new()
        .append(true)
        .open(&activate)
        .with_context(|| format!("Failed to open {}", activate.display()))?;

    if cfg!(windows) {
        writeln!(file)?;
        writeln!(file, "set VENV_NAME={}", env_name)?;
        writeln!(file, "set VENV_PATH={}", env_dir.display())?;
        writeln!(file, "set VENV_MAIN={}", project_root.display())?;
    } else {
        writeln!(file)?;
        writeln!(file, "export VENV_NAME=\"{}\"", env_name)?;
        writeln!(file, "export VENV_PATH=\"{}\"", env_dir.display())?;
        writeln!(file, "export VENV_MAIN=\"{}\"", project_root.display())?;
    }

    let Some(module) = entry else {
        return Ok(());
    };

    let post = post_activate_script(env_dir);
    if cfg!(windows) {
        fs::write(
            &post,
            format!(
                "@echo off\ncd \"{}\"\npython -m {}\n",
                project_root.display(),
                module
            ),
        )?;
        writeln!(file, "\ncall \"{}\"", post.display())?;
    } else {
        fs::write(
            &post,
            format!(
                "#!/bin/sh\ncd \"{}\"\npython -m {}\n",
                project_root.display(),
                module
            ),
        )?;
        make_executable(&post)?;
        writeln!(file, "\n. \"{}\"", post.display())?;
    }

    tracing::debug!(env = env_name, module, "post-activation hook installed");
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fake_env(dir: &Path) {
        fs::create_dir_all(bin_dir(dir)).unwrap();
        fs::write(python_path(dir), "").unwrap();
        fs::write(activate_script(dir), "# activate\n").unwrap();
    }

    #[test]
    fn interpreter_marks_a_venv() {
        let temp = tempdir().unwrap();
        assert!(!is_venv(temp.path()));
        fake_env(temp.path());
        assert!(is_venv(temp.path()));
    }

    #[test]
    fn local_venv_prefers_dot_venv() {
        let temp = tempdir().unwrap();
        fake_env(&temp.path().join("venv"));
        assert_eq!(detect_local_venv(temp.path()), Some(temp.path().join("venv")));

        fake_env(&temp.path().join(".venv"));
        assert_eq!(detect_local_venv(temp.path()), Some(temp.path().join(".venv")));
    }

    #[test]
    fn activation_env_prepends_bin_dir() {
        let temp = tempdir().unwrap();
        let vars = activation_env(temp.path()).unwrap();

        let (_, path) = vars.iter().find(|(k, _)| k == "PATH").unwrap();
        let first = env::split_paths(path).next().unwrap();
        assert_eq!(first, bin_dir(temp.path()));

        let (_, venv) = vars.iter().find(|(k, _)| k == "VIRTUAL_ENV").unwrap();
        assert_eq!(venv, temp.path().as_os_str());
    }

    #[test]
    fn create_invocation_sets_prompt() {
        let inv = create_invocation(Path::new("python3"), Path::new("envs/a_yolo"), "a_yolo");
        let args: Vec<_> = inv.args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-m", "venv", "envs/a_yolo", "--prompt", "a_yolo"]);
    }

    #[test]
    fn hooks_append_exports_and_entry_script() {
        let temp = tempdir().unwrap();
        let env_dir = temp.path().join("wv_yolo");
        fake_env(&env_dir);

        write_activation_hooks(&env_dir, "wv_yolo", temp.path(), Some("scripts.models.yolov8.main"))
            .unwrap();

        let activate = fs::read_to_string(activate_script(&env_dir)).unwrap();
        assert!(activate.starts_with("# activate\n"));
        assert!(activate.contains("VENV_NAME"));
        assert!(activate.contains("wv_yolo"));
        assert!(activate.contains("post_activate"));

        let post = fs::read_to_string(post_activate_script(&env_dir)).unwrap();
        assert!(post.contains("python -m scripts.models.yolov8.main"));
    }

    #[test]
    fn hooks_without_entry_skip_post_script() {
        let temp = tempdir().unwrap();
        fake_env(temp.path());

        write_activation_hooks(temp.path(), "plain", temp.path(), None).unwrap();
        assert!(!post_activate_script(temp.path()).exists());
    }
}
