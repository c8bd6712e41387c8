#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

// Stand-in interpreter. Every call is logged; `-m venv DIR` lays out DIR/bin with a
// copy of itself; pip fails for any argument listed in FAKE_PIP_FAIL.
const FAKE_PYTHON: &str = r#"#!/bin/sh
echo "$@" >> "${FAKE_PY_LOG:-/dev/null}"
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    if [ -n "$FAKE_VENV_EXIT" ]; then
        exit "$FAKE_VENV_EXIT"
    fi
    mkdir -p "$3/bin"
    cp "$0" "$3/bin/python"
    printf '# activate\n' > "$3/bin/activate"
    exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    for arg in "$@"; do
        case " $FAKE_PIP_FAIL " in
            *" $arg "*) exit 1 ;;
        esac
    done
fi
exit 0
"#;

struct Sandbox {
    _temp: TempDir,
    root: PathBuf,
    python: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = tempdir().unwrap();
        // wvenv sees the resolved cwd; compare against the same spelling
        let root = temp.path().canonicalize().unwrap();
        let bin = root.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python3");
        fs::write(&python, FAKE_PYTHON).unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            _temp: temp,
            root,
            python,
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn log(&self) -> String {
        fs::read_to_string(self.root().join("calls.log")).unwrap_or_default()
    }

    fn wvenv(&self) -> Command {
        let mut cmd = Command::cargo_bin("wvenv").unwrap();
        cmd.current_dir(self.root())
            .env_remove("WORKON_HOME")
            .env_remove("VIRTUAL_ENV")
            .env_remove("FAKE_PIP_FAIL")
            .env_remove("FAKE_VENV_EXIT")
            .env("FAKE_PY_LOG", self.root().join("calls.log"))
            .env("NO_COLOR", "1");
        cmd
    }

    fn setup(&self, name: &str) -> Command {
        let mut cmd = self.wvenv();
        cmd.args(["setup", "--yes", "--name", name])
            .arg("--python")
            .arg(&self.python);
        cmd
    }

    /// An environment made the way `setup` would, without going through it
    fn make_env(&self, dir: &Path) {
        let bin = dir.join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::copy(&self.python, bin.join("python")).unwrap();
        fs::set_permissions(bin.join("python"), fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[test]
fn test_setup_creates_environments_and_remembers_base_name() {
    let sb = Sandbox::new();

    sb.setup("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environments ready: 4/4"))
        .stdout(predicate::str::contains("Setup completed successfully!"));

    let yolo = sb.root().join("venvs/demo_yolo");
    assert!(yolo.join("bin/python").is_file());
    assert!(sb.root().join("venvs/demo_fast-rcc/bin/python").is_file());
    assert!(sb.root().join("venvs/custom_venvs.txt").is_file());
    assert!(sb.root().join("dataset/valid").is_dir());

    let activate = fs::read_to_string(yolo.join("bin/activate")).unwrap();
    assert!(activate.contains("export VENV_NAME=\"demo_yolo\""));
    assert!(activate.contains(&format!("export VENV_PATH=\"{}\"", yolo.display())));

    let log = sb.log();
    assert!(log.contains(&format!("-m venv {} --prompt demo_yolo", yolo.display())));
    assert!(log.contains("-m pip install wheel tomli"));

    sb.wvenv()
        .args(["switch", "1", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo_yolo/bin/activate"));

    sb.wvenv()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment demo_vit ready"));
}

#[test]
fn test_setup_writes_post_activate_hook_for_entry() {
    let sb = Sandbox::new();
    fs::write(
        sb.root().join("wvenv.toml"),
        "directories = []\n\n[[environments]]\nname = \"app\"\nentry = \"pkg.main\"\n",
    )
    .unwrap();

    sb.setup("wv-venv").assert().success();

    let bin = sb.root().join("venvs/wv-venv_app/bin");
    let post = fs::read_to_string(bin.join("post_activate")).unwrap();
    assert!(post.contains("python -m pkg.main"));
    assert!(post.contains(&format!("cd \"{}\"", sb.root().display())));

    let activate = fs::read_to_string(bin.join("activate")).unwrap();
    assert!(activate.contains(&format!(". \"{}\"", bin.join("post_activate").display())));
}

#[test]
fn test_setup_skips_existing_environment() {
    let sb = Sandbox::new();
    fs::create_dir_all(sb.root().join("venvs/wv-venv_vit")).unwrap();

    sb.setup("wv-venv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment 'wv-venv_vit' already exists"));

    assert!(!sb.log().contains("--prompt wv-venv_vit"));
    assert!(sb.log().contains("--prompt wv-venv_ssd"));
}

#[test]
fn test_setup_bootstrap_failure_is_only_a_warning() {
    let sb = Sandbox::new();

    sb.setup("wv-venv")
        .env("FAKE_PIP_FAIL", "wheel")
        .assert()
        .success()
        .stdout(predicate::str::contains("bootstrap packages failed to install"))
        .stdout(predicate::str::contains("Environments ready: 4/4"));
}

#[test]
fn test_setup_fails_when_venv_creation_fails() {
    let sb = Sandbox::new();

    sb.setup("wv-venv")
        .env("FAKE_VENV_EXIT", "3")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Environments ready: 0/4"))
        .stderr(predicate::str::contains("4 environment(s) could not be created"));

    assert!(!sb.root().join("venvs/wv-venv_yolo").exists());
}

#[test]
fn test_install_skips_when_manifest_unchanged() {
    let sb = Sandbox::new();
    sb.make_env(&sb.root().join("venvs/wv-venv_yolo"));
    fs::write(sb.root().join("requirements.txt"), "numpy\ntorch\n").unwrap();

    sb.wvenv()
        .args(["install", "--env", "yolo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All packages installed into wv-venv_yolo"));

    let installs = || sb.log().matches("-m pip install -r").count();
    assert_eq!(installs(), 1);
    assert!(sb
        .root()
        .join("venvs/wv-venv_yolo/.wvenv-manifest.sha256")
        .is_file());

    sb.wvenv()
        .args(["install", "--env", "yolo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is up to date"));
    assert_eq!(installs(), 1);

    sb.wvenv()
        .args(["install", "--env", "yolo", "--force"])
        .assert()
        .success();
    assert_eq!(installs(), 2);

    fs::write(sb.root().join("requirements.txt"), "numpy\ntorch\nscipy\n").unwrap();
    sb.wvenv()
        .args(["install", "--env", "yolo"])
        .assert()
        .success();
    assert_eq!(installs(), 3);
}

#[test]
fn test_install_each_continues_past_failures() {
    let sb = Sandbox::new();
    let env = sb.root().join("venvs/wv-venv_ssd");
    sb.make_env(&env);
    fs::write(sb.root().join("requirements.txt"), "numpy\nbroken-pkg\ntorch\n").unwrap();

    sb.wvenv()
        .args(["install", "--env", "ssd", "--each"])
        .env("FAKE_PIP_FAIL", "broken-pkg")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 package(s) failed to install: broken-pkg"));

    let log = sb.log();
    assert!(log.contains("-m pip install numpy"));
    assert!(log.contains("-m pip install torch"));
    assert!(!env.join(".wvenv-manifest.sha256").exists());
}

#[test]
fn test_install_system_ignores_active_environment() {
    let sb = Sandbox::new();
    let active = sb.root().join("active-env");
    fs::create_dir_all(active.join("bin")).unwrap();
    let broken = active.join("bin/python");
    fs::write(&broken, "#!/bin/sh\nexit 9\n").unwrap();
    fs::set_permissions(&broken, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(sb.root().join("requirements.txt"), "numpy\n").unwrap();

    sb.wvenv()
        .args(["install", "--system", "--python"])
        .arg(&sb.python)
        .env("VIRTUAL_ENV", &active)
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring active environment"))
        .stdout(predicate::str::contains("All packages installed into system interpreter"));

    assert!(sb.log().contains("-m pip install -r"));
    assert!(!active.join(".wvenv-manifest.sha256").exists());
}
