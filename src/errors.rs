use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum EnvError {
    #[error("No Python interpreter found (tried: {0})")]
    #[diagnostic(
        code(wvenv::python::not_found),
        help("Install Python, add it to PATH, or pass `--python /path/to/python`.")
    )]
    InterpreterNotFound(String),

    #[error("Not a usable Python interpreter ({reason}): {}", .path.display())]
    #[diagnostic(
        code(wvenv::python::invalid),
        help("Point at an existing, executable interpreter binary.")
    )]
    InvalidInterpreter { path: PathBuf, reason: String },

    #[error("Environment '{name}' not found at {}", .path.display())]
    #[diagnostic(
        code(wvenv::env::not_found),
        help("Run `wvenv setup` to create the configured environments, or `wvenv switch --list` to see what exists.")
    )]
    EnvironmentNotFound { name: String, path: PathBuf },

    #[error("Invalid choice: {0}")]
    #[diagnostic(
        code(wvenv::menu::choice),
        help("Pick one of the numbers shown by `wvenv switch --list`.")
    )]
    InvalidChoice(String),

    #[error("No target environment for installation")]
    #[diagnostic(
        code(wvenv::install::no_target),
        help("Activate a virtual environment, pass `--env <name>`, or use `--system` to install into the base interpreter.")
    )]
    NoTargetEnvironment,

    #[error("Manifest not found: {}", .0.display())]
    #[diagnostic(
        code(wvenv::install::manifest),
        help("Pass `--manifest <file>` or set `manifest` in wvenv.toml.")
    )]
    ManifestNotFound(PathBuf),

    #[error("`{0}` failed")]
    #[diagnostic(
        code(wvenv::exec::failed),
        help("The command exited with code {1}. See output above for details.")
    )]
    CommandFailed(String, i32),

    #[error("{0} package(s) failed to install: {1}")]
    #[diagnostic(code(wvenv::install::incomplete))]
    InstallIncomplete(usize, String),

    #[error("{0} item(s) could not be removed")]
    #[diagnostic(
        code(wvenv::clean::incomplete),
        help("Check file permissions or close programs holding these files open.")
    )]
    CleanIncomplete(usize),

    #[error("{0} environment(s) could not be created")]
    #[diagnostic(code(wvenv::setup::incomplete))]
    SetupIncomplete(usize),

    #[error("Operation cancelled")]
    #[diagnostic(
        code(wvenv::prompt::cancelled),
        help("Re-run with `--yes` to skip the confirmation prompt.")
    )]
    Cancelled,

    #[error("Project already initialized")]
    #[diagnostic(
        code(wvenv::init::exists),
        help("A wvenv.toml already exists. Delete it if you want to re-initialize.")
    )]
    AlreadyInitialized,

    #[error("Unknown template '{0}'")]
    #[diagnostic(code(wvenv::init::template), help("Available templates: {1}"))]
    UnknownTemplate(String, String),

    #[error("Invalid configuration in {}", .path.display())]
    #[diagnostic(code(wvenv::config::invalid), help("{message}"))]
    InvalidConfig { path: PathBuf, message: String },

    #[error(transparent)]
    #[diagnostic(code(wvenv::system::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(wvenv::system::other))]
    Anyhow(#[from] anyhow::Error),
}

impl From<inquire::InquireError> for EnvError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => EnvError::Cancelled,
            other => EnvError::Anyhow(anyhow::anyhow!(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnvError>;
