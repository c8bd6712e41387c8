use std::env;
use std::path::{Path, PathBuf};

use crate::errors::{EnvError, Result};
use crate::project::Project;
use crate::runner::Invocation;
use crate::{locator, log, tui, venv};

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    Configured(String),
    Custom(String),
    AddCustom,
    Exit,
}

impl MenuEntry {
    pub fn label(&self) -> String {
        match self {
            MenuEntry::Configured(suffix) => format!("{} Environment", suffix.to_uppercase()),
            MenuEntry::Custom(entry) => format!("Custom Environment: {}", entry),
            MenuEntry::AddCustom => "Add Custom Venv".to_string(),
            MenuEntry::Exit => "Exit".to_string(),
        }
    }
}

/// Configured environments, then custom entries, then Add and Exit
pub fn build_menu(project: &Project, custom: &[String]) -> Vec<MenuEntry> {
    project
        .config
        .environments
        .iter()
        .map(|spec| MenuEntry::Configured(spec.name.clone()))
        .chain(custom.iter().cloned().map(MenuEntry::Custom))
        .chain([MenuEntry::AddCustom, MenuEntry::Exit])
        .collect()
}

/// Map a 1-based menu number to its entry
pub fn resolve_choice<'a>(menu: &'a [MenuEntry], choice: &str) -> Result<&'a MenuEntry> {
    choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| menu.get(idx))
        .ok_or_else(|| EnvError::InvalidChoice(choice.trim().to_string()))
}

pub fn print_menu(menu: &[MenuEntry]) {
    log::info("Select the virtual environment to activate:");
    for (i, entry) in menu.iter().enumerate() {
        log::info(&format!("{}. {}", i + 1, entry.label()));
    }
}

/// The line recorded for a new custom environment. A name alone is kept when it
/// resolves inside the environment home; otherwise the path is what gets stored.
pub fn custom_entry(project: &Project, name: Option<&str>, path: Option<&Path>) -> Option<String> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let path = path.filter(|p| !p.as_os_str().is_empty());

    match (name, path) {
        (Some(name), None) => Some(name.to_string()),
        (None, Some(path)) => Some(project.path(path).display().to_string()),
        (Some(name), Some(path)) => {
            if project.path(path) == project.workon_home.join(name) {
                Some(name.to_string())
            } else {
                tracing::debug!(name, path = %path.display(), "storing path for custom environment");
                Some(project.path(path).display().to_string())
            }
        }
        (None, None) => None,
    }
}

pub struct SwitchOptions {
    pub target: Option<String>,
    pub list: bool,
    pub add: Option<String>,
    pub path: Option<PathBuf>,
    pub print: bool,
}

/// Returns the exit code of the activated shell (0 when nothing was spawned)
pub fn run(project: &Project, opts: SwitchOptions) -> Result<i32> {
    let custom = project.custom_venvs();

    if opts.add.is_some() || opts.path.is_some() {
        let entry = custom_entry(project, opts.add.as_deref(), opts.path.as_deref())
            .ok_or_else(|| EnvError::InvalidChoice("empty custom environment".to_string()))?;
        custom.append(&entry)?;
        log::success(&format!("Added custom environment '{}'", entry));
        return Ok(0);
    }

    let menu = build_menu(project, &custom.load()?);

    if opts.list {
        print_menu(&menu);
        return Ok(0);
    }

    let selected = match opts.target.as_deref() {
        Some(t) if t.trim().parse::<usize>().is_ok() => resolve_choice(&menu, t)?.clone(),
        Some(name) => return activate(project, name, opts.print),
        None => {
            if !locator::stdin_is_interactive() {
                print_menu(&menu);
                return Err(EnvError::InvalidChoice(
                    "no selection given and stdin is not a terminal".to_string(),
                ));
            }
            let labels = menu.iter().map(MenuEntry::label).collect();
            let idx = tui::select_index("Select the virtual environment to activate:", labels)?;
            menu[idx].clone()
        }
    };

    match selected {
        MenuEntry::Configured(name) | MenuEntry::Custom(name) => {
            activate(project, &name, opts.print)
        }
        MenuEntry::AddCustom => {
            let path = tui::prompt_optional("Enter the custom path to the virtual environment:")?;
            let name = tui::prompt_optional("Enter a name for the environment:")?;
            let entry = custom_entry(project, name.as_deref(), path.as_deref().map(Path::new))
                .ok_or_else(|| EnvError::InvalidChoice("empty custom environment".to_string()))?;
            custom.append(&entry)?;
            activate(project, &entry, opts.print)
        }
        MenuEntry::Exit => {
            log::info("Exiting...");
            Ok(0)
        }
    }
}

fn activate(project: &Project, name: &str, print_only: bool) -> Result<i32> {
    let (name, dir) = project.require_venv(name)?;

    if print_only {
        println!("{}", venv::activate_script(&dir).display());
        return Ok(0);
    }

    log::info(&format!("Activating virtual environment {}...", name));
    let mut shell = Invocation::new(user_shell()).env_remove("PYTHONHOME");
    for (key, value) in venv::activation_env(&dir)? {
        shell = shell.env(key, value);
    }
    shell = shell.env("VENV_NAME", &name);

    log::success(&format!("Virtual environment {} activated. Exit the shell to return.", name));
    let code = shell.status()?;
    tracing::debug!(env = %name, code, "shell exited");
    Ok(code)
}

fn user_shell() -> PathBuf {
    let var = if cfg!(windows) { "COMSPEC" } else { "SHELL" };
    let fallback = if cfg!(windows) { "cmd.exe" } else { "/bin/sh" };

    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}
