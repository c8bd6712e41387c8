mod cache;
mod clean;
mod cli;
mod config;
mod custom;
mod doctor;
mod errors;
mod init;
mod install;
mod locator;
mod log;
mod progress;
mod project;
mod root;
mod runner;
mod scaffold;
mod setup;
mod switcher;
mod templates;
mod tui;
mod update;
mod venv;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use std::env;

use cli::{Cli, Command, Shell};
use errors::Result;
use project::Project;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    log::init(cli.verbose);

    let code = run_main(cli)?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Returns the process exit code for commands that pass one through (`switch`)
pub fn run_main(cli: Cli) -> Result<i32> {
    let cwd = env::current_dir()?;

    // --------------------------------------------------
    // Commands that do not need a project
    // --------------------------------------------------
    let command = match cli.command {
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            let out = &mut std::io::stdout();

            match shell {
                Shell::Bash => generate(shells::Bash, &mut cmd, "wvenv", out),
                Shell::Zsh => generate(shells::Zsh, &mut cmd, "wvenv", out),
                Shell::Fish => generate(shells::Fish, &mut cmd, "wvenv", out),
            }

            return Ok(0);
        }

        Some(Command::Init { template }) => {
            let template = match template {
                Some(t) => t,
                None if locator::stdin_is_interactive() => tui::select_template()?,
                None => "wastevision".to_string(),
            };
            init::init(&cwd, &template)?;
            return Ok(0);
        }

        Some(command) => command,

        None => {
            if !locator::stdin_is_interactive() {
                Cli::command().print_help()?;
                return Ok(0);
            }
            let project = Project::discover(&cwd)?;
            return main_menu(&project);
        }
    };

    // --------------------------------------------------
    // Project-scoped commands
    // --------------------------------------------------
    let project = Project::discover(&cwd)?;
    dispatch(&project, command)
}

fn dispatch(project: &Project, command: Command) -> Result<i32> {
    match command {
        Command::Setup {
            name,
            python,
            yes,
            dry_run,
        } => setup::run(
            project,
            setup::SetupOptions {
                name,
                python,
                yes,
                dry_run,
            },
        )?,

        Command::Scaffold => scaffold::run(&project.root, &project.config.directories)?,

        Command::Locate { python, env } => {
            let version = match env.as_deref() {
                Some(name) => {
                    let spec = project.find_environment(name).ok_or_else(|| {
                        errors::EnvError::EnvironmentNotFound {
                            name: name.to_string(),
                            path: project.workon_home.join(name),
                        }
                    })?;
                    spec.python.clone()
                }
                None => None,
            };

            let candidates = locator::candidates_for(&project.config.python, version.as_deref());
            let path = locator::resolve_interpreter(python.as_deref(), candidates)?;
            println!("{}", path.display());
        }

        Command::Install {
            env,
            manifest,
            extras,
            each,
            force,
            system,
            python,
        } => install::run(
            project,
            install::InstallOptions {
                env,
                manifest,
                extras,
                each,
                force,
                system,
                python,
            },
        )?,

        Command::Switch {
            target,
            list,
            add,
            path,
            print,
        } => {
            return switcher::run(
                project,
                switcher::SwitchOptions {
                    target,
                    list,
                    add,
                    path,
                    print,
                },
            )
        }

        Command::Update { names, all } => update::run(project, &names, all)?,

        Command::Clean { yes, dry_run } => {
            clean::run(project, clean::CleanOptions { yes, dry_run })?
        }

        Command::Doctor => doctor::run(project)?,

        Command::Init { .. } | Command::Completions { .. } => {
            unreachable!("handled before project discovery")
        }
    }

    Ok(0)
}

/// Top-level menu shown when no subcommand is given on a terminal
fn main_menu(project: &Project) -> Result<i32> {
    let actions = [
        ("Setup", "Create directories and all environments"),
        ("Switch", "Activate an environment"),
        ("Install", "Install dependencies into the active environment"),
        ("Update", "Upgrade pip and setuptools in every environment"),
        ("Clean", "Remove caches and training outputs"),
        ("Doctor", "Check project health"),
        ("Exit", ""),
    ];

    let labels = actions
        .iter()
        .map(|(name, desc)| format!("{:<8} {}", name, desc))
        .collect();
    let idx = tui::select_index("What would you like to do?", labels)?;

    let command = match actions[idx].0 {
        "Setup" => Command::Setup {
            name: None,
            python: None,
            yes: false,
            dry_run: false,
        },
        "Switch" => Command::Switch {
            target: None,
            list: false,
            add: None,
            path: None,
            print: false,
        },
        "Install" => Command::Install {
            env: None,
            manifest: None,
            extras: Vec::new(),
            each: false,
            force: false,
            system: false,
            python: None,
        },
        "Update" => Command::Update {
            names: Vec::new(),
            all: false,
        },
        "Clean" => Command::Clean {
            yes: false,
            dry_run: false,
        },
        "Doctor" => Command::Doctor,
        _ => {
            log::info("Exiting...");
            return Ok(0);
        }
    };

    dispatch(project, command)
}
