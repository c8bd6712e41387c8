use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wvenv",
    version,
    about = "Python environment bootstrapper for multi-model ML projects",
    long_about = "wvenv locates a Python interpreter, creates one virtual environment per model family, scaffolds dataset and output directories, installs dependencies and cleans generated artifacts. Run without a subcommand for an interactive menu."
)]
pub struct Cli {
    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Write a wvenv.toml for this project
    Init {
        /// Name of the template to use
        template: Option<String>,
    },

    /// Create the environment home, project directories and every configured environment
    Setup {
        /// Base name for the environments (default from config)
        #[arg(long)]
        name: Option<String>,

        /// Interpreter used to create the environments
        #[arg(long)]
        python: Option<PathBuf>,

        /// Accept defaults without prompting
        #[arg(short, long)]
        yes: bool,

        /// Show what would be created without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Create the project directory structure only
    Scaffold,

    /// Print the Python interpreter that would be used
    Locate {
        /// Validate this interpreter instead of searching PATH
        #[arg(long)]
        python: Option<PathBuf>,

        /// Honour the pinned version of a configured environment
        #[arg(long)]
        env: Option<String>,
    },

    /// Install dependencies from a manifest into an environment
    Install {
        /// Target environment (configured name, custom entry or path)
        #[arg(short, long)]
        env: Option<String>,

        /// requirements.txt or pyproject.toml (default from config)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Optional dependency groups from pyproject.toml (e.g. --extras export,dev)
        #[arg(long, value_delimiter = ',')]
        extras: Vec<String>,

        /// Install packages one at a time and continue past failures
        #[arg(long)]
        each: bool,

        /// Reinstall even if the manifest has not changed
        #[arg(long)]
        force: bool,

        /// Install into the base interpreter when no environment is active
        #[arg(long)]
        system: bool,

        /// Base interpreter for --system
        #[arg(long, requires = "system")]
        python: Option<PathBuf>,
    },

    /// Choose an environment and open a shell with it activated
    Switch {
        /// Menu number or environment name
        target: Option<String>,

        /// List the menu and exit
        #[arg(short, long)]
        list: bool,

        /// Record a custom environment by name
        #[arg(long, value_name = "NAME", conflicts_with_all = ["target", "list"])]
        add: Option<String>,

        /// Location of the custom environment being added
        #[arg(long, conflicts_with_all = ["target", "list"])]
        path: Option<PathBuf>,

        /// Print the activation script path instead of spawning a shell
        #[arg(long)]
        print: bool,
    },

    /// Upgrade pip and setuptools inside environments
    Update {
        /// Environments to update (default: all configured)
        names: Vec<String>,

        /// Include custom environments
        #[arg(long)]
        all: bool,
    },

    /// Delete bytecode caches, notebook checkpoints and training outputs
    Clean {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// List what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Check project health
    Doctor,

    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}
