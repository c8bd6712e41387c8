use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::runner::ExecutionResult;

/// Install the diagnostic subscriber. `RUST_LOG` wins over `-v`.
pub fn init(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "wvenv=debug",
        _ => "wvenv=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn header(msg: &str) {
    println!("\n{}", format!("=== {} ===", msg).bold());
}

pub fn success(msg: &str) {
    println!("{} {}", "✔".green(), msg);
}

pub fn skipped(msg: &str) {
    println!("{} {}", "•".dimmed(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

pub fn failure(msg: &str) {
    println!("{} {}", "✘".red(), msg);
}

/// Print the captured output of a failed command
pub fn print_command_output(label: &str, result: &ExecutionResult) {
    println!("────────── {} ──────────", label);

    if !result.stdout.is_empty() {
        println!("[stdout]");
        print!("{}", String::from_utf8_lossy(&result.stdout));
    }

    if !result.stderr.is_empty() {
        println!("[stderr]");
        print!("{}", String::from_utf8_lossy(&result.stderr));
    }

    println!("────────── end: {} (exit={}) ──────────", label, result.exit_code);
}
