use inquire::{Confirm, Select, Text};

use crate::errors::Result;
use crate::templates::TEMPLATES;

pub fn select_template() -> Result<String> {
    let options: Vec<String> = TEMPLATES
        .iter()
        .map(|t| format!("{:<12} - {}", t.name, t.description))
        .collect();

    let ans = Select::new("Choose a project template:", options).prompt()?;
    let chosen = ans.split_whitespace().next().unwrap_or("wastevision").to_string();
    Ok(chosen)
}

pub fn prompt_interpreter_path() -> Result<String> {
    let ans = Text::new("Enter the absolute path to your Python executable:").prompt()?;
    Ok(ans)
}

/// Free text with a default taken on empty input
pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let ans = Text::new(message).with_default(default).prompt()?;
    let ans = ans.trim();
    Ok(if ans.is_empty() { default.to_string() } else { ans.to_string() })
}

pub fn prompt_optional(message: &str) -> Result<Option<String>> {
    let ans = Text::new(message)
        .with_help_message("leave empty to skip")
        .prompt()?;
    let ans = ans.trim();
    Ok((!ans.is_empty()).then(|| ans.to_string()))
}

pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new(message).with_default(default).prompt()?)
}

/// Returns the index of the chosen label
pub fn select_index(message: &str, labels: Vec<String>) -> Result<usize> {
    let ans = Select::new(message, labels)
        .with_help_message("↑↓ to move, enter to select, esc to exit")
        .raw_prompt()?;
    Ok(ans.index)
}
