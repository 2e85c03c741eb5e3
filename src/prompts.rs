use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

use crate::errors::EasError;

/// Every interactive entry point funnels through these wrappers: when
/// `non_interactive` is set they fail before anything is rendered, so no
/// command can block on a terminal that nobody is watching.
pub fn select(non_interactive: bool, message: &str, items: &[String]) -> Result<usize> {
    if non_interactive {
        return Err(EasError::NonInteractive(format!("\"{message}\"")).into());
    }
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(0)
        .items(items)
        .interact()?;
    Ok(index)
}

pub fn confirm(non_interactive: bool, message: &str) -> Result<bool> {
    if non_interactive {
        return Err(EasError::NonInteractive(format!("\"{message}\"")).into());
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

pub fn input(non_interactive: bool, message: &str) -> Result<String> {
    if non_interactive {
        return Err(EasError::NonInteractive(format!("\"{message}\"")).into());
    }
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .interact_text()?;
    Ok(raw.trim().to_string())
}

pub fn password(non_interactive: bool, message: &str) -> Result<String> {
    if non_interactive {
        return Err(EasError::NonInteractive(format!("\"{message}\"")).into());
    }
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .interact()?;
    Ok(raw)
}
