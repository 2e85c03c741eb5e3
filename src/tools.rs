use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::process::Command;

use crate::errors::EasError;

fn tool_error(tool: &str, message: impl Into<String>) -> EasError {
    EasError::ExternalTool {
        tool: tool.to_string(),
        message: message.into(),
    }
}

async fn run_captured(tool: &str, program: &str, args: &[&str]) -> Result<std::process::Output> {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| tool_error(tool, format!("failed to spawn {program}: {e}")).into())
}

/// Runs the project-local `expo-updates` CLI and returns its stdout. Stderr
/// is inspected for the CLI's known failure markers so the caller gets a
/// classified error instead of raw process output.
pub async fn expo_updates_command(
    project_dir: &Path,
    args: &[&str],
    env: &BTreeMap<String, String>,
) -> Result<String> {
    let bin = project_dir.join("node_modules").join(".bin").join("expo-updates");
    if !bin.exists() {
        return Err(tool_error(
            "expo-updates",
            "the expo-updates package is not installed in this project; install it and run npm install",
        )
        .into());
    }

    let output = Command::new(&bin)
        .args(args)
        .current_dir(project_dir)
        .envs(env)
        .output()
        .await
        .map_err(|e| tool_error("expo-updates", format!("failed to spawn: {e}")))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        if stderr.contains("Invalid command") {
            return Err(tool_error(
                "expo-updates",
                format!("{args:?} is not a valid expo-updates command"),
            )
            .into());
        }
        return Err(tool_error("expo-updates", stderr.trim().to_string()).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub async fn is_direnv_installed() -> bool {
    run_captured("direnv", "direnv", &["--version"])
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Install command for direnv on this host, detected the way the original
/// setup script does: macOS uses brew, Linux is classified from
/// /etc/os-release into apt-get and dnf families.
pub async fn direnv_install_command() -> Result<(String, Vec<String>)> {
    match std::env::consts::OS {
        "macos" => Ok(("brew".to_string(), vec!["install".into(), "direnv".into()])),
        "linux" => {
            let release = tokio::fs::read_to_string("/etc/os-release")
                .await
                .map_err(|e| tool_error("direnv", format!("error reading OS release info: {e}")))?;
            if release.contains("Ubuntu") || release.contains("Debian") {
                Ok((
                    "sudo".to_string(),
                    vec!["apt-get".into(), "install".into(), "-y".into(), "direnv".into()],
                ))
            } else if release.contains("Fedora") || release.contains("CentOS") {
                Ok((
                    "sudo".to_string(),
                    vec!["dnf".into(), "install".into(), "-y".into(), "direnv".into()],
                ))
            } else {
                Err(tool_error("direnv", "this Linux distribution is not supported").into())
            }
        }
        other => Err(tool_error("direnv", format!("platform {other} is not supported")).into()),
    }
}

pub async fn install_direnv() -> Result<()> {
    let (program, args) = direnv_install_command().await?;
    println!("Running: {} {}", program, args.join(" "));
    let status = Command::new(&program)
        .args(&args)
        .status()
        .await
        .map_err(|e| tool_error("direnv", format!("failed to spawn {program}: {e}")))?;
    if !status.success() {
        return Err(tool_error("direnv", "installation failed").into());
    }
    Ok(())
}

pub async fn direnv_allow(project_dir: &Path) -> Result<()> {
    let status = Command::new("direnv")
        .arg("allow")
        .current_dir(project_dir)
        .status()
        .await
        .map_err(|e| tool_error("direnv", format!("failed to spawn: {e}")))?;
    if !status.success() {
        return Err(tool_error("direnv", "direnv allow failed").into());
    }
    Ok(())
}

pub struct ShellDirenvConfig {
    pub shell_config_path: PathBuf,
    pub hook_cmd: &'static str,
}

/// Shell hook location, keyed off $SHELL the way the original does.
pub fn shell_direnv_config() -> Option<ShellDirenvConfig> {
    let shell = std::env::var("SHELL").ok()?;
    let home = dirs::home_dir()?;
    if shell.ends_with("bash") {
        Some(ShellDirenvConfig {
            shell_config_path: home.join(".bashrc"),
            hook_cmd: "eval \"$(direnv hook bash)\"",
        })
    } else if shell.ends_with("zsh") {
        Some(ShellDirenvConfig {
            shell_config_path: home.join(".zshrc"),
            hook_cmd: "eval \"$(direnv hook zsh)\"",
        })
    } else if shell.ends_with("fish") {
        Some(ShellDirenvConfig {
            shell_config_path: home.join(".config/fish/config.fish"),
            hook_cmd: "direnv hook fish | source",
        })
    } else {
        None
    }
}
