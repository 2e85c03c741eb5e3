use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input};
use serde::Serialize;

use crate::errors::EasError;

/// Where a credential value may come from: a file named ahead of time, or an
/// interactive prompt. Every variant is handled exhaustively at the
/// resolution site.
#[derive(Debug, Clone)]
pub enum AscApiKeySource {
    Path(AscApiKeyPath),
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AscApiKeyPath {
    pub key_p8_path: PathBuf,
    pub key_id: String,
    pub issuer_id: String,
}

/// Loaded App Store Connect API key material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AscApiKey {
    pub key_p8: String,
    pub key_id: String,
    pub issuer_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AscApiKeySummary {
    pub source: &'static str,
    pub path: PathBuf,
    pub key_id: String,
}

#[derive(Debug, Clone)]
pub struct AscApiKeyResult {
    pub key: AscApiKey,
    pub summary: AscApiKeySummary,
}

#[derive(Debug, Clone)]
pub enum ServiceAccountSource {
    Path(PathBuf),
    Prompt,
}

#[derive(Debug, Clone)]
pub struct ServiceAccountKeyResult {
    pub path: PathBuf,
    pub json: serde_json::Value,
}

/// Seam between source resolution and the terminal, so resolution logic can
/// be exercised without a TTY.
pub trait KeyPrompter {
    fn prompt_path(&mut self, message: &str) -> Result<PathBuf>;
    fn prompt_string(&mut self, message: &str) -> Result<String>;
}

/// Production prompter backed by dialoguer.
pub struct TerminalPrompter;

impl KeyPrompter for TerminalPrompter {
    fn prompt_path(&mut self, message: &str) -> Result<PathBuf> {
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .interact_text()?;
        Ok(PathBuf::from(raw.trim()))
    }

    fn prompt_string(&mut self, message: &str) -> Result<String> {
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .interact_text()?;
        Ok(raw.trim().to_string())
    }
}

/// Resolves a key source down to an on-disk path plus identifiers. A `Path`
/// source whose file exists never prompts. A missing file falls back to
/// prompting until the user supplies an existing path or cancels; in
/// non-interactive mode the first would-be prompt fails instead.
pub fn resolve_asc_api_key_path(
    non_interactive: bool,
    source: &AscApiKeySource,
    prompter: &mut dyn KeyPrompter,
) -> Result<AscApiKeyPath> {
    match source {
        AscApiKeySource::Path(path) => {
            if path.key_p8_path.exists() {
                return Ok(path.clone());
            }
            if non_interactive {
                return Err(EasError::NonInteractive(format!(
                    "the App Store Connect API key at {} does not exist; picking another path",
                    path.key_p8_path.display()
                ))
                .into());
            }
            let key_p8_path = prompt_for_existing_path(prompter, &path.key_p8_path)?;
            Ok(AscApiKeyPath {
                key_p8_path,
                key_id: path.key_id.clone(),
                issuer_id: path.issuer_id.clone(),
            })
        }
        AscApiKeySource::Prompt => {
            if non_interactive {
                return Err(EasError::NonInteractive(
                    "providing an App Store Connect API key".to_string(),
                )
                .into());
            }
            let mut key_p8_path =
                prompter.prompt_path("Path to your App Store Connect API key (.p8)")?;
            while !key_p8_path.exists() {
                eprintln!("No file found at {}", key_p8_path.display());
                key_p8_path =
                    prompter.prompt_path("Path to your App Store Connect API key (.p8)")?;
            }
            let key_id = prompter.prompt_string("Key ID")?;
            let issuer_id = prompter.prompt_string("Issuer ID")?;
            Ok(AscApiKeyPath {
                key_p8_path,
                key_id,
                issuer_id,
            })
        }
    }
}

fn prompt_for_existing_path(
    prompter: &mut dyn KeyPrompter,
    missing: &Path,
) -> Result<PathBuf> {
    eprintln!("No file found at {}", missing.display());
    loop {
        let candidate = prompter.prompt_path("Path to your App Store Connect API key (.p8)")?;
        if candidate.exists() {
            return Ok(candidate);
        }
        eprintln!("No file found at {}", candidate.display());
    }
}

/// Reads the key material for an already-resolved path.
pub fn load_asc_api_key(path: &AscApiKeyPath) -> Result<AscApiKeyResult> {
    let key_p8 = fs::read_to_string(&path.key_p8_path).with_context(|| {
        format!(
            "Failed to read the App Store Connect API key at {}",
            path.key_p8_path.display()
        )
    })?;
    Ok(AscApiKeyResult {
        key: AscApiKey {
            key_p8,
            key_id: path.key_id.clone(),
            issuer_id: path.issuer_id.clone(),
        },
        summary: AscApiKeySummary {
            source: "local",
            path: path.key_p8_path.clone(),
            key_id: path.key_id.clone(),
        },
    })
}

pub fn resolve_asc_api_key(
    non_interactive: bool,
    source: &AscApiKeySource,
    prompter: &mut dyn KeyPrompter,
) -> Result<AscApiKeyResult> {
    let path = resolve_asc_api_key_path(non_interactive, source, prompter)?;
    load_asc_api_key(&path)
}

/// Google service account keys follow the same path-or-prompt shape.
pub fn resolve_service_account_key(
    non_interactive: bool,
    source: &ServiceAccountSource,
    prompter: &mut dyn KeyPrompter,
) -> Result<ServiceAccountKeyResult> {
    let path = match source {
        ServiceAccountSource::Path(path) => {
            if path.exists() {
                path.clone()
            } else {
                if non_interactive {
                    return Err(EasError::NonInteractive(format!(
                        "the service account key at {} does not exist; picking another path",
                        path.display()
                    ))
                    .into());
                }
                prompt_for_existing_path(prompter, path)?
            }
        }
        ServiceAccountSource::Prompt => {
            if non_interactive {
                return Err(EasError::NonInteractive(
                    "providing a Google service account key".to_string(),
                )
                .into());
            }
            let mut candidate =
                prompter.prompt_path("Path to your Google service account key (.json)")?;
            while !candidate.exists() {
                eprintln!("No file found at {}", candidate.display());
                candidate =
                    prompter.prompt_path("Path to your Google service account key (.json)")?;
            }
            candidate
        }
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read the service account key at {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text).map_err(|_| {
        EasError::Credentials(format!(
            "{} is not a valid service account key file",
            path.display()
        ))
    })?;
    if json.get("client_email").and_then(|e| e.as_str()).is_none() {
        return Err(EasError::Credentials(format!(
            "{} has no client_email; is it really a service account key?",
            path.display()
        ))
        .into());
    }
    Ok(ServiceAccountKeyResult { path, json })
}
