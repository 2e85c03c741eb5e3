use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::EasError;

pub const EAS_JSON: &str = "eas.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }

    /// Platform name as the GraphQL API spells it.
    pub fn app_platform(&self) -> &'static str {
        match self {
            Platform::Android => "ANDROID",
            Platform::Ios => "IOS",
        }
    }

    fn profile_key(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsSource {
    Local,
    Remote,
}

impl Default for CredentialsSource {
    fn default() -> Self {
        CredentialsSource::Remote
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    pub version: Option<String>,
    pub require_commit: Option<bool>,
    pub app_version_source: Option<String>,
}

/// Merged view of a build profile for one platform: the profile's common
/// fields with the platform block applied on top.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildProfile {
    pub extends: Option<String>,
    pub credentials_source: Option<CredentialsSource>,
    pub distribution: Option<String>,
    pub channel: Option<String>,
    pub node: Option<String>,
    pub image: Option<String>,
    pub resource_class: Option<String>,
    pub build_configuration: Option<String>,
    pub gradle_command: Option<String>,
    pub auto_increment: Option<bool>,
    pub env: BTreeMap<String, String>,
}

/// Merged view of a submit profile for one platform.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitProfile {
    pub extends: Option<String>,
    // iOS
    pub asc_api_key_path: Option<String>,
    pub asc_api_key_id: Option<String>,
    pub asc_api_key_issuer_id: Option<String>,
    pub asc_app_id: Option<String>,
    pub apple_team_id: Option<String>,
    pub language: Option<String>,
    // Android
    pub service_account_key_path: Option<String>,
    pub track: Option<String>,
    pub release_status: Option<String>,
    pub changes_not_sent_for_review: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EasJson {
    cli: Option<CliConfig>,
    build: BTreeMap<String, Value>,
    submit: BTreeMap<String, Value>,
}

/// Reads `eas.json` once and hands out merged, typed profiles. Lookup is by
/// exact profile name; a missing name is a configuration error, not a prompt.
pub struct EasJsonAccessor {
    path: PathBuf,
    eas_json: EasJson,
}

impl EasJsonAccessor {
    pub fn from_project_dir(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(EAS_JSON);
        if !path.exists() {
            return Err(EasError::Config(format!(
                "{} was not found in {}. Run this command inside a configured project",
                EAS_JSON,
                project_dir.display()
            ))
            .into());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let eas_json: EasJson = serde_json::from_str(&text)
            .map_err(|e| EasError::Config(format!("{} is not valid: {e}", path.display())))?;
        Ok(Self { path, eas_json })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cli_config(&self) -> Option<&CliConfig> {
        self.eas_json.cli.as_ref()
    }

    pub fn build_profile_names(&self) -> Vec<String> {
        self.eas_json.build.keys().cloned().collect()
    }

    pub fn submit_profile_names(&self) -> Vec<String> {
        self.eas_json.submit.keys().cloned().collect()
    }

    pub fn build_profile(&self, platform: Platform, name: &str) -> Result<BuildProfile> {
        let merged = resolve_profile(&self.eas_json.build, platform, name)?;
        let profile = serde_json::from_value(Value::Object(merged)).map_err(|e| {
            EasError::Config(format!("build profile \"{name}\" is not valid: {e}"))
        })?;
        Ok(profile)
    }

    pub fn submit_profile(&self, platform: Platform, name: &str) -> Result<SubmitProfile> {
        let merged = resolve_profile(&self.eas_json.submit, platform, name)?;
        let profile = serde_json::from_value(Value::Object(merged)).map_err(|e| {
            EasError::Config(format!("submit profile \"{name}\" is not valid: {e}"))
        })?;
        Ok(profile)
    }
}

/// Resolves an `extends` chain and flattens the platform block over the
/// profile's common fields. Later layers win; `env` maps merge key-wise.
fn resolve_profile(
    profiles: &BTreeMap<String, Value>,
    platform: Platform,
    name: &str,
) -> Result<Map<String, Value>> {
    let mut chain = Vec::new();
    let mut current = name.to_string();
    loop {
        let raw = profiles
            .get(&current)
            .ok_or_else(|| EasError::ProfileNotFound(current.clone()))?;
        let obj = raw.as_object().cloned().ok_or_else(|| {
            EasError::Config(format!("profile \"{current}\" must be an object"))
        })?;
        let parent = obj.get("extends").and_then(|v| v.as_str()).map(String::from);
        chain.push(obj);
        match parent {
            Some(p) => {
                if chain.len() > profiles.len() {
                    return Err(EasError::Config(format!(
                        "profile \"{name}\" has a circular extends chain"
                    ))
                    .into());
                }
                current = p;
            }
            None => break,
        }
    }

    // Base of the chain first, the requested profile last.
    let mut merged = Map::new();
    for layer in chain.into_iter().rev() {
        merge_objects(&mut merged, layer);
    }

    if let Some(Value::Object(platform_block)) = merged.remove(platform.profile_key()) {
        merge_objects(&mut merged, platform_block);
    }
    // The other platform's block is irrelevant for a merged view.
    for key in ["android", "ios"] {
        merged.remove(key);
    }
    merged.remove("extends");
    Ok(merged)
}

fn merge_objects(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        let merged = match (base.get(&key), &value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                let mut merged = existing.clone();
                merge_objects(&mut merged, incoming.clone());
                Some(Value::Object(merged))
            }
            _ => None,
        };
        base.insert(key, merged.unwrap_or(value));
    }
}
