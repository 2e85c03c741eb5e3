use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::EasError;
use crate::session::Actor;

pub const APP_JSON: &str = "app.json";

#[derive(Debug, Deserialize)]
struct AppJson {
    expo: ExpoConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpoConfig {
    pub name: Option<String>,
    pub slug: String,
    pub owner: Option<String>,
    pub version: Option<String>,
    pub ios: Option<IosAppConfig>,
    pub android: Option<AndroidAppConfig>,
    pub extra: Option<ExtraConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IosAppConfig {
    pub bundle_identifier: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AndroidAppConfig {
    pub package: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtraConfig {
    pub eas: Option<EasExtra>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EasExtra {
    pub project_id: Option<String>,
}

impl ExpoConfig {
    /// The project id linking this local project to the EAS servers.
    pub fn project_id(&self) -> Result<String> {
        self.extra
            .as_ref()
            .and_then(|e| e.eas.as_ref())
            .and_then(|e| e.project_id.clone())
            .ok_or_else(|| {
                EasError::Config(
                    "this project has no extra.eas.projectId in app.json".to_string(),
                )
                .into()
            })
    }

    /// `@owner/slug`, preferring the explicit owner over the actor's name.
    pub fn full_name(&self, actor: Option<&Actor>) -> String {
        let owner = self
            .owner
            .clone()
            .or_else(|| actor.map(|a| a.account_name()))
            .unwrap_or_else(|| "anonymous".to_string());
        format!("@{}/{}", owner, self.slug)
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        self.ios.as_ref().and_then(|c| c.bundle_identifier.as_deref())
    }

    pub fn android_package(&self) -> Option<&str> {
        self.android.as_ref().and_then(|c| c.package.as_deref())
    }
}

/// Walks up from `start` until a directory containing `app.json` is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(APP_JSON).exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(EasError::Config(format!(
                "{} was not found in {} or any parent directory",
                APP_JSON,
                start.display()
            ))
            .into());
        }
    }
}

pub fn read_app_config(project_dir: &Path) -> Result<ExpoConfig> {
    let path = project_dir.join(APP_JSON);
    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let app_json: AppJson = serde_json::from_str(&text)
        .map_err(|e| EasError::Config(format!("{} is not valid: {e}", path.display())))?;
    Ok(app_json.expo)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedConfig {
    pub exp: ExpoConfig,
    pub env: BTreeMap<String, String>,
}

/// Merges the process environment into the resolved app config. Profile env
/// wins over inherited process variables; the accessor itself never touches
/// the environment.
pub fn evaluate_config_with_env(
    exp: ExpoConfig,
    profile_env: &BTreeMap<String, String>,
) -> EvaluatedConfig {
    let mut env: BTreeMap<String, String> = env::vars().collect();
    for (key, value) in profile_env {
        env.insert(key.clone(), value.clone());
    }
    EvaluatedConfig { exp, env }
}
