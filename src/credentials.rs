use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asc::{AppStoreConnectClient, AscKeyInfo};
use crate::errors::EasError;
use crate::graphql::GraphqlClient;
use crate::mutations;
use crate::prompts;
use crate::queries::AscApiKeyFragment;
use crate::util;

pub const CREDENTIALS_JSON: &str = "credentials.json";

/// Per-invocation credentials state: which project, which API session, and
/// whether prompting is allowed.
pub struct CredentialsContext<'a> {
    pub project_dir: PathBuf,
    pub graphql: &'a GraphqlClient,
    pub non_interactive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionCertificate {
    pub path: String,
    pub password: Option<String>,
}

/// Local signing material for one iOS target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IosTargetCredentials {
    pub provisioning_profile_path: String,
    pub distribution_certificate: DistributionCertificate,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidKeystore {
    pub keystore_path: String,
    pub keystore_password: String,
    pub key_alias: String,
    pub key_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidCredentials {
    pub keystore: AndroidKeystore,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CredentialsJson {
    ios: Option<Value>,
    android: Option<AndroidCredentials>,
}

pub type IosCredentialsMap = BTreeMap<String, IosTargetCredentials>;

fn read_credentials_json(project_dir: &Path) -> Result<CredentialsJson> {
    let path = project_dir.join(CREDENTIALS_JSON);
    if !path.exists() {
        return Err(EasError::Credentials(format!(
            "{} was not found in {}",
            CREDENTIALS_JSON,
            project_dir.display()
        ))
        .into());
    }
    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| EasError::Credentials(format!("{} is not valid: {e}", path.display())).into())
}

/// Reads iOS credentials for the named targets. The single-target shorthand
/// (credential fields directly under "ios") maps onto the sole target.
pub fn read_ios_credentials(project_dir: &Path, targets: &[String]) -> Result<IosCredentialsMap> {
    let raw = read_credentials_json(project_dir)?
        .ios
        .ok_or_else(|| EasError::Credentials("credentials.json has no ios entry".to_string()))?;

    let map: IosCredentialsMap = if raw.get("provisioningProfilePath").is_some() {
        let single: IosTargetCredentials = serde_json::from_value(raw)
            .map_err(|e| EasError::Credentials(format!("invalid ios credentials: {e}")))?;
        let target = targets.first().cloned().ok_or_else(|| {
            EasError::Credentials("no iOS target to assign credentials to".to_string())
        })?;
        BTreeMap::from([(target, single)])
    } else {
        serde_json::from_value(raw)
            .map_err(|e| EasError::Credentials(format!("invalid ios credentials: {e}")))?
    };

    ensure_all_targets_configured(targets, &map)?;
    Ok(map)
}

pub fn read_android_credentials(project_dir: &Path) -> Result<AndroidCredentials> {
    read_credentials_json(project_dir)?
        .android
        .ok_or_else(|| {
            EasError::Credentials("credentials.json has no android entry".to_string()).into()
        })
}

fn ensure_all_targets_configured(targets: &[String], map: &IosCredentialsMap) -> Result<()> {
    for target in targets {
        if !map.contains_key(target) {
            return Err(EasError::Credentials(format!(
                "credentials.json is missing an entry for target \"{target}\""
            ))
            .into());
        }
    }
    Ok(())
}

/// A key is valid iff the vendor still knows it and has not revoked it.
pub fn is_key_valid(info: Option<&AscKeyInfo>) -> bool {
    match info {
        Some(info) => !info.is_revoked,
        None => false,
    }
}

pub async fn is_key_valid_and_tracked(
    asc: &AppStoreConnectClient,
    key_identifier: &str,
) -> Result<bool> {
    let info = asc.get_api_key_info(key_identifier).await?;
    Ok(is_key_valid(info.as_ref()))
}

/// Filters remotely-tracked keys down to those whose vendor metadata is
/// still valid. At most one of these is considered active per target.
pub async fn valid_and_tracked_keys(
    asc: &AppStoreConnectClient,
    keys: Vec<AscApiKeyFragment>,
) -> Result<Vec<AscApiKeyFragment>> {
    let infos = asc.list_api_keys().await?;
    let valid: Vec<&str> = infos
        .iter()
        .filter(|info| is_key_valid(Some(info)))
        .map(|info| info.key_id.as_str())
        .collect();
    Ok(keys
        .into_iter()
        .filter(|key| valid.contains(&key.key_identifier.as_str()))
        .collect())
}

/// Lets the user pick one of the account's keys, newest first.
pub async fn select_asc_api_key(
    ctx: &CredentialsContext<'_>,
    account_id: &str,
) -> Result<Option<AscApiKeyFragment>> {
    let mut keys = crate::queries::asc_api_keys_for_account(ctx.graphql, account_id).await?;
    if keys.is_empty() {
        println!("No App Store Connect API keys found for this account");
        return Ok(None);
    }
    keys.sort_by(util::compare_keys_desc);
    let items: Vec<String> = keys.iter().map(format_asc_api_key).collect();
    let index = prompts::select(ctx.non_interactive, "Select an API key", &items)?;
    Ok(Some(keys.swap_remove(index)))
}

pub fn format_asc_api_key(key: &AscApiKeyFragment) -> String {
    match &key.name {
        Some(name) => format!("{} ({})", name, key.key_identifier),
        None => key.key_identifier.clone(),
    }
}

/// Removes a tracked App Store Connect API key: a confirmation gate, the
/// remote delete, then an optionally-confirmed revocation with Apple. The
/// whole flow is refused in non-interactive mode.
pub async fn remove_asc_api_key(
    ctx: &CredentialsContext<'_>,
    key: &AscApiKeyFragment,
    asc: Option<&AppStoreConnectClient>,
) -> Result<()> {
    if ctx.non_interactive {
        return Err(EasError::NonInteractive(
            "removing an App Store Connect API key".to_string(),
        )
        .into());
    }

    let confirmed = prompts::confirm(
        ctx.non_interactive,
        "Deleting this API key may affect projects that rely on it. Do you want to continue?",
    )?;
    if !confirmed {
        println!("Aborting");
        return Ok(());
    }

    println!("Removing API key {}", format_asc_api_key(key));
    mutations::delete_asc_api_key(ctx.graphql, &key.id).await?;

    let should_revoke = prompts::confirm(
        ctx.non_interactive,
        "Do you also want to revoke this key on the Apple Developer Portal?",
    )?;
    if should_revoke {
        match asc {
            Some(asc) => asc.revoke_api_key(&key.key_identifier).await?,
            None => {
                return Err(EasError::Credentials(
                    "no local key material available to authenticate the revocation; pass --key-path/--key-id/--issuer-id".to_string(),
                )
                .into());
            }
        }
    }
    Ok(())
}
