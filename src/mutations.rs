use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::EasError;
use crate::graphql::GraphqlClient;
use crate::queries::{Webhook, WebhookEvent};
use crate::session::Account;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInput {
    pub url: String,
    pub secret: String,
    pub event: WebhookEvent,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleTeam {
    pub id: String,
    pub apple_team_identifier: String,
    pub apple_team_name: Option<String>,
    pub account: Option<Account>,
}

pub fn format_apple_team(team: &AppleTeam) -> String {
    match &team.apple_team_name {
        Some(name) => format!("Team ID: {}, Team name: {}", team.apple_team_identifier, name),
        None => format!("Team ID: {}", team.apple_team_identifier),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub status: String,
    pub platform: Option<String>,
    pub logs_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupPublication {
    pub id: String,
    pub group: String,
    pub runtime_version: String,
    pub platform: String,
    pub manifest_permalink: Option<String>,
}

const CREATE_WEBHOOK_MUTATION: &str = r#"
    mutation CreateWebhookMutation($appId: String!, $webhookInput: WebhookInput!) {
        webhook {
            createWebhook(appId: $appId, webhookInput: $webhookInput) {
                id
                appId
                event
                url
                createdAt
                updatedAt
            }
        }
    }
"#;

pub async fn create_webhook(
    client: &GraphqlClient,
    app_id: &str,
    input: &WebhookInput,
) -> Result<Webhook> {
    let data = client
        .request(
            CREATE_WEBHOOK_MUTATION,
            json!({ "appId": app_id, "webhookInput": input }),
        )
        .await?;
    unwrap_payload(&data, "/webhook/createWebhook")
}

const UPDATE_WEBHOOK_MUTATION: &str = r#"
    mutation UpdateWebhookMutation($webhookId: ID!, $webhookInput: WebhookInput!) {
        webhook {
            updateWebhook(webhookId: $webhookId, webhookInput: $webhookInput) {
                id
                appId
                event
                url
                createdAt
                updatedAt
            }
        }
    }
"#;

pub async fn update_webhook(
    client: &GraphqlClient,
    webhook_id: &str,
    input: &WebhookInput,
) -> Result<Webhook> {
    let data = client
        .request(
            UPDATE_WEBHOOK_MUTATION,
            json!({ "webhookId": webhook_id, "webhookInput": input }),
        )
        .await?;
    unwrap_payload(&data, "/webhook/updateWebhook")
}

const DELETE_WEBHOOK_MUTATION: &str = r#"
    mutation DeleteWebhookMutation($webhookId: ID!) {
        webhook {
            deleteWebhook(webhookId: $webhookId) {
                id
            }
        }
    }
"#;

pub async fn delete_webhook(client: &GraphqlClient, webhook_id: &str) -> Result<()> {
    client
        .request(DELETE_WEBHOOK_MUTATION, json!({ "webhookId": webhook_id }))
        .await?;
    Ok(())
}

const CREATE_APPLE_TEAM_MUTATION: &str = r#"
    mutation CreateAppleTeamMutation($appleTeamInput: AppleTeamInput!, $accountId: ID!) {
        appleTeam {
            createAppleTeam(appleTeamInput: $appleTeamInput, accountId: $accountId) {
                id
                appleTeamIdentifier
                appleTeamName
                account {
                    id
                    name
                }
            }
        }
    }
"#;

pub async fn create_apple_team(
    client: &GraphqlClient,
    account_id: &str,
    apple_team_identifier: &str,
    apple_team_name: Option<&str>,
) -> Result<AppleTeam> {
    let data = client
        .request(
            CREATE_APPLE_TEAM_MUTATION,
            json!({
                "appleTeamInput": {
                    "appleTeamIdentifier": apple_team_identifier,
                    "appleTeamName": apple_team_name,
                },
                "accountId": account_id,
            }),
        )
        .await?;
    unwrap_payload(&data, "/appleTeam/createAppleTeam")
}

const UPDATE_APPLE_TEAM_MUTATION: &str = r#"
    mutation UpdateAppleTeamMutation($appleTeamUpdateInput: AppleTeamUpdateInput!, $appleTeamId: ID!) {
        appleTeam {
            updateAppleTeam(appleTeamUpdateInput: $appleTeamUpdateInput, id: $appleTeamId) {
                id
                appleTeamIdentifier
                appleTeamName
                account {
                    id
                    name
                }
            }
        }
    }
"#;

pub async fn update_apple_team(
    client: &GraphqlClient,
    apple_team_id: &str,
    apple_team_name: &str,
) -> Result<AppleTeam> {
    let data = client
        .request(
            UPDATE_APPLE_TEAM_MUTATION,
            json!({
                "appleTeamUpdateInput": { "appleTeamName": apple_team_name },
                "appleTeamId": apple_team_id,
            }),
        )
        .await?;
    unwrap_payload(&data, "/appleTeam/updateAppleTeam")
}

const DELETE_ASC_API_KEY_MUTATION: &str = r#"
    mutation DeleteAppStoreConnectApiKeyMutation($appStoreConnectApiKeyId: ID!) {
        appStoreConnectApiKey {
            deleteAppStoreConnectApiKey(id: $appStoreConnectApiKeyId) {
                id
            }
        }
    }
"#;

pub async fn delete_asc_api_key(client: &GraphqlClient, key_id: &str) -> Result<()> {
    client
        .request(
            DELETE_ASC_API_KEY_MUTATION,
            json!({ "appStoreConnectApiKeyId": key_id }),
        )
        .await?;
    Ok(())
}

const CREATE_IOS_SUBMISSION_MUTATION: &str = r#"
    mutation CreateIosSubmissionMutation($appId: ID!, $config: IosSubmissionConfigInput!, $submittedBuildId: ID) {
        submission {
            createIosSubmission(input: { appId: $appId, config: $config, submittedBuildId: $submittedBuildId }) {
                submission {
                    id
                    status
                    platform
                    logsUrl
                }
            }
        }
    }
"#;

pub async fn create_ios_submission(
    client: &GraphqlClient,
    app_id: &str,
    config: Value,
    submitted_build_id: Option<&str>,
) -> Result<Submission> {
    let data = client
        .request(
            CREATE_IOS_SUBMISSION_MUTATION,
            json!({
                "appId": app_id,
                "config": config,
                "submittedBuildId": submitted_build_id,
            }),
        )
        .await?;
    unwrap_payload(&data, "/submission/createIosSubmission/submission")
}

const CREATE_ANDROID_SUBMISSION_MUTATION: &str = r#"
    mutation CreateAndroidSubmissionMutation($appId: ID!, $config: AndroidSubmissionConfigInput!, $submittedBuildId: ID) {
        submission {
            createAndroidSubmission(input: { appId: $appId, config: $config, submittedBuildId: $submittedBuildId }) {
                submission {
                    id
                    status
                    platform
                    logsUrl
                }
            }
        }
    }
"#;

pub async fn create_android_submission(
    client: &GraphqlClient,
    app_id: &str,
    config: Value,
    submitted_build_id: Option<&str>,
) -> Result<Submission> {
    let data = client
        .request(
            CREATE_ANDROID_SUBMISSION_MUTATION,
            json!({
                "appId": app_id,
                "config": config,
                "submittedBuildId": submitted_build_id,
            }),
        )
        .await?;
    unwrap_payload(&data, "/submission/createAndroidSubmission/submission")
}

const GET_SIGNED_UPLOAD_MUTATION: &str = r#"
    mutation GetSignedUploadMutation($contentTypes: [String!]!) {
        asset {
            getSignedAssetUploadSpecifications(assetContentTypes: $contentTypes) {
                specifications
            }
        }
    }
"#;

pub async fn get_signed_upload_urls(
    client: &GraphqlClient,
    content_types: &[&str],
) -> Result<Vec<String>> {
    let data = client
        .request(
            GET_SIGNED_UPLOAD_MUTATION,
            json!({ "contentTypes": content_types }),
        )
        .await?;
    unwrap_payload(
        &data,
        "/asset/getSignedAssetUploadSpecifications/specifications",
    )
}

const CREATE_UPDATE_BRANCH_MUTATION: &str = r#"
    mutation CreateUpdateBranchForApp($appId: ID!, $name: String!) {
        updateBranch {
            createUpdateBranchForApp(appId: $appId, name: $name) {
                id
                name
            }
        }
    }
"#;

pub async fn create_update_branch(
    client: &GraphqlClient,
    app_id: &str,
    name: &str,
) -> Result<String> {
    let data = client
        .request(
            CREATE_UPDATE_BRANCH_MUTATION,
            json!({ "appId": app_id, "name": name }),
        )
        .await?;
    data.pointer("/updateBranch/createUpdateBranchForApp/id")
        .and_then(|id| id.as_str())
        .map(String::from)
        .ok_or_else(|| {
            EasError::RemoteApi("branch creation returned no id".to_string()).into()
        })
}

const PUBLISH_UPDATE_GROUP_MUTATION: &str = r#"
    mutation UpdatePublishMutation($publishUpdateGroupsInput: [PublishUpdateGroupInput!]!) {
        updateBranch {
            publishUpdateGroups(publishUpdateGroupsInput: $publishUpdateGroupsInput) {
                id
                group
                runtimeVersion
                platform
                manifestPermalink
            }
        }
    }
"#;

pub async fn publish_update_group(
    client: &GraphqlClient,
    publish_update_groups_input: Value,
) -> Result<Vec<UpdateGroupPublication>> {
    let data = client
        .request(
            PUBLISH_UPDATE_GROUP_MUTATION,
            json!({ "publishUpdateGroupsInput": publish_update_groups_input }),
        )
        .await?;
    unwrap_payload(&data, "/updateBranch/publishUpdateGroups")
}

const SET_CODE_SIGNING_INFO_MUTATION: &str = r#"
    mutation SetCodeSigningInfoMutation($updateId: ID!, $codeSigningInfo: CodeSigningInfoInput!) {
        update {
            setCodeSigningInfo(updateId: $updateId, codeSigningInfo: $codeSigningInfo) {
                id
                group
                awaitingCodeSigningInfo
            }
        }
    }
"#;

pub async fn set_code_signing_info(
    client: &GraphqlClient,
    update_id: &str,
    code_signing_info: Value,
) -> Result<Value> {
    let data = client
        .request(
            SET_CODE_SIGNING_INFO_MUTATION,
            json!({ "updateId": update_id, "codeSigningInfo": code_signing_info }),
        )
        .await?;
    Ok(data
        .pointer("/update/setCodeSigningInfo")
        .cloned()
        .unwrap_or(Value::Null))
}

/// Pulls a typed payload out of an unwrapped `data` value. A missing payload
/// after a successful request means the server and CLI disagree on the schema.
fn unwrap_payload<T: serde::de::DeserializeOwned>(data: &Value, pointer: &str) -> Result<T> {
    let payload = data.pointer(pointer).cloned().ok_or_else(|| {
        EasError::RemoteApi(format!("response had no payload at {pointer}"))
    })?;
    Ok(serde_json::from_value(payload)?)
}
