use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::graphql::GraphqlClient;
use crate::session::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEvent {
    Build,
    Submit,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::Build => "BUILD",
            WebhookEvent::Submit => "SUBMIT",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub app_id: Option<String>,
    pub event: WebhookEvent,
    pub url: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AscApiKeyFragment {
    pub id: String,
    pub key_identifier: String,
    pub name: Option<String>,
    pub updated_at: Option<String>,
}

const CURRENT_ACTOR_QUERY: &str = r#"
    query CurrentActor {
        meActor {
            __typename
            id
            ... on User {
                username
            }
            ... on Robot {
                firstName
            }
            accounts {
                id
                name
            }
        }
    }
"#;

pub async fn current_actor(client: &GraphqlClient) -> Result<Option<Actor>> {
    let data = client.request(CURRENT_ACTOR_QUERY, Value::Null).await?;
    match data.get("meActor") {
        Some(actor) if !actor.is_null() => Ok(Some(serde_json::from_value(actor.clone())?)),
        _ => Ok(None),
    }
}

const WEBHOOKS_BY_APP_ID_QUERY: &str = r#"
    query WebhooksByAppId($appId: String!, $webhookFilter: WebhookFilter) {
        app {
            byId(appId: $appId) {
                id
                webhooks(filter: $webhookFilter) {
                    id
                    appId
                    event
                    url
                    createdAt
                    updatedAt
                }
            }
        }
    }
"#;

pub async fn webhooks_by_app_id(
    client: &GraphqlClient,
    app_id: &str,
    event: Option<WebhookEvent>,
) -> Result<Vec<Webhook>> {
    let filter = match event {
        Some(event) => json!({ "event": event.as_str() }),
        None => Value::Null,
    };
    let data = client
        .request(
            WEBHOOKS_BY_APP_ID_QUERY,
            json!({ "appId": app_id, "webhookFilter": filter }),
        )
        .await?;
    let webhooks = data
        .pointer("/app/byId/webhooks")
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    Ok(serde_json::from_value(webhooks)?)
}

const WEBHOOK_BY_ID_QUERY: &str = r#"
    query WebhookById($webhookId: ID!) {
        webhook {
            byId(id: $webhookId) {
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

pub async fn webhook_by_id(client: &GraphqlClient, webhook_id: &str) -> Result<Webhook> {
    let data = client
        .request(WEBHOOK_BY_ID_QUERY, json!({ "webhookId": webhook_id }))
        .await?;
    let webhook = data.pointer("/webhook/byId").cloned().ok_or_else(|| {
        crate::errors::EasError::RemoteApi(format!("webhook {webhook_id} was not found"))
    })?;
    if webhook.is_null() {
        return Err(crate::errors::EasError::RemoteApi(format!(
            "webhook {webhook_id} was not found"
        ))
        .into());
    }
    Ok(serde_json::from_value(webhook)?)
}

const ASC_API_KEYS_BY_ACCOUNT_QUERY: &str = r#"
    query AppStoreConnectApiKeysByAccount($accountId: ID!) {
        account {
            byId(accountId: $accountId) {
                id
                appStoreConnectApiKeys {
                    id
                    keyIdentifier
                    name
                    updatedAt
                }
            }
        }
    }
"#;

pub async fn asc_api_keys_for_account(
    client: &GraphqlClient,
    account_id: &str,
) -> Result<Vec<AscApiKeyFragment>> {
    let data = client
        .request(
            ASC_API_KEYS_BY_ACCOUNT_QUERY,
            json!({ "accountId": account_id }),
        )
        .await?;
    let keys = data
        .pointer("/account/byId/appStoreConnectApiKeys")
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    Ok(serde_json::from_value(keys)?)
}

const UPDATE_BRANCH_BY_NAME_QUERY: &str = r#"
    query UpdateBranchByName($appId: String!, $name: String!) {
        app {
            byId(appId: $appId) {
                id
                updateBranchByName(name: $name) {
                    id
                    name
                }
            }
        }
    }
"#;

pub async fn update_branch_id_by_name(
    client: &GraphqlClient,
    app_id: &str,
    name: &str,
) -> Result<Option<String>> {
    let data = client
        .request(
            UPDATE_BRANCH_BY_NAME_QUERY,
            json!({ "appId": app_id, "name": name }),
        )
        .await?;
    Ok(data
        .pointer("/app/byId/updateBranchByName/id")
        .and_then(|id| id.as_str())
        .map(String::from))
}
