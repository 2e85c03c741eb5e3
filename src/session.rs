use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::EasError;
use crate::graphql::{api_base_url, GraphqlClient, SessionAuth};
use crate::queries;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// The authenticated identity driving the CLI: a human user or a robot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "__typename")]
pub enum Actor {
    User {
        id: String,
        username: String,
        #[serde(default)]
        accounts: Vec<Account>,
    },
    Robot {
        id: String,
        #[serde(default, rename = "firstName")]
        first_name: Option<String>,
        #[serde(default)]
        accounts: Vec<Account>,
    },
}

impl Actor {
    pub fn id(&self) -> &str {
        match self {
            Actor::User { id, .. } | Actor::Robot { id, .. } => id,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        match self {
            Actor::User { accounts, .. } | Actor::Robot { accounts, .. } => accounts,
        }
    }

    /// Display name of the actor. This CANNOT be used as a project owner;
    /// robots in particular have no personal account.
    pub fn display_name(&self) -> String {
        match self {
            Actor::User { username, .. } => username.clone(),
            Actor::Robot { first_name, .. } => match first_name {
                Some(name) => format!("{name} (robot)"),
                None => "robot".to_string(),
            },
        }
    }

    /// Name of the actor's primary account, used as the default project owner.
    pub fn account_name(&self) -> String {
        match self {
            Actor::User { username, accounts, .. } => accounts
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| username.clone()),
            Actor::Robot { accounts, .. } => accounts
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "robot".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionData {
    session_secret: Option<String>,
    access_token: Option<String>,
    user_id: Option<String>,
    username: Option<String>,
    current_connection: Option<String>,
}

fn session_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("EAS_SESSION_FILE") {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| EasError::Config("could not determine the home directory".to_string()))?;
    Ok(home.join(".eas").join("session.json"))
}

/// Explicit session state passed through command context. The current actor
/// is fetched lazily, cached for the lifetime of the invocation, and
/// invalidated only by an explicit logout. The session file on disk is the
/// source of truth for the next invocation.
pub struct Session {
    path: PathBuf,
    data: Option<SessionData>,
    actor: Option<Actor>,
}

impl Session {
    pub fn load() -> Result<Self> {
        let path = session_file_path()?;
        let data = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(serde_json::from_str(&text).with_context(|| {
                format!("{} is corrupted; run `eas login` again", path.display())
            })?)
        } else {
            None
        };
        Ok(Self {
            path,
            data,
            actor: None,
        })
    }

    /// An access token set through EXPO_TOKEN takes precedence over a stored
    /// session secret, matching server-side robot authentication.
    pub fn auth(&self) -> SessionAuth {
        if let Ok(token) = std::env::var("EXPO_TOKEN") {
            if !token.is_empty() {
                return SessionAuth::AccessToken(token);
            }
        }
        match &self.data {
            Some(data) => {
                if let Some(token) = &data.access_token {
                    SessionAuth::AccessToken(token.clone())
                } else if let Some(secret) = &data.session_secret {
                    SessionAuth::SessionSecret(secret.clone())
                } else {
                    SessionAuth::None
                }
            }
            None => SessionAuth::None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !matches!(self.auth(), SessionAuth::None)
    }

    /// Fetches the current actor once and caches it for this invocation.
    pub async fn actor(&mut self, client: &GraphqlClient) -> Result<Option<&Actor>> {
        if self.actor.is_none() && self.has_credentials() {
            self.actor = queries::current_actor(client).await?;
        }
        Ok(self.actor.as_ref())
    }

    pub async fn ensure_logged_in(&mut self, client: &GraphqlClient) -> Result<&Actor> {
        if !self.has_credentials() {
            return Err(EasError::Credentials(
                "no session found. Run `eas login` first".to_string(),
            )
            .into());
        }
        self.actor(client)
            .await?
            .ok_or_else(|| EasError::Credentials("session is no longer valid".to_string()).into())
    }

    pub async fn login(&mut self, username: &str, password: &str, otp: Option<&str>) -> Result<Actor> {
        let session_secret = login_request(username, password, otp).await?;

        let client = GraphqlClient::new(SessionAuth::SessionSecret(session_secret.clone()))?;
        let actor = queries::current_actor(&client)
            .await?
            .ok_or_else(|| EasError::Credentials("login did not return a user".to_string()))?;

        self.store(SessionData {
            session_secret: Some(session_secret),
            access_token: None,
            user_id: Some(actor.id().to_string()),
            username: Some(actor.display_name()),
            current_connection: Some("Username-Password-Authentication".to_string()),
        })?;
        self.actor = Some(actor.clone());
        Ok(actor)
    }

    /// Clears the cached actor and deletes the session file.
    pub fn logout(&mut self) -> Result<()> {
        self.actor = None;
        self.data = None;
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn store(&mut self, data: SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.data = Some(data);
        Ok(())
    }
}

/// The login endpoint predates the GraphQL API and is plain REST.
async fn login_request(username: &str, password: &str, otp: Option<&str>) -> Result<String> {
    let url = api_base_url()?.join("v2/auth/loginAsync")?;
    let http = reqwest::Client::builder()
        .user_agent(concat!("eas-cli/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()?;
    let mut body = json!({ "username": username, "password": password });
    if let Some(otp) = otp {
        body["otp"] = json!(otp);
    }
    let res = http
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| EasError::RemoteApi(e.to_string()))?;
    let status = res.status();
    let payload: serde_json::Value = res
        .json()
        .await
        .map_err(|e| EasError::RemoteApi(e.to_string()))?;
    if !status.is_success() {
        let message = payload
            .pointer("/errors/0/message")
            .and_then(|m| m.as_str())
            .unwrap_or("invalid username or password");
        return Err(EasError::Credentials(message.to_string()).into());
    }
    payload
        .pointer("/data/sessionSecret")
        .and_then(|s| s.as_str())
        .map(String::from)
        .ok_or_else(|| EasError::RemoteApi("login response had no session secret".to_string()).into())
}
