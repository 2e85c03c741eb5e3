use anyhow::Result;
use reqwest::{Client, Url};
use serde_json::{json, Value};

use crate::errors::EasError;

pub const DEFAULT_API_URL: &str = "https://api.expo.dev/";

/// Base URL of the EAS API, overridable through `EXPO_API_URL`.
pub fn api_base_url() -> Result<Url> {
    let raw = std::env::var("EXPO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let url = Url::parse(&raw)
        .map_err(|e| EasError::Config(format!("EXPO_API_URL is not a valid URL: {e}")))?;
    Ok(url)
}

#[derive(Debug, Clone, Default)]
pub enum SessionAuth {
    #[default]
    None,
    SessionSecret(String),
    AccessToken(String),
}

pub struct GraphqlClient {
    http: Client,
    base_url: Url,
    auth: SessionAuth,
}

impl GraphqlClient {
    pub fn new(auth: SessionAuth) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("eas-cli/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;
        Ok(Self {
            http,
            base_url: api_base_url()?,
            auth,
        })
    }

    /// Overrides the base URL for API requests. Useful for tests with a mock server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.auth, SessionAuth::None)
    }

    /// Issues one GraphQL request and unwraps the response envelope. Callers
    /// receive the `data` payload or a typed error, never the raw envelope.
    /// A failed call surfaces immediately; there are no retries here.
    pub async fn request(&self, query: &str, variables: Value) -> Result<Value> {
        let url = self.base_url.join("graphql")?;
        let mut req = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }));
        req = match &self.auth {
            SessionAuth::None => req,
            SessionAuth::SessionSecret(secret) => req.header("expo-session", secret),
            SessionAuth::AccessToken(token) => {
                req.header("Authorization", format!("Bearer {token}"))
            }
        };

        let res = req
            .send()
            .await
            .map_err(|e| EasError::RemoteApi(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| EasError::RemoteApi(e.to_string()))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|_| EasError::RemoteApi(format!("{status}: {text}")))?;

        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("unknown GraphQL error")
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(EasError::RemoteApi(message).into());
            }
        }
        if !status.is_success() {
            return Err(EasError::RemoteApi(format!("{status}: {text}")).into());
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
