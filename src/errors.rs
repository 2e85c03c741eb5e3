use thiserror::Error;

/// Failure taxonomy for the CLI. Commands propagate these through `anyhow`;
/// nothing is retried automatically, and an uncaught error exits non-zero.
#[derive(Debug, Error)]
pub enum EasError {
    #[error("missing profile \"{0}\" in eas.json")]
    ProfileNotFound(String),

    #[error("{0}")]
    Config(String),

    #[error("request to the EAS API failed: {0}")]
    RemoteApi(String),

    #[error("{0}")]
    Credentials(String),

    #[error(
        "input was required but --non-interactive was set: {0}. Pass the missing value as a flag or rerun without --non-interactive"
    )]
    NonInteractive(String),

    #[error("{tool}: {message}")]
    ExternalTool { tool: String, message: String },
}
