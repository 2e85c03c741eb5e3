use std::path::PathBuf;

use anyhow::Result;
use serde_json::{json, Value};

use crate::analytics::{with_analytics, EventLog, EventTriple, SUBMIT_REQUEST};
use crate::easjson::{Platform, SubmitProfile};
use crate::errors::EasError;
use crate::graphql::GraphqlClient;
use crate::mutations::{self, Submission};
use crate::sources::{
    resolve_asc_api_key, resolve_service_account_key, AscApiKeyPath, AscApiKeyResult,
    AscApiKeySource, KeyPrompter, ServiceAccountKeyResult, ServiceAccountSource,
};
use crate::util::spinner;

/// Where the app archive to submit comes from.
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    Url(String),
    BuildId(String),
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedArchive {
    Url(String),
    BuildId(String),
}

/// Immutable per-invocation submission state. Built once from flags and the
/// submit profile, then only read.
pub struct SubmissionContext<'a> {
    pub platform: Platform,
    pub project_dir: PathBuf,
    pub project_id: String,
    pub archive_source: ArchiveSource,
    pub profile: SubmitProfile,
    pub non_interactive: bool,
    pub json: bool,
    pub graphql: &'a GraphqlClient,
}

/// One value the submission needs before it can be registered. Resolution
/// runs strictly in declaration order: several options may prompt, and
/// parallel prompts would race on the one terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOption {
    Archive,
    AscAppIdentifier,
    AscApiKey,
    ServiceAccountKey,
}

pub const IOS_SOURCE_OPTIONS: &[SourceOption] = &[
    SourceOption::Archive,
    SourceOption::AscAppIdentifier,
    SourceOption::AscApiKey,
];

pub const ANDROID_SOURCE_OPTIONS: &[SourceOption] =
    &[SourceOption::Archive, SourceOption::ServiceAccountKey];

pub fn source_options_for(platform: Platform) -> &'static [SourceOption] {
    match platform {
        Platform::Ios => IOS_SOURCE_OPTIONS,
        Platform::Android => ANDROID_SOURCE_OPTIONS,
    }
}

fn events_for(option: SourceOption) -> EventTriple {
    match option {
        SourceOption::Archive => EventTriple {
            attempt: "SUBMIT_RESOLVE_ARCHIVE_ATTEMPT",
            success: "SUBMIT_RESOLVE_ARCHIVE_SUCCESS",
            failure: "SUBMIT_RESOLVE_ARCHIVE_FAIL",
        },
        SourceOption::AscAppIdentifier => EventTriple {
            attempt: "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_ATTEMPT",
            success: "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_SUCCESS",
            failure: "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_FAIL",
        },
        SourceOption::AscApiKey => EventTriple {
            attempt: "SUBMIT_RESOLVE_ASC_API_KEY_ATTEMPT",
            success: "SUBMIT_RESOLVE_ASC_API_KEY_SUCCESS",
            failure: "SUBMIT_RESOLVE_ASC_API_KEY_FAIL",
        },
        SourceOption::ServiceAccountKey => EventTriple {
            attempt: "SUBMIT_RESOLVE_SERVICE_ACCOUNT_KEY_ATTEMPT",
            success: "SUBMIT_RESOLVE_SERVICE_ACCOUNT_KEY_SUCCESS",
            failure: "SUBMIT_RESOLVE_SERVICE_ACCOUNT_KEY_FAIL",
        },
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSourceOptions {
    pub archive: Option<ResolvedArchive>,
    pub asc_app_identifier: Option<String>,
    pub asc_api_key: Option<AscApiKeyResult>,
    pub service_account_key: Option<ServiceAccountKeyResult>,
}

/// Resolves every source option in declaration order, instrumenting each
/// with attempt/success/failure events. Failure in option N aborts before
/// option N+1 is touched.
pub async fn resolve_source_options(
    ctx: &SubmissionContext<'_>,
    options: &[SourceOption],
    log: &mut EventLog,
    prompter: &mut dyn KeyPrompter,
) -> Result<ResolvedSourceOptions> {
    let mut resolved = ResolvedSourceOptions::default();
    for option in options {
        match option {
            SourceOption::Archive => {
                let archive = with_analytics(log, events_for(*option), async {
                    resolve_archive(ctx, prompter)
                })
                .await?;
                resolved.archive = Some(archive);
            }
            SourceOption::AscAppIdentifier => {
                let identifier = with_analytics(log, events_for(*option), async {
                    resolve_asc_app_identifier(ctx, prompter)
                })
                .await?;
                resolved.asc_app_identifier = Some(identifier);
            }
            SourceOption::AscApiKey => {
                let key = with_analytics(log, events_for(*option), async {
                    resolve_asc_api_key(ctx.non_interactive, &asc_api_key_source(&ctx.profile), prompter)
                })
                .await?;
                resolved.asc_api_key = Some(key);
            }
            SourceOption::ServiceAccountKey => {
                let key = with_analytics(log, events_for(*option), async {
                    resolve_service_account_key(
                        ctx.non_interactive,
                        &service_account_source(&ctx.profile),
                        prompter,
                    )
                })
                .await?;
                resolved.service_account_key = Some(key);
            }
        }
    }
    Ok(resolved)
}

fn resolve_archive(
    ctx: &SubmissionContext<'_>,
    prompter: &mut dyn KeyPrompter,
) -> Result<ResolvedArchive> {
    match &ctx.archive_source {
        ArchiveSource::Url(url) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    EasError::Config(format!("\"{url}\" is not a valid archive URL")).into(),
                );
            }
            Ok(ResolvedArchive::Url(url.clone()))
        }
        ArchiveSource::BuildId(id) => {
            if id.is_empty() {
                return Err(EasError::Config("the build id must not be empty".to_string()).into());
            }
            Ok(ResolvedArchive::BuildId(id.clone()))
        }
        ArchiveSource::Prompt => {
            if ctx.non_interactive {
                return Err(EasError::NonInteractive(
                    "providing an app archive (--url or --id)".to_string(),
                )
                .into());
            }
            let raw =
                prompter.prompt_string("URL to the app archive or the ID of an existing build")?;
            if raw.starts_with("http://") || raw.starts_with("https://") {
                Ok(ResolvedArchive::Url(raw))
            } else if raw.is_empty() {
                Err(EasError::Config("the archive reference must not be empty".to_string()).into())
            } else {
                Ok(ResolvedArchive::BuildId(raw))
            }
        }
    }
}

fn resolve_asc_app_identifier(
    ctx: &SubmissionContext<'_>,
    prompter: &mut dyn KeyPrompter,
) -> Result<String> {
    if let Some(asc_app_id) = &ctx.profile.asc_app_id {
        return Ok(asc_app_id.clone());
    }
    if ctx.non_interactive {
        return Err(EasError::NonInteractive(
            "providing the App Store Connect app ID (ascAppId)".to_string(),
        )
        .into());
    }
    prompter.prompt_string("App Store Connect app ID (ascAppId)")
}

/// The submit profile decides the key strategy: a fully-specified key block
/// is a path source, anything less falls back to prompting.
pub fn asc_api_key_source(profile: &SubmitProfile) -> AscApiKeySource {
    match (
        &profile.asc_api_key_path,
        &profile.asc_api_key_id,
        &profile.asc_api_key_issuer_id,
    ) {
        (Some(path), Some(key_id), Some(issuer_id)) => AscApiKeySource::Path(AscApiKeyPath {
            key_p8_path: PathBuf::from(path),
            key_id: key_id.clone(),
            issuer_id: issuer_id.clone(),
        }),
        _ => AscApiKeySource::Prompt,
    }
}

pub fn service_account_source(profile: &SubmitProfile) -> ServiceAccountSource {
    match &profile.service_account_key_path {
        Some(path) => ServiceAccountSource::Path(PathBuf::from(path)),
        None => ServiceAccountSource::Prompt,
    }
}

fn missing_option(name: &str) -> EasError {
    EasError::Config(format!("source option \"{name}\" was not resolved"))
}

/// Builds the platform-specific submission config plus the optional build id
/// to attach.
pub fn create_submission_config(
    ctx: &SubmissionContext<'_>,
    resolved: &ResolvedSourceOptions,
) -> Result<(Value, Option<String>)> {
    let archive = resolved
        .archive
        .as_ref()
        .ok_or_else(|| missing_option("archive"))?;
    let (archive_url, build_id) = match archive {
        ResolvedArchive::Url(url) => (Some(url.clone()), None),
        ResolvedArchive::BuildId(id) => (None, Some(id.clone())),
    };

    let config = match ctx.platform {
        Platform::Ios => {
            let key = resolved
                .asc_api_key
                .as_ref()
                .ok_or_else(|| missing_option("ascApiKey"))?;
            let identifier = resolved
                .asc_app_identifier
                .as_ref()
                .ok_or_else(|| missing_option("ascAppIdentifier"))?;
            let mut config = json!({
                "ascApiKey": {
                    "keyP8": key.key.key_p8,
                    "keyIdentifier": key.key.key_id,
                    "issuerIdentifier": key.key.issuer_id,
                },
                "ascAppIdentifier": identifier,
            });
            if let Some(apple_team_id) = &ctx.profile.apple_team_id {
                config["appleTeamId"] = json!(apple_team_id);
            }
            if let Some(url) = &archive_url {
                config["archiveUrl"] = json!(url);
            }
            config
        }
        Platform::Android => {
            let key = resolved
                .service_account_key
                .as_ref()
                .ok_or_else(|| missing_option("serviceAccountKey"))?;
            let mut config = json!({
                "googleServiceAccountKeyJson": key.json.to_string(),
                "track": ctx.profile.track.as_deref().unwrap_or("internal"),
            });
            if let Some(release_status) = &ctx.profile.release_status {
                config["releaseStatus"] = json!(release_status);
            }
            if let Some(changes) = ctx.profile.changes_not_sent_for_review {
                config["changesNotSentForReview"] = json!(changes);
            }
            if let Some(url) = &archive_url {
                config["archiveUrl"] = json!(url);
            }
            config
        }
    };
    Ok((config, build_id))
}

/// The submission workflow: resolve all source options sequentially, build
/// the platform input, then register it with the server in one atomic call.
/// Registration failures leave nothing behind to roll back.
pub async fn submit(
    ctx: &SubmissionContext<'_>,
    log: &mut EventLog,
    prompter: &mut dyn KeyPrompter,
) -> Result<Submission> {
    let resolved =
        resolve_source_options(ctx, source_options_for(ctx.platform), log, prompter).await?;
    let (config, build_id) = create_submission_config(ctx, &resolved)?;

    let platform_name = ctx.platform.display_name();
    with_analytics(log, SUBMIT_REQUEST, async {
        let pb = spinner(&format!("Scheduling {platform_name} submission"), !ctx.json);
        let result = match ctx.platform {
            Platform::Ios => {
                mutations::create_ios_submission(
                    ctx.graphql,
                    &ctx.project_id,
                    config,
                    build_id.as_deref(),
                )
                .await
            }
            Platform::Android => {
                mutations::create_android_submission(
                    ctx.graphql,
                    &ctx.project_id,
                    config,
                    build_id.as_deref(),
                )
                .await
            }
        };
        match &result {
            Ok(_) => pb.finish_with_message(format!("Scheduled {platform_name} submission")),
            Err(_) => pb.abandon_with_message(format!("Failed to schedule {platform_name} submission")),
        }
        result
    })
    .await
}
