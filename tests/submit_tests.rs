use std::path::PathBuf;

use anyhow::Result;
use eas::analytics::EventLog;
use eas::easjson::{Platform, SubmitProfile};
use eas::errors::EasError;
use eas::graphql::{GraphqlClient, SessionAuth};
use eas::sources::KeyPrompter;
use eas::submit::{
    resolve_source_options, source_options_for, ArchiveSource, SubmissionContext,
};

#[derive(Default)]
struct ScriptedPrompter {
    strings: Vec<String>,
    prompts: usize,
}

impl KeyPrompter for ScriptedPrompter {
    fn prompt_path(&mut self, _message: &str) -> Result<PathBuf> {
        self.prompts += 1;
        panic!("no path prompt expected in these tests");
    }

    fn prompt_string(&mut self, _message: &str) -> Result<String> {
        self.prompts += 1;
        Ok(self.strings.remove(0))
    }
}

fn ios_context<'a>(
    graphql: &'a GraphqlClient,
    project_dir: PathBuf,
    profile: SubmitProfile,
    archive_source: ArchiveSource,
    non_interactive: bool,
) -> SubmissionContext<'a> {
    SubmissionContext {
        platform: Platform::Ios,
        project_dir,
        project_id: "proj-1".to_string(),
        archive_source,
        profile,
        non_interactive,
        json: true,
        graphql,
    }
}

fn ios_profile_with_key(dir: &std::path::Path) -> SubmitProfile {
    let key_file = dir.join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();
    SubmitProfile {
        asc_app_id: Some("1234567890".to_string()),
        asc_api_key_path: Some(key_file.to_string_lossy().into_owned()),
        asc_api_key_id: Some("ABCDEF".to_string()),
        asc_api_key_issuer_id: Some("issuer-1".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn source_options_resolve_in_declaration_order() {
    let dir = tempfile::tempdir().unwrap();
    let graphql = GraphqlClient::new(SessionAuth::None).unwrap();
    let ctx = ios_context(
        &graphql,
        dir.path().to_path_buf(),
        ios_profile_with_key(dir.path()),
        ArchiveSource::Url("https://example.com/app.ipa".to_string()),
        true,
    );

    let mut log = EventLog::new(false);
    let mut prompter = ScriptedPrompter::default();
    let resolved =
        resolve_source_options(&ctx, source_options_for(ctx.platform), &mut log, &mut prompter)
            .await
            .unwrap();

    assert_eq!(prompter.prompts, 0);
    assert_eq!(
        log.names(),
        &[
            "SUBMIT_RESOLVE_ARCHIVE_ATTEMPT",
            "SUBMIT_RESOLVE_ARCHIVE_SUCCESS",
            "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_ATTEMPT",
            "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_SUCCESS",
            "SUBMIT_RESOLVE_ASC_API_KEY_ATTEMPT",
            "SUBMIT_RESOLVE_ASC_API_KEY_SUCCESS",
        ]
    );
    assert_eq!(
        resolved.asc_api_key.unwrap().key.key_p8,
        "super secret".to_string()
    );
    assert_eq!(resolved.asc_app_identifier.as_deref(), Some("1234567890"));
}

#[tokio::test]
async fn failure_in_one_option_aborts_before_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let graphql = GraphqlClient::new(SessionAuth::None).unwrap();
    // ascAppId missing: option 2 of 3 must fail in non-interactive mode and
    // option 3 must never be attempted.
    let mut profile = ios_profile_with_key(dir.path());
    profile.asc_app_id = None;
    let ctx = ios_context(
        &graphql,
        dir.path().to_path_buf(),
        profile,
        ArchiveSource::Url("https://example.com/app.ipa".to_string()),
        true,
    );

    let mut log = EventLog::new(false);
    let mut prompter = ScriptedPrompter::default();
    let err =
        resolve_source_options(&ctx, source_options_for(ctx.platform), &mut log, &mut prompter)
            .await
            .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EasError>(),
        Some(EasError::NonInteractive(_))
    ));
    assert_eq!(prompter.prompts, 0);
    assert_eq!(
        log.names(),
        &[
            "SUBMIT_RESOLVE_ARCHIVE_ATTEMPT",
            "SUBMIT_RESOLVE_ARCHIVE_SUCCESS",
            "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_ATTEMPT",
            "SUBMIT_RESOLVE_ASC_APP_IDENTIFIER_FAIL",
        ]
    );
}

#[tokio::test]
async fn missing_archive_fails_before_any_prompt_in_non_interactive_mode() {
    let dir = tempfile::tempdir().unwrap();
    let graphql = GraphqlClient::new(SessionAuth::None).unwrap();
    let ctx = ios_context(
        &graphql,
        dir.path().to_path_buf(),
        ios_profile_with_key(dir.path()),
        ArchiveSource::Prompt,
        true,
    );

    let mut log = EventLog::new(false);
    let mut prompter = ScriptedPrompter::default();
    let err =
        resolve_source_options(&ctx, source_options_for(ctx.platform), &mut log, &mut prompter)
            .await
            .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EasError>(),
        Some(EasError::NonInteractive(_))
    ));
    assert_eq!(prompter.prompts, 0);
    assert_eq!(
        log.names(),
        &["SUBMIT_RESOLVE_ARCHIVE_ATTEMPT", "SUBMIT_RESOLVE_ARCHIVE_FAIL"]
    );
}

#[tokio::test]
async fn android_declares_archive_then_service_account_key() {
    let dir = tempfile::tempdir().unwrap();
    let sa_file = dir.path().join("service-account.json");
    std::fs::write(&sa_file, r#"{"client_email": "ci@example.iam.gserviceaccount.com"}"#)
        .unwrap();
    let graphql = GraphqlClient::new(SessionAuth::None).unwrap();
    let ctx = SubmissionContext {
        platform: Platform::Android,
        project_dir: dir.path().to_path_buf(),
        project_id: "proj-1".to_string(),
        archive_source: ArchiveSource::BuildId("build-42".to_string()),
        profile: SubmitProfile {
            service_account_key_path: Some(sa_file.to_string_lossy().into_owned()),
            track: Some("internal".to_string()),
            ..Default::default()
        },
        non_interactive: true,
        json: true,
        graphql: &graphql,
    };

    let mut log = EventLog::new(false);
    let mut prompter = ScriptedPrompter::default();
    let resolved =
        resolve_source_options(&ctx, source_options_for(ctx.platform), &mut log, &mut prompter)
            .await
            .unwrap();

    assert_eq!(
        log.names(),
        &[
            "SUBMIT_RESOLVE_ARCHIVE_ATTEMPT",
            "SUBMIT_RESOLVE_ARCHIVE_SUCCESS",
            "SUBMIT_RESOLVE_SERVICE_ACCOUNT_KEY_ATTEMPT",
            "SUBMIT_RESOLVE_SERVICE_ACCOUNT_KEY_SUCCESS",
        ]
    );
    assert!(resolved.service_account_key.is_some());
}
