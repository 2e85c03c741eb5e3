#![cfg(feature = "http-mock")]

use httpmock::{Method::POST, MockServer};
use serde_json::json;

use eas::analytics::EventLog;
use eas::easjson::{Platform, SubmitProfile};
use eas::errors::EasError;
use eas::graphql::{GraphqlClient, SessionAuth};
use eas::queries;
use eas::submit::{submit, ArchiveSource, SubmissionContext};

fn mock_client(server: &MockServer) -> GraphqlClient {
    GraphqlClient::new(SessionAuth::SessionSecret("test".into()))
        .unwrap()
        .with_base_url(reqwest::Url::parse(&server.base_url()).unwrap())
}

#[tokio::test]
async fn current_actor_unwraps_the_data_envelope() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": {
                    "meActor": {
                        "__typename": "User",
                        "id": "user-1",
                        "username": "jester",
                        "accounts": [{"id": "acct-1", "name": "jester"}]
                    }
                }
            }));
    });

    let client = mock_client(&server);
    let actor = queries::current_actor(&client).await.unwrap().unwrap();
    assert_eq!(actor.display_name(), "jester");
    assert_eq!(actor.accounts().len(), 1);
}

#[tokio::test]
async fn graphql_error_envelope_becomes_a_typed_error() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": null,
                "errors": [
                    {"message": "Entity not authorized"},
                    {"message": "Experience with id 'xyz' does not exist"}
                ]
            }));
    });

    let client = mock_client(&server);
    let err = queries::current_actor(&client).await.unwrap_err();
    match err.downcast_ref::<EasError>() {
        Some(EasError::RemoteApi(message)) => {
            assert!(message.contains("Entity not authorized"));
            assert!(message.contains("does not exist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_registers_the_submission_in_one_call() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("CreateIosSubmissionMutation");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": {
                    "submission": {
                        "createIosSubmission": {
                            "submission": {
                                "id": "sub-1",
                                "status": "IN_QUEUE",
                                "platform": "IOS",
                                "logsUrl": null
                            }
                        }
                    }
                }
            }));
    });

    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();

    let client = mock_client(&server);
    let ctx = SubmissionContext {
        platform: Platform::Ios,
        project_dir: dir.path().to_path_buf(),
        project_id: "proj-1".to_string(),
        archive_source: ArchiveSource::Url("https://example.com/app.ipa".to_string()),
        profile: SubmitProfile {
            asc_app_id: Some("1234567890".to_string()),
            asc_api_key_path: Some(key_file.to_string_lossy().into_owned()),
            asc_api_key_id: Some("ABCDEF".to_string()),
            asc_api_key_issuer_id: Some("issuer-1".to_string()),
            ..Default::default()
        },
        non_interactive: true,
        json: true,
        graphql: &client,
    };

    let mut log = EventLog::new(false);
    let mut prompter = NoPrompter;
    let submission = submit(&ctx, &mut log, &mut prompter).await.unwrap();

    mock.assert();
    assert_eq!(submission.id, "sub-1");
    assert_eq!(submission.status, "IN_QUEUE");
    let names = log.names();
    assert_eq!(names.last(), Some(&"SUBMIT_REQUEST_SUCCESS"));
    assert!(names.contains(&"SUBMIT_REQUEST_ATTEMPT"));
}

#[tokio::test]
async fn create_apple_team_returns_the_tracked_team() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("CreateAppleTeamMutation");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": {
                    "appleTeam": {
                        "createAppleTeam": {
                            "id": "team-1",
                            "appleTeamIdentifier": "AB12CD34EF",
                            "appleTeamName": "ACME Corp",
                            "account": {"id": "acct-1", "name": "acme"}
                        }
                    }
                }
            }));
    });

    let client = mock_client(&server);
    let team = eas::mutations::create_apple_team(&client, "acct-1", "AB12CD34EF", Some("ACME Corp"))
        .await
        .unwrap();
    assert_eq!(team.apple_team_identifier, "AB12CD34EF");
    assert_eq!(
        eas::mutations::format_apple_team(&team),
        "Team ID: AB12CD34EF, Team name: ACME Corp"
    );
}

#[tokio::test]
async fn upload_specifications_unwrap_to_a_plain_list() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("GetSignedUploadMutation");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": {
                    "asset": {
                        "getSignedAssetUploadSpecifications": {
                            "specifications": ["spec-a", "spec-b"]
                        }
                    }
                }
            }));
    });

    let client = mock_client(&server);
    let specs = eas::mutations::get_signed_upload_urls(&client, &["application/octet-stream"])
        .await
        .unwrap();
    assert_eq!(specs, vec!["spec-a".to_string(), "spec-b".to_string()]);
}

#[tokio::test]
async fn set_code_signing_info_round_trips() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("SetCodeSigningInfoMutation");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "data": {
                    "update": {
                        "setCodeSigningInfo": {
                            "id": "update-1",
                            "group": "group-1",
                            "awaitingCodeSigningInfo": false
                        }
                    }
                }
            }));
    });

    let client = mock_client(&server);
    let update = eas::mutations::set_code_signing_info(
        &client,
        "update-1",
        json!({"keyid": "main", "alg": "rsa-v1_5-sha256", "sig": "deadbeef"}),
    )
    .await
    .unwrap();
    assert_eq!(update["awaitingCodeSigningInfo"], false);
}

struct NoPrompter;

impl eas::sources::KeyPrompter for NoPrompter {
    fn prompt_path(&mut self, _message: &str) -> anyhow::Result<std::path::PathBuf> {
        panic!("no prompt expected");
    }

    fn prompt_string(&mut self, _message: &str) -> anyhow::Result<String> {
        panic!("no prompt expected");
    }
}
