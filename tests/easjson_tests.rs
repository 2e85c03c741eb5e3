use eas::easjson::{EasJsonAccessor, Platform};
use eas::errors::EasError;

const EAS_JSON: &str = r#"
{
    "cli": { "version": ">= 5.0.0" },
    "build": {
        "base": {
            "channel": "main",
            "env": { "APP_ENV": "base" },
            "ios": { "image": "latest" }
        },
        "production": {
            "extends": "base",
            "distribution": "store",
            "env": { "SENTRY": "on" },
            "android": { "image": "ubuntu-22.04-jdk-17-ndk-r25" }
        }
    },
    "submit": {
        "production": {
            "ios": {
                "ascAppId": "1234567890",
                "ascApiKeyPath": "./asc-key.p8",
                "ascApiKeyId": "ABCDEF",
                "ascApiKeyIssuerId": "issuer-1"
            },
            "android": {
                "track": "internal",
                "serviceAccountKeyPath": "./service-account.json"
            }
        }
    }
}
"#;

fn accessor() -> EasJsonAccessor {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("eas.json"), EAS_JSON).unwrap();
    EasJsonAccessor::from_project_dir(dir.path()).unwrap()
}

#[test]
fn enumerates_profile_names() {
    let accessor = accessor();
    assert_eq!(accessor.build_profile_names(), vec!["base", "production"]);
    assert_eq!(accessor.submit_profile_names(), vec!["production"]);
}

#[test]
fn missing_profile_is_a_configuration_error() {
    let accessor = accessor();
    let err = accessor
        .build_profile(Platform::Ios, "does-not-exist")
        .unwrap_err();
    match err.downcast_ref::<EasError>() {
        Some(EasError::ProfileNotFound(name)) => assert_eq!(name, "does-not-exist"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn platform_block_wins_over_common_fields() {
    let accessor = accessor();
    let ios = accessor.build_profile(Platform::Ios, "production").unwrap();
    assert_eq!(ios.image.as_deref(), Some("latest"));
    assert_eq!(ios.channel.as_deref(), Some("main"));
    assert_eq!(ios.distribution.as_deref(), Some("store"));

    let android = accessor
        .build_profile(Platform::Android, "production")
        .unwrap();
    assert_eq!(android.image.as_deref(), Some("ubuntu-22.04-jdk-17-ndk-r25"));
}

#[test]
fn extends_chain_merges_env_key_wise() {
    let accessor = accessor();
    let profile = accessor.build_profile(Platform::Ios, "production").unwrap();
    assert_eq!(profile.env.get("APP_ENV").map(String::as_str), Some("base"));
    assert_eq!(profile.env.get("SENTRY").map(String::as_str), Some("on"));
}

#[test]
fn submit_profile_is_platform_specific() {
    let accessor = accessor();
    let ios = accessor
        .submit_profile(Platform::Ios, "production")
        .unwrap();
    assert_eq!(ios.asc_app_id.as_deref(), Some("1234567890"));
    assert_eq!(ios.asc_api_key_id.as_deref(), Some("ABCDEF"));
    assert!(ios.track.is_none());

    let android = accessor
        .submit_profile(Platform::Android, "production")
        .unwrap();
    assert_eq!(android.track.as_deref(), Some("internal"));
    assert!(android.asc_app_id.is_none());
}

#[test]
fn circular_extends_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("eas.json"),
        r#"{"build": {"a": {"extends": "b"}, "b": {"extends": "a"}}}"#,
    )
    .unwrap();
    let accessor = EasJsonAccessor::from_project_dir(dir.path()).unwrap();
    let err = accessor.build_profile(Platform::Ios, "a").unwrap_err();
    assert!(err.to_string().contains("circular"));
}
