use eas::asc::AscKeyInfo;
use eas::queries::AscApiKeyFragment;

#[test]
fn key_is_invalid_when_unknown_to_the_vendor() {
    assert!(!eas::is_key_valid(None));
}

#[test]
fn key_is_invalid_when_revoked() {
    let info = AscKeyInfo {
        key_id: "K1".into(),
        name: Some("ci key".into()),
        is_revoked: true,
    };
    assert!(!eas::is_key_valid(Some(&info)));
}

#[test]
fn key_is_valid_when_tracked_and_not_revoked() {
    let info = AscKeyInfo {
        key_id: "K1".into(),
        name: None,
        is_revoked: false,
    };
    assert!(eas::is_key_valid(Some(&info)));
}

fn key(id: &str, updated_at: Option<&str>) -> AscApiKeyFragment {
    AscApiKeyFragment {
        id: id.to_string(),
        key_identifier: format!("ident-{id}"),
        name: None,
        updated_at: updated_at.map(String::from),
    }
}

#[test]
fn compare_keys_desc_prefers_newest() {
    let a = key("1", Some("2025-01-01T00:00:00Z"));
    let b = key("2", Some("2025-02-01T00:00:00Z"));
    assert_eq!(
        eas::compare_keys_desc(&a, &b) as i32,
        std::cmp::Ordering::Greater as i32
    );
}

#[test]
fn compare_keys_desc_falls_back_to_id() {
    let a = key("1", None);
    let b = key("2", None);
    assert_eq!(
        eas::compare_keys_desc(&a, &b) as i32,
        std::cmp::Ordering::Greater as i32
    );
}

#[test]
fn submission_details_url_shape() {
    assert_eq!(
        eas::submission_details_url("acme", "demo", "sub1"),
        "https://expo.dev/accounts/acme/projects/demo/submissions/sub1"
    );
}
