use std::path::PathBuf;

use anyhow::Result;
use eas::errors::EasError;
use eas::sources::{
    resolve_asc_api_key_path, AscApiKeyPath, AscApiKeySource, KeyPrompter,
};

/// Prompter with pre-scripted answers, counting how often it was asked.
#[derive(Default)]
struct ScriptedPrompter {
    paths: Vec<PathBuf>,
    strings: Vec<String>,
    path_prompts: usize,
    string_prompts: usize,
}

impl KeyPrompter for ScriptedPrompter {
    fn prompt_path(&mut self, _message: &str) -> Result<PathBuf> {
        self.path_prompts += 1;
        Ok(self.paths.remove(0))
    }

    fn prompt_string(&mut self, _message: &str) -> Result<String> {
        self.string_prompts += 1;
        Ok(self.strings.remove(0))
    }
}

fn path_source(key_p8_path: PathBuf) -> AscApiKeySource {
    AscApiKeySource::Path(AscApiKeyPath {
        key_p8_path,
        key_id: "test-key-id".into(),
        issuer_id: "test-issuer-id".into(),
    })
}

#[test]
fn existing_path_never_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();

    let mut prompter = ScriptedPrompter::default();
    let resolved =
        resolve_asc_api_key_path(false, &path_source(key_file.clone()), &mut prompter).unwrap();

    assert_eq!(prompter.path_prompts, 0);
    assert_eq!(resolved.key_p8_path, key_file);
    assert_eq!(resolved.key_id, "test-key-id");
}

#[test]
fn missing_path_prompts_until_an_existing_file_is_supplied() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();

    // Two bad answers, then a good one: exactly three prompt invocations.
    let mut prompter = ScriptedPrompter {
        paths: vec![
            dir.path().join("doesnt-exist.p8"),
            dir.path().join("blah.p8"),
            key_file.clone(),
        ],
        ..Default::default()
    };
    let resolved = resolve_asc_api_key_path(
        false,
        &path_source(dir.path().join("never-existed.p8")),
        &mut prompter,
    )
    .unwrap();

    assert_eq!(prompter.path_prompts, 3);
    assert_eq!(resolved.key_p8_path, key_file);
}

#[test]
fn prompt_source_asks_for_path_and_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();

    let mut prompter = ScriptedPrompter {
        paths: vec![key_file.clone()],
        strings: vec!["prompted-key-id".into(), "prompted-issuer-id".into()],
        ..Default::default()
    };
    let resolved =
        resolve_asc_api_key_path(false, &AscApiKeySource::Prompt, &mut prompter).unwrap();

    assert_eq!(prompter.path_prompts, 1);
    assert_eq!(prompter.string_prompts, 2);
    assert_eq!(resolved.key_id, "prompted-key-id");
    assert_eq!(resolved.issuer_id, "prompted-issuer-id");
}

#[test]
fn non_interactive_fails_before_any_prompt() {
    let dir = tempfile::tempdir().unwrap();

    let mut prompter = ScriptedPrompter::default();
    let err = resolve_asc_api_key_path(
        true,
        &path_source(dir.path().join("doesnt-exist.p8")),
        &mut prompter,
    )
    .unwrap_err();

    assert_eq!(prompter.path_prompts, 0);
    assert!(matches!(
        err.downcast_ref::<EasError>(),
        Some(EasError::NonInteractive(_))
    ));

    let err =
        resolve_asc_api_key_path(true, &AscApiKeySource::Prompt, &mut prompter).unwrap_err();
    assert_eq!(prompter.path_prompts, 0);
    assert!(matches!(
        err.downcast_ref::<EasError>(),
        Some(EasError::NonInteractive(_))
    ));
}

#[test]
fn non_interactive_path_source_with_existing_file_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("asc-api-key.p8");
    std::fs::write(&key_file, "super secret").unwrap();

    let mut prompter = ScriptedPrompter::default();
    let resolved =
        resolve_asc_api_key_path(true, &path_source(key_file.clone()), &mut prompter).unwrap();
    assert_eq!(prompter.path_prompts, 0);
    assert_eq!(resolved.key_p8_path, key_file);
}
