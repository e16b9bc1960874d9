//! Integration tests for the CardVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Secrets are piped through stdin so no interactive prompt is needed,
//! and `reveal` runs with a non-terminal stdout, so it prints the value
//! once and hides it again without waiting out the window.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the cardvault binary, run in `dir`.
fn cardvault(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("cardvault").expect("binary should exist");
    cmd.current_dir(dir.path()).env_remove("CARDVAULT_LOG");
    cmd
}

/// Helper: a temp project with `cardvault init` already run.
fn initialized() -> TempDir {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp).arg("init").assert().success();
    tmp
}

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("project-tracker cards"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("reveal"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("rotate-key"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cardvault"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn mask_prints_masked_value() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .args(["mask", "sk_live_51H4RdE2BqJhGwM5N8"])
        .assert()
        .success()
        .stdout("sk_live_*****wM5N8\n");
}

#[test]
fn init_creates_key_file() {
    let tmp = initialized();
    tmp.child(".cardvault/keys/default.key")
        .assert(predicate::path::is_file());
}

#[test]
fn second_init_fails_without_force() {
    let tmp = initialized();
    cardvault(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key already exists"));

    cardvault(&tmp).args(["init", "--force"]).assert().success();
}

#[test]
fn add_list_reveal_roundtrip() {
    let tmp = initialized();

    cardvault(&tmp)
        .args(["add", "PROJ-1", "Stripe", "--note", "live account"])
        .write_stdin("sk_live_51H4RdE2BqJhGwM5N8\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("added to PROJ-1"));

    cardvault(&tmp)
        .args(["list", "PROJ-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk_live_*****wM5N8"))
        .stdout(predicate::str::contains("live account"))
        .stdout(predicate::str::contains("51H4RdE2Bq").not());

    cardvault(&tmp)
        .args(["reveal", "PROJ-1", "Stripe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk_live_51H4RdE2BqJhGwM5N8"));

    // The plaintext never reaches the store file.
    tmp.child(".cardvault/credentials.json")
        .assert(predicate::str::contains("sk_live_*****wM5N8"))
        .assert(predicate::str::contains("51H4RdE2Bq").not());
}

#[test]
fn add_reference_needs_no_secret() {
    let tmp = initialized();

    cardvault(&tmp)
        .args([
            "add",
            "PROJ-2",
            "Runbook",
            "--kind",
            "reference",
            "https://wiki.example.com/runbook",
        ])
        .assert()
        .success();

    cardvault(&tmp)
        .args(["reveal", "PROJ-2", "Runbook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing is hidden"));
}

#[test]
fn add_updates_existing_name() {
    let tmp = initialized();

    for secret in ["first-secret-1111", "second-secret-2222"] {
        cardvault(&tmp)
            .args(["add", "C", "Token"])
            .write_stdin(secret)
            .assert()
            .success();
    }

    cardvault(&tmp)
        .args(["list", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 credential(s)"))
        .stdout(predicate::str::contains("*****2222"));
}

#[test]
fn add_empty_secret_fails() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["add", "C", "Token"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn add_without_init_fails() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .args(["add", "C", "Token"])
        .write_stdin("some-secret-value")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No encryption key"));
}

#[test]
fn list_empty_card() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["list", "EMPTY-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No credentials"));
}

#[test]
fn reveal_missing_credential_fails() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["reveal", "C", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'Nope' not found"));
}

#[test]
fn remove_with_force() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["add", "C", "Token"])
        .write_stdin("value-to-remove")
        .assert()
        .success();

    cardvault(&tmp)
        .args(["remove", "C", "Token", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 remaining"));

    cardvault(&tmp)
        .args(["list", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No credentials"));
}

#[test]
fn rotate_key_keeps_secrets_readable() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["add", "C", "Token"])
        .write_stdin("ghp_1234567890abcdefABCDEF")
        .assert()
        .success();

    let key_before = std::fs::read_to_string(tmp.path().join(".cardvault/keys/default.key")).unwrap();

    cardvault(&tmp)
        .arg("rotate-key")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 secret(s) re-encrypted"));

    let key_after = std::fs::read_to_string(tmp.path().join(".cardvault/keys/default.key")).unwrap();
    assert_ne!(key_before, key_after);

    cardvault(&tmp)
        .args(["reveal", "C", "Token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghp_1234567890abcdefABCDEF"));
}

#[test]
fn key_export_import_moves_access() {
    let source = initialized();
    cardvault(&source)
        .args(["add", "C", "Token"])
        .write_stdin("shared-secret-9876")
        .assert()
        .success();

    let exported = cardvault(&source)
        .args(["key", "export"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let exported = String::from_utf8(exported).unwrap();

    let target = TempDir::new().unwrap();
    cardvault(&target)
        .args(["key", "import", exported.trim()])
        .assert()
        .success();

    // Same key on both sides: the target can read the source's store.
    std::fs::copy(
        source.path().join(".cardvault/credentials.json"),
        target.path().join(".cardvault/credentials.json"),
    )
    .unwrap();
    cardvault(&target)
        .args(["reveal", "C", "Token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared-secret-9876"));
}

#[test]
fn key_import_rejects_garbage() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .args(["key", "import", "not-a-key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key"));
}

#[test]
fn settings_file_changes_vault_dir() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".cardvault.toml")
        .write_str("vault_dir = \"secrets\"\n")
        .unwrap();

    cardvault(&tmp).arg("init").assert().success();
    tmp.child("secrets/keys/default.key")
        .assert(predicate::path::is_file());
}

#[test]
fn context_flag_selects_key() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["--context", "board-7", "init"])
        .assert()
        .success();
    tmp.child(".cardvault/keys/board-7.key")
        .assert(predicate::path::is_file());
}

#[test]
fn invalid_card_id_rejected() {
    let tmp = initialized();
    cardvault(&tmp)
        .args(["list", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("card id cannot be empty"));
}

#[test]
fn completions_bash() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cardvault"));
}

#[test]
fn completions_unknown_shell_fails() {
    let tmp = TempDir::new().unwrap();
    cardvault(&tmp)
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
