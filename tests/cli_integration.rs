//! Integration tests for the parley binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn parley_bin() -> Command {
    Command::cargo_bin("parley").expect("binary is built")
}

fn memory_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("parley.toml");
    std::fs::write(
        &path,
        "[store]\nbackend = \"memory\"\n\n[bot]\nadmin_id = 7\n",
    )
    .unwrap();
    path
}

#[test]
fn test_version_command() {
    parley_bin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parley"));
}

#[test]
fn test_help_lists_commands() {
    parley_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("serve"))
                .and(predicate::str::contains("chat"))
                .and(predicate::str::contains("export"))
                .and(predicate::str::contains("import")),
        );
}

#[test]
fn test_unknown_command_fails() {
    parley_bin().arg("dance").assert().failure();
}

#[test]
fn test_init_in_temp_dir() {
    let dir = TempDir::new().unwrap();

    parley_bin()
        .args(["init", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Parley initialized"));

    assert!(dir.path().join("parley.toml").exists());
    assert!(dir.path().join(".parley/knowledge.db").exists());

    parley_bin()
        .args(["init", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_with_admin_and_wake_words() {
    let dir = TempDir::new().unwrap();

    parley_bin()
        .args(["init", "--admin-id", "-77", "--wake-word", "oi", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wake words: oi").and(predicate::str::contains("admin:      -77")));

    let config = std::fs::read_to_string(dir.path().join("parley.toml")).unwrap();
    assert!(config.contains("admin_id = -77"));
    assert!(config.contains("\"oi\""));
}

#[test]
fn test_keys_on_empty_store() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);

    parley_bin()
        .arg("--config")
        .arg(&config)
        .arg("keys")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing learned yet."));
}

#[test]
fn test_serve_teaches_and_answers_over_stdio() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);

    let input = [
        r#"{"type":"command","chat_id":7,"sender_id":7,"name":"learn"}"#,
        r#"{"type":"message","chat_id":7,"text":"^hi (?P<who>\\w+)"}"#,
        r#"{"type":"message","chat_id":7,"text":"hello {who}"}"#,
        r#"{"type":"message","chat_id":-9,"chat_kind":"group","text":"hi all"}"#,
        r#"{"type":"message","chat_id":-9,"chat_kind":"group","text":"hey hi all"}"#,
        "",
    ]
    .join("\n");

    let output = parley_bin()
        .arg("--quiet")
        .arg("--config")
        .arg(&config)
        .arg("serve")
        .write_stdin(input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    // The un-addressed group message gets no reply.
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("To what question should I answer?"));
    assert!(lines[1].contains("Then what should I say?"));
    assert_eq!(lines[3], r#"{"chat_id":-9,"text":"hello all"}"#);
}

#[test]
fn test_export_and_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("knowledge.db");
    let config = dir.path().join("parley.toml");
    std::fs::write(
        &config,
        format!("[store]\nbackend = \"sqlite\"\ndb_path = {:?}\n", db.display().to_string()),
    )
    .unwrap();

    parley_bin()
        .arg("--quiet")
        .arg("--config")
        .arg(&config)
        .arg("serve")
        .write_stdin(concat!(
            r#"{"type":"command","chat_id":1,"name":"learn"}"#,
            "\n",
            r#"{"type":"message","chat_id":1,"text":"ping"}"#,
            "\n",
            r#"{"type":"message","chat_id":1,"text":"pong"}"#,
            "\n"
        ))
        .assert()
        .success();

    let export = dir.path().join("export.json");
    parley_bin()
        .arg("--config")
        .arg(&config)
        .arg("export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 entries"));

    let other = TempDir::new().unwrap();
    let other_config = other.path().join("parley.toml");
    std::fs::write(
        &other_config,
        format!(
            "[store]\nbackend = \"sqlite\"\ndb_path = {:?}\n",
            other.path().join("k.db").display().to_string()
        ),
    )
    .unwrap();

    parley_bin()
        .arg("--config")
        .arg(&other_config)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("New keys: 1"));

    parley_bin()
        .arg("--config")
        .arg(&other_config)
        .arg("keys")
        .assert()
        .success()
        .stdout(predicate::str::contains("ping"));
}
