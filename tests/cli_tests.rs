
use milelog::EntryCollection;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use test_helpers::{api_body, milelog_command, sample_entries, store_path, write_store, TEST_USER};

#[test]
fn test_cli_requires_subcommand() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path()).assert().failure().code(2);
}

#[test]
fn test_cli_user_set_and_show() {
    let temp_dir = TempDir::new().unwrap();

    milelog_command(temp_dir.path())
        .args(["user", "walker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default user changed to: walker"));

    assert!(temp_dir.path().join("config.json").exists());

    milelog_command(temp_dir.path())
        .arg("user")
        .assert()
        .success()
        .stdout("walker\n");
}

#[test]
fn test_cli_user_flag_overrides_saved_user() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .args(["user", "walker"])
        .assert()
        .success();

    milelog_command(temp_dir.path())
        .args(["-u", "cyclist", "user"])
        .assert()
        .success()
        .stdout("cyclist\n");
}

#[test]
fn test_cli_user_without_any_user_fails() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .arg("user")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No user set"));
}

#[test]
fn test_cli_user_rejects_path_names() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .args(["user", "../elsewhere"])
        .assert()
        .failure()
        .code(1);
    assert!(!temp_dir.path().join("config.json").exists());
}

#[test]
fn test_cli_find_without_store_suggests_sync() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "find"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Need to run 'milelog sync'?"));
}

#[test]
fn test_cli_find_json_with_pattern() {
    let temp_dir = TempDir::new().unwrap();
    write_store(temp_dir.path(), TEST_USER, &sample_entries());

    let output = milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "find", "-p", "river|tempo", "-f", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let found: EntryCollection = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<i64> = found.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![103, 102]);
}

#[test]
fn test_cli_find_tsv_with_dates() {
    let temp_dir = TempDir::new().unwrap();
    write_store(temp_dir.path(), TEST_USER, &sample_entries());

    let output = milelog_command(temp_dir.path())
        .env("MILELOG_USER", TEST_USER)
        .args(["find", "--start", "2024-03-01", "--end", "20240303"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id\tdate"));
    assert!(lines[1].starts_with("102\t2024-03-03 07:00\tRunning\t5.00\tmiles\t0:45:00"));
}

#[test]
fn test_cli_find_no_matches_prints_header_only() {
    let temp_dir = TempDir::new().unwrap();
    write_store(temp_dir.path(), TEST_USER, &sample_entries());

    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "find", "-p", "marathon"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tdate").and(predicate::str::contains("103").not()));
}

#[test]
fn test_cli_find_invalid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    write_store(temp_dir.path(), TEST_USER, &sample_entries());

    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "find", "-p", "(tempo"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("(tempo"));
}

#[test]
fn test_cli_find_unknown_range() {
    let temp_dir = TempDir::new().unwrap();
    write_store(temp_dir.path(), TEST_USER, &sample_entries());

    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "find", "next", "decade"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("next decade"));
}

#[test]
fn test_cli_rm_last() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_store(temp_dir.path(), TEST_USER, &sample_entries());

    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "rm", "last"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry removed."));

    let stored: EntryCollection = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let ids: Vec<i64> = stored.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![102, 101]);
}

#[test]
fn test_cli_rm_unknown_id_leaves_store_alone() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_store(temp_dir.path(), TEST_USER, &sample_entries());
    let before = fs::read(&path).unwrap();

    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "rm", "999"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Entry not found"));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_cli_rm_rejects_bad_target() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "rm", "newest"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_cli_sync_from_mock_api() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let entries = sample_entries();

    let _first = server
        .mock("GET", "/people/runner/entries.json")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(api_body(&entries.entries))
        .create();
    let _last = server
        .mock("GET", "/people/runner/entries.json")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body(api_body(&[]))
        .create();

    milelog_command(temp_dir.path())
        .env("MILELOG_API_URL", server.url())
        .args(["-u", TEST_USER, "sync"])
        .assert()
        .success()
        .stdout("Synced 3 entries (full sync).\n");

    let path = store_path(temp_dir.path(), TEST_USER);
    let stored: EntryCollection = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    assert_eq!(stored, entries);
}

#[test]
fn test_cli_sync_unreachable_api_fails() {
    let temp_dir = TempDir::new().unwrap();
    milelog_command(temp_dir.path())
        .args(["-u", TEST_USER, "sync"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Fetch error"));
    assert!(!store_path(temp_dir.path(), TEST_USER).exists());
}

#[test]
fn test_cli_json_logs_go_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let output = milelog_command(temp_dir.path())
        .args(["--log-format", "json", "-u", TEST_USER, "user"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "runner\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(line).expect("log line is JSON");
    }
}
