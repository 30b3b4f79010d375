//! Smoke tests -- verify the binary runs and key subcommands exist.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("screenward")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Content-severity classification",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("screenward")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("screenward"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("screenward")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_stats_subcommand_exists() {
    Command::cargo_bin("screenward")
        .unwrap()
        .args(["stats", "--help"])
        .assert()
        .success();
}

#[test]
fn test_classify_subcommand_exists() {
    Command::cargo_bin("screenward")
        .unwrap()
        .args(["classify", "--help"])
        .assert()
        .success();
}

#[test]
fn test_classify_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("detections.json");
    std::fs::write(
        &path,
        r#"[{"label": "FEMALE_BREAST_EXPOSED", "score": 0.9}]"#,
    )
    .unwrap();

    Command::cargo_bin("screenward")
        .unwrap()
        .args(["classify", "--file", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicates::str::contains("3 (explicit)"));
}

#[test]
fn test_stats_rejects_bad_period() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("stats.db");

    Command::cargo_bin("screenward")
        .unwrap()
        .args([
            "stats",
            "--user",
            "alice@example.com",
            "--period",
            "fortnight",
            "--db",
            db.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid period"));
}
