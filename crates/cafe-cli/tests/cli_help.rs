use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("cafe")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--offline"));
}

#[test]
fn test_sessions_help_shows_subcommands() {
    cargo_bin_cmd!("cafe")
        .args(["sessions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_delete_requires_id() {
    cargo_bin_cmd!("cafe")
        .args(["sessions", "delete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CAFE_ID"));
}
