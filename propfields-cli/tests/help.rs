use assert_cmd::cargo::{self};
use predicates::str::contains;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("propfields");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("propfields"))
        .stdout(contains("--scenario"));
}

#[test]
fn requires_a_scenario() {
    let mut cmd = cargo::cargo_bin_cmd!("propfields");
    cmd.assert().failure().stderr(contains("--scenario"));
}
