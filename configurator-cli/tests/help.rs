use assert_cmd::cargo::{self};
use predicates::str::contains;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("configurator");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("--store"));
}

#[test]
fn store_is_required() {
    let mut cmd = cargo::cargo_bin_cmd!("configurator");
    cmd.assert().failure().stderr(contains("--store"));
}
