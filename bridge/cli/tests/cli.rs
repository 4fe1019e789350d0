use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const MODULE: &str = "github.com/acme/shop";

fn fixtures() -> PathBuf {
    // Fixtures live with the library crate (cli/../lib/tests/fixtures).
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("lib/tests/fixtures")
}

#[allow(deprecated)]
fn bridge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bridge").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn shop_cmd() -> Command {
    let mut cmd = bridge_cmd();
    cmd.arg("--api")
        .arg(fixtures().join("shop/example/example.go"))
        .args(["--mod", MODULE])
        .arg("--mod-dir")
        .arg(fixtures().join("shop"));
    cmd
}

#[test]
fn test_help_flag() {
    bridge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TypeScript RPC client"))
        .stdout(predicate::str::contains("--dump-model"));
}

#[test]
fn test_missing_required_flags() {
    bridge_cmd()
        .args(["--ts", "out.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--api"));
}

#[test]
fn test_writes_requested_artifacts() {
    let out = TempDir::new().unwrap();
    let ts = out.path().join("web/example.ts");
    let server = out.path().join("server/server_gen.go");

    shop_cmd()
        .arg("--ts")
        .arg(&ts)
        .arg("--server")
        .arg(&server)
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote"));

    let ts_text = std::fs::read_to_string(&ts).unwrap();
    assert!(ts_text.contains("public async HasPermission("));

    let go_text = std::fs::read_to_string(&server).unwrap();
    assert!(go_text.contains("package server"));
}

#[test]
fn test_dry_run_prints_instead_of_writing() {
    let out = TempDir::new().unwrap();
    let ts = out.path().join("example.ts");

    shop_cmd()
        .arg("--ts")
        .arg(&ts)
        .args(["--ts-service", "Perms", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export class Perms {"))
        .stdout(predicate::str::contains("'/perms/haspermission'"));

    assert!(!ts.exists());
}

#[test]
fn test_dump_model_outputs_json() {
    shop_cmd()
        .arg("--dump-model")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"primary_interface\": \"Example\""))
        .stdout(predicate::str::contains("\"variant\": \"enum\""));
}

#[test]
fn test_warnings_are_reported() {
    shop_cmd()
        .arg("--dump-model")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("Shelf.Items"));
}

#[test]
fn test_go_client_package_flag() {
    shop_cmd()
        .args(["--go-client", "client_gen.go", "--go-client-package", "rpc", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package rpc"))
        .stdout(predicate::str::contains("func (c *Client) HasPermission("));
}

#[test]
fn test_emission_failure_exits_nonzero() {
    let out = TempDir::new().unwrap();

    bridge_cmd()
        .arg("--api")
        .arg(fixtures().join("plain/plain.go"))
        .args(["--mod", MODULE])
        .arg("--mod-dir")
        .arg(fixtures())
        .arg("--ts")
        .arg(out.path().join("plain.ts"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No primary interface"));
}

#[test]
fn test_syntax_error_exits_nonzero() {
    bridge_cmd()
        .arg("--api")
        .arg(fixtures().join("broken/broken.go"))
        .args(["--mod", MODULE])
        .arg("--mod-dir")
        .arg(fixtures())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Syntax error"));
}

#[test]
fn test_no_outputs_requested_warns() {
    shop_cmd()
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to generate"));
}
