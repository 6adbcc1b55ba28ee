//! Black-box tests of the `multiapp` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn multiapp() -> Command {
    Command::cargo_bin("multiapp").expect("multiapp binary")
}

fn fixture(name: &str) -> PathBuf {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../tests/fixtures")).join(name)
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read json")).expect("parse json")
}

#[test]
fn new_scaffolds_and_prints_result() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("blog");
    let report = temp.path().join("run.json");

    multiapp()
        .current_dir(temp.path())
        .arg("new")
        .arg(&project)
        .arg("--template")
        .arg(fixture("template-modern"))
        .args(["--apps", "front,admin", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Name: front"))
        .stdout(predicate::str::contains("2. Name: admin"))
        .stdout(predicate::str::contains("php bin/{app_name} server:run"));

    assert!(project.join("apps/front/FrontKernel.php").is_file());
    assert!(project.join("bin/admin").is_file());
    assert!(!project.join("app").exists());

    let report = read_json(&report);
    assert_eq!(report["schema"], "multiapp.run.v1");
    assert_eq!(report["status"], "succeeded");
    assert_eq!(report["layout"], "modern");
    assert_eq!(report["apps"], serde_json::json!(["front", "admin"]));
    assert_eq!(report["steps"].as_array().unwrap().len(), 13);
}

#[test]
fn new_into_non_empty_directory_exits_2_and_reports() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("blog");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("index.php"), "<?php").unwrap();
    let report = temp.path().join("run.json");

    multiapp()
        .current_dir(temp.path())
        .arg("new")
        .arg(&project)
        .arg("--template")
        .arg(fixture("template-modern"))
        .arg("--report")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not empty"));

    assert_eq!(fs::read_to_string(project.join("index.php")).unwrap(), "<?php");
    let report = read_json(&report);
    assert_eq!(report["status"], "failed");
    assert!(report["error"].as_str().unwrap().contains("not empty"));
}

#[test]
fn reserved_app_name_exits_2() {
    let temp = TempDir::new().unwrap();

    multiapp()
        .current_dir(temp.path())
        .args(["new", "blog", "--apps", "console"])
        .arg("--template")
        .arg(fixture("template-modern"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reserved"));

    assert!(!temp.path().join("blog").exists());
}

#[test]
fn plan_json_lists_every_step() {
    let temp = TempDir::new().unwrap();

    let output = multiapp()
        .current_dir(temp.path())
        .args(["plan", "--format", "json", "--app-count", "3", "--template"])
        .arg(fixture("template-legacy"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["schema"], "multiapp.plan.v1");
    assert_eq!(plan["layout"], "legacy");
    assert_eq!(plan["apps"], serde_json::json!(["app1", "app2", "app3"]));
    assert_eq!(plan["steps"].as_array().unwrap().len(), 2 + 5 * 3 + 1);
    assert!(fs::read_dir(temp.path()).unwrap().next().is_none(), "plan touches nothing");
}

#[test]
fn plan_text_uses_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("multiapp.toml"),
        "[scaffold]\napps = [\"shop\"]\ncore = \"SharedBundle\"\n",
    )
    .unwrap();

    multiapp()
        .current_dir(temp.path())
        .args(["plan", "--template"])
        .arg(fixture("template-modern"))
        .assert()
        .success()
        .stdout(predicate::str::contains("# multiapp plan"))
        .stdout(predicate::str::contains("- Core module: `shared`"))
        .stdout(predicate::str::contains("materialize_app_tree[shop]"));
}

#[test]
fn explicit_config_path_is_used() {
    let temp = TempDir::new().unwrap();
    let cfg = temp.path().join("custom.toml");
    fs::write(&cfg, "[scaffold]\napps = [\"api\"]\n").unwrap();

    multiapp()
        .current_dir(temp.path())
        .arg("--config")
        .arg(&cfg)
        .args(["plan", "--template"])
        .arg(fixture("template-modern"))
        .assert()
        .success()
        .stdout(predicate::str::contains("- Apps: api"));
}

#[test]
fn invalid_config_exits_2() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("multiapp.toml"), "[scaffold]\nbundles = 1\n").unwrap();

    multiapp()
        .current_dir(temp.path())
        .args(["plan", "--template"])
        .arg(fixture("template-modern"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("multiapp.toml"));
}

#[test]
fn plan_rejects_template_of_other_layout() {
    multiapp()
        .args(["plan", "--layout", "modern", "--template"])
        .arg(fixture("template-legacy"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bin/console"));
}

#[test]
fn unknown_layout_value_is_a_usage_error() {
    multiapp()
        .args(["plan", "--layout", "flat", "--template", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("flat"));
}

#[test]
fn selfupdate_alias_is_accepted() {
    multiapp()
        .args(["selfupdate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--download-url"));
}

#[test]
fn self_update_without_release_location_exits_2() {
    let temp = TempDir::new().unwrap();

    multiapp()
        .current_dir(temp.path())
        .arg("self-update")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--version-url"));
}
