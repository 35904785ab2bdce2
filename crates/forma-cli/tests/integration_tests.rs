//! Integration tests for forma-cli.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BASE: &str = r##"
Identifier = "com.acme.base"
Kind = "Xcode.Xcode3.ProjectTemplateUnitKind"
Nodes = ["README.md"]

[[Options]]
Identifier = "productName"
Type = "text"
Required = true

[Definitions]
"README.md" = "# ___VARIABLE_productName___"
"##;

const APP: &str = r#"{
  "Identifier": "com.acme.app",
  "Ancestors": ["com.acme.base"],
  "Concrete": true,
  "Name": "App",
  "Nodes": ["___PACKAGENAMEASIDENTIFIER___/main.swift"],
  "SharedSettings": {
    "BUNDLE_ID": "com.acme.___VARIABLE_productName:rfc1034Identifier___"
  }
}"#;

const BROKEN: &str = r#"
Identifier = "com.acme.broken"
Ancestors = ["com.acme.gone"]
Concrete = true
"#;

/// Temp workspace with a `templates/` directory; also the working directory
/// so no stray `.env` or config is picked up.
fn workspace(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let templates = temp.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    for (name, content) in files {
        fs::write(templates.join(name), content).unwrap();
    }
    temp
}

fn forma(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("forma");
    cmd.current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .args(["--templates", "templates"]);
    cmd
}

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_flag() {
    cargo_bin_cmd!("forma")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn version_flag() {
    cargo_bin_cmd!("forma")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_templates_dir_is_configuration_error() {
    let temp = TempDir::new().unwrap();
    cargo_bin_cmd!("forma")
        .current_dir(temp.path())
        .env_remove("FORMA_TEMPLATES__DIR")
        .arg("list")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No templates directory configured"));
}

// ── list ──────────────────────────────────────────────────────────────────────

#[test]
fn list_shows_concrete_templates_only_by_default() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    forma(&temp)
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.app"))
        .stdout(predicate::str::contains("com.acme.base").not());
}

#[test]
fn list_all_as_json() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    let output = forma(&temp)
        .args(["list", "--all", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["identifier"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["com.acme.app", "com.acme.base"]);
}

// ── resolve / check ───────────────────────────────────────────────────────────

#[test]
fn resolve_prints_chain() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    forma(&temp)
        .args(["resolve", "com.acme.app", "--chain"])
        .assert()
        .success()
        .stdout("com.acme.base\ncom.acme.app\n");
}

#[test]
fn resolve_unknown_template_exits_3() {
    let temp = workspace(&[("base.toml", BASE)]);
    forma(&temp)
        .args(["resolve", "com.acme.nope"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("com.acme.nope"));
}

#[test]
fn resolve_broken_chain_exits_2() {
    let temp = workspace(&[("broken.toml", BROKEN)]);
    forma(&temp)
        .args(["resolve", "com.acme.broken"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("com.acme.gone"));
}

#[test]
fn check_reports_broken_templates() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP), ("broken.toml", BROKEN)]);
    forma(&temp)
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("com.acme.app"))
        .stdout(predicate::str::contains("com.acme.broken"))
        .stderr(predicate::str::contains("1 of 2 templates failed"));
}

#[test]
fn strict_mode_rejects_bad_files() {
    let temp = workspace(&[("base.toml", BASE), ("bad.toml", "Identifier = [")]);
    forma(&temp).args(["list"]).assert().success();
    forma(&temp)
        .args(["--strict", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad.toml"));
}

// ── render ────────────────────────────────────────────────────────────────────

#[test]
fn render_substitutes_every_field() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    let output = forma(&temp)
        .args([
            "render",
            "com.acme.app",
            "--set",
            "productName=Demo App",
            "--package-name",
            "Demo App",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["nodes"][1]["path"], "Demo_App/main.swift");
    assert_eq!(plan["definitions"][0]["text"], "# Demo App");
    assert_eq!(plan["shared_settings"]["BUNDLE_ID"], "com.acme.demo-app");
}

#[test]
fn render_missing_option_fails_with_diagnostics() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    forma(&temp)
        .args(["render", "com.acme.app"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("productName"))
        .stderr(predicate::str::contains("com.acme.app"));
}

#[test]
fn render_allow_errors_exits_zero() {
    let temp = workspace(&[("base.toml", BASE), ("app.json", APP)]);
    forma(&temp)
        .args(["render", "com.acme.app", "--allow-errors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("diagnostics"));
}

// ── tokens ────────────────────────────────────────────────────────────────────

#[test]
fn tokens_as_json() {
    let temp = TempDir::new().unwrap();
    let output = cargo_bin_cmd!("forma")
        .current_dir(temp.path())
        .args(["--output-format", "json", "tokens", "a___VARIABLE_x:upper___b"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tokens: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tokens[1]["kind"], "option");
    assert_eq!(tokens[1]["name"], "x");
    assert_eq!(tokens[1]["offset"], 1);
    assert_eq!(tokens[1]["transforms"][0], "upper");
}

#[test]
fn tokens_unknown_transform_exits_2() {
    let temp = TempDir::new().unwrap();
    cargo_bin_cmd!("forma")
        .current_dir(temp.path())
        .args(["tokens", "___FILENAME:shout___"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("shout"));
}

// ── config ────────────────────────────────────────────────────────────────────

#[test]
fn config_values_come_from_file_and_env() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("forma.toml");
    fs::write(&config, "[naming]\norganization_name = \"Acme\"\n").unwrap();

    cargo_bin_cmd!("forma")
        .current_dir(temp.path())
        .args(["--config", "forma.toml", "config", "get", "naming.organization_name"])
        .assert()
        .success()
        .stdout("Acme\n");

    cargo_bin_cmd!("forma")
        .current_dir(temp.path())
        .env("FORMA_NAMING__ORGANIZATION_NAME", "Env Corp")
        .args(["--config", "forma.toml", "config", "get", "naming.organization_name"])
        .assert()
        .success()
        .stdout("Env Corp\n");
}
