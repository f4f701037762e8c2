//! End-to-end tests for the wikistore CLI.
//!
//! Tests invoke the `wikistore` binary as a subprocess and verify JSON output.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn wikistore() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wikistore"))
}

fn wikistore_in(dir: &Path) -> Command {
    let mut cmd = wikistore();
    cmd.current_dir(dir);
    cmd
}

fn run_ok(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = wikistore_in(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn run_err(dir: &Path, args: &[&str]) -> Output {
    let output = wikistore_in(dir).args(args).output().unwrap();
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    output
}

fn init_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    run_ok(dir.path(), &["init", "."]);
    dir
}

fn add(dir: &Path, resource: &str, name: &str, content: &str) -> serde_json::Value {
    run_ok(dir, &["add", resource, name, "--content", content])
}

// === Init ===

#[test]
fn e2e_init_creates_config_and_root() {
    let dir = TempDir::new().unwrap();
    let result = run_ok(dir.path(), &["init", "."]);
    assert!(result["root"].as_str().unwrap().ends_with("FitNesseRoot"));

    assert!(dir.path().join("wikistore.toml").is_file());
    assert!(dir.path().join("FitNesseRoot").is_dir());

    // A second init refuses to overwrite the config.
    run_err(dir.path(), &["init", "."]);
}

// === Add ===

#[test]
fn e2e_add_redirects_to_new_page() {
    let dir = init_tree();
    let result = add(dir.path(), "", "TestPage", "parent");
    assert_eq!(result["status"], 303);
    assert_eq!(result["location"], "TestPage");
    assert_eq!(result["body"], "");

    let result = add(dir.path(), "TestPage", "ChildPage", "child content");
    assert_eq!(result["location"], "TestPage.ChildPage");
    assert!(dir
        .path()
        .join("FitNesseRoot")
        .join("TestPage")
        .join("ChildPage.wiki")
        .is_file());
}

#[test]
fn e2e_add_rejects_invalid_names() {
    let dir = init_tree();
    add(dir.path(), "", "TestPage", "parent");

    let output = run_err(dir.path(), &["add", "TestPage", "1man1mission"]);
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["status"], 400);
    assert!(result["body"]
        .as_str()
        .unwrap()
        .contains("Invalid Child Name"));

    let output = run_err(dir.path(), &["add", "MissingPage", "ChildPage"]);
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["status"], 404);
}

#[test]
fn e2e_add_seeds_attributes() {
    let dir = init_tree();
    add(dir.path(), "", "TestPage", "parent");
    run_ok(
        dir.path(),
        &[
            "add",
            "TestPage",
            "ChildPage",
            "--page-type",
            "Suite",
            "--help-text",
            "help text",
            "--suites",
            "tag",
            "--author",
            "alice",
        ],
    );

    let page = run_ok(dir.path(), &["show", "TestPage.ChildPage"]);
    assert_eq!(page["path"], "TestPage.ChildPage");
    assert_eq!(page["properties"]["Suite"], true);
    assert!(page["properties"].get("Test").is_none());
    assert_eq!(page["properties"]["Help"], "help text");
    assert_eq!(page["properties"]["Suites"], "tag");
    assert_eq!(page["properties"]["LastModifyingUser"], "alice");
    assert!(page["last_modified"].as_str().is_some());
}

// === Show / Edit / History ===

#[test]
fn e2e_edit_keeps_history() {
    let dir = init_tree();
    add(dir.path(), "", "FrontPage", "first");
    run_ok(dir.path(), &["edit", "FrontPage", "--content", "second"]);

    let page = run_ok(dir.path(), &["show", "FrontPage"]);
    assert_eq!(page["content"], "second");

    let history = run_ok(dir.path(), &["history", "FrontPage"]);
    let versions = history.as_array().unwrap();
    assert_eq!(versions.len(), 2);

    let oldest = versions[1]["name"].as_str().unwrap();
    let old = run_ok(dir.path(), &["show", "FrontPage", "--version", oldest]);
    assert_eq!(old["content"], "first");
    assert_eq!(old["version"], oldest);
}

#[test]
fn e2e_show_missing_page_fails() {
    let dir = init_tree();
    let output = run_err(dir.path(), &["show", "MissingPage"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("page not found"));

    add(dir.path(), "", "FrontPage", "x");
    run_err(dir.path(), &["show", "FrontPage", "--version", "nope"]);
}

// === Ls / Rm ===

#[test]
fn e2e_ls_and_rm() {
    let dir = init_tree();
    for name in ["ZetaPage", "AlphaPage"] {
        add(dir.path(), "", name, name);
    }
    add(dir.path(), "AlphaPage", "ChildPage", "child");

    let children = run_ok(dir.path(), &["ls"]);
    let names: Vec<&str> = children
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["AlphaPage", "ZetaPage"]);

    let nested = run_ok(dir.path(), &["ls", "AlphaPage"]);
    assert_eq!(nested[0]["path"], "AlphaPage.ChildPage");

    let removed = run_ok(dir.path(), &["rm", "AlphaPage"]);
    assert_eq!(removed["removed"], "AlphaPage");
    run_err(dir.path(), &["show", "AlphaPage.ChildPage"]);
    assert_eq!(run_ok(dir.path(), &["ls"]).as_array().unwrap().len(), 1);
}

// === Config ===

#[test]
fn e2e_simple_backend_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("custom.toml"),
        "root = \"pages\"\nversions = \"simple\"\nauthor = \"admin\"\n",
    )
    .unwrap();

    run_ok(
        dir.path(),
        &["--config", "custom.toml", "add", "", "FrontPage", "--content", "x"],
    );
    assert!(dir.path().join("pages").join("FrontPage.wiki").is_file());

    let history = run_ok(dir.path(), &["--config", "custom.toml", "history", "FrontPage"]);
    assert!(history.as_array().unwrap().is_empty());
}

#[test]
fn e2e_completions() {
    let output = wikistore().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("wikistore"));
}
