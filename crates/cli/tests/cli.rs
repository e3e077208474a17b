//! End-to-end tests for the `formwright` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SHOP: &str = r#"{
    "schemas": [
        {
            "name": "Shop.Order",
            "attributes": [
                {"name": "id", "type": "id"},
                {"name": "reference", "type": "string"}
            ],
            "relations": [
                {"field": "line_items", "kind": "has_many", "related": "Shop.LineItem"}
            ]
        },
        {
            "name": "Shop.LineItem",
            "attributes": [{"name": "price", "type": "decimal"}]
        }
    ],
    "resources": [
        {"name": "order", "schema": "Shop.Order", "overrides": [{"field": "reference", "label": "Order #"}]},
        {"name": "line_item", "schema": "Shop.LineItem"}
    ],
    "layouts": [
        {
            "name": "orders",
            "resource": "order",
            "declaration": {"tag": "index", "name": "orders", "children": ["reference", "line_items"]}
        }
    ]
}"#;

const WITH_WARNING: &str = r#"{
    "schemas": [{"name": "Shop.Tag", "attributes": [{"name": "label", "type": "string"}]}],
    "resources": [
        {
            "name": "tag",
            "schema": "Shop.Tag",
            "actions": {"index_row": [{"op": "remove", "name": "archive"}]}
        }
    ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn formwright() -> Command {
    let mut cmd = Command::cargo_bin("formwright").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn compose_prints_snapshot_json() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "shop.json", SHOP);

    let output = formwright().args(["compose", arg(&file)]).output().unwrap();
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let order = &snapshot["resources"]["order"];
    assert_eq!(order["fields_order"], serde_json::json!(["line_items", "reference", "id"]));
    assert_eq!(order["fields"]["reference"]["label"], "Order #");
    assert_eq!(snapshot["layouts"]["orders"]["root"]["tag"], "index");
}

#[test]
fn compose_pretty_is_indented() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "shop.json", SHOP);

    formwright()
        .args(["compose", arg(&file), "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"resources\""));
}

#[test]
fn check_reports_clean_declarations() {
    let dir = TempDir::new().unwrap();
    write(&dir, "shop.json", SHOP);

    formwright()
        .args(["check", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 resources, 1 layouts"))
        .stdout(predicate::str::contains("No problems found"));
}

#[test]
fn check_lists_warnings() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "tags.json", WITH_WARNING);

    formwright()
        .args(["check", arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning(s)"))
        .stderr(predicate::str::contains("[tag.actions.index_row] cannot remove 'archive'"));
}

#[test]
fn strict_mode_fails_on_warnings() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "tags.json", WITH_WARNING);

    formwright()
        .args(["check", arg(&file), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));
}

#[test]
fn resolve_prints_option_value() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "shop.json", SHOP);

    formwright()
        .args(["resolve", arg(&file), "--layout", "orders", "--node", "orders", "--key", "page_title"])
        .assert()
        .success()
        .stdout("\"Listing Orders\"\n");

    formwright()
        .args(["resolve", arg(&file), "--layout", "orders", "--node", "reference", "--key", "label"])
        .assert()
        .success()
        .stdout("\"Order #\"\n");
}

#[test]
fn resolve_missing_option_exits_with_not_found() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "shop.json", SHOP);

    formwright()
        .args(["resolve", arg(&file), "--layout", "orders", "--node", "orders", "--key", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no value for 'nope'"));
}

#[test]
fn missing_path_is_an_error() {
    formwright()
        .args(["check", "/no/such/declarations"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load declarations"));
}

#[test]
fn malformed_layout_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "bad.json",
        r#"{"layouts": [{"name": "broken", "declaration": {"tag": "form", "name": "x", "children": [true]}}]}"#,
    );

    formwright()
        .args(["compose", arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed layout 'broken' at $.children[0]"));
}
