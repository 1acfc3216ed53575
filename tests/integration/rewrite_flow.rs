//! Integration tests for INSERT/DELETE runs over script trees
//!
//! Tests the flow: directory walk -> script and globals rewrite -> files on disk

use super::common::script_fixtures::{header_calls, TestTree, ACTION_C, GLOBALS_H};
use lrtag::{Action, Config, Runner};

fn run(tree: &TestTree, config: &Config, action: Action) -> lrtag::RunReport {
    Runner::new(config, action)
        .expect("Failed to build runner")
        .run(&tree.root)
        .expect("Run failed")
}

/// Test that every labelled request gets its transaction and step
#[test]
fn test_insert_tags_every_request() {
    let tree = TestTree::single_session();
    let report = run(&tree, &Config::default(), Action::Insert);

    assert!(report.is_success());
    assert_eq!(report.headers_inserted, 4);

    let action = tree.read("Shop/Action.c");
    assert_eq!(header_calls(&action), 4);
    for expected in [
        "TSN=NoTransaction;PC=home;SI=LoadRunner;LSN=Shop;",
        "TSN=01_Login;PC=login.pl;SI=LoadRunner;LSN=Shop;",
        "TSN=02_Checkout;PC=pay;SI=LoadRunner;LSN=Shop;",
        "TSN=03_Search_%d;PC=search;SI=LoadRunner;LSN=Shop;",
    ] {
        assert!(action.contains(expected), "missing header {expected}");
    }
}

/// Test that each header sits directly above its request, followed by a blank line
#[test]
fn test_header_placed_immediately_above_request() {
    let tree = TestTree::single_session();
    run(&tree, &Config::default(), Action::Insert);

    let action = tree.read("Shop/Action.c");
    let lines: Vec<&str> = action.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.contains("addDynatraceHeaderTest") {
            assert_eq!(lines[i + 1], "", "separator after header at line {i}");
            assert!(
                lines[i + 2].trim_start().starts_with("web_"),
                "request after header at line {i}: {}",
                lines[i + 2]
            );
        }
    }
}

/// Test that a second INSERT changes nothing
#[test]
fn test_insert_is_idempotent() {
    let tree = TestTree::single_session();
    let config = Config::default();

    run(&tree, &config, Action::Insert);
    let first = tree.snapshot();

    let report = run(&tree, &config, Action::Insert);
    assert_eq!(tree.snapshot(), first);
    assert_eq!(report.scripts_changed, 0);
    assert_eq!(report.scripts_unchanged, 1);
    assert_eq!(report.declarations_changed, 0);
}

/// Test that DELETE after INSERT restores every file byte for byte
#[test]
fn test_insert_then_delete_restores_tree() {
    let tree = TestTree::single_session();
    let config = Config::default();
    let before = tree.snapshot();

    run(&tree, &config, Action::Insert);
    assert_ne!(tree.snapshot(), before);

    let report = run(&tree, &config, Action::Delete);
    assert_eq!(tree.snapshot(), before);
    assert_eq!(report.headers_removed, 4);
    assert_eq!(report.declarations_changed, 1);
}

/// Test that globals.h gets exactly one helper and loses it again on DELETE
#[test]
fn test_globals_helper_lifecycle() {
    let tree = TestTree::single_session();
    let config = Config::default();

    run(&tree, &config, Action::Insert);
    run(&tree, &config, Action::Insert);
    let globals = tree.read("Shop/globals.h");
    assert_eq!(globals.matches("void addDynatraceHeaderTest(").count(), 1);
    assert!(globals.ends_with("#endif // _GLOBALS_H\n"));

    run(&tree, &config, Action::Delete);
    assert_eq!(tree.read("Shop/globals.h"), GLOBALS_H);
}

/// Test that excluded files are never modified
#[test]
fn test_excluded_files_untouched() {
    let tree = TestTree::single_session();
    tree.write("Shop/vuser_init.c", ACTION_C);
    let config = Config::default().with_excluded(["vuser_init.c"]);

    let report = run(&tree, &config, Action::Insert);
    assert_eq!(tree.read("Shop/vuser_init.c"), ACTION_C);
    assert_eq!(report.excluded, vec![tree.root.join("Shop/vuser_init.c")]);

    run(&tree, &config, Action::Delete);
    assert_eq!(tree.read("Shop/vuser_init.c"), ACTION_C);
}

/// Test that folders without a marker are left alone
#[test]
fn test_folder_without_marker_skipped() {
    let tree = TestTree::single_session();
    tree.write("Unmarked/Action.c", ACTION_C);
    tree.write("Unmarked/globals.h", GLOBALS_H);

    let report = run(&tree, &Config::default(), Action::Insert);
    assert_eq!(report.sessions, 1);
    assert_eq!(tree.read("Unmarked/Action.c"), ACTION_C);
    assert_eq!(tree.read("Unmarked/globals.h"), GLOBALS_H);
}

/// Test that each folder uses its own marker as the session tag
#[test]
fn test_nested_sessions_use_own_tag() {
    let tree = TestTree::new();
    tree.session("suite/browse", "Browse");
    tree.session("suite/buy", "Buy");
    tree.write("suite/browse/Action.c", ACTION_C);
    tree.write("suite/buy/Action.c", ACTION_C);

    let report = run(&tree, &Config::default(), Action::Insert);
    assert_eq!(report.sessions, 2);
    assert!(tree.read("suite/browse/Action.c").contains("LSN=Browse;"));
    assert!(tree.read("suite/buy/Action.c").contains("LSN=Buy;"));
    assert!(!tree.read("suite/buy/Action.c").contains("LSN=Browse;"));
}

/// Test that calls left over from an earlier run are replaced, not duplicated
#[test]
fn test_stale_headers_replaced() {
    let tree = TestTree::single_session();
    run(&tree, &Config::default(), Action::Insert);

    // Same folder re-tagged under a new session name
    std::fs::remove_file(tree.root.join("Shop/Shop.usr")).unwrap();
    tree.session("Shop", "Store");
    run(&tree, &Config::default(), Action::Insert);

    let action = tree.read("Shop/Action.c");
    assert_eq!(header_calls(&action), 4);
    assert!(action.contains("LSN=Store;"));
    assert!(!action.contains("LSN=Shop;"));
}

/// Test that a globals.h without #endif is reported and left unchanged
#[test]
fn test_globals_without_guard_reported() {
    let tree = TestTree::single_session();
    tree.write("Shop/globals.h", "int shared;\n");

    let report = run(&tree, &Config::default(), Action::Insert);
    assert_eq!(report.missing_guards, vec![tree.root.join("Shop/globals.h")]);
    assert_eq!(tree.read("Shop/globals.h"), "int shared;\n");
}

/// Test that request calls can be configured
#[test]
fn test_custom_request_calls() {
    let tree = TestTree::single_session();
    let config = Config::from_toml_str(
        r#"
        [rewrite]
        request_calls = ["web_url"]
        placeholder_transaction = "Unassigned"
        "#,
    )
    .unwrap();

    let report = run(&tree, &config, Action::Insert);
    assert_eq!(report.headers_inserted, 2);

    let action = tree.read("Shop/Action.c");
    assert!(action.contains("TSN=Unassigned;PC=home;"));
    assert!(!action.contains("PC=login.pl;"));
}
