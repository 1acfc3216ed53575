//! Property tests for the script rewriter
//!
//! Scripts are assembled from the line shapes the rewriter cares about,
//! mixed with arbitrary filler, then pushed through INSERT and DELETE.

use lrtag::rewrite::PLACEHOLDER_TRANSACTION;
use lrtag::{Action, Rewriter};
use proptest::prelude::*;

fn rewriter() -> Rewriter {
    Rewriter::new(
        &["web_url", "web_submit_data", "web_custom_request"],
        PLACEHOLDER_TRANSACTION,
    )
    .expect("default rules compile")
}

fn name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9_]{0,8}"
}

fn variable() -> impl Strategy<Value = String> {
    "v_[a-z0-9]{0,6}"
}

fn line_body() -> impl Strategy<Value = String> {
    prop_oneof![
        name().prop_map(|n| format!("\tlr_start_transaction(\"{n}\");")),
        (variable(), name()).prop_map(|(v, n)| format!("\t{v} = \"{n}\";")),
        variable().prop_map(|v| format!("\tlr_start_transaction({v});")),
        name().prop_map(|n| format!(
            "\tlr_start_transaction(lr_eval_string(lr_param_sprintf(\"{n}_%d\", i)));"
        )),
        name().prop_map(|n| format!("\tweb_url(\"{n}\", \"URL=http://host/{n}\", LAST);")),
        name().prop_map(|n| format!("\tweb_submit_data(\"{n}\",")),
        Just("\tweb_custom_request(step, LAST);".to_string()),
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z ;(){}=]{0,24}",
    ]
}

fn script() -> impl Strategy<Value = String> {
    (
        prop::collection::vec((line_body(), prop::bool::ANY), 0..40),
        prop::bool::ANY,
    )
        .prop_map(|(lines, terminate_last)| {
            let mut text = String::new();
            let count = lines.len();
            for (i, (body, crlf)) in lines.into_iter().enumerate() {
                text.push_str(&body);
                if i + 1 < count || terminate_last {
                    text.push_str(if crlf { "\r\n" } else { "\n" });
                }
            }
            text
        })
}

fn request_lines_with_literal(text: &str) -> usize {
    text.lines()
        .filter(|l| {
            (l.contains("web_url(") || l.contains("web_submit_data(")) && l.contains('"')
        })
        .count()
}

proptest! {
    #[test]
    fn test_insert_is_idempotent(text in script()) {
        let r = rewriter();
        let once = r.rewrite_script(&text, "Session", Action::Insert).text;
        let twice = r.rewrite_script(&once, "Session", Action::Insert).text;
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn test_delete_undoes_insert(text in script()) {
        let r = rewriter();
        let inserted = r.rewrite_script(&text, "Session", Action::Insert).text;
        let deleted = r.rewrite_script(&inserted, "Session", Action::Delete).text;
        prop_assert_eq!(deleted, text);
    }

    #[test]
    fn test_one_header_per_labelled_request(text in script()) {
        let r = rewriter();
        let out = r.rewrite_script(&text, "Session", Action::Insert);
        prop_assert_eq!(out.inserted, request_lines_with_literal(&text));
        prop_assert!(!out.text.contains("TSN=;"));
    }
}
