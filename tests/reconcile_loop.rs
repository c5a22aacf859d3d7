mod common;

use common::FakeSink;
use indexmap::IndexSet;
use std::collections::BTreeMap;
use meme_narrator::{
    generate::generate_one,
    reconcile::{MissingArtifact, NO_ERROR_MESSAGE, reconcile, reconcile_with_errors},
    sink::ArtifactSink,
};

fn ids(list: &[&str]) -> IndexSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn regen<'a>(sink: &'a FakeSink) -> impl FnMut(&str) -> Result<(), String> + 'a {
    move |id| generate_one(sink, id, "text")
}

#[test]
fn converges_after_two_rounds() {
    let sink = FakeSink::new().fail_times("b", 1);
    let report = reconcile(&ids(&["a", "b", "c"]), &sink, regen(&sink), 3);

    assert!(report.is_complete());
    assert_eq!(report.attempts_used, 2);
    assert_eq!(sink.attempts("a"), 1);
    assert_eq!(sink.attempts("b"), 2);
    assert_eq!(sink.attempts("c"), 1);
}

#[test]
fn exhaustion_reports_latest_error_only_for_failing_ids() {
    let sink = FakeSink::new().always_fail("b");
    let report = reconcile(&ids(&["a", "b"]), &sink, regen(&sink), 3);

    assert_eq!(report.attempts_used, 3);
    assert_eq!(
        report.missing,
        vec![MissingArtifact {
            id: "b".into(),
            message: "tts failed for b on attempt 3".into(),
        }]
    );
    assert_eq!(sink.attempts("a"), 1);
    assert_eq!(sink.attempts("b"), 3);
}

#[test]
fn nothing_to_do_when_everything_exists() {
    let sink = FakeSink::new().with_present("a").with_present("b");
    let mut calls = 0;
    let report = reconcile(
        &ids(&["a", "b"]),
        &sink,
        |_| {
            calls += 1;
            Ok(())
        },
        3,
    );
    assert!(report.is_complete());
    assert_eq!(report.attempts_used, 0);
    assert_eq!(calls, 0);
}

#[test]
fn silent_generator_gets_placeholder_message() {
    // The generator claims success but never produces the artifact.
    let sink = FakeSink::new();
    let report = reconcile(&ids(&["ghost"]), &sink, |_| Ok(()), 2);
    assert_eq!(report.attempts_used, 2);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].message, NO_ERROR_MESSAGE);
}

#[test]
fn zero_budget_only_scans() {
    let sink = FakeSink::new().with_present("a");
    let report = reconcile(&ids(&["a", "b"]), &sink, regen(&sink), 0);
    assert_eq!(report.attempts_used, 0);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].id, "b");
    assert!(sink.writes().is_empty());
}

#[test]
fn artifacts_outside_expected_are_ignored() {
    let sink = FakeSink::new().with_present("stray");
    let report = reconcile(&ids(&["a"]), &sink, regen(&sink), 1);
    assert!(report.is_complete());
    assert!(sink.exists("stray"));
    assert_eq!(sink.writes(), vec![("a".to_string(), "text".to_string())]);
}

#[test]
fn missing_keeps_expected_order() {
    let sink = FakeSink::new().always_fail("z").always_fail("m");
    let report = reconcile(&ids(&["z", "a", "m"]), &sink, regen(&sink), 1);
    let missing: Vec<_> = report.missing.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(missing, vec!["z", "m"]);
}

#[test]
fn known_errors_are_kept_until_a_newer_one_arrives() {
    let known: BTreeMap<String, String> = [
        ("a".to_string(), "first pass: a".to_string()),
        ("b".to_string(), "first pass: b".to_string()),
    ]
    .into_iter()
    .collect();

    let sink = FakeSink::new();
    let report = reconcile_with_errors(&ids(&["a", "b"]), &sink, |_| Ok(()), 0, known.clone());
    let messages: Vec<_> = report.missing.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(messages, vec!["first pass: a", "first pass: b"]);

    let sink = FakeSink::new().always_fail("b");
    let report = reconcile_with_errors(&ids(&["a", "b"]), &sink, regen(&sink), 1, known);
    assert_eq!(
        report.missing,
        vec![MissingArtifact {
            id: "b".into(),
            message: "tts failed for b on attempt 1".into(),
        }]
    );
}
