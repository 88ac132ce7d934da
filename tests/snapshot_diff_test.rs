//! 快照差分与噪声过滤的性质测试

use ax_context_monitor::{diff_lines, filter_genuine, LineDiff};
use std::collections::HashMap;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn multiset(items: &[String]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item.clone()).or_insert(0) += 1;
    }
    counts
}

/// multiset(b) == multiset(a) - removed + added
fn assert_conserved(a: &[String], b: &[String], diff: &LineDiff) {
    let mut counts = multiset(a);
    for line in &diff.removed {
        *counts.entry(line.clone()).or_insert(0) -= 1;
    }
    for line in &diff.added {
        *counts.entry(line.clone()).or_insert(0) += 1;
    }
    counts.retain(|_, c| *c != 0);
    assert!(counts.values().all(|c| *c > 0), "negative count: {:?}", counts);
    assert_eq!(counts, multiset(b));
}

fn fixtures() -> Vec<(Vec<String>, Vec<String>)> {
    vec![
        (lines(&[]), lines(&[])),
        (lines(&[]), lines(&["a", "a", "b"])),
        (lines(&["a", "b"]), lines(&[])),
        (lines(&["row|v=1", "row|v=1"]), lines(&["row|v=1"])),
        (
            lines(&["button|label=OK", "button|label=OK", "text|d=1|v=x"]),
            lines(&["button|label=OK", "text|d=1|v=y", "text|d=2|v=z", "text|d=2|v=z"]),
        ),
        (
            lines(&["a", "b", "c", "a", "a"]),
            lines(&["c", "a", "d", "b", "d", "e"]),
        ),
    ]
}

#[test]
fn test_diff_with_itself_is_empty() {
    for (a, b) in fixtures() {
        assert_eq!(diff_lines(&a, &a), LineDiff::default());
        assert_eq!(diff_lines(&b, &b), LineDiff::default());
    }
}

#[test]
fn test_diff_conserves_multisets() {
    for (a, b) in fixtures() {
        let diff = diff_lines(&a, &b);
        assert_conserved(&a, &b, &diff);
    }
}

#[test]
fn test_diff_is_anti_symmetric() {
    for (a, b) in fixtures() {
        let forward = diff_lines(&a, &b);
        let backward = diff_lines(&b, &a);
        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.removed, backward.added);
    }
}

#[test]
fn test_filter_is_identity_without_matching_skeletons() {
    let diff = LineDiff {
        added: lines(&["text|d=3|v=c", "row|v=new", "text|d=1|v=a", "button|d=2"]),
        removed: lines(&["text|d=9|v=old", "row|v=gone", "label|d=1|v=a"]),
    };
    assert_eq!(filter_genuine(&diff), diff.added);
}

#[test]
fn test_refresh_noise_example() {
    let a = lines(&["button|label=Play|d=1"]);
    let b = lines(&["button|label=Pause|d=1"]);
    let diff = diff_lines(&a, &b);

    assert_eq!(diff.added, lines(&["button|label=Pause|d=1"]));
    assert_eq!(diff.removed, lines(&["button|label=Play|d=1"]));
    assert!(filter_genuine(&diff).is_empty());
}

#[test]
fn test_genuine_new_element_example() {
    let a = lines(&["text|d=1|v=Hello"]);
    let b = lines(&["text|d=1|v=Hello", "text|d=2|v=World"]);
    let diff = diff_lines(&a, &b);

    assert_eq!(diff.added, lines(&["text|d=2|v=World"]));
    assert!(diff.removed.is_empty());
    assert_eq!(filter_genuine(&diff), lines(&["text|d=2|v=World"]));
}

#[test]
fn test_duplicate_lines_example() {
    let a = lines(&["row|v=1", "row|v=1"]);
    let b = lines(&["row|v=1"]);
    let diff = diff_lines(&a, &b);

    assert!(diff.added.is_empty());
    assert_eq!(diff.removed, lines(&["row|v=1"]));
}

#[test]
fn test_chat_scenario_mixes_noise_and_new_messages() {
    let before = lines(&[
        "window|title=Slack",
        "label|d=clock|v=10:00",
        "text|d=msg-1|v=hi",
        "button|label=Send",
    ]);
    let after = lines(&[
        "window|title=Slack",
        "label|d=clock|v=10:01",
        "text|d=msg-1|v=hi",
        "text|d=msg-2|v=lunch?",
        "text|v=typing...",
        "button|label=Send",
    ]);

    let diff = diff_lines(&before, &after);
    assert_conserved(&before, &after, &diff);
    assert_eq!(
        filter_genuine(&diff),
        lines(&["text|d=msg-2|v=lunch?", "text|v=typing..."])
    );
}

#[test]
fn test_malformed_lines_do_not_panic() {
    let a = lines(&["", "|", "||", "d=1", "=|d="]);
    let b = lines(&["|||", "d=", "x|d=", "\u{1F600}|d=\u{1F600}"]);
    let diff = diff_lines(&a, &b);
    let genuine = filter_genuine(&diff);
    assert!(genuine.len() <= diff.added.len());
}
