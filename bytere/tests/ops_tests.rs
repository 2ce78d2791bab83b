//! The composite operations, end to end

use bytere::{associate, filter, match_one, RegexError, FILTER_EXCLUDE, FILTER_WITH_INDEX};
use pretty_assertions::assert_eq;

fn text(segments: &[&[u8]]) -> Vec<String> {
    segments
        .iter()
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

#[test]
fn test_associate_reference_example() {
    let (segments, tags) =
        associate(b"testhahatest", &["haha", "te"], &[2, 3], 4).unwrap();
    assert_eq!(text(&segments), ["", "te", "st", "haha", "", "te", "st"]);
    assert_eq!(tags, [4, 3, 4, 2, 4, 3, 4]);
}

#[test]
fn test_associate_partitions_arbitrary_inputs() {
    let cases: [&[u8]; 4] = [b"", b"x", b"aaabbbccc", b"the quick brown fox"];
    for input in cases {
        let (segments, tags) = associate(input, &["b+", "qu"], &[1, 2], 0).unwrap();
        assert_eq!(segments.concat(), input);
        assert_eq!(segments.len(), tags.len());
        assert_eq!(segments.len() % 2, 1, "always 2M+1 segments");
    }
}

#[test]
fn test_associate_tags_line_up_with_patterns() {
    let (segments, tags) =
        associate(b"cold warm cold", &["warm", "cold"], &["w", "c"], "-").unwrap();
    assert_eq!(
        text(&segments),
        ["", "cold", " ", "warm", " ", "cold", ""]
    );
    assert_eq!(tags, ["-", "c", "-", "w", "-", "c", "-"]);
}

#[test]
fn test_associate_anchor_applies_to_remainder() {
    // ^ in an associate pattern re-anchors at each remainder, so it can
    // only ever produce a match at the current cursor.
    let (segments, tags) = associate(b"abcabc", &["^abc"], &[1], 0).unwrap();
    assert_eq!(text(&segments), ["", "abc", "", "abc", ""]);
    assert_eq!(tags, [0, 1, 0, 1, 0]);
}

#[test]
fn test_filter_basic_subset() {
    let strings = ["alpha", "beta", "gamma", "delta"];
    let kept = filter(&strings, b"a$", 0).unwrap();
    let names: Vec<_> = kept.iter().map(|(_, s)| **s).collect();
    assert_eq!(names, ["alpha", "beta", "gamma", "delta"]);

    let kept = filter(&strings, b"^[bd]", 0).unwrap();
    let names: Vec<_> = kept.iter().map(|(_, s)| **s).collect();
    assert_eq!(names, ["beta", "delta"]);
}

#[test]
fn test_filter_flags_combine() {
    let strings = ["one", "two", "three", "four"];
    let kept = filter(&strings, b"o", FILTER_EXCLUDE | FILTER_WITH_INDEX).unwrap();
    let pairs: Vec<_> = kept.iter().map(|(i, s)| (i.unwrap(), **s)).collect();
    assert_eq!(pairs, [(3, "three")]);
}

#[test]
fn test_filter_compile_error_propagates() {
    let strings = ["a"];
    assert_eq!(
        filter(&strings, b"[oops", 0).unwrap_err(),
        RegexError::UnmatchedBracket
    );
}

#[test]
fn test_match_one_round_trip() {
    assert!(match_one(b"wizard", b"z.r").unwrap());
    assert!(!match_one(b"wizard", b"^z").unwrap());
}
