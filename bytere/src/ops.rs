//! String-processing operations built on the engine
//!
//! Two composite operations and a one-shot convenience. [`associate`]
//! splits a string into alternating untouched/matched segments and pairs
//! every segment with a caller-supplied token; [`filter`] keeps the
//! members of a string array that match (or fail to match) a pattern.
//! All three compile their patterns with bare parentheses as the grouping
//! operators.

use crate::engine::Regex;
use crate::error::{RegexError, Result};

/// `filter` flag bit: pair every kept string with its 1-based position in
/// the input.
pub const FILTER_WITH_INDEX: u32 = 0x1;
/// `filter` flag bit: keep the strings that do NOT match.
pub const FILTER_EXCLUDE: u32 = 0x2;

/// One-shot test of `pattern` against `input`.
pub fn match_one(input: &[u8], pattern: &[u8]) -> Result<bool> {
    let mut re = Regex::compile(pattern, true)?;
    Ok(re.exec(input))
}

/// Split `input` into segments and associate a token with each.
///
/// Walking left to right, the earliest pattern match wins (ties broken by
/// array order), producing an untouched segment tagged `default` followed
/// by the matched segment tagged with that pattern's token. Whatever the
/// patterns never reach forms a final `default` segment, so the output is
/// always `2 * M + 1` segments whose concatenation is exactly `input`.
///
/// A zero-length match is recorded and the cursor then moves one byte, so
/// patterns that can match the empty string cannot loop forever.
pub fn associate<'a, P, T>(
    input: &'a [u8],
    patterns: &[P],
    tokens: &[T],
    default: T,
) -> Result<(Vec<&'a [u8]>, Vec<T>)>
where
    P: AsRef<[u8]>,
    T: Clone,
{
    if patterns.len() != tokens.len() {
        return Err(RegexError::PatternTokenMismatch);
    }
    if patterns.is_empty() {
        return Ok((vec![input], vec![default]));
    }

    let mut regs = patterns
        .iter()
        .map(|p| Regex::compile(p.as_ref(), true))
        .collect::<Result<Vec<_>>>()?;

    // Collect (begin, end, pattern index) spans over the whole input.
    let mut found: Vec<(usize, usize, usize)> = Vec::new();
    let mut cursor = 0;
    while cursor < input.len() {
        let rest = &input[cursor..];

        let mut winner: Option<(usize, usize)> = None; // (start, pattern)
        for (i, re) in regs.iter_mut().enumerate() {
            if re.exec(rest) {
                let (s, _) = re.span(0).expect("successful exec records span 0");
                if s == 0 {
                    // Nothing can start earlier than the cursor itself.
                    winner = Some((0, i));
                    break;
                }
                match winner {
                    Some((best, _)) if best <= s => {}
                    _ => winner = Some((s, i)),
                }
            }
        }

        let Some((_, index)) = winner else {
            break;
        };
        let (s, e) = regs[index].span(0).expect("winner matched the remainder");
        let begin = cursor + s;
        let end = cursor + e;
        found.push((begin, end, index));
        cursor = end;
        if begin == end {
            // An empty match must not pin the cursor in place.
            cursor += 1;
            if cursor >= input.len() {
                break;
            }
        }
    }

    let mut segments = Vec::with_capacity(2 * found.len() + 1);
    let mut tags = Vec::with_capacity(2 * found.len() + 1);
    let mut at = 0;
    for &(begin, end, index) in &found {
        segments.push(&input[at..begin]);
        tags.push(default.clone());
        segments.push(&input[begin..end]);
        tags.push(tokens[index].clone());
        at = end;
    }
    segments.push(&input[at..]);
    tags.push(default);
    Ok((segments, tags))
}

/// Keep the members of `strings` selected by `pattern`.
///
/// `flag` is a bit set: [`FILTER_EXCLUDE`] inverts the selection,
/// [`FILTER_WITH_INDEX`] pairs each kept string with its 1-based position
/// in the input (otherwise the position slot is `None`). Input order is
/// preserved. The pattern compiles once for the whole array.
pub fn filter<'a, S>(
    strings: &'a [S],
    pattern: &[u8],
    flag: u32,
) -> Result<Vec<(Option<usize>, &'a S)>>
where
    S: AsRef<[u8]>,
{
    if strings.is_empty() {
        return Ok(Vec::new());
    }
    let mut re = Regex::compile(pattern, true)?;
    let keep_matches = flag & FILTER_EXCLUDE == 0;
    let with_index = flag & FILTER_WITH_INDEX != 0;

    let mut out = Vec::new();
    for (i, s) in strings.iter().enumerate() {
        if re.exec(s.as_ref()) == keep_matches {
            out.push((with_index.then_some(i + 1), s));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(segments: &[&[u8]]) -> Vec<String> {
        segments
            .iter()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect()
    }

    #[test]
    fn test_associate_alternates_segments() {
        let (segments, tags) =
            associate(b"testhahatest", &[b"haha".as_ref(), b"te"], &[2, 3], 4).unwrap();
        assert_eq!(segs(&segments), ["", "te", "st", "haha", "", "te", "st"]);
        assert_eq!(tags, [4, 3, 4, 2, 4, 3, 4]);
    }

    #[test]
    fn test_associate_is_a_partition() {
        let input = b"one fish two fish";
        let (segments, tags) = associate(input, &["fish", "two"], &['f', 't'], 'd').unwrap();
        let joined: Vec<u8> = segments.concat();
        assert_eq!(joined, input);
        assert_eq!(segments.len(), tags.len());
        assert_eq!(segments.len() % 2, 1);
    }

    #[test]
    fn test_associate_no_match_is_single_segment() {
        let (segments, tags) = associate(b"abc", &["zzz"], &[1], 0).unwrap();
        assert_eq!(segs(&segments), ["abc"]);
        assert_eq!(tags, [0]);
    }

    #[test]
    fn test_associate_empty_patterns() {
        let (segments, tags) = associate::<&[u8], i32>(b"abc", &[], &[], 9).unwrap();
        assert_eq!(segs(&segments), ["abc"]);
        assert_eq!(tags, [9]);
    }

    #[test]
    fn test_associate_earliest_match_wins() {
        let (segments, tags) = associate(b"bxa", &["a", "x"], &[1, 2], 0).unwrap();
        assert_eq!(segs(&segments), ["b", "x", "", "a", ""]);
        assert_eq!(tags, [0, 2, 0, 1, 0]);
    }

    #[test]
    fn test_associate_tie_prefers_first_pattern() {
        let (_, tags) = associate(b"ab", &["ab", "a"], &[1, 2], 0).unwrap();
        assert_eq!(tags, [0, 1, 0]);
    }

    #[test]
    fn test_associate_empty_match_advances() {
        // x* matches the empty string at every position; the walk must
        // still terminate and still partition the input.
        let input = b"abc";
        let (segments, tags) = associate(input, &["x*"], &[1], 0).unwrap();
        let joined: Vec<u8> = segments.concat();
        assert_eq!(joined, input);
        assert!(tags.len() >= 3);
    }

    #[test]
    fn test_associate_size_mismatch() {
        assert_eq!(
            associate(b"abc", &["a"], &[1, 2], 0).unwrap_err(),
            RegexError::PatternTokenMismatch
        );
    }

    #[test]
    fn test_associate_bad_pattern_propagates() {
        assert_eq!(
            associate(b"abc", &["(a"], &[1], 0).unwrap_err(),
            RegexError::UnmatchedParens
        );
    }

    #[test]
    fn test_filter_keeps_matches_in_order() {
        let strings = ["apple", "banana", "avocado", "cherry"];
        let kept = filter(&strings, b"^a", 0).unwrap();
        let names: Vec<_> = kept.iter().map(|(_, s)| **s).collect();
        assert_eq!(names, ["apple", "avocado"]);
        assert!(kept.iter().all(|(i, _)| i.is_none()));
    }

    #[test]
    fn test_filter_exclude_inverts() {
        let strings = ["apple", "banana", "avocado"];
        let kept = filter(&strings, b"^a", FILTER_EXCLUDE).unwrap();
        let names: Vec<_> = kept.iter().map(|(_, s)| **s).collect();
        assert_eq!(names, ["banana"]);
    }

    #[test]
    fn test_filter_with_index_is_one_based() {
        let strings = ["one", "two", "three"];
        let kept = filter(&strings, b"^t", FILTER_WITH_INDEX).unwrap();
        let pairs: Vec<_> = kept.iter().map(|(i, s)| (i.unwrap(), **s)).collect();
        assert_eq!(pairs, [(2, "two"), (3, "three")]);
    }

    #[test]
    fn test_filter_empty_input() {
        let strings: [&str; 0] = [];
        assert!(filter(&strings, b"a", 0).unwrap().is_empty());
    }

    #[test]
    fn test_match_one() {
        assert!(match_one(b"hello world", b"wor").unwrap());
        assert!(!match_one(b"hello", b"^world").unwrap());
        assert!(match_one(b"ab", b"(a)(b)").unwrap());
        assert!(match_one_err_is_compile_error());
    }

    fn match_one_err_is_compile_error() -> bool {
        match_one(b"x", b"a**") == Err(RegexError::NestedRepeat)
    }
}
