//! bytere — a byte-oriented regular expression engine
//!
//! Patterns compile into a compact byte program: a linear encoding of a
//! nondeterministic finite automaton whose edges are two-byte offsets, in
//! the lineage of Henry Spencer's classic library. A recursive
//! backtracker executes the program against raw bytes, recording up to
//! nine capture-group spans, and a handful of compile-time hints (anchor,
//! start byte, mandatory literal) lets the search loop skip positions that
//! cannot possibly match.
//!
//! On top of the engine sit a bounded-buffer substitution routine
//! ([`Regex::substitute`]) and two array-level operations: [`associate`]
//! for splitting a string into tagged segments, and [`filter`] for sifting
//! a string array through a pattern.
//!
//! ```
//! use bytere::Regex;
//!
//! let mut re = Regex::new("([A-Za-z]+) ([A-Za-z]+)").unwrap();
//! assert!(re.exec(b"John Doe"));
//!
//! let mut out = [0u8; 16];
//! let end = re.substitute(b"John Doe", br"\2 \1", &mut out).unwrap();
//! assert_eq!(&out[..end], b"Doe John");
//! ```
//!
//! The syntax is deliberately small: `.` `*` `+` `?` `|` `^` `$`,
//! character classes with ranges, up to nine capture groups, and the word
//! anchors `\<` `\>`. No Unicode, no counted repetition, no lookaround.
//! Matching is greedy and can backtrack exponentially on pathological
//! patterns; bound your inputs if the patterns are untrusted.

mod compiler;
mod lexer;
mod program;
mod replace;

pub mod engine;
pub mod error;
pub mod ops;

pub use engine::Regex;
pub use error::{RegexError, Result};
pub use ops::{associate, filter, match_one, FILTER_EXCLUDE, FILTER_WITH_INDEX};
pub use program::NSUBEXP;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // Compile, match, capture, substitute.
        let mut re = Regex::new("a(b+)c").unwrap();
        assert!(re.exec(b"xxabbbcyy"));
        assert_eq!(re.span(0), Some((2, 7)));
        assert_eq!(re.group(b"xxabbbcyy", 1), Some(&b"bbb"[..]));

        let mut out = [0u8; 32];
        let end = re.substitute(b"xxabbbcyy", b"got [&]", &mut out).unwrap();
        assert_eq!(&out[..end], b"got [abbbc]");
    }

    #[test]
    fn test_ex_style_parens() {
        // Without excompat, groups are spelled \( \).
        let mut re = Regex::compile(br"a\(b\)", false).unwrap();
        assert!(re.exec(b"ab"));
        assert_eq!(re.span(1), Some((1, 2)));
        // ...and bare parens are ordinary bytes.
        let mut re = Regex::compile(b"a(b)", false).unwrap();
        assert!(re.exec(b"xa(b)y"));
        assert!(!re.exec(b"ab"));
    }
}
