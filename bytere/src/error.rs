//! Error types for the regex engine
//!
//! Compile-time errors (bad syntax, oversized programs) and runtime errors
//! (substitution overflow, damaged state) share one `thiserror` enum. The
//! messages are the engine's traditional one-liners, so callers that show
//! them to users keep the wording their patterns have always produced.

use thiserror::Error;

/// The error type for compilation, substitution and the composite
/// operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// A lone `\` terminated the pattern.
    #[error("regular expression cannot end with '\\', use \"\\\\\"")]
    TrailingBackslash,

    /// `\{` or `\}` appeared in the pattern.
    #[error("sorry, unimplemented operator")]
    UnimplementedOperator,

    /// `(` without `)`, or a stray `)`.
    #[error("unmatched ()")]
    UnmatchedParens,

    /// More than nine capture groups.
    #[error("too many ()")]
    TooManyParens,

    /// `*` or `+` applied to something that can match the empty string.
    #[error("*+ operand could be empty")]
    EmptyRepeat,

    /// Two repetition operators in a row, e.g. `a**`.
    #[error("nested *?+")]
    NestedRepeat,

    /// A `[x-y]` range with x above y.
    #[error("invalid [] range")]
    InvalidClassRange,

    /// `[` without a closing `]`.
    #[error("unmatched []")]
    UnmatchedBracket,

    /// `]` outside any character class.
    #[error("unexpected ]")]
    UnexpectedBracket,

    /// `*`, `+` or `?` with nothing to repeat.
    #[error("{0} follows nothing")]
    RepeatFollowsNothing(char),

    /// The compiled program would not fit in two-byte offsets.
    #[error("regexp too big")]
    TooBig,

    /// Substitution output exceeded the destination buffer.
    #[error("line too long")]
    LineTooLong,

    /// A substituted capture contained a NUL byte or referenced a span
    /// outside the matched input.
    #[error("damaged match string")]
    DamagedMatchString,

    /// A program without the magic byte was handed to `substitute`.
    #[error("damaged regexp fed to regsub")]
    DamagedRegexp,

    /// `associate` was given arrays of different lengths.
    #[error("pattern and token array sizes must be identical")]
    PatternTokenMismatch,

    /// A "can't happen" condition inside the compiler.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

/// Result type alias for regex operations.
pub type Result<T> = std::result::Result<T, RegexError>;
