//! Regex record and backtracking matcher
//!
//! A [`Regex`] owns the compiled program plus three compile-time hints the
//! search loop uses to skip hopeless attempts: the byte every match must
//! begin with (if one is obvious), whether the match is anchored to the
//! start of the input, and a literal that must appear somewhere in any
//! matching input. The capture arrays live in the record and are rewritten
//! by every [`Regex::exec`] call; everything else is immutable after
//! compilation.
//!
//! Matching itself happens in a per-call [`Matcher`] that holds the input
//! cursor and scratch capture slots, so a `Regex` can be shared freely
//! between calls (though not between threads mid-exec).

use bstr::ByteSlice;

use crate::compiler;
use crate::error::Result;
use crate::program::{
    self, next, op, operand, operand_str, ANY, ANYBUT, ANYOF, BACK, BOL, BRANCH, CLOSE, END, EOL,
    EXACTLY, MAGIC, NOTHING, NSUBEXP, OPEN, PLUS, STAR, WORDEND, WORDSTART,
};

/// A compiled regular expression.
#[derive(Debug)]
pub struct Regex {
    /// The byte program; first byte is the magic number.
    pub(crate) program: Vec<u8>,
    /// Byte every match must start with, or 0 if none is obvious.
    pub(crate) start: u8,
    /// Match is anchored to the beginning of the input.
    pub(crate) anchored: bool,
    /// Position and length, inside `program`, of a literal that must
    /// appear in any matching input.
    pub(crate) must: Option<(usize, usize)>,
    /// Capture start positions from the last successful exec; slot 0 is
    /// the whole match.
    pub(crate) startp: [Option<usize>; NSUBEXP],
    /// Capture end positions, parallel to `startp`.
    pub(crate) endp: [Option<usize>; NSUBEXP],
}

impl Regex {
    /// Compile a pattern.
    ///
    /// With `excompat` unset, `\(` and `\)` are the grouping operators and
    /// bare parentheses are literal, as in ex/ed. With it set, bare `(`
    /// and `)` group and the escaped forms are literal.
    pub fn compile(pattern: &[u8], excompat: bool) -> Result<Regex> {
        compiler::compile(pattern, excompat)
    }

    /// Compile a pattern in which bare parentheses group.
    pub fn new(pattern: &str) -> Result<Regex> {
        Regex::compile(pattern.as_bytes(), true)
    }

    /// Match the program against `input`, recording capture spans in the
    /// record. Returns true on the first position where the whole program
    /// succeeds.
    ///
    /// There is no depth cap on backtracking: callers accepting untrusted
    /// patterns should bound pattern and input length themselves.
    pub fn exec(&mut self, input: &[u8]) -> bool {
        // Check validity of the program.
        if self.program.first() != Some(&MAGIC) {
            log::error!("corrupted program");
            return false;
        }

        // Matchable input ends at the first NUL, like the C strings this
        // engine grew up on.
        let limit = input.find_byte(0).unwrap_or(input.len());

        // If there is a "must appear" literal, look for it first.
        if let Some((at, len)) = self.must {
            let needle = &self.program[at..at + len];
            if input[..limit].find(needle).is_none() {
                return false;
            }
        }

        // Simplest case: an anchored match need be tried only once.
        if self.anchored {
            return self.try_at(input, 0);
        }

        if self.start != 0 {
            // We know what byte a match must start with.
            let mut base = 0;
            while let Some(found) = input[base..limit].find_byte(self.start) {
                if self.try_at(input, base + found) {
                    return true;
                }
                base += found + 1;
            }
            false
        } else {
            // We don't, so try every position.
            for origin in 0..=limit {
                if self.try_at(input, origin) {
                    return true;
                }
            }
            false
        }
    }

    /// Attempt the match at one specific origin.
    fn try_at(&mut self, input: &[u8], origin: usize) -> bool {
        log::trace!("regex attempt at byte {origin}");
        let mut m = Matcher {
            prog: &self.program,
            input,
            pos: origin,
            startp: [None; NSUBEXP],
            endp: [None; NSUBEXP],
        };
        if m.run(1) {
            self.startp = m.startp;
            self.endp = m.endp;
            self.startp[0] = Some(origin);
            self.endp[0] = Some(m.pos);
            true
        } else {
            self.startp = [None; NSUBEXP];
            self.endp = [None; NSUBEXP];
            false
        }
    }

    /// Span of capture `n` from the last successful exec; `n == 0` is the
    /// whole match. `None` for groups that did not participate.
    pub fn span(&self, n: usize) -> Option<(usize, usize)> {
        if n >= NSUBEXP {
            return None;
        }
        match (self.startp[n], self.endp[n]) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    /// The bytes capture `n` matched, sliced out of `input` (which must be
    /// the input of the last successful exec).
    pub fn group<'i>(&self, input: &'i [u8], n: usize) -> Option<&'i [u8]> {
        let (s, e) = self.span(n)?;
        input.get(s..e)
    }

    /// Whether every match must start at input position 0.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// The byte every match must begin with, when one is obvious.
    pub fn start_byte(&self) -> Option<u8> {
        (self.start != 0).then_some(self.start)
    }

    /// The literal every matching input must contain, when one is known.
    pub fn must_literal(&self) -> Option<&[u8]> {
        self.must.map(|(at, len)| &self.program[at..at + len])
    }

    /// Render the program in a vaguely comprehensible form, one node per
    /// line, followed by the optimisation hints.
    pub fn dump(&self) -> String {
        let mut out = program::dump(&self.program);
        let mut hints = String::new();
        if self.start != 0 {
            hints.push_str(&format!("start `{}' ", self.start as char));
        }
        if self.anchored {
            hints.push_str("anchored ");
        }
        if let Some(m) = self.must_literal() {
            hints.push_str(&format!("must have \"{}\"", bstr::BStr::new(m)));
        }
        if !hints.is_empty() {
            out.push_str(hints.trim_end());
            out.push('\n');
        }
        out
    }
}

/// A word-part byte: ASCII letter, digit or underscore.
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// State of one match attempt.
struct Matcher<'r, 'i> {
    prog: &'r [u8],
    input: &'i [u8],
    pos: usize,
    startp: [Option<usize>; NSUBEXP],
    endp: [Option<usize>; NSUBEXP],
}

impl Matcher<'_, '_> {
    /// Current input byte; NUL at (or beyond) end of input.
    #[inline]
    fn cur(&self) -> u8 {
        self.input.get(self.pos).copied().unwrap_or(0)
    }

    /// Main matching loop, starting from the node at `start`.
    ///
    /// Ordinary nodes that don't care whether the rest of the match fails
    /// are walked with the cursor reassignment at the bottom; only BRANCH,
    /// OPEN/CLOSE and the repetition retry loop recurse.
    fn run(&mut self, start: usize) -> bool {
        let mut scan = start;
        loop {
            let nxt = next(self.prog, scan);
            match op(self.prog, scan) {
                BOL => {
                    if self.pos != 0 {
                        return false;
                    }
                }
                EOL => {
                    if self.cur() != 0 {
                        return false;
                    }
                }
                ANY => {
                    if self.cur() == 0 {
                        return false;
                    }
                    self.pos += 1;
                }
                WORDSTART => {
                    // At the very start of the input this always holds.
                    if self.pos != 0
                        && (self.cur() == 0
                            || is_word(self.input[self.pos - 1])
                            || !is_word(self.cur()))
                    {
                        return false;
                    }
                }
                WORDEND => {
                    // At the very end of the input this always holds.
                    if self.cur() != 0
                        && (self.pos == 0
                            || !is_word(self.input[self.pos - 1])
                            || is_word(self.cur()))
                    {
                        return false;
                    }
                }
                EXACTLY => {
                    let lit = operand_str(self.prog, operand(scan));
                    // Inline the first byte, for speed.
                    if lit.first() != Some(&self.cur()) {
                        return false;
                    }
                    if lit.len() > 1 && !self.input[self.pos..].starts_with(lit) {
                        return false;
                    }
                    self.pos += lit.len();
                }
                ANYOF => {
                    let set = operand_str(self.prog, operand(scan));
                    if self.cur() == 0 || !set.contains(&self.cur()) {
                        return false;
                    }
                    self.pos += 1;
                }
                ANYBUT => {
                    let set = operand_str(self.prog, operand(scan));
                    if self.cur() == 0 || set.contains(&self.cur()) {
                        return false;
                    }
                    self.pos += 1;
                }
                NOTHING | BACK => {}
                o if (OPEN + 1..=OPEN + 9).contains(&o) => {
                    let no = (o - OPEN) as usize;
                    let save = self.pos;
                    return if self.chase(nxt) {
                        // Don't set the start if some later invocation of
                        // the same parentheses already has.
                        if self.startp[no].is_none() {
                            self.startp[no] = Some(save);
                        }
                        true
                    } else {
                        false
                    };
                }
                o if (CLOSE + 1..=CLOSE + 9).contains(&o) => {
                    let no = (o - CLOSE) as usize;
                    let save = self.pos;
                    return if self.chase(nxt) {
                        if self.endp[no].is_none() {
                            self.endp[no] = Some(save);
                        }
                        true
                    } else {
                        false
                    };
                }
                BRANCH => {
                    if nxt.map(|n| op(self.prog, n)) != Some(BRANCH) {
                        // No choice: continue into the operand without
                        // recursing.
                        scan = operand(scan);
                        continue;
                    }
                    let mut sib = Some(scan);
                    while let Some(b) = sib {
                        if op(self.prog, b) != BRANCH {
                            break;
                        }
                        let save = self.pos;
                        if self.run(operand(b)) {
                            return true;
                        }
                        self.pos = save;
                        sib = next(self.prog, b);
                    }
                    return false;
                }
                STAR | PLUS => {
                    // Look ahead to avoid retry attempts when we know what
                    // byte must come next.
                    let nextch = match nxt {
                        Some(n) if op(self.prog, n) == EXACTLY => self.prog[operand(n)],
                        _ => 0,
                    };
                    let min = if op(self.prog, scan) == STAR { 0 } else { 1 };
                    let save = self.pos;
                    let mut count = self.repeat(operand(scan));
                    while count >= min {
                        // If it could work, try it.
                        if nextch == 0 || self.cur() == nextch {
                            if self.chase(nxt) {
                                return true;
                            }
                        }
                        // Couldn't or didn't; back up one.
                        if count == 0 {
                            break;
                        }
                        count -= 1;
                        self.pos = save + count;
                    }
                    return false;
                }
                END => return true,
                _ => {
                    log::error!("memory corruption");
                    return false;
                }
            }
            match nxt {
                Some(n) => scan = n,
                None => break,
            }
        }
        // Only reachable on a damaged program; END is the normal exit.
        log::error!("corrupted pointers");
        false
    }

    /// Recurse into an optional next node; a missing one means the
    /// program is damaged.
    fn chase(&mut self, p: Option<usize>) -> bool {
        match p {
            Some(p) => self.run(p),
            None => {
                log::error!("corrupted pointers");
                false
            }
        }
    }

    /// Consume as many consecutive matches of a simple atom as possible
    /// and report the count.
    fn repeat(&mut self, p: usize) -> usize {
        let mut count = 0;
        match op(self.prog, p) {
            ANY => {
                let rest = &self.input[self.pos..];
                count = rest.find_byte(0).unwrap_or(rest.len());
                self.pos += count;
            }
            EXACTLY => {
                // Simple operands are single bytes.
                let b = self.prog[operand(p)];
                while self.cur() == b {
                    count += 1;
                    self.pos += 1;
                }
            }
            ANYOF => {
                let set = operand_str(self.prog, operand(p));
                while self.cur() != 0 && set.contains(&self.cur()) {
                    count += 1;
                    self.pos += 1;
                }
            }
            ANYBUT => {
                let set = operand_str(self.prog, operand(p));
                while self.cur() != 0 && !set.contains(&self.cur()) {
                    count += 1;
                    self.pos += 1;
                }
            }
            _ => {
                // Called on something that is not a simple atom.
                log::error!("internal foulup");
            }
        }
        count
    }
}
