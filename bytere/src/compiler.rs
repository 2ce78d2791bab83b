//! Two-pass pattern compiler
//!
//! We cannot allocate the program until we know how big it will be, and we
//! cannot know that without compiling. So we compile twice: the first pass
//! drives the whole grammar with the emitter in sizing mode, the second
//! emits into a buffer of exactly the measured size. The program therefore
//! never grows or moves mid-emit, which is what lets repetition operators
//! wrap already-emitted operands by shifting them in place.
//!
//! Grammar:
//!
//! ```text
//! regex   := branch ( '|' branch )*
//! branch  := piece*
//! piece   := atom ( '*' | '+' | '?' )?
//! atom    := '.' | '^' | '$' | '\<' | '\>'
//!          | '[' '^'? classbody ']'
//!          | '(' regex ')'
//!          | literal-run
//! ```
//!
//! Parts of this code are subtly aware of how operator precedence shapes
//! the emitted graph; an individual BRANCH is never concatenated with
//! anything, and the repetition builders rely on that.

use crate::engine::Regex;
use crate::error::{RegexError, Result};
use crate::lexer::{
    self, is_mult, ASTERIX, CARET, DOLLAR, DOT, LBRAC, LSHBRAC, LSQBRAC, OR_OP, PLUSS, QMARK,
    RBRAC, RSHBRAC, RSQBRAC, SPECIAL,
};
use crate::program::{
    next, op, operand, operand_str, CodeBuf, ANY, ANYBUT, ANYOF, BACK, BOL, BRANCH, CLOSE, END,
    EOL, EXACTLY, MAGIC, NOTHING, NSUBEXP, OPEN, PLUS, STAR, WORDEND, WORDSTART,
};

/// Largest program that still fits the two-byte offset encoding.
const MAX_PROGRAM: usize = 32_767;

/// Properties of a just-parsed subexpression, passed up the grammar.
#[derive(Clone, Copy, Default)]
struct AtomFlags {
    /// Known never to match the empty string.
    has_width: bool,
    /// Simple enough to be a STAR/PLUS operand.
    simple: bool,
    /// Starts with `*` or `+`.
    spstart: bool,
}

/// One compilation pass over the tokenised pattern.
struct Compiler<'t> {
    toks: &'t [u16],
    pos: usize,
    npar: usize,
    code: CodeBuf,
}

/// Compile `pattern` into a ready-to-run [`Regex`].
pub(crate) fn compile(pattern: &[u8], excompat: bool) -> Result<Regex> {
    let toks = lexer::tokenize(pattern, excompat)?;

    // First pass: determine size and legality.
    let mut pass = Compiler {
        toks: &toks,
        pos: 0,
        npar: 1,
        code: CodeBuf::sizing(),
    };
    pass.code.byte(MAGIC);
    let (_, flags) = pass.reg(false)?;
    let size = pass.code.len();
    if size >= MAX_PROGRAM {
        return Err(RegexError::TooBig);
    }

    // Second pass: emit for real.
    let mut pass = Compiler {
        toks: &toks,
        pos: 0,
        npar: 1,
        code: CodeBuf::emitting(size),
    };
    pass.code.byte(MAGIC);
    pass.reg(false)?;
    let program = pass.code.into_program();

    // Dig out information for the matcher's fast paths.
    let mut start = 0u8;
    let mut anchored = false;
    let mut must = None;
    let first = 1;
    if next(&program, first).map(|n| op(&program, n)) == Some(END) {
        // Only one top-level alternative.
        let head = operand(first);
        match op(&program, head) {
            EXACTLY => start = program[operand(head)],
            BOL => anchored = true,
            _ => {}
        }

        // If the expression opens with a repetition, record the longest
        // literal that must appear anywhere in a match. Ties go to the
        // later literal: the start-byte check already guards the front.
        if flags.spstart {
            let mut longest = None;
            let mut len = 0;
            let mut walk = Some(head);
            while let Some(s) = walk {
                if op(&program, s) == EXACTLY {
                    let lit = operand_str(&program, operand(s));
                    if lit.len() >= len {
                        longest = Some(operand(s));
                        len = lit.len();
                    }
                }
                walk = next(&program, s);
            }
            must = longest.map(|at| (at, len));
        }
    }

    Ok(Regex {
        program,
        start,
        anchored,
        must,
        startp: [None; NSUBEXP],
        endp: [None; NSUBEXP],
    })
}

impl<'t> Compiler<'t> {
    /// Current token; the sentinel 0 once the pattern is exhausted.
    fn tok(&self) -> u16 {
        self.toks[self.pos]
    }

    /// Regular expression proper: main body or parenthesised subexpression.
    /// The caller has absorbed the opening parenthesis.
    ///
    /// Group handling is folded in here because the tails of all branches
    /// must be tied to the closing node, whichever kind it is.
    fn reg(&mut self, paren: bool) -> Result<(usize, AtomFlags)> {
        let mut out = AtomFlags {
            has_width: true, // tentatively
            ..AtomFlags::default()
        };

        let (open, parno) = if paren {
            if self.npar >= NSUBEXP {
                return Err(RegexError::TooManyParens);
            }
            let parno = self.npar;
            self.npar += 1;
            (Some(self.code.node(OPEN + parno as u8)), parno)
        } else {
            (None, 0)
        };

        // Pick up the branches, linking them together.
        let (br, flags) = self.branch()?;
        let head = match open {
            Some(o) => {
                self.code.tail(o, br);
                o
            }
            None => br,
        };
        out.has_width &= flags.has_width;
        out.spstart |= flags.spstart;
        while self.tok() == OR_OP {
            self.pos += 1;
            let (br, flags) = self.branch()?;
            self.code.tail(head, br);
            out.has_width &= flags.has_width;
            out.spstart |= flags.spstart;
        }

        // Make a closing node and hook it on the end.
        let ender = self
            .code
            .node(if paren { CLOSE + parno as u8 } else { END });
        self.code.tail(head, ender);

        // Hook the tails of the individual branches to the closing node.
        let mut scan = Some(head);
        while let Some(s) = scan {
            self.code.optail(s, ender);
            scan = self.code.next_of(s);
        }

        // Check for proper termination.
        if paren {
            let t = self.tok();
            self.pos += 1;
            if t != RBRAC {
                return Err(RegexError::UnmatchedParens);
            }
        } else if self.tok() != 0 {
            if self.tok() == RBRAC {
                return Err(RegexError::UnmatchedParens);
            }
            return Err(RegexError::Internal("junk on end"));
        }
        Ok((head, out))
    }

    /// One alternative of an `|` operator; implements concatenation.
    fn branch(&mut self) -> Result<(usize, AtomFlags)> {
        let mut out = AtomFlags::default(); // worst case
        let ret = self.code.node(BRANCH);
        let mut chain: Option<usize> = None;
        while self.tok() != 0 && self.tok() != OR_OP && self.tok() != RBRAC {
            let (latest, flags) = self.piece()?;
            out.has_width |= flags.has_width;
            match chain {
                None => out.spstart |= flags.spstart, // first piece
                Some(c) => self.code.tail(c, latest),
            }
            chain = Some(latest);
        }
        if chain.is_none() {
            // Loop ran zero times.
            self.code.node(NOTHING);
        }
        Ok((ret, out))
    }

    /// An atom followed by an optional `*`, `+` or `?`.
    ///
    /// The branching shapes for `?` and the general `*`/`+` reuse one
    /// NOTHING node as both the endmarker of the branch list and the body
    /// of the last branch; the endmarker role is the one that is not
    /// redundant.
    fn piece(&mut self) -> Result<(usize, AtomFlags)> {
        let (ret, flags) = self.atom()?;

        let op_tok = self.tok();
        if !is_mult(op_tok) {
            return Ok((ret, flags));
        }
        if !flags.has_width && op_tok != QMARK {
            return Err(RegexError::EmptyRepeat);
        }
        let out = if op_tok != PLUSS {
            AtomFlags {
                spstart: true,
                ..AtomFlags::default()
            }
        } else {
            AtomFlags {
                has_width: true,
                ..AtomFlags::default()
            }
        };

        if op_tok == ASTERIX && flags.simple {
            self.code.insert(STAR, ret);
        } else if op_tok == ASTERIX {
            // Emit x* as (x&|), where & means "self".
            self.code.insert(BRANCH, ret); // Either x
            let back = self.code.node(BACK); // and loop
            self.code.optail(ret, back);
            self.code.optail(ret, ret); // back
            let alt = self.code.node(BRANCH); // or
            self.code.tail(ret, alt);
            let nothing = self.code.node(NOTHING); // null
            self.code.tail(ret, nothing);
        } else if op_tok == PLUSS && flags.simple {
            self.code.insert(PLUS, ret);
        } else if op_tok == PLUSS {
            // Emit x+ as x(&|), where & means "self".
            let first = self.code.node(BRANCH); // Either
            self.code.tail(ret, first);
            let back = self.code.node(BACK); // loop back
            self.code.tail(back, ret);
            let alt = self.code.node(BRANCH); // or
            self.code.tail(first, alt);
            let nothing = self.code.node(NOTHING); // null
            self.code.tail(ret, nothing);
        } else if op_tok == QMARK {
            // Emit x? as (x|)
            self.code.insert(BRANCH, ret); // Either x
            let alt = self.code.node(BRANCH); // or
            self.code.tail(ret, alt);
            let nothing = self.code.node(NOTHING); // null
            self.code.tail(ret, nothing);
            self.code.optail(ret, nothing);
        }

        self.pos += 1;
        if is_mult(self.tok()) {
            return Err(RegexError::NestedRepeat);
        }
        Ok((ret, out))
    }

    /// The lowest level.
    ///
    /// A whole run of ordinary characters is gobbled into a single EXACTLY
    /// node, which is both smaller to store and faster to run.
    fn atom(&mut self) -> Result<(usize, AtomFlags)> {
        let mut flags = AtomFlags::default(); // worst case
        let t = self.tok();
        self.pos += 1;
        let ret = match t {
            CARET => self.code.node(BOL),
            DOLLAR => self.code.node(EOL),
            DOT => {
                flags.has_width = true;
                flags.simple = true;
                self.code.node(ANY)
            }
            LSHBRAC => self.code.node(WORDSTART),
            RSHBRAC => self.code.node(WORDEND),
            LSQBRAC => {
                let ret = self.class()?;
                flags.has_width = true;
                flags.simple = true;
                ret
            }
            LBRAC => {
                let (sub, sub_flags) = self.reg(true)?;
                flags.has_width |= sub_flags.has_width;
                flags.spstart |= sub_flags.spstart;
                sub
            }
            0 | OR_OP | RBRAC => {
                // Supposed to be caught earlier.
                return Err(RegexError::Internal("internal urp"));
            }
            ASTERIX => return Err(RegexError::RepeatFollowsNothing('*')),
            PLUSS => return Err(RegexError::RepeatFollowsNothing('+')),
            QMARK => return Err(RegexError::RepeatFollowsNothing('?')),
            _ => {
                self.pos -= 1;
                let start = self.pos;
                let mut len = 0;
                while self.toks[start + len] != 0 && self.toks[start + len] & SPECIAL == 0 {
                    len += 1;
                }
                if len == 0 {
                    return Err(RegexError::UnexpectedBracket);
                }
                let ender = self.toks[start + len];
                if len > 1 && is_mult(ender) {
                    // Back off clear of the ?+* operand.
                    len -= 1;
                }
                flags.has_width = true;
                if len == 1 {
                    flags.simple = true;
                }
                let ret = self.code.node(EXACTLY);
                for i in 0..len {
                    self.code.byte(self.toks[start + i] as u8);
                }
                self.code.byte(0);
                self.pos = start + len;
                ret
            }
        };
        Ok((ret, flags))
    }

    /// `[...]` character class; the opening bracket has been consumed.
    ///
    /// A `]` or `-` directly after the opening (or the `^`) is a literal
    /// member. Ranges expand in place, so the operand is always a plain
    /// byte set.
    fn class(&mut self) -> Result<usize> {
        let ret = if self.tok() == CARET {
            // Complement of the set.
            self.pos += 1;
            self.code.node(ANYBUT)
        } else {
            self.code.node(ANYOF)
        };
        if self.tok() == RSQBRAC || self.tok() == b'-' as u16 {
            self.code.byte(self.tok() as u8);
            self.pos += 1;
        }
        while self.tok() != 0 && self.tok() != RSQBRAC {
            if self.tok() == b'-' as u16 {
                self.pos += 1;
                if self.tok() == RSQBRAC || self.tok() == 0 {
                    self.code.byte(b'-');
                } else {
                    let lo = (self.toks[self.pos - 2] & 0xff) + 1;
                    let hi = self.tok() & 0xff;
                    if lo > hi + 1 {
                        return Err(RegexError::InvalidClassRange);
                    }
                    for b in lo..=hi {
                        self.code.byte(b as u8);
                    }
                    self.pos += 1;
                }
            } else {
                self.code.byte(self.tok() as u8);
                self.pos += 1;
            }
        }
        self.code.byte(0);
        if self.tok() != RSQBRAC {
            return Err(RegexError::UnmatchedBracket);
        }
        self.pos += 1;
        Ok(ret)
    }
}
