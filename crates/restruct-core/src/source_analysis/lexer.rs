// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for RST source text.
//!
//! The lexer is hand-written and byte-driven: RST's word class is
//! `[A-Za-z0-9]` plus every non-ASCII byte, so multi-byte UTF-8 sequences
//! always stay inside [`TokenKind::Word`] tokens and token boundaries never
//! split a character.
//!
//! # Design Principles
//!
//! - **Whitespace is semantic**: indentation drives block structure, so
//!   every newline becomes an [`TokenKind::Indent`] token and horizontal
//!   whitespace survives as [`TokenKind::White`]
//! - **Total**: every input produces a token stream ending in exactly one
//!   EOF; there is no failure mode
//! - **Append mode**: [`tokenize`] appends to an existing vector and
//!   returns the number of columns consumed before tokenization, so callers
//!   embedding text (included files, table cells) can align positions
//!
//! A NUL byte terminates the scan like end of input does; RST sources are
//! text, and everything after an embedded NUL is unreachable garbage.

use super::token::{Token, TokenKind};

/// Returns `true` for bytes that form [`TokenKind::Word`] tokens.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b >= 0x80
}

/// The lexer state: a cursor over the source bytes plus position tracking.
struct Lexer<'src> {
    /// The source text (for symbol slices).
    text: &'src str,
    /// The source bytes (for classification).
    src: &'src [u8],
    /// Current byte offset.
    pos: usize,
    /// Current 0-based line.
    line: i32,
    /// Current raw column (before base-indent adjustment).
    col: i32,
    /// Columns stripped uniformly from every line (skip-pounds mode).
    base_indent: i32,
    /// Whether up to two leading `#` per line are treated as indentation.
    skip_pounds: bool,
}

/// Tokenizes `source` into a fresh token stream.
///
/// The stream always ends in exactly one EOF token, whatever the input.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    tokenize(source, false, &mut tokens);
    tokens
}

/// Tokenizes `source`, appending tokens to `tokens` until an EOF token has
/// been emitted.
///
/// Returns the number of source columns consumed before tokenization began
/// (the `#`-leader and base indentation in skip-pounds mode, zero
/// otherwise); callers parsing embedded text add it to their base column so
/// diagnostics line up with the enclosing file.
pub(crate) fn tokenize(source: &str, skip_pounds: bool, tokens: &mut Vec<Token>) -> i32 {
    let first = tokens.len();
    let mut lexer = Lexer::new(source, skip_pounds);
    let consumed = lexer.skip_preamble();
    loop {
        let tok = lexer.next_token();
        let is_eof = tok.is_eof();
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    // Leading whitespace on the very first line has no preceding newline to
    // fold into; reshape it into the indent token the parser expects.
    if tokens[first].kind() == TokenKind::White {
        let ival = i32::try_from(tokens[first].symbol().len()).unwrap_or(i32::MAX);
        let line = tokens[first].line();
        tokens[first] = Token::indent(ival, line);
    }
    consumed
}

impl<'src> Lexer<'src> {
    fn new(text: &'src str, skip_pounds: bool) -> Self {
        Self {
            text,
            src: text.as_bytes(),
            pos: 0,
            line: 0,
            col: 0,
            base_indent: 0,
            skip_pounds,
        }
    }

    /// Returns the byte at `i`, or NUL past the end of input.
    fn byte(&self, i: usize) -> u8 {
        self.src.get(i).copied().unwrap_or(0)
    }

    /// Clamps a raw column into base-indent-relative coordinates.
    fn adjust(&self, col: i32) -> i32 {
        (col - self.base_indent).max(0)
    }

    /// Skips the UTF-8 BOM and, in skip-pounds mode, the first line's
    /// `#`-leader and base indentation. Returns the columns consumed.
    fn skip_preamble(&mut self) -> i32 {
        let mut consumed = 0;
        if self.src.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.pos = 3;
        }
        if self.skip_pounds {
            if self.byte(self.pos) == b'#' {
                self.pos += 1;
                consumed += 1;
            }
            if self.byte(self.pos) == b'#' {
                self.pos += 1;
                consumed += 1;
            }
            while self.byte(self.pos) == b' ' {
                self.pos += 1;
                self.base_indent += 1;
                consumed += 1;
            }
            self.col = self.base_indent;
        }
        consumed
    }

    /// Lexes the next token, dispatching on the first byte.
    fn next_token(&mut self) -> Token {
        match self.byte(self.pos) {
            0 => Token::eof(self.line, self.adjust(self.col)),
            b if is_word_byte(b) => self.lex_word(),
            b' ' | b'\t' | 0x0B | 0x0C => self.lex_white(),
            b'\r' | b'\n' => self.lex_indent(),
            b if b.is_ascii_punctuation() => self.lex_adornment(),
            _ => self.lex_other(),
        }
    }

    /// Lexes a maximal run of word bytes.
    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        let col = self.col;
        while is_word_byte(self.byte(self.pos)) {
            self.pos += 1;
        }
        self.col += i32::try_from(self.pos - start).unwrap_or(i32::MAX);
        Token::new(
            TokenKind::Word,
            &self.text[start..self.pos],
            self.line,
            self.adjust(col),
        )
    }

    /// Lexes horizontal whitespace. A run that leads straight into a
    /// newline is discarded in favour of the indent token.
    fn lex_white(&mut self) -> Token {
        let start = self.pos;
        let col = self.col;
        self.pos += 1;
        while matches!(self.byte(self.pos), b' ' | b'\t') {
            self.pos += 1;
        }
        self.col += i32::try_from(self.pos - start).unwrap_or(i32::MAX);
        if matches!(self.byte(self.pos), b'\r' | b'\n') {
            return self.next_token();
        }
        Token::new(
            TokenKind::White,
            &self.text[start..self.pos],
            self.line,
            self.adjust(col),
        )
    }

    /// Lexes a newline into an indent token.
    ///
    /// The indentation of a blank line is taken from the next non-blank
    /// line (looked at, not consumed), so the parser's indent stack sees a
    /// consistent depth across paragraph gaps.
    fn lex_indent(&mut self) -> Token {
        self.line += 1;
        let (indent, pos) = self.indent_after(self.pos);
        self.pos = pos;
        self.col = indent;
        Token::indent((indent - self.base_indent).max(0), self.line)
    }

    /// Computes the effective indentation after the newline at `start`.
    ///
    /// Returns the indentation and the position after this line's own
    /// newline and leading whitespace. When the line is blank the returned
    /// indentation comes from the first non-blank line below (zero at end
    /// of input), found by lookahead that does not move the cursor.
    fn indent_after(&self, start: usize) -> (i32, usize) {
        let (indent, after_ws) = self.scan_line_indent(start);
        let mut look_indent = indent;
        let mut look_pos = after_ws;
        loop {
            match self.byte(look_pos) {
                0 => {
                    look_indent = 0;
                    break;
                }
                b'\r' | b'\n' => {
                    let (i, p) = self.scan_line_indent(look_pos);
                    look_indent = i;
                    look_pos = p;
                }
                _ => break,
            }
        }
        (look_indent, after_ws)
    }

    /// Consumes the newline at `start` plus the following indentation,
    /// returning the indentation width and the position after it.
    ///
    /// Tabs round the column up to the next multiple of 8. In skip-pounds
    /// mode up to two `#` are skipped without counting, matching the
    /// base-indent computation of the first line.
    fn scan_line_indent(&self, start: usize) -> (i32, usize) {
        let mut pos = start;
        if self.byte(pos) == b'\r' {
            pos += 1;
            if self.byte(pos) == b'\n' {
                pos += 1;
            }
        } else if self.byte(pos) == b'\n' {
            pos += 1;
        }
        if self.skip_pounds {
            if self.byte(pos) == b'#' {
                pos += 1;
            }
            if self.byte(pos) == b'#' {
                pos += 1;
            }
        }
        let mut indent = 0;
        loop {
            match self.byte(pos) {
                b' ' | 0x0B | 0x0C => {
                    pos += 1;
                    indent += 1;
                }
                b'\t' => {
                    pos += 1;
                    indent = indent - indent % 8 + 8;
                }
                _ => break,
            }
        }
        (indent, pos)
    }

    /// Lexes a maximal run of one identical punctuation character.
    ///
    /// Runs longer than three characters are adornments (heading
    /// underlines, transitions, table borders); short runs are ordinary
    /// punctuation like `::` or `..`.
    fn lex_adornment(&mut self) -> Token {
        let start = self.pos;
        let col = self.col;
        let c = self.byte(self.pos);
        while self.byte(self.pos) == c {
            self.pos += 1;
        }
        let len = self.pos - start;
        self.col += i32::try_from(len).unwrap_or(i32::MAX);
        let kind = if len > 3 {
            TokenKind::Adornment
        } else {
            TokenKind::Punct
        };
        Token::new(kind, &self.text[start..self.pos], self.line, self.adjust(col))
    }

    /// Lexes a single unclassified byte (control characters, mostly).
    fn lex_other(&mut self) -> Token {
        let start = self.pos;
        let col = self.col;
        self.pos += 1;
        self.col += 1;
        Token::new(
            TokenKind::Other,
            &self.text[start..self.pos],
            self.line,
            self.adjust(col),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: just the kinds.
    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).iter().map(Token::kind).collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        let toks = lex("");
        assert_eq!(toks.len(), 1);
        assert!(toks[0].is_eof());
    }

    #[test]
    fn single_word() {
        let toks = lex("hello");
        assert_eq!(toks[0].kind(), TokenKind::Word);
        assert_eq!(toks[0].symbol(), "hello");
        assert!(toks[1].is_eof());
    }

    #[test]
    fn words_and_whitespace() {
        let toks = lex("a  b");
        assert_eq!(
            toks.iter().map(Token::symbol).collect::<Vec<_>>(),
            vec!["a", "  ", "b", ""]
        );
        assert_eq!(toks[1].kind(), TokenKind::White);
        assert_eq!(toks[2].col(), 3);
    }

    #[test]
    fn newline_becomes_indent() {
        let toks = lex("a\nb");
        assert_eq!(
            kinds("a\nb"),
            vec![
                TokenKind::Word,
                TokenKind::Indent,
                TokenKind::Word,
                TokenKind::Eof
            ]
        );
        assert_eq!(toks[1].ival(), 0);
        assert_eq!(toks[1].symbol(), "\n");
        assert_eq!(toks[2].line(), 1);
    }

    #[test]
    fn crlf_is_one_newline() {
        assert_eq!(
            kinds("a\r\nb"),
            vec![
                TokenKind::Word,
                TokenKind::Indent,
                TokenKind::Word,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn indented_line() {
        let toks = lex("a\n  b");
        assert_eq!(toks[1].ival(), 2);
        assert_eq!(toks[1].symbol(), "\n  ");
        assert_eq!(toks[2].col(), 2);
    }

    #[test]
    fn blank_line_takes_next_lines_indent() {
        let toks = lex("a\n\n  b");
        // Both indents report the indentation of the `b` line.
        assert_eq!(toks[1].kind(), TokenKind::Indent);
        assert_eq!(toks[1].ival(), 2);
        assert_eq!(toks[2].kind(), TokenKind::Indent);
        assert_eq!(toks[2].ival(), 2);
        assert_eq!(toks[3].symbol(), "b");
    }

    #[test]
    fn blank_line_at_eof_has_zero_indent() {
        let toks = lex("a\n\n");
        assert_eq!(toks[1].ival(), 0);
        assert_eq!(toks[2].ival(), 0);
        assert!(toks[3].is_eof());
    }

    #[test]
    fn tab_rounds_to_multiple_of_eight() {
        let toks = lex("a\n\tb");
        assert_eq!(toks[1].ival(), 8);
        let toks = lex("a\n  \tb");
        assert_eq!(toks[1].ival(), 8);
    }

    #[test]
    fn trailing_spaces_fold_into_indent() {
        assert_eq!(
            kinds("a   \nb"),
            vec![
                TokenKind::Word,
                TokenKind::Indent,
                TokenKind::Word,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn leading_whitespace_becomes_indent() {
        let toks = lex("  x");
        assert_eq!(toks[0].kind(), TokenKind::Indent);
        assert_eq!(toks[0].ival(), 2);
        assert_eq!(toks[1].symbol(), "x");
    }

    #[test]
    fn punctuation_run_lengths() {
        let toks = lex("= == === ====");
        assert_eq!(toks[0].kind(), TokenKind::Punct);
        assert_eq!(toks[2].kind(), TokenKind::Punct);
        assert_eq!(toks[4].kind(), TokenKind::Punct);
        assert_eq!(toks[6].kind(), TokenKind::Adornment);
        assert_eq!(toks[6].symbol(), "====");
    }

    #[test]
    fn mixed_punctuation_splits_runs() {
        let toks = lex("::..");
        assert_eq!(toks[0].symbol(), "::");
        assert_eq!(toks[1].symbol(), "..");
    }

    #[test]
    fn bom_is_skipped() {
        let toks = lex("\u{FEFF}x");
        assert_eq!(toks[0].kind(), TokenKind::Word);
        assert_eq!(toks[0].symbol(), "x");
    }

    #[test]
    fn nul_terminates() {
        let toks = lex("a\0b");
        assert_eq!(toks[0].symbol(), "a");
        assert!(toks[1].is_eof());
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn non_ascii_stays_in_words() {
        let toks = lex("héllo wörld");
        assert_eq!(toks[0].symbol(), "héllo");
        assert_eq!(toks[2].symbol(), "wörld");
    }

    #[test]
    fn skip_pounds_strips_leader() {
        let mut tokens = Vec::new();
        let consumed = tokenize("## Hello\n## World", true, &mut tokens);
        // Two pounds and one space consumed; the space is the base indent.
        assert_eq!(consumed, 3);
        assert_eq!(tokens[0].symbol(), "Hello");
        assert_eq!(tokens[0].col(), 0);
        assert_eq!(tokens[1].kind(), TokenKind::Indent);
        assert_eq!(tokens[1].ival(), 0);
        assert_eq!(tokens[2].symbol(), "World");
        assert_eq!(tokens[2].col(), 0);
    }

    #[test]
    fn append_mode_returns_zero_without_pounds() {
        let mut tokens = Vec::new();
        assert_eq!(tokenize("x", false, &mut tokens), 0);
        let first_len = tokens.len();
        tokenize("y", false, &mut tokens);
        assert_eq!(tokens.len(), first_len + 2);
    }

    #[test]
    fn other_tokens_are_single_bytes() {
        let toks = lex("a\x01b");
        assert_eq!(toks[1].kind(), TokenKind::Other);
        assert_eq!(toks[1].symbol(), "\u{1}");
    }
}
