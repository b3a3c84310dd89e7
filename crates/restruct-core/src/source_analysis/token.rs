// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for RST lexical analysis.
//!
//! Tokens carry their literal text (`symbol`) and a 0-based source position.
//! Whitespace is semantic in RST, so the lexer does not discard it: runs of
//! spaces become [`TokenKind::White`] tokens, and every source newline
//! becomes a [`TokenKind::Indent`] token whose `ival` records the
//! indentation of the following line. Blank lines look ahead: their
//! `Indent` token carries the indentation of the next non-blank line, which
//! is what the block parser's indent stack needs to see.
//!
//! Columns are measured in bytes from the base indent (the uniform prefix
//! stripped when parsing documentation embedded in source comments).

use std::fmt;

use ecow::EcoString;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input. Exactly one per lex run, always last.
    Eof,
    /// A newline plus the indentation of the following line.
    Indent,
    /// A run of horizontal whitespace not followed by a newline.
    White,
    /// A run of `[A-Za-z0-9]` or non-ASCII bytes.
    Word,
    /// A run of four or more identical punctuation characters.
    Adornment,
    /// A run of one to three identical punctuation characters.
    Punct,
    /// A single character with no other classification.
    Other,
}

/// A lexical token: kind, literal text and source position.
///
/// # Examples
///
/// ```
/// use restruct_core::source_analysis::{Token, TokenKind};
///
/// let tok = Token::new(TokenKind::Word, "hello", 0, 4);
/// assert_eq!(tok.kind(), TokenKind::Word);
/// assert_eq!(tok.symbol(), "hello");
/// assert_eq!(tok.col(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    symbol: EcoString,
    ival: i32,
    line: i32,
    col: i32,
}

impl Token {
    /// Creates a token with no integer payload.
    #[must_use]
    pub fn new(kind: TokenKind, symbol: impl Into<EcoString>, line: i32, col: i32) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            ival: 0,
            line,
            col,
        }
    }

    /// Creates an indent token for the given indentation depth.
    ///
    /// The symbol is the newline followed by `ival` spaces, which keeps the
    /// token stream a faithful (re-indented) spelling of the input.
    #[must_use]
    pub fn indent(ival: i32, line: i32) -> Self {
        let width = usize::try_from(ival).unwrap_or(0);
        let mut symbol = EcoString::from("\n");
        for _ in 0..width {
            symbol.push(' ');
        }
        Self {
            kind: TokenKind::Indent,
            symbol,
            ival,
            line,
            col: 0,
        }
    }

    /// Creates the end-of-input token.
    #[must_use]
    pub fn eof(line: i32, col: i32) -> Self {
        Self::new(TokenKind::Eof, "", line, col)
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the literal text of this token (empty for EOF).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the indentation payload (meaningful for `Indent` only).
    #[must_use]
    pub fn ival(&self) -> i32 {
        self.ival
    }

    /// Returns the 0-based source line.
    #[must_use]
    pub fn line(&self) -> i32 {
        self.line
    }

    /// Returns the 0-based column, measured from the base indent.
    #[must_use]
    pub fn col(&self) -> i32 {
        self.col
    }

    /// Returns the first character of the symbol, if any.
    #[must_use]
    pub fn first_char(&self) -> Option<char> {
        self.symbol.chars().next()
    }

    /// Returns `true` for the end-of-input token.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Returns `true` for indent tokens.
    #[must_use]
    pub fn is_indent(&self) -> bool {
        self.kind == TokenKind::Indent
    }

    /// Returns `true` for tokens that end a physical line: EOF, whitespace
    /// or an indent.
    #[must_use]
    pub fn is_line_end(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Eof | TokenKind::White | TokenKind::Indent
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "<eof>"),
            TokenKind::Indent => write!(f, "<indent {}>", self.ival),
            _ => write!(f, "{}", self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_symbol_shape() {
        let tok = Token::indent(3, 7);
        assert_eq!(tok.kind(), TokenKind::Indent);
        assert_eq!(tok.symbol(), "\n   ");
        assert_eq!(tok.ival(), 3);
        assert_eq!(tok.line(), 7);
        assert_eq!(tok.col(), 0);
    }

    #[test]
    fn eof_has_empty_symbol() {
        let tok = Token::eof(4, 0);
        assert!(tok.is_eof());
        assert_eq!(tok.symbol(), "");
        assert_eq!(tok.first_char(), None);
    }

    #[test]
    fn line_end_predicate() {
        assert!(Token::eof(0, 0).is_line_end());
        assert!(Token::indent(0, 1).is_line_end());
        assert!(Token::new(TokenKind::White, " ", 0, 0).is_line_end());
        assert!(!Token::new(TokenKind::Word, "x", 0, 0).is_line_end());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Token::new(TokenKind::Word, "abc", 0, 0).to_string(), "abc");
        assert_eq!(Token::indent(2, 1).to_string(), "<indent 2>");
        assert_eq!(Token::eof(0, 0).to_string(), "<eof>");
    }
}
