// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for RST documents.
//!
//! The parser walks the token stream produced by the lexer with a plain
//! index and an **indent stack**: entering a nested block pushes the column
//! its content must start at, leaving pops it. The driver
//! ([`Parser::parse_section`]) first normalizes indentation (descending
//! into a block quote when a line starts deeper than required, returning
//! to the caller when it starts shallower), then classifies the current
//! position ([`Parser::which_section`]) and dispatches to the block parser
//! for that construct. Anything unclassified falls back to a paragraph.
//!
//! Block parsers live in [`blocks`], inline markup in [`inline`], and the
//! `..` directive subsystem in [`directives`]; all of them are further
//! `impl` blocks on [`Parser`]. Included files and table cells are parsed
//! by nested parser frames that share one [`SharedState`].
//!
//! # Error Handling
//!
//! Diagnostics are delivered to the message sink in source order. Warning
//! class messages return `Ok` and parsing continues; error class messages
//! return the [`ParseError`] that unwinds to the entry point, so every
//! parsing method threads `Result` with `?`.

mod blocks;
mod directives;
mod inline;

#[cfg(test)]
mod property_tests;

use ecow::EcoString;

use crate::ast::{NodeKind, RstNode};

use super::error::{MsgKind, ParseError, RstMessage, Severity};
use super::lexer::tokenize;
use super::state::{Binding, FindFileHandler, MsgHandler, ParseOptions, SharedState};
use super::token::{Token, TokenKind};

/// Parses an RST document with explicit base position and callbacks.
///
/// `line` and `col` give the position of the text's first character in its
/// enclosing file, so diagnostics from embedded documentation line up.
/// `find_file` locates files for the `include`, `raw` and `code-block`
/// directives (`None` uses a filesystem existence probe) and `msg_handler`
/// receives every diagnostic (`None` prints warnings to standard output).
///
/// On success returns the resolved document tree and whether a `contents`
/// directive was seen. The first error-class diagnostic aborts the parse
/// and is returned as the [`ParseError`].
pub fn rst_parse(
    text: &str,
    filename: &str,
    line: i32,
    col: i32,
    options: ParseOptions,
    find_file: Option<FindFileHandler>,
    msg_handler: Option<MsgHandler>,
) -> Result<(RstNode, bool), ParseError> {
    let mut shared = SharedState::new(options, find_file, msg_handler);
    let mut parser = Parser::new(&mut shared);
    parser.filename = filename.into();
    parser.line = line;
    parser.col = col + tokenize(text, options.skip_pounds, &mut parser.tokens);
    let unresolved = parser.parse_doc()?;
    let ast = parser.resolve_subs(unresolved)?;
    Ok((ast, parser.has_toc))
}

/// Parses an RST document with default callbacks, reporting positions
/// relative to line 1.
///
/// # Examples
///
/// ```
/// use restruct_core::{parse_document, ParseOptions};
///
/// let (ast, has_toc) = parse_document("*hello*", "doc.rst", ParseOptions::new()).unwrap();
/// assert!(!has_toc);
/// assert_eq!(ast.text_content(), "hello");
/// ```
///
/// # Errors
///
/// Returns the first error-class diagnostic as a [`ParseError`].
pub fn parse_document(
    text: &str,
    filename: &str,
    options: ParseOptions,
) -> Result<(RstNode, bool), ParseError> {
    rst_parse(text, filename, 1, 0, options, None, None)
}

/// One parser frame: a token stream, a cursor and an indent stack.
///
/// The top-level parse and every nested parse (included file, table cell)
/// get their own frame; [`SharedState`] spans all frames of one parse.
pub(in crate::source_analysis) struct Parser<'s> {
    /// State shared across include recursion.
    pub(super) shared: &'s mut SharedState,
    /// The token stream (read-only after lexing).
    pub(super) tokens: Vec<Token>,
    /// Current token index.
    pub(super) idx: usize,
    /// Required indentation columns; the bottom entry is 0.
    pub(super) indent_stack: Vec<i32>,
    /// File name for diagnostics.
    pub(super) filename: EcoString,
    /// Base line added to token lines in diagnostics.
    pub(super) line: i32,
    /// Base column added to token columns in diagnostics.
    pub(super) col: i32,
    /// Set by the resolver when a `contents` directive is seen.
    pub(super) has_toc: bool,
}

impl<'s> Parser<'s> {
    /// Creates a fresh frame over the given shared state.
    pub(super) fn new(shared: &'s mut SharedState) -> Self {
        Self {
            shared,
            tokens: Vec::new(),
            idx: 0,
            indent_stack: vec![0],
            filename: EcoString::new(),
            line: 1,
            col: 0,
            has_toc: false,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the token at `i`, or the trailing EOF token when `i` is past
    /// the end. Lookahead can then overshoot freely without bounds checks
    /// at every call site.
    pub(super) fn tok(&self, i: usize) -> &Token {
        self.tokens.get(i).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("parser has no tokens; expected at least an EOF token")
        })
    }

    /// Returns the current token.
    pub(super) fn current(&self) -> &Token {
        self.tok(self.idx)
    }

    /// Returns a leaf node holding the current token's text.
    pub(super) fn new_leaf(&self) -> RstNode {
        RstNode::leaf(self.current().symbol())
    }

    /// Returns the required indentation for the current nesting.
    pub(super) fn curr_ind(&self) -> i32 {
        *self.indent_stack.last().unwrap_or(&0)
    }

    /// Pushes a required indentation on entering a nested block.
    pub(super) fn push_ind(&mut self, ind: i32) {
        self.indent_stack.push(ind);
    }

    /// Pops the required indentation on leaving a nested block.
    pub(super) fn pop_ind(&mut self) {
        if self.indent_stack.len() > 1 {
            self.indent_stack.pop();
        }
    }

    /// Returns the index of the first token after the next newline.
    pub(super) fn token_after_newline(&self) -> usize {
        self.token_after_newline_from(self.idx)
    }

    /// Returns the index of the first token after the next newline at or
    /// after `start`.
    pub(super) fn token_after_newline_from(&self, start: usize) -> usize {
        let mut i = start;
        loop {
            match self.tok(i).kind() {
                TokenKind::Eof => break,
                TokenKind::Indent => {
                    i += 1;
                    break;
                }
                _ => i += 1,
            }
        }
        i
    }

    /// Returns `true` when the current token starts its line at the
    /// required indentation (or the buffer starts here).
    pub(super) fn pred_nl(&self) -> bool {
        if self.idx == 0 {
            return true;
        }
        let prev = self.tok(self.idx - 1);
        prev.kind() == TokenKind::Indent && prev.ival() == self.curr_ind()
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Reports a diagnostic at the current token.
    ///
    /// Error-class kinds return the corresponding [`ParseError`] so call
    /// sites can propagate with `?`; warnings return `Ok`.
    pub(super) fn msg(&mut self, kind: MsgKind, arg: &str) -> Result<(), ParseError> {
        let line = self.current().line();
        let col = self.current().col();
        self.msg_at(line, col, kind, arg)
    }

    /// Reports a diagnostic at an explicit token position.
    pub(super) fn msg_at(
        &mut self,
        line: i32,
        col: i32,
        kind: MsgKind,
        arg: &str,
    ) -> Result<(), ParseError> {
        let message = RstMessage {
            filename: self.filename.clone(),
            line: self.line + line,
            col: self.col + col,
            kind,
            arg: arg.into(),
        };
        (self.shared.msg_handler)(&message);
        if kind.severity() == Severity::Error {
            Err(ParseError::from(&message))
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Shared-State Registration
    // ========================================================================

    /// Registers a hyperlink or footnote target under a normalized name.
    ///
    /// Redefinition keeps the last value and warns when the new value's
    /// text differs from the registered one.
    pub(super) fn set_ref(&mut self, key: EcoString, value: RstNode) -> Result<(), ParseError> {
        if let Some(i) = self.shared.refs.iter().position(|b| b.key == key) {
            if self.shared.refs[i].value.text_content() != value.text_content() {
                self.msg(MsgKind::RedefinitionOfLabel, &key)?;
            }
            self.shared.refs[i].value = value;
        } else {
            self.shared.refs.push(Binding { key, value });
        }
        Ok(())
    }

    // ========================================================================
    // Pattern Matching
    // ========================================================================

    /// Matches a pattern of token classes against consecutive tokens
    /// starting at `start`.
    ///
    /// One pattern character matches one token: `w` word, space white,
    /// `i` indent, `p` punctuation, `a` adornment, `o` other, `T` anything,
    /// `E` end of line (EOF, white or indent), `e` an enumerator (a single
    /// letter, a digit run, or `#`). Any other character matches a
    /// punctuation/adornment token whose symbol is exactly the literal run
    /// of that character: `"(e) "` is `(`, enumerator, `)`, white, and
    /// `"--w"` is the two-hyphen token followed by a word.
    pub(super) fn pattern_match(&self, start: usize, pattern: &str) -> bool {
        let pat = pattern.as_bytes();
        let mut i = 0;
        let mut j = start;
        while i < pat.len() {
            let tok = self.tok(j);
            let matched = match pat[i] {
                b'w' => tok.kind() == TokenKind::Word,
                b' ' => tok.kind() == TokenKind::White,
                b'i' => tok.kind() == TokenKind::Indent,
                b'p' => tok.kind() == TokenKind::Punct,
                b'a' => tok.kind() == TokenKind::Adornment,
                b'o' => tok.kind() == TokenKind::Other,
                b'T' => true,
                b'E' => tok.is_line_end(),
                b'e' => {
                    let sym = tok.symbol();
                    (tok.kind() == TokenKind::Word || sym == "#")
                        && match sym.as_bytes().first() {
                            Some(b'a'..=b'z' | b'A'..=b'Z') => sym.len() == 1,
                            Some(b'0'..=b'9') => sym.bytes().all(|b| b.is_ascii_digit()),
                            _ => true,
                        }
                }
                c => {
                    let mut run = 0;
                    while i < pat.len() && pat[i] == c {
                        i += 1;
                        run += 1;
                    }
                    i -= 1;
                    matches!(tok.kind(), TokenKind::Punct | TokenKind::Adornment)
                        && tok.symbol().len() == run
                        && tok.symbol().as_bytes()[0] == c
                }
            };
            if !matched {
                return false;
            }
            i += 1;
            j += 1;
        }
        true
    }

    // ========================================================================
    // Section Classification
    // ========================================================================

    /// Returns `true` when the following lines continue a line block: the
    /// next line starts with `|` at the same column, or strictly deeper.
    fn is_line_block(&self) -> bool {
        let j = self.token_after_newline();
        (self.tok(j).col() == self.current().col() && self.tok(j).symbol() == "|")
            || self.tok(j).col() > self.current().col()
    }

    /// Returns `true` when the current line is a definition term: the next
    /// line starts deeper with ordinary content, and the term is not a
    /// literal-block introducer.
    fn is_def_list(&self) -> bool {
        let j = self.token_after_newline();
        self.current().col() < self.tok(j).col()
            && matches!(
                self.tok(j).kind(),
                TokenKind::Word | TokenKind::Other | TokenKind::Punct
            )
            && (j < 2 || self.tok(j - 2).symbol() != "::")
    }

    /// Returns `true` for option list starts: `-x`, `--long`, `/x`, `//x`.
    fn is_option_list(&self) -> bool {
        self.pattern_match(self.idx, "-w")
            || self.pattern_match(self.idx, "--w")
            || self.pattern_match(self.idx, "/w")
            || self.pattern_match(self.idx, "//w")
    }

    /// Classifies the section starting at the current token.
    ///
    /// Returns the node kind the dispatcher should parse. `Leaf` means
    /// "nothing can start here" and becomes a new-section-expected error;
    /// `GridTable` is recognized only to report that it is unimplemented.
    fn which_section(&self) -> NodeKind {
        match self.current().kind() {
            TokenKind::Adornment => {
                if self.pattern_match(self.idx + 1, "ii") {
                    NodeKind::Transition
                } else if self.pattern_match(self.idx + 1, " a") {
                    NodeKind::Table
                } else if self.pattern_match(self.idx + 1, "i") {
                    NodeKind::Overline
                } else {
                    NodeKind::Leaf
                }
            }
            TokenKind::Punct => {
                if self.pattern_match(self.token_after_newline(), "ai") {
                    NodeKind::Headline
                } else if self.current().symbol() == "::" {
                    NodeKind::LiteralBlock
                } else if self.pred_nl()
                    && matches!(self.current().symbol(), "+" | "*" | "-")
                    && self.tok(self.idx + 1).kind() == TokenKind::White
                {
                    NodeKind::BulletList
                } else if self.current().symbol() == "|" && self.is_line_block() {
                    NodeKind::LineBlock
                } else if self.current().symbol() == ".." && self.pred_nl() {
                    NodeKind::Directive
                } else if self.pattern_match(self.idx, ":w:") && self.pred_nl() {
                    NodeKind::FieldList
                } else if self.pattern_match(self.idx, "(e) ") {
                    NodeKind::EnumList
                } else if self.pattern_match(self.idx, "+a+") {
                    NodeKind::GridTable
                } else if self.is_def_list() {
                    NodeKind::DefList
                } else if self.is_option_list() {
                    NodeKind::OptionList
                } else {
                    NodeKind::Paragraph
                }
            }
            TokenKind::Word | TokenKind::Other | TokenKind::White => {
                if self.pattern_match(self.token_after_newline(), "ai") {
                    NodeKind::Headline
                } else if self.pattern_match(self.idx, "e) ")
                    || self.pattern_match(self.idx, "e. ")
                {
                    NodeKind::EnumList
                } else if self.is_def_list() {
                    NodeKind::DefList
                } else {
                    NodeKind::Paragraph
                }
            }
            TokenKind::Eof | TokenKind::Indent => NodeKind::Leaf,
        }
    }

    // ========================================================================
    // Section Driver
    // ========================================================================

    /// Parses a whole document fragment and unwraps redundant grouping.
    pub(super) fn parse_section_wrapper(&mut self) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Inner);
        self.parse_section(&mut result)?;
        while result.children.len() == 1 && result.children[0].kind == NodeKind::Inner {
            if let Some(only) = result.children.pop() {
                result = only;
            }
        }
        Ok(result)
    }

    /// Parses sections into `result` until the indentation drops below the
    /// current requirement or the input ends.
    fn parse_section(&mut self, result: &mut RstNode) -> Result<(), ParseError> {
        loop {
            let mut leave = false;
            while self.current().kind() == TokenKind::Indent {
                let ival = self.current().ival();
                if self.curr_ind() == ival {
                    self.idx += 1;
                } else if ival > self.curr_ind() {
                    // Deeper than required: a block quote.
                    self.push_ind(ival);
                    let mut quote = RstNode::new(NodeKind::BlockQuote);
                    let parsed = self.parse_section(&mut quote);
                    self.pop_ind();
                    parsed?;
                    result.add(quote);
                } else {
                    leave = true;
                    break;
                }
            }
            if leave || self.current().kind() == TokenKind::Eof {
                break;
            }
            let kind = self.which_section();
            let parsed: Option<RstNode> = match kind {
                NodeKind::LiteralBlock => {
                    self.idx += 1; // skip '::'
                    Some(self.parse_literal_block())
                }
                NodeKind::BulletList => self.parse_bullet_list()?,
                NodeKind::LineBlock => self.parse_line_block()?,
                NodeKind::Directive => self.parse_dot_dot()?,
                NodeKind::EnumList => self.parse_enum_list()?,
                NodeKind::DefList => self.parse_definition_list()?,
                NodeKind::FieldList => {
                    if self.idx > 0 {
                        self.idx -= 1;
                    }
                    Some(self.parse_fields()?)
                }
                NodeKind::Transition => Some(self.parse_transition()),
                NodeKind::Headline => Some(self.parse_headline()?),
                NodeKind::Overline => Some(self.parse_overline()?),
                NodeKind::Table => Some(self.parse_simple_table()?),
                NodeKind::OptionList => self.parse_option_list()?,
                NodeKind::GridTable => {
                    self.msg(MsgKind::GridTableNotImplemented, "")?;
                    None
                }
                NodeKind::Leaf => {
                    self.msg(MsgKind::NewSectionExpected, "")?;
                    None
                }
                _ => None,
            };
            let parsed = match parsed {
                Some(node) => Some(node),
                None if kind != NodeKind::Directive => {
                    let mut para = RstNode::new(NodeKind::Paragraph);
                    self.parse_paragraph(&mut para)?;
                    Some(para)
                }
                None => None,
            };
            result.add_opt(parsed);
        }
        // A container whose first child is a lone paragraph renders without
        // the paragraph wrapper.
        if result.child_kind(0) == Some(NodeKind::Paragraph)
            && result.child_kind(1) != Some(NodeKind::Paragraph)
        {
            result.children[0].kind = NodeKind::Inner;
        }
        Ok(())
    }

    /// Parses the whole token stream as a document.
    pub(super) fn parse_doc(&mut self) -> Result<RstNode, ParseError> {
        let result = self.parse_section_wrapper()?;
        if self.current().kind() != TokenKind::Eof {
            self.msg(MsgKind::GeneralParseError, "")?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses with quiet callbacks; panics on parse errors.
    fn parse(text: &str) -> RstNode {
        try_parse(text).expect("parse failed")
    }

    fn try_parse(text: &str) -> Result<RstNode, ParseError> {
        rst_parse(
            text,
            "test.rst",
            1,
            0,
            ParseOptions::new(),
            Some(Box::new(|_| None)),
            Some(Box::new(|_| {})),
        )
        .map(|(ast, _)| ast)
    }

    /// Descends into the tree by child indices.
    fn at<'a>(node: &'a RstNode, path: &[usize]) -> &'a RstNode {
        let mut cur = node;
        for &i in path {
            cur = cur.child(i).expect("missing child");
        }
        cur
    }

    /// Finds the first node of the given kind, depth first.
    fn find_kind(node: &RstNode, kind: NodeKind) -> Option<&RstNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|c| find_kind(c, kind))
    }

    // --- Pattern DSL ---

    #[test]
    fn pattern_classes() {
        let mut shared = SharedState::new(ParseOptions::new(), None, None);
        let mut p = Parser::new(&mut shared);
        tokenize("word ==== :: x", false, &mut p.tokens);
        assert!(p.pattern_match(0, "w a"));
        assert!(p.pattern_match(2, "a"));
        assert!(p.pattern_match(4, "::"));
        assert!(!p.pattern_match(4, ":"));
        assert!(p.pattern_match(0, "T T T"));
        assert!(p.pattern_match(6, "eE"));
    }

    #[test]
    fn pattern_enumerators() {
        let mut shared = SharedState::new(ParseOptions::new(), None, None);
        let mut p = Parser::new(&mut shared);
        tokenize("(a) (12) (ab) (#)", false, &mut p.tokens);
        assert!(p.pattern_match(0, "(e) "));
        assert!(p.pattern_match(4, "(e) "));
        assert!(!p.pattern_match(8, "(e) "));
        assert!(p.pattern_match(12, "(e)"));
    }

    // --- Scenario tests ---

    #[test]
    fn emphasis_single_word() {
        let ast = parse("*hello*");
        // Inner → Paragraph(retagged Inner) → Emphasis → Leaf
        let em = at(&ast, &[0]);
        assert_eq!(em.kind, NodeKind::Emphasis);
        assert_eq!(em.children.len(), 1);
        assert_eq!(em.children[0].kind, NodeKind::Leaf);
        assert_eq!(em.children[0].text, "hello");
    }

    #[test]
    fn headline_then_paragraph() {
        let ast = parse("Title\n=====\n\nbody\n");
        assert_eq!(ast.kind, NodeKind::Inner);
        let headline = at(&ast, &[0]);
        assert_eq!(headline.kind, NodeKind::Headline);
        assert_eq!(headline.level, 1);
        assert_eq!(headline.text_content(), "Title");
        let para = at(&ast, &[1]);
        assert_eq!(para.kind, NodeKind::Paragraph);
        assert_eq!(para.children[0].text, "body");
    }

    #[test]
    fn distinct_underline_chars_get_increasing_levels() {
        let ast = parse("A\n=====\n\nB\n-----\n\nC\n=====\n");
        assert_eq!(at(&ast, &[0]).level, 1);
        assert_eq!(at(&ast, &[1]).level, 2);
        assert_eq!(at(&ast, &[2]).level, 1);
    }

    #[test]
    fn bullet_list_two_items() {
        let ast = parse("* a\n* b\n");
        let list = at(&ast, &[0]);
        assert_eq!(list.kind, NodeKind::BulletList);
        assert_eq!(list.children.len(), 2);
        for item in &list.children {
            assert_eq!(item.kind, NodeKind::BulletItem);
            assert_eq!(item.child_kind(0), Some(NodeKind::Inner));
        }
        assert_eq!(at(list, &[0, 0]).text_content().trim(), "a");
        assert_eq!(at(list, &[1, 0]).text_content().trim(), "b");
    }

    #[test]
    fn enumerated_list() {
        let ast = parse("1. a\n2. b\n");
        let list = at(&ast, &[0]);
        assert_eq!(list.kind, NodeKind::EnumList);
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.children[0].kind, NodeKind::EnumItem);
    }

    #[test]
    fn enum_list_paren_style() {
        let ast = parse("(1) a\n(2) b\n");
        let list = at(&ast, &[0]);
        assert_eq!(list.kind, NodeKind::EnumList);
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn transition_line() {
        let ast = parse("above\n\n------\n\nbelow\n");
        let kinds: Vec<_> = ast.children.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&NodeKind::Transition));
    }

    #[test]
    fn overline_heading() {
        let ast = parse("=====\nTitle\n=====\n\nbody\n");
        let over = at(&ast, &[0]);
        assert_eq!(over.kind, NodeKind::Overline);
        assert_eq!(over.level, 1);
        assert_eq!(over.text_content(), "Title");
    }

    #[test]
    fn overline_missing_trailing_adornment_is_lenient() {
        // The trailing adornment is optional; its absence is not an error.
        let ast = try_parse("=====\nTitle\n").expect("lenient overline");
        assert_eq!(at(&ast, &[0]).kind, NodeKind::Overline);
    }

    #[test]
    fn underline_and_overline_levels_are_separate() {
        let ast = parse("=====\nA\n=====\n\nB\n=====\n");
        // '=' gets overline level 1 and, independently, underline level 1.
        assert_eq!(at(&ast, &[0]).kind, NodeKind::Overline);
        assert_eq!(at(&ast, &[0]).level, 1);
        assert_eq!(at(&ast, &[1]).kind, NodeKind::Headline);
        assert_eq!(at(&ast, &[1]).level, 1);
    }

    #[test]
    fn literal_block_after_paragraph() {
        let ast = parse("para::\n\n  literal text\n\nafter\n");
        let para = at(&ast, &[0]);
        assert_eq!(para.kind, NodeKind::Paragraph);
        // The '::' leaves a single ':' of literal text in the paragraph.
        assert!(para.children.iter().any(|c| c.text == ":"));
        let lit = para
            .children
            .iter()
            .find(|c| c.kind == NodeKind::LiteralBlock)
            .expect("literal block");
        assert!(lit.text_content().contains("literal text"));
    }

    #[test]
    fn block_quote_from_deeper_indent() {
        let ast = parse("text\n\n  quoted\n");
        let kinds: Vec<_> = ast.children.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&NodeKind::BlockQuote));
    }

    #[test]
    fn field_list() {
        let ast = parse(":author: someone\n:version: 1\n");
        let fields = at(&ast, &[0]);
        assert_eq!(fields.kind, NodeKind::FieldList);
        assert_eq!(fields.children.len(), 2);
        let field = &fields.children[0];
        assert_eq!(field.kind, NodeKind::Field);
        assert_eq!(field.child_kind(0), Some(NodeKind::FieldName));
        assert_eq!(field.child_kind(1), Some(NodeKind::FieldBody));
        assert_eq!(at(field, &[0]).text_content(), "author");
    }

    #[test]
    fn definition_list() {
        let ast = parse("term\n  definition body\n");
        let list = at(&ast, &[0]);
        assert_eq!(list.kind, NodeKind::DefList);
        let item = at(list, &[0]);
        assert_eq!(item.kind, NodeKind::DefItem);
        assert_eq!(item.child_kind(0), Some(NodeKind::DefName));
        assert_eq!(item.child_kind(1), Some(NodeKind::DefBody));
        assert_eq!(at(item, &[0]).text_content(), "term");
    }

    #[test]
    fn option_list() {
        let ast = parse("-a  description of a\n--long  description of long\n");
        let list = at(&ast, &[0]);
        assert_eq!(list.kind, NodeKind::OptionList);
        assert_eq!(list.children.len(), 2);
        let item = at(list, &[0]);
        assert_eq!(item.kind, NodeKind::OptionListItem);
        assert_eq!(item.child_kind(0), Some(NodeKind::OptionGroup));
        assert_eq!(item.child_kind(1), Some(NodeKind::Description));
    }

    #[test]
    fn line_block() {
        let ast = parse("| first line\n| second line\n");
        let block = at(&ast, &[0]);
        assert_eq!(block.kind, NodeKind::LineBlock);
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0].kind, NodeKind::LineBlockItem);
    }

    #[test]
    fn simple_table() {
        let ast = parse("====  ====\nr1c1  r1c2\nr2c1  r2c2\n====  ====\n");
        let table = at(&ast, &[0]);
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(table.children.len(), 2);
        let row = at(table, &[0]);
        assert_eq!(row.kind, NodeKind::TableRow);
        assert_eq!(row.children.len(), 2);
        assert_eq!(row.children[0].kind, NodeKind::TableDataCell);
        assert_eq!(at(row, &[0]).text_content().trim(), "r1c1");
    }

    #[test]
    fn simple_table_with_header() {
        let ast = parse("====  ====\nh1    h2\n====  ====\nd1    d2\n====  ====\n");
        let table = at(&ast, &[0]);
        let header_row = at(table, &[0]);
        assert_eq!(header_row.children[0].kind, NodeKind::TableHeaderCell);
        let data_row = at(table, &[1]);
        assert_eq!(data_row.children[0].kind, NodeKind::TableDataCell);
    }

    #[test]
    fn grid_table_reports_unimplemented() {
        let err = try_parse("+----+----+\n| a  | b  |\n+----+----+\n").unwrap_err();
        assert_eq!(err.kind, MsgKind::GridTableNotImplemented);
    }

    #[test]
    fn ref_resolves_to_hyperlink() {
        let ast = parse(".. _label: http://x.y\n\nsee label_.\n");
        let link = find_kind(&ast, NodeKind::Hyperlink).expect("hyperlink");
        assert_eq!(link.children.len(), 2);
        assert_eq!(link.child_kind(0), Some(NodeKind::Inner));
        assert_eq!(link.children[1].text_content(), "http://x.y");
    }

    #[test]
    fn lone_paragraph_retagged_as_inner() {
        let ast = parse("just one paragraph\n");
        // A single paragraph renders without its wrapper.
        assert_eq!(ast.kind, NodeKind::Inner);
        assert_eq!(ast.text_content().trim_end(), "just one paragraph");
    }

    #[test]
    fn base_position_offsets_diagnostics() {
        let err = rst_parse(
            "``unterminated\n\n",
            "embedded.rst",
            10,
            4,
            ParseOptions::new(),
            Some(Box::new(|_| None)),
            Some(Box::new(|_| {})),
        )
        .unwrap_err();
        assert_eq!(err.kind, MsgKind::Expected);
        assert_eq!(err.line, 10);
        assert_eq!(err.col, 4);
    }

    #[test]
    fn diagnostics_are_delivered_in_source_order() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(i32, MsgKind)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let result = rst_parse(
            "|one| then |two|\n",
            "test.rst",
            1,
            0,
            ParseOptions::new(),
            Some(Box::new(|_| None)),
            Some(Box::new(move |m| sink.borrow_mut().push((m.line, m.kind)))),
        );
        assert!(result.is_ok());
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, k)| *k == MsgKind::UnknownSubstitution));
    }
}
