// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The `..` directive subsystem.
//!
//! A `..` at the start of a line introduces one of four forms:
//!
//! - a **named directive** (`.. name:: argument`), dispatched through
//!   [`Parser::parse_directive`] with per-directive argument, field-list
//!   and body conventions
//! - a **hyperlink target** (`.. _name: target`)
//! - a **substitution definition** (`.. |name| replace:: ...` or
//!   `.. |name| image:: ...`)
//! - a **footnote/citation target** (`.. [name] ...`)
//!
//! Anything else is a comment: everything indented deeper than the `..` is
//! consumed and discarded.
//!
//! `include` re-enters the whole parser on the included file with a nested
//! frame sharing this parse's state. The shared include stack turns
//! self-inclusion into an error instead of unbounded recursion.

use ecow::EcoString;

use crate::ast::{NodeKind, RstNode};
use crate::source_analysis::error::{MsgKind, ParseError};
use crate::source_analysis::lexer::tokenize;
use crate::source_analysis::state::eq_ignore_style;
use crate::source_analysis::token::TokenKind;

use super::Parser;

/// How a directive's argument is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgStyle {
    /// No argument.
    None,
    /// A file name: words and punctuation up to the next whitespace.
    File,
    /// A single word.
    Word,
    /// The rest of the line as inline content.
    Inline,
}

/// How a directive's body is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyStyle {
    /// No body; leave the indented block for the surrounding section.
    None,
    /// A nested document section.
    Section,
    /// A verbatim literal block.
    LiteralBlock,
}

/// Languages the downstream highlighters understand; a `code` or
/// `code-block` naming anything else gets an unsupported-language warning.
const KNOWN_LANGUAGES: &[&str] = &[
    "none",
    "nim",
    "nimrod",
    "c",
    "cpp",
    "c++",
    "csharp",
    "c#",
    "java",
    "javascript",
    "js",
    "python",
    "rust",
    "yaml",
];

/// Field names the `image` and `figure` directives understand.
const IMAGE_FIELDS: &[&str] = &["height", "width", "scale", "alt", "align", "target"];

/// Field names the `code` and `code-block` directives understand.
const CODE_FIELDS: &[&str] = &["file", "linenos", "number-lines", "default-language"];

/// Field names the `include` directive understands.
const INCLUDE_FIELDS: &[&str] = &["literal"];

/// Field names the `raw` directive understands.
const RAW_FIELDS: &[&str] = &["file"];

/// Looks up the value of a named field in a directive's field list.
///
/// Returns `None` when the directive has no such field; a present field
/// with an empty body yields `"?"` so presence stays observable.
fn field_value(directive: &RstNode, fieldname: &str) -> Option<String> {
    let fields = directive.child(1)?;
    if fields.kind != NodeKind::FieldList {
        return None;
    }
    for field in &fields.children {
        let name = field.child(0)?.text_content();
        if name.trim() == fieldname {
            let body = field
                .child(1)
                .map(RstNode::text_content)
                .unwrap_or_default();
            let body = body.trim().to_string();
            return Some(if body.is_empty() { "?".to_string() } else { body });
        }
    }
    None
}

impl Parser<'_> {
    /// Parses a `..` block: directive, target, substitution or comment.
    ///
    /// Returns `Ok(None)` for the forms that only register state (targets,
    /// substitutions) or produce nothing (comments).
    pub(super) fn parse_dot_dot(&mut self) -> Result<Option<RstNode>, ParseError> {
        let col = self.current().col();
        self.idx += 1;
        let name = self.get_directive();
        if !name.is_empty() {
            self.push_ind(col);
            let result = self.dispatch_directive(&name);
            self.pop_ind();
            result
        } else if self.pattern_match(self.idx, " _") {
            // hyperlink target
            self.idx += 2;
            let name = self.get_reference_name(":")?;
            if self.current().kind() == TokenKind::White {
                self.idx += 1;
            }
            let target = self.until_eol()?;
            self.set_ref(name.to_refname().into(), target)?;
            Ok(None)
        } else if self.pattern_match(self.idx, " |") {
            // substitution definition
            self.idx += 2;
            let name = self.get_reference_name("|")?;
            if self.current().kind() == TokenKind::White {
                self.idx += 1;
            }
            let value = if eq_ignore_style(self.current().symbol(), "replace") {
                self.idx += 2;
                Some(self.until_eol()?)
            } else if eq_ignore_style(self.current().symbol(), "image") {
                self.idx += 2;
                if self.current().kind() == TokenKind::White {
                    self.idx += 1;
                }
                Some(self.dir_image()?)
            } else {
                let symbol = EcoString::from(self.current().symbol());
                self.msg(MsgKind::InvalidDirective, &symbol)?;
                None
            };
            if let Some(value) = value {
                self.shared.set_sub(name.text_content().into(), value);
            }
            Ok(None)
        } else if self.pattern_match(self.idx, " [") {
            // footnote or citation target
            self.idx += 2;
            let name = self.get_reference_name("]")?;
            if self.current().kind() == TokenKind::White {
                self.idx += 1;
            }
            let target = self.until_eol()?;
            self.set_ref(name.to_refname().into(), target)?;
            Ok(None)
        } else {
            self.parse_comment();
            Ok(None)
        }
    }

    /// Reads a directive name followed by `::`, or restores the cursor and
    /// returns an empty string when the line is not a named directive.
    fn get_directive(&mut self) -> EcoString {
        if self.current().kind() != TokenKind::White
            || self.tok(self.idx + 1).kind() != TokenKind::Word
        {
            return EcoString::new();
        }
        let mark = self.idx;
        self.idx += 1;
        let mut name = EcoString::from(self.current().symbol());
        self.idx += 1;
        while matches!(
            self.current().kind(),
            TokenKind::Word | TokenKind::Punct | TokenKind::Adornment | TokenKind::Other
        ) {
            if self.current().symbol() == "::" {
                break;
            }
            name.push_str(self.current().symbol());
            self.idx += 1;
        }
        if self.current().kind() == TokenKind::White {
            self.idx += 1;
        }
        if self.current().symbol() == "::" {
            self.idx += 1;
            if self.current().kind() == TokenKind::White {
                self.idx += 1;
            }
            name
        } else {
            self.idx = mark;
            EcoString::new()
        }
    }

    /// Dispatches a recognized directive name.
    fn dispatch_directive(&mut self, name: &str) -> Result<Option<RstNode>, ParseError> {
        match name {
            "include" => self.dir_include(),
            "image" => self.dir_image().map(Some),
            "figure" => self.dir_figure().map(Some),
            "code" => self.dir_code_block(false).map(Some),
            "code-block" => self.dir_code_block(true).map(Some),
            "container" => self.dir_container().map(Some),
            "title" => self.dir_title().map(Some),
            "contents" => self.dir_contents().map(Some),
            "index" => self.dir_index().map(Some),
            "raw" => {
                if self.shared.options.support_raw_directive {
                    self.dir_raw()
                } else {
                    self.msg(MsgKind::InvalidDirective, name)?;
                    Ok(None)
                }
            }
            _ => {
                self.msg(MsgKind::InvalidDirective, name)?;
                Ok(None)
            }
        }
    }

    /// Parses the generic directive shape into `[argument, fields, body]`.
    ///
    /// The field list is only recognized when the following line is
    /// indented at least three columns and starts with `:`; the body is
    /// whatever sits deeper than the directive's own line, parsed per
    /// `body`.
    fn parse_directive(
        &mut self,
        arg: ArgStyle,
        has_fields: bool,
        body: BodyStyle,
    ) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Directive);
        let args = match arg {
            ArgStyle::None => None,
            ArgStyle::File => {
                let mut args = RstNode::new(NodeKind::DirArg);
                while matches!(
                    self.current().kind(),
                    TokenKind::Word | TokenKind::Other | TokenKind::Punct | TokenKind::Adornment
                ) {
                    args.add(self.new_leaf());
                    self.idx += 1;
                }
                Some(args)
            }
            ArgStyle::Word => {
                while self.current().kind() == TokenKind::White {
                    self.idx += 1;
                }
                if self.current().kind() == TokenKind::Word {
                    let mut args = RstNode::new(NodeKind::DirArg);
                    args.add(self.new_leaf());
                    self.idx += 1;
                    Some(args)
                } else {
                    None
                }
            }
            ArgStyle::Inline => {
                let mut args = RstNode::new(NodeKind::DirArg);
                self.parse_line(&mut args)?;
                Some(args)
            }
        };
        result.add_slot(args);
        let fields = if has_fields
            && self.current().kind() == TokenKind::Indent
            && self.current().ival() >= 3
            && self.tok(self.idx + 1).symbol() == ":"
        {
            Some(self.parse_fields()?)
        } else {
            None
        };
        result.add_slot(fields);
        let content = match body {
            BodyStyle::None => None,
            BodyStyle::Section | BodyStyle::LiteralBlock => self.parse_dir_body(body)?,
        };
        result.add_slot(content);
        Ok(result)
    }

    /// Warns about field names the directive does not understand.
    ///
    /// Names are compared ignoring case and underscores, like role and
    /// substitution keywords. Unknown fields stay in the tree so renderers
    /// still see them; only the warning is emitted.
    fn check_fields(&mut self, directive: &RstNode, known: &[&str]) -> Result<(), ParseError> {
        let fields = &directive.children[1];
        if fields.kind != NodeKind::FieldList {
            return Ok(());
        }
        for field in &fields.children {
            let name = field
                .child(0)
                .map(RstNode::text_content)
                .unwrap_or_default();
            let name = name.trim();
            if !known.iter().any(|k| eq_ignore_style(k, name)) {
                self.msg(MsgKind::UnsupportedField, name)?;
            }
        }
        Ok(())
    }

    /// Parses a directive body at the indentation of the following line.
    fn parse_dir_body(&mut self, body: BodyStyle) -> Result<Option<RstNode>, ParseError> {
        if self.current().kind() == TokenKind::Indent && self.current().ival() > self.curr_ind() {
            let ival = self.current().ival();
            self.push_ind(ival);
            let parsed = match body {
                BodyStyle::LiteralBlock => Ok(self.parse_literal_block()),
                _ => self.parse_section_wrapper(),
            };
            self.pop_ind();
            Ok(Some(parsed?))
        } else {
            Ok(None)
        }
    }

    /// Collects a reference name up to the closing marker.
    pub(super) fn get_reference_name(&mut self, end: &str) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Inner);
        loop {
            match self.current().kind() {
                TokenKind::Word | TokenKind::Other | TokenKind::White => {
                    result.add(self.new_leaf());
                    self.idx += 1;
                }
                TokenKind::Punct => {
                    if self.current().symbol() == end {
                        self.idx += 1;
                        break;
                    }
                    result.add(self.new_leaf());
                    self.idx += 1;
                }
                _ => {
                    self.msg(MsgKind::Expected, end)?;
                    break;
                }
            }
        }
        Ok(result)
    }

    /// Consumes a comment: the rest of the line, or everything indented
    /// deeper than the comment's own line.
    fn parse_comment(&mut self) {
        match self.current().kind() {
            TokenKind::Indent | TokenKind::Eof => {
                if self.current().kind() == TokenKind::Indent
                    && self.tok(self.idx + 1).kind() == TokenKind::Indent
                {
                    // empty comment
                    self.idx += 1;
                } else {
                    let indent = self.current().ival();
                    loop {
                        match self.current().kind() {
                            TokenKind::Eof => break,
                            TokenKind::Indent if self.current().ival() < indent => break,
                            _ => self.idx += 1,
                        }
                    }
                }
            }
            _ => {
                while !matches!(self.current().kind(), TokenKind::Indent | TokenKind::Eof) {
                    self.idx += 1;
                }
            }
        }
    }

    // ========================================================================
    // Individual Directives
    // ========================================================================

    /// `include`: splice another file into the document.
    ///
    /// With a `literal` field the file becomes a literal block; otherwise
    /// it is lexed and parsed by a nested frame sharing this parse's
    /// state. Including a file that is already being included is an error.
    fn dir_include(&mut self) -> Result<Option<RstNode>, ParseError> {
        let n = self.parse_directive(ArgStyle::File, true, BodyStyle::None)?;
        self.check_fields(&n, INCLUDE_FIELDS)?;
        let arg = n.children[0].text_content();
        let filename = arg.trim();
        let Some(path) = (self.shared.find_file)(filename) else {
            self.msg(MsgKind::CannotOpenFile, filename)?;
            return Ok(None);
        };
        if field_value(&n, "literal").is_some() {
            let Ok(content) = std::fs::read_to_string(&path) else {
                self.msg(MsgKind::CannotOpenFile, path.as_str())?;
                return Ok(None);
            };
            let mut result = RstNode::new(NodeKind::LiteralBlock);
            result.add(RstNode::leaf(content));
            Ok(Some(result))
        } else {
            if self.shared.include_stack.contains(&path) {
                self.msg(MsgKind::RecursiveInclude, filename)?;
                return Ok(None);
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                self.msg(MsgKind::CannotOpenFile, path.as_str())?;
                return Ok(None);
            };
            self.shared.include_stack.push(path);
            let parsed = {
                let mut nested = Parser::new(&mut *self.shared);
                nested.filename = filename.into();
                nested.col += tokenize(&content, false, &mut nested.tokens);
                nested.parse_doc()
            };
            self.shared.include_stack.pop();
            Ok(Some(parsed?))
        }
    }

    /// `image`: a file argument plus renderer-facing fields.
    pub(super) fn dir_image(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::File, true, BodyStyle::None)?;
        self.check_fields(&result, IMAGE_FIELDS)?;
        result.kind = NodeKind::Image;
        Ok(result)
    }

    /// `figure`: an image with a caption section.
    fn dir_figure(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::File, true, BodyStyle::Section)?;
        self.check_fields(&result, IMAGE_FIELDS)?;
        result.kind = NodeKind::Figure;
        Ok(result)
    }

    /// `code` / `code-block`: a language word and a verbatim body.
    ///
    /// A `file` field replaces the body with the file's contents. The
    /// extended form guarantees a `default-language: Nimrod` field when no
    /// fields were given, so renderers always find a language to fall
    /// back to. A language no highlighter understands and fields the
    /// directive does not know both warn; parsing continues.
    fn dir_code_block(&mut self, with_default_language: bool) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::Word, true, BodyStyle::LiteralBlock)?;
        let language = result.children[0].text_content();
        let language = language.trim();
        if !language.is_empty()
            && !KNOWN_LANGUAGES.iter().any(|k| eq_ignore_style(k, language))
        {
            self.msg(MsgKind::UnsupportedLanguage, language)?;
        }
        self.check_fields(&result, CODE_FIELDS)?;
        if let Some(filename) = field_value(&result, "file") {
            match (self.shared.find_file)(&filename) {
                None => self.msg(MsgKind::CannotOpenFile, &filename)?,
                Some(path) => match std::fs::read_to_string(&path) {
                    Err(_) => self.msg(MsgKind::CannotOpenFile, path.as_str())?,
                    Ok(content) => {
                        let mut body = RstNode::new(NodeKind::LiteralBlock);
                        body.add(RstNode::leaf(content));
                        result.children[2] = body;
                    }
                },
            }
        }
        if with_default_language
            && (result.children[1].is_empty_slot() || result.children[1].children.is_empty())
        {
            let mut name = RstNode::new(NodeKind::FieldName);
            name.add(RstNode::leaf("default-language"));
            let mut body = RstNode::new(NodeKind::FieldBody);
            body.add(RstNode::leaf("Nimrod"));
            let mut field = RstNode::new(NodeKind::Field);
            field.add(name);
            field.add(body);
            let mut fields = RstNode::new(NodeKind::FieldList);
            fields.add(field);
            result.children[1] = fields;
        }
        result.kind = NodeKind::CodeBlock;
        Ok(result)
    }

    /// `container`: inline argument and a nested section.
    fn dir_container(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::Inline, false, BodyStyle::Section)?;
        result.kind = NodeKind::Container;
        Ok(result)
    }

    /// `title`: sets the document title.
    fn dir_title(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::Inline, false, BodyStyle::None)?;
        result.kind = NodeKind::Title;
        Ok(result)
    }

    /// `contents`: requests a table of contents.
    fn dir_contents(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::Inline, false, BodyStyle::None)?;
        result.kind = NodeKind::Contents;
        Ok(result)
    }

    /// `index`: an index entry with a nested section. Takes no fields, so
    /// any field present warns.
    fn dir_index(&mut self) -> Result<RstNode, ParseError> {
        let mut result = self.parse_directive(ArgStyle::None, true, BodyStyle::Section)?;
        self.check_fields(&result, &[])?;
        result.kind = NodeKind::Index;
        Ok(result)
    }

    /// `raw`: passthrough content for one output format.
    fn dir_raw(&mut self) -> Result<Option<RstNode>, ParseError> {
        let mut result = self.parse_directive(ArgStyle::Word, true, BodyStyle::None)?;
        self.check_fields(&result, RAW_FIELDS)?;
        if !result.children[0].is_empty_slot() {
            let format = result.children[0].text_content();
            if format.eq_ignore_ascii_case("html") {
                self.dir_raw_aux(result, NodeKind::RawHtml).map(Some)
            } else if format.eq_ignore_ascii_case("latex") {
                self.dir_raw_aux(result, NodeKind::RawLatex).map(Some)
            } else {
                self.msg(MsgKind::InvalidDirective, &format)?;
                Ok(None)
            }
        } else {
            result.kind = NodeKind::Raw;
            if let Some(body) = self.parse_dir_body(BodyStyle::Section)? {
                result.children[2] = body;
            }
            Ok(Some(result))
        }
    }

    /// Finishes a `raw` directive for a known format: either the named
    /// file's contents, or the indented body taken verbatim.
    fn dir_raw_aux(&mut self, result: RstNode, kind: NodeKind) -> Result<RstNode, ParseError> {
        if let Some(filename) = field_value(&result, "file") {
            let Some(path) = (self.shared.find_file)(&filename) else {
                self.msg(MsgKind::CannotOpenFile, &filename)?;
                return Ok(result);
            };
            let Ok(content) = std::fs::read_to_string(&path) else {
                self.msg(MsgKind::CannotOpenFile, path.as_str())?;
                return Ok(result);
            };
            let mut n = RstNode::new(kind);
            n.add(RstNode::leaf(content));
            Ok(n)
        } else {
            let mut result = result;
            result.kind = kind;
            if let Some(body) = self.parse_dir_body(BodyStyle::LiteralBlock)? {
                result.children[2] = body;
            }
            Ok(result)
        }
    }
}
