// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Block-level parsing: paragraphs, lists, headings, tables, literal
//! blocks and field lists.
//!
//! Every list parser follows the same shape: record the marker column,
//! push the content column onto the indent stack, parse each item as a
//! nested section, and keep going while the next line returns to the
//! marker column with the same marker. The indent stack is what makes
//! arbitrary nesting fall out for free.
//!
//! Simple tables are the odd one out: cell boundaries come from the
//! adornment line's column layout, and each collected cell string is
//! re-lexed and re-parsed as a document fragment by a nested parser frame.

use ecow::EcoString;

use crate::ast::{NodeKind, RstNode};
use crate::source_analysis::error::ParseError;
use crate::source_analysis::lexer::tokenize;
use crate::source_analysis::token::TokenKind;

use super::Parser;

impl Parser<'_> {
    // ========================================================================
    // Line-Level Helpers
    // ========================================================================

    /// Parses inline content up to (not including) punctuation that ends
    /// the construct, an adornment, or the end of the line.
    pub(super) fn parse_line(&mut self, father: &mut RstNode) -> Result<(), ParseError> {
        while matches!(
            self.current().kind(),
            TokenKind::White | TokenKind::Word | TokenKind::Other | TokenKind::Punct
        ) {
            self.parse_inline(father)?;
        }
        Ok(())
    }

    /// Parses inline content up to the end of the line.
    pub(super) fn parse_until_newline(&mut self, father: &mut RstNode) -> Result<(), ParseError> {
        while !matches!(self.current().kind(), TokenKind::Eof | TokenKind::Indent) {
            self.parse_inline(father)?;
        }
        Ok(())
    }

    /// Collects the rest of the line into a grouping node.
    pub(super) fn until_eol(&mut self) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Inner);
        self.parse_until_newline(&mut result)?;
        Ok(result)
    }

    // ========================================================================
    // Paragraphs & Literal Blocks
    // ========================================================================

    /// Accumulates paragraph content across lines at the same indentation.
    ///
    /// A trailing `::` followed by a deeper-indented block keeps one `:` as
    /// text and attaches the block as a literal block. Lines classified as
    /// something other than paragraph-like content end the paragraph.
    pub(super) fn parse_paragraph(&mut self, result: &mut RstNode) -> Result<(), ParseError> {
        loop {
            match self.current().kind() {
                TokenKind::Indent => {
                    if self.tok(self.idx + 1).kind() == TokenKind::Indent {
                        // Blank line: paragraph ends.
                        self.idx += 1;
                        break;
                    }
                    if self.current().ival() == self.curr_ind() {
                        self.idx += 1;
                        match self.which_section() {
                            NodeKind::Paragraph
                            | NodeKind::Leaf
                            | NodeKind::Headline
                            | NodeKind::Overline
                            | NodeKind::Directive => result.add(RstNode::leaf(" ")),
                            NodeKind::LineBlock => {
                                let block = self.parse_line_block()?;
                                result.add_opt(block);
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                TokenKind::Punct => {
                    if self.current().symbol() == "::"
                        && self.tok(self.idx + 1).kind() == TokenKind::Indent
                        && self.curr_ind() < self.tok(self.idx + 1).ival()
                    {
                        result.add(RstNode::leaf(":"));
                        self.idx += 1; // skip '::'
                        result.add(self.parse_literal_block());
                        break;
                    }
                    self.parse_inline(result)?;
                }
                TokenKind::White
                | TokenKind::Word
                | TokenKind::Adornment
                | TokenKind::Other => {
                    self.parse_inline(result)?;
                }
                TokenKind::Eof => break,
            }
        }
        Ok(())
    }

    /// Captures an indented block verbatim.
    ///
    /// The first line's indentation is the base; deeper lines keep their
    /// extra indentation as literal spaces. Without an indented block the
    /// rest of the current line is taken.
    pub(super) fn parse_literal_block(&mut self) -> RstNode {
        let mut text = EcoString::new();
        if self.current().kind() == TokenKind::Indent {
            let indent = self.current().ival();
            self.idx += 1;
            loop {
                match self.current().kind() {
                    TokenKind::Eof => break,
                    TokenKind::Indent => {
                        if self.current().ival() < indent {
                            break;
                        }
                        text.push('\n');
                        let extra = usize::try_from(self.current().ival() - indent).unwrap_or(0);
                        for _ in 0..extra {
                            text.push(' ');
                        }
                        self.idx += 1;
                    }
                    _ => {
                        text.push_str(self.current().symbol());
                        self.idx += 1;
                    }
                }
            }
        } else {
            while !matches!(self.current().kind(), TokenKind::Indent | TokenKind::Eof) {
                text.push_str(self.current().symbol());
                self.idx += 1;
            }
        }
        let mut result = RstNode::new(NodeKind::LiteralBlock);
        result.add(RstNode::leaf(text));
        result
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Parses a bullet list. Items repeat while the marker recurs at the
    /// list's column.
    pub(super) fn parse_bullet_list(&mut self) -> Result<Option<RstNode>, ParseError> {
        if self.tok(self.idx + 1).kind() != TokenKind::White {
            return Ok(None);
        }
        let bullet = EcoString::from(self.current().symbol());
        let col = self.current().col();
        let mut result = RstNode::new(NodeKind::BulletList);
        self.push_ind(self.tok(self.idx + 2).col());
        self.idx += 2;
        loop {
            let mut item = RstNode::new(NodeKind::BulletItem);
            self.parse_section(&mut item)?;
            result.add(item);
            if self.current().kind() == TokenKind::Indent
                && self.current().ival() == col
                && self.tok(self.idx + 1).symbol() == bullet.as_str()
                && self.tok(self.idx + 2).kind() == TokenKind::White
            {
                self.idx += 3;
            } else {
                break;
            }
        }
        self.pop_ind();
        Ok(Some(result))
    }

    /// Parses a line block (`| ...` lines).
    pub(super) fn parse_line_block(&mut self) -> Result<Option<RstNode>, ParseError> {
        if self.tok(self.idx + 1).kind() != TokenKind::White {
            return Ok(None);
        }
        let col = self.current().col();
        let mut result = RstNode::new(NodeKind::LineBlock);
        self.push_ind(self.tok(self.idx + 2).col());
        self.idx += 2;
        loop {
            let mut item = RstNode::new(NodeKind::LineBlockItem);
            self.parse_section(&mut item)?;
            result.add(item);
            if self.current().kind() == TokenKind::Indent
                && self.current().ival() == col
                && self.tok(self.idx + 1).symbol() == "|"
                && self.tok(self.idx + 2).kind() == TokenKind::White
            {
                self.idx += 3;
            } else {
                break;
            }
        }
        self.pop_ind();
        Ok(Some(result))
    }

    /// Parses an enumerated list; the enumerator style of the first item
    /// must recur for every further item.
    ///
    /// A lone enumerated line with nothing aligned under it reads as an
    /// ordinary sentence (`1. note` in running text), so the list is only
    /// committed when the next line lines up.
    pub(super) fn parse_enum_list(&mut self) -> Result<Option<RstNode>, ParseError> {
        const WILDCARDS: [&str; 3] = ["(e) ", "e) ", "e. "];
        const WILDPOS: [usize; 3] = [1, 0, 0];
        let Some(w) = WILDCARDS
            .iter()
            .position(|pattern| self.pattern_match(self.idx, pattern))
        else {
            return Ok(None);
        };
        let col = self.current().col();
        self.idx += WILDPOS[w] + 3;
        let j = self.token_after_newline();
        if self.tok(j).col() != self.current().col() && !self.pattern_match(j, WILDCARDS[w]) {
            self.idx -= WILDPOS[w] + 3;
            return Ok(None);
        }
        let mut result = RstNode::new(NodeKind::EnumList);
        self.push_ind(self.current().col());
        loop {
            let mut item = RstNode::new(NodeKind::EnumItem);
            self.parse_section(&mut item)?;
            result.add(item);
            if self.current().kind() == TokenKind::Indent
                && self.current().ival() == col
                && self.pattern_match(self.idx + 1, WILDCARDS[w])
            {
                self.idx += WILDPOS[w] + 4;
            } else {
                break;
            }
        }
        self.pop_ind();
        Ok(Some(result))
    }

    /// Parses a definition list: term lines with deeper-indented bodies.
    pub(super) fn parse_definition_list(&mut self) -> Result<Option<RstNode>, ParseError> {
        let j = self.token_after_newline().saturating_sub(1);
        if j < 1
            || self.tok(j).kind() != TokenKind::Indent
            || self.tok(j).ival() <= self.curr_ind()
            || self.tok(j - 1).symbol() == "::"
        {
            return Ok(None);
        }
        let col = self.current().col();
        let mut result = RstNode::new(NodeKind::DefList);
        loop {
            let mut name = RstNode::new(NodeKind::DefName);
            self.parse_line(&mut name)?;
            if self.current().kind() == TokenKind::Indent
                && self.current().ival() > self.curr_ind()
                && self.tok(self.idx + 1).symbol() != "::"
                && !matches!(
                    self.tok(self.idx + 1).kind(),
                    TokenKind::Indent | TokenKind::Eof
                )
            {
                let ival = self.current().ival();
                self.push_ind(ival);
                let mut body = RstNode::new(NodeKind::DefBody);
                self.parse_section(&mut body)?;
                self.pop_ind();
                let mut item = RstNode::new(NodeKind::DefItem);
                item.add(name);
                item.add(body);
                result.add(item);
            } else {
                break;
            }
            if self.current().kind() == TokenKind::Indent && self.current().ival() == col {
                self.idx += 1;
                let j = self.token_after_newline().saturating_sub(1);
                let continues = j >= 1
                    && self.tok(j).kind() == TokenKind::Indent
                    && self.tok(j).ival() > 0
                    && self.tok(j - 1).symbol() != "::"
                    && self.tok(j + 1).symbol() != "::";
                if !continues {
                    break;
                }
            } else {
                break;
            }
        }
        if result.children.is_empty() {
            return Ok(None);
        }
        Ok(Some(result))
    }

    /// Parses an option list: option groups with aligned descriptions.
    pub(super) fn parse_option_list(&mut self) -> Result<Option<RstNode>, ParseError> {
        let mut result = RstNode::new(NodeKind::OptionList);
        loop {
            if !self.is_option_list() {
                break;
            }
            let mut group = RstNode::new(NodeKind::OptionGroup);
            let mut description = RstNode::new(NodeKind::Description);
            if self.pattern_match(self.idx, "//w") {
                self.idx += 1;
            }
            while !matches!(self.current().kind(), TokenKind::Indent | TokenKind::Eof) {
                if self.current().kind() == TokenKind::White && self.current().symbol().len() > 1 {
                    self.idx += 1;
                    break;
                }
                group.add(self.new_leaf());
                self.idx += 1;
            }
            let j = self.token_after_newline();
            if j > 0
                && self.tok(j - 1).kind() == TokenKind::Indent
                && self.tok(j - 1).ival() > self.curr_ind()
            {
                let ival = self.tok(j - 1).ival();
                self.push_ind(ival);
                self.parse_section(&mut description)?;
                self.pop_ind();
            } else {
                self.parse_line(&mut description)?;
            }
            if self.current().kind() == TokenKind::Indent {
                self.idx += 1;
            }
            let mut item = RstNode::new(NodeKind::OptionListItem);
            item.add(group);
            item.add(description);
            result.add(item);
        }
        Ok(Some(result))
    }

    // ========================================================================
    // Headings & Transitions
    // ========================================================================

    /// Parses a text line followed by its adornment underline.
    ///
    /// Classification saw the underline on the next line, but inline
    /// markup in the title can legally consume past it (an emphasis span
    /// closing on a later line), so the underline is re-checked before it
    /// is taken.
    pub(super) fn parse_headline(&mut self) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Headline);
        self.parse_until_newline(&mut result)?;
        let c = if self.current().kind() == TokenKind::Indent
            && self.tok(self.idx + 1).kind() == TokenKind::Adornment
        {
            let c = self.tok(self.idx + 1).first_char().unwrap_or('\0');
            self.idx += 2;
            c
        } else {
            '\0'
        };
        let shared = &mut *self.shared;
        result.level = shared
            .underline_to_level
            .assign(&mut shared.underline_level, c as u8);
        Ok(result)
    }

    /// Parses an overline heading: adornment, text (possibly spanning
    /// deeper-indented lines), optional trailing adornment.
    ///
    /// The trailing adornment and one following newline are consumed when
    /// present but their absence is tolerated.
    pub(super) fn parse_overline(&mut self) -> Result<RstNode, ParseError> {
        let c = self.current().first_char().unwrap_or('\0');
        self.idx += 2;
        let mut result = RstNode::new(NodeKind::Overline);
        loop {
            self.parse_until_newline(&mut result)?;
            if self.current().kind() == TokenKind::Indent {
                self.idx += 1;
                if self.tok(self.idx - 1).ival() > self.curr_ind() {
                    result.add(RstNode::leaf(" "));
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        let shared = &mut *self.shared;
        result.level = shared
            .overline_to_level
            .assign(&mut shared.overline_level, c as u8);
        if self.current().kind() == TokenKind::Adornment {
            self.idx += 1;
            if self.current().kind() == TokenKind::Indent {
                self.idx += 1;
            }
        }
        Ok(result)
    }

    /// Consumes a standalone adornment line as a transition.
    pub(super) fn parse_transition(&mut self) -> RstNode {
        let result = RstNode::new(NodeKind::Transition);
        self.idx += 1;
        if self.current().kind() == TokenKind::Indent {
            self.idx += 1;
        }
        if self.current().kind() == TokenKind::Indent {
            self.idx += 1;
        }
        result
    }

    // ========================================================================
    // Simple Tables
    // ========================================================================

    /// Returns the last column of the current token.
    fn tok_end(&self) -> i32 {
        let tok = self.current();
        tok.col() + i32::try_from(tok.symbol().len()).unwrap_or(i32::MAX) - 1
    }

    /// Reads column boundaries from an adornment line. Each column extends
    /// to the end of its adornment run; the last column is unbounded.
    fn get_columns(&mut self, cols: &mut Vec<i32>) {
        cols.clear();
        loop {
            cols.push(self.tok_end());
            self.idx += 1;
            if self.current().kind() != TokenKind::White {
                break;
            }
            self.idx += 1;
            if self.current().kind() != TokenKind::Adornment {
                break;
            }
        }
        if self.current().kind() == TokenKind::Indent {
            self.idx += 1;
        }
        if let Some(last) = cols.last_mut() {
            *last = 32_000;
        }
    }

    /// Parses a simple table. Rows are split into cell strings by the
    /// column layout (multi-line cells joined with newlines) and each cell
    /// is re-parsed as a document fragment. A second adornment line turns
    /// the first row into header cells.
    pub(super) fn parse_simple_table(&mut self) -> Result<RstNode, ParseError> {
        let mut cols: Vec<i32> = Vec::new();
        let mut row: Vec<String> = Vec::new();
        let mut result = RstNode::new(NodeKind::Table);
        loop {
            if self.current().kind() == TokenKind::Adornment {
                let last = self.token_after_newline();
                if matches!(self.tok(last).kind(), TokenKind::Eof | TokenKind::Indent) {
                    // The closing adornment line.
                    self.idx = last;
                    break;
                }
                self.get_columns(&mut cols);
                row = vec![String::new(); cols.len()];
                // A second adornment line marks everything above as header.
                if let Some(prev_row) = result.children.last_mut() {
                    for cell in &mut prev_row.children {
                        cell.kind = NodeKind::TableHeaderCell;
                    }
                }
            }
            if self.current().kind() == TokenKind::Eof {
                break;
            }
            for cell in &mut row {
                cell.clear();
            }
            let line = self.current().line();
            // A cell may span multiple source lines.
            loop {
                let mut i = 0;
                while !matches!(self.current().kind(), TokenKind::Indent | TokenKind::Eof) {
                    let limit = cols.get(i).copied().unwrap_or(32_000);
                    if self.tok_end() <= limit || i + 1 >= cols.len() {
                        if let Some(cell) = row.get_mut(i) {
                            cell.push_str(self.current().symbol());
                        }
                        self.idx += 1;
                    } else {
                        if self.current().kind() == TokenKind::White {
                            self.idx += 1;
                        }
                        i += 1;
                    }
                }
                if self.current().kind() == TokenKind::Indent {
                    self.idx += 1;
                }
                if self.tok_end() <= cols.first().copied().unwrap_or(0) {
                    break;
                }
                if matches!(
                    self.current().kind(),
                    TokenKind::Eof | TokenKind::Adornment
                ) {
                    break;
                }
                for cell in row.iter_mut().skip(1) {
                    cell.push('\n');
                }
            }
            let mut row_node = RstNode::new(NodeKind::TableRow);
            for (j, cell_text) in row.iter().enumerate() {
                let fragment = {
                    let mut nested = Parser::new(&mut *self.shared);
                    nested.filename = self.filename.clone();
                    nested.line = line - 1;
                    nested.col = cols.get(j).copied().unwrap_or(0);
                    nested.col += tokenize(cell_text, false, &mut nested.tokens);
                    nested.parse_doc()?
                };
                let mut cell = RstNode::new(NodeKind::TableDataCell);
                cell.add(fragment);
                row_node.add(cell);
            }
            result.add(row_node);
        }
        Ok(result)
    }

    // ========================================================================
    // Field Lists
    // ========================================================================

    /// Parses consecutive `:name: body` fields at one column.
    pub(super) fn parse_fields(&mut self) -> Result<RstNode, ParseError> {
        let at_start = self.idx == 0 && self.tok(0).symbol() == ":";
        let col = if at_start {
            self.current().col()
        } else {
            self.current().ival()
        };
        let mut result = RstNode::new(NodeKind::FieldList);
        if !at_start {
            self.idx += 1;
        }
        loop {
            result.add(self.parse_field()?);
            if self.current().kind() == TokenKind::Indent
                && self.current().ival() == col
                && self.tok(self.idx + 1).symbol() == ":"
            {
                self.idx += 1;
            } else {
                break;
            }
        }
        Ok(result)
    }

    /// Parses one field: inline name up to the closing `:`, rest of the
    /// line, and an optional deeper-indented body section.
    fn parse_field(&mut self) -> Result<RstNode, ParseError> {
        let mut result = RstNode::new(NodeKind::Field);
        let col = self.current().col();
        let mut name = RstNode::new(NodeKind::FieldName);
        self.parse_until(&mut name, ":", false)?;
        let mut body = RstNode::new(NodeKind::FieldBody);
        if self.current().kind() != TokenKind::Indent {
            self.parse_line(&mut body)?;
        }
        if self.current().kind() == TokenKind::Indent {
            let indent = self.current().ival();
            if indent > col {
                self.push_ind(indent);
                self.parse_section(&mut body)?;
                self.pop_ind();
            }
        }
        result.add(name);
        result.add(body);
        Ok(result)
    }
}
