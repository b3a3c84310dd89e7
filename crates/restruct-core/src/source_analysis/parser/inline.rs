// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Inline markup recognition.
//!
//! RST decides whether a punctuation run opens or closes markup from its
//! neighborhood, not from pairing. The rules, keeping reStructuredText's
//! own numbering:
//!
//! 1. A start marker must be preceded by start of line, whitespace, or an
//!    opening character (`' " ( [ { < - / : _`)
//! 2. A start marker must not be followed by whitespace or end of input
//! 3. An end marker must not be preceded by whitespace
//! 4. An end marker must be followed by end of line or a closing character
//!    (`' " ) ] } > - / \ : . , ; ! ? _`)
//! 5. A start marker must not be preceded by a backslash
//! 7. If a start marker is preceded by an opening bracket or quote, it must
//!    not be immediately followed by the matching closer; and an end marker
//!    (except `` `` ``) must not be preceded by a backslash
//!
//! (Rule 6, about nested markup of the same kind, falls out of the
//! recursive structure and needs no separate check.)
//!
//! Besides emphasis and literals this module recognizes standalone URLs,
//! trailing-underscore references, substitution references, smileys, the
//! postfix forms of interpreted text (roles and embedded hyperlink
//! targets), and optionally fenced Markdown code blocks.

use ecow::EcoString;

use crate::ast::{NodeKind, RstNode};
use crate::source_analysis::error::{MsgKind, ParseError};
use crate::source_analysis::token::TokenKind;

use super::Parser;

/// Characters that may precede an inline start marker (rule 1).
const OPENERS: &[char] = &['\'', '"', '(', '[', '{', '<', '-', '/', ':', '_'];

/// Characters that may follow an inline end marker (rule 4).
const CLOSERS: &[char] = &[
    '\'', '"', ')', ']', '}', '>', '-', '/', '\\', ':', '.', ',', ';', '!', '?', '_',
];

/// Characters a smiley can start with.
const SMILEY_START: &[char] = &[':', ';', '8'];

/// The smiley table: source spelling → icon name.
///
/// Matched as verbatim token sequences, tried in table order with the
/// first complete match winning. A spelling that extends another one with
/// further punctuation must therefore come first (`:?:` before `:?`,
/// which tokenize as separate one-character runs); word-extended
/// spellings like `:oops:` next to `:o` need no special order because the
/// word lexes as one indivisible token.
const SMILIES: &[(&str, &str)] = &[
    (":D", "icon_e_biggrin"),
    (":-D", "icon_e_biggrin"),
    (":)", "icon_e_smile"),
    (":-)", "icon_e_smile"),
    (";)", "icon_e_wink"),
    (";-)", "icon_e_wink"),
    (":(", "icon_e_sad"),
    (":-(", "icon_e_sad"),
    (":o", "icon_e_surprised"),
    (":-o", "icon_e_surprised"),
    (":shock:", "icon_eek"),
    (":?:", "icon_question"),
    (":?", "icon_e_confused"),
    (":-?", "icon_e_confused"),
    (":-/", "icon_e_confused"),
    ("8-)", "icon_cool"),
    (":lol:", "icon_lol"),
    (":x", "icon_mad"),
    (":-x", "icon_mad"),
    (":P", "icon_razz"),
    (":-P", "icon_razz"),
    (":oops:", "icon_redface"),
    (":cry:", "icon_cry"),
    (":evil:", "icon_evil"),
    (":twisted:", "icon_twisted_evil"),
    (":roll:", "icon_rolleyes"),
    (":!:", "icon_exclaim"),
    (":idea:", "icon_idea"),
    (":arrow:", "icon_arrow"),
    (":|", "icon_neutral"),
    (":-|", "icon_neutral"),
    (":mrgreen:", "icon_mrgreen"),
];

impl Parser<'_> {
    /// Checks whether the current token starts inline markup `markup`.
    pub(super) fn is_inline_markup_start(&self, markup: &str) -> bool {
        if self.current().symbol() != markup {
            return false;
        }
        // Rule 1: allowed predecessor.
        if self.idx > 0 {
            let prev = self.tok(self.idx - 1);
            let ok = matches!(prev.kind(), TokenKind::Indent | TokenKind::White)
                || prev.first_char().is_some_and(|c| OPENERS.contains(&c));
            if !ok {
                return false;
            }
        }
        // Rule 2: not followed by line end.
        if self.tok(self.idx + 1).is_line_end() {
            return false;
        }
        // Rule 5: not escaped.
        if self.idx > 0 && self.tok(self.idx - 1).symbol() == "\\" {
            return false;
        }
        // Rule 7: an opening bracket or quote before the marker must not be
        // closed immediately after it.
        if self.idx > 0 {
            let closer = match self.tok(self.idx - 1).first_char() {
                Some(c @ ('\'' | '"')) => Some(c),
                Some('(') => Some(')'),
                Some('[') => Some(']'),
                Some('{') => Some('}'),
                Some('<') => Some('>'),
                _ => None,
            };
            if let Some(closer) = closer {
                if self.tok(self.idx + 1).first_char() == Some(closer) {
                    return false;
                }
            }
        }
        true
    }

    /// Checks whether the current token ends inline markup `markup`.
    pub(super) fn is_inline_markup_end(&self, markup: &str) -> bool {
        self.is_inline_markup_end_at(self.idx, markup)
    }

    /// Checks whether the token at `at` ends inline markup `markup`.
    pub(super) fn is_inline_markup_end_at(&self, at: usize, markup: &str) -> bool {
        if self.tok(at).symbol() != markup || at == 0 {
            return false;
        }
        // Rule 3: not preceded by line whitespace.
        let prev = self.tok(at - 1);
        if matches!(prev.kind(), TokenKind::Indent | TokenKind::White) {
            return false;
        }
        // Rule 4: followed by line end or a closing character.
        let next = self.tok(at + 1);
        if !next.is_line_end() && !next.first_char().is_some_and(|c| CLOSERS.contains(&c)) {
            return false;
        }
        // Rule 7: backslash blocks everything except inline literals.
        if markup != "``" && prev.symbol() == "\\" {
            return false;
        }
        true
    }

    /// Parses one inline element into `father`.
    ///
    /// At punctuation the markup kinds are tried longest first, so `***`
    /// wins over `**` wins over `*`. Everything unrecognized degrades to a
    /// text leaf.
    pub(super) fn parse_inline(&mut self, father: &mut RstNode) -> Result<(), ParseError> {
        match self.current().kind() {
            TokenKind::Punct => {
                if self.is_inline_markup_start("***") {
                    let mut n = RstNode::new(NodeKind::TripleEmphasis);
                    self.parse_until(&mut n, "***", true)?;
                    father.add(n);
                } else if self.is_inline_markup_start("**") {
                    let mut n = RstNode::new(NodeKind::StrongEmphasis);
                    self.parse_until(&mut n, "**", true)?;
                    father.add(n);
                } else if self.is_inline_markup_start("*") {
                    let mut n = RstNode::new(NodeKind::Emphasis);
                    self.parse_until(&mut n, "*", true)?;
                    father.add(n);
                } else if self.shared.options.support_markdown && self.current().symbol() == "```"
                {
                    self.idx += 1;
                    let n = self.parse_markdown_code_block()?;
                    father.add(n);
                } else if self.is_inline_markup_start("``") {
                    let mut n = RstNode::new(NodeKind::InlineLiteral);
                    self.parse_until(&mut n, "``", false)?;
                    father.add(n);
                } else if self.is_inline_markup_start("`") {
                    let mut n = RstNode::new(NodeKind::InterpretedText);
                    self.parse_until(&mut n, "`", true)?;
                    let n = self.parse_postfix(n)?;
                    father.add(n);
                } else if self.is_inline_markup_start("|") {
                    let mut n = RstNode::new(NodeKind::SubstitutionReferences);
                    self.parse_until(&mut n, "|", false)?;
                    father.add(n);
                } else {
                    if self.shared.options.support_smileys {
                        if let Some(n) = self.parse_smiley() {
                            father.add(n);
                            return Ok(());
                        }
                    }
                    self.parse_backslash(father);
                }
            }
            TokenKind::Word => {
                if self.shared.options.support_smileys {
                    if let Some(n) = self.parse_smiley() {
                        father.add(n);
                        return Ok(());
                    }
                }
                if self.is_url(self.idx) {
                    self.parse_url(father);
                } else {
                    self.parse_word_or_ref(father);
                }
            }
            TokenKind::Adornment | TokenKind::Other | TokenKind::White => {
                if self.shared.options.support_smileys {
                    if let Some(n) = self.parse_smiley() {
                        father.add(n);
                        return Ok(());
                    }
                }
                father.add(self.new_leaf());
                self.idx += 1;
            }
            TokenKind::Indent | TokenKind::Eof => {}
        }
        Ok(())
    }

    /// Collects inline children into `father` until the end marker.
    ///
    /// Newlines and whitespace collapse to single spaces. A blank line or
    /// end of input before the marker is an `expected` error reported at
    /// the construct's start position.
    pub(super) fn parse_until(
        &mut self,
        father: &mut RstNode,
        postfix: &str,
        interpret_backslash: bool,
    ) -> Result<(), ParseError> {
        let line = self.current().line();
        let col = self.current().col();
        self.idx += 1;
        loop {
            match self.current().kind() {
                TokenKind::Punct => {
                    if self.is_inline_markup_end(postfix) {
                        self.idx += 1;
                        break;
                    }
                    if interpret_backslash {
                        self.parse_backslash(father);
                    } else {
                        father.add(self.new_leaf());
                        self.idx += 1;
                    }
                }
                TokenKind::Adornment | TokenKind::Word | TokenKind::Other => {
                    father.add(self.new_leaf());
                    self.idx += 1;
                }
                TokenKind::White => {
                    father.add(RstNode::leaf(" "));
                    self.idx += 1;
                }
                TokenKind::Indent => {
                    father.add(RstNode::leaf(" "));
                    self.idx += 1;
                    if self.current().kind() == TokenKind::Indent {
                        self.msg_at(line, col, MsgKind::Expected, postfix)?;
                        break;
                    }
                }
                TokenKind::Eof => {
                    self.msg_at(line, col, MsgKind::Expected, postfix)?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Handles backslash escapes: `\\` is a literal backslash, `\x` is a
    /// literal `x`, a lone trailing `\` disappears.
    pub(super) fn parse_backslash(&mut self, father: &mut RstNode) {
        match self.current().symbol() {
            "\\\\" => {
                father.add(RstNode::leaf("\\"));
                self.idx += 1;
            }
            "\\" => {
                self.idx += 1;
                if self.current().kind() != TokenKind::White {
                    father.add(self.new_leaf());
                }
                if self.current().kind() != TokenKind::Eof {
                    self.idx += 1;
                }
            }
            _ => {
                father.add(self.new_leaf());
                self.idx += 1;
            }
        }
    }

    /// Recognizes `scheme://host...` at token `i`.
    pub(super) fn is_url(&self, i: usize) -> bool {
        self.tok(i + 1).symbol() == ":"
            && self.tok(i + 2).symbol() == "//"
            && self.tok(i + 3).kind() == TokenKind::Word
            && matches!(
                self.tok(i).symbol(),
                "http" | "https" | "ftp" | "telnet" | "file"
            )
    }

    /// Consumes a URL into a standalone hyperlink node.
    ///
    /// Punctuation is included while something other than whitespace
    /// follows it, so `x.y/z` stays together but a sentence-final period
    /// does not join the URL.
    fn parse_url(&mut self, father: &mut RstNode) {
        let mut n = RstNode::new(NodeKind::StandaloneHyperlink);
        loop {
            match self.current().kind() {
                TokenKind::Word | TokenKind::Adornment | TokenKind::Other => {}
                TokenKind::Punct => {
                    if !matches!(
                        self.tok(self.idx + 1).kind(),
                        TokenKind::Word
                            | TokenKind::Adornment
                            | TokenKind::Other
                            | TokenKind::Punct
                    ) {
                        break;
                    }
                }
                _ => break,
            }
            n.add(self.new_leaf());
            self.idx += 1;
        }
        father.add(n);
    }

    /// Emits a word, or a reference when a trailing `_` closes it
    /// (`label_` resolves against the reference table in the post-pass).
    fn parse_word_or_ref(&mut self, father: &mut RstNode) {
        let leaf = self.new_leaf();
        self.idx += 1;
        if self.current().symbol() == "_" && self.is_inline_markup_end_at(self.idx, "_") {
            let mut r = RstNode::new(NodeKind::Ref);
            r.add(leaf);
            father.add(r);
            self.idx += 1;
        } else {
            father.add(leaf);
        }
    }

    /// Tries to match a smiley at the current position.
    ///
    /// Smileys are matched as verbatim token sequences: the accumulated
    /// token text must equal the smiley spelling exactly, with no token
    /// crossing the spelling's end.
    fn parse_smiley(&mut self) -> Option<RstNode> {
        let first = self.current().first_char()?;
        if !SMILEY_START.contains(&first) {
            return None;
        }
        'keys: for &(key, icon) in SMILIES {
            let mut matched = 0;
            let mut j = self.idx;
            while matched < key.len() {
                let tok = self.tok(j);
                if tok.is_line_end() {
                    continue 'keys;
                }
                let rest = &key[matched..];
                if !rest.starts_with(tok.symbol()) {
                    continue 'keys;
                }
                matched += tok.symbol().len();
                j += 1;
            }
            self.idx = j;
            return Some(RstNode::with_text(NodeKind::Smiley, icon));
        }
        None
    }

    /// Applies postfix syntax after interpreted text: a trailing `_` turns
    /// it into a reference (or extracts an embedded hyperlink target), a
    /// `:role:` suffix retags or wraps it.
    fn parse_postfix(&mut self, n: RstNode) -> Result<RstNode, ParseError> {
        let mut n = n;
        if self.is_inline_markup_end("_") {
            self.idx += 1;
            if self.idx >= 3
                && self.tok(self.idx - 2).symbol() == "`"
                && self.tok(self.idx - 3).symbol() == ">"
            {
                // `label <target>`_
                let mut label = RstNode::new(NodeKind::Inner);
                let mut target = RstNode::new(NodeKind::Inner);
                split_embedded_ref(&n, &mut label, &mut target);
                if label.children.is_empty() {
                    let mut result = RstNode::new(NodeKind::StandaloneHyperlink);
                    result.add(target);
                    return Ok(result);
                }
                let key: EcoString = label.to_refname().into();
                let mut result = RstNode::new(NodeKind::Hyperlink);
                result.add(label);
                result.add(target.clone());
                self.set_ref(key, target)?;
                return Ok(result);
            }
            if n.kind == NodeKind::InterpretedText {
                n.kind = NodeKind::Ref;
            }
        } else if self.pattern_match(self.idx, ":w:") {
            let role = EcoString::from(self.tok(self.idx + 1).symbol());
            match role.as_str() {
                "idx" => n.kind = NodeKind::Idx,
                "literal" => n.kind = NodeKind::InlineLiteral,
                "strong" => n.kind = NodeKind::StrongEmphasis,
                "emphasis" => n.kind = NodeKind::Emphasis,
                "sub" | "subscript" => n.kind = NodeKind::Sub,
                "sup" | "supscript" => n.kind = NodeKind::Sup,
                _ => {
                    let mut general = RstNode::new(NodeKind::GeneralRole);
                    n.kind = NodeKind::Inner;
                    general.add(n);
                    general.add(RstNode::leaf(role));
                    n = general;
                }
            }
            self.idx += 3;
        }
        Ok(n)
    }

    /// Parses the remainder of a fenced code block after the opening fence
    /// has been consumed: an optional language word, verbatim text, the
    /// closing fence.
    fn parse_markdown_code_block(&mut self) -> Result<RstNode, ParseError> {
        let args = if self.current().kind() == TokenKind::Word {
            let mut a = RstNode::new(NodeKind::DirArg);
            a.add(self.new_leaf());
            self.idx += 1;
            Some(a)
        } else {
            None
        };
        let mut text = EcoString::new();
        loop {
            match self.current().kind() {
                TokenKind::Eof => {
                    self.msg(MsgKind::Expected, "```")?;
                    break;
                }
                TokenKind::Punct if self.current().symbol() == "```" => {
                    self.idx += 1;
                    break;
                }
                _ => {
                    text.push_str(self.current().symbol());
                    self.idx += 1;
                }
            }
        }
        let mut body = RstNode::new(NodeKind::LiteralBlock);
        body.add(RstNode::leaf(text));
        let mut result = RstNode::new(NodeKind::CodeBlock);
        result.add_slot(args);
        result.add_slot(None);
        result.add(body);
        Ok(result)
    }
}

/// Splits the children of an interpreted-text node at the last `<` into
/// label and target, dropping the space before the `<` and the closing `>`.
fn split_embedded_ref(n: &RstNode, label: &mut RstNode, target: &mut RstNode) {
    let len = n.children.len() as isize;
    let mut sep: isize = -1;
    let mut i = len - 2;
    while i >= 0 {
        if n.children[i as usize].text == "<" {
            sep = i;
            break;
        }
        i -= 1;
    }
    let incr: isize = if sep > 0 && n.children[(sep - 1) as usize].text.starts_with(' ') {
        2
    } else {
        1
    };
    let mut i = 0;
    while i <= sep - incr {
        label.add(n.children[i as usize].clone());
        i += 1;
    }
    let mut i = sep + 1;
    while i <= len - 2 {
        if i >= 0 {
            target.add(n.children[i as usize].clone());
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::super::rst_parse;
    use crate::ast::{NodeKind, RstNode};
    use crate::source_analysis::state::ParseOptions;

    fn parse_with(text: &str, options: ParseOptions) -> RstNode {
        rst_parse(
            text,
            "test.rst",
            1,
            0,
            options,
            Some(Box::new(|_| None)),
            Some(Box::new(|_| {})),
        )
        .map(|(ast, _)| ast)
        .expect("parse failed")
    }

    fn parse(text: &str) -> RstNode {
        parse_with(text, ParseOptions::new())
    }

    fn find_kind(node: &RstNode, kind: NodeKind) -> Option<&RstNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|c| find_kind(c, kind))
    }

    #[test]
    fn strong_and_triple_emphasis() {
        let ast = parse("**bold** and ***loud***");
        assert!(find_kind(&ast, NodeKind::StrongEmphasis).is_some());
        assert!(find_kind(&ast, NodeKind::TripleEmphasis).is_some());
        assert_eq!(
            find_kind(&ast, NodeKind::TripleEmphasis)
                .map(RstNode::text_content),
            Some("loud".to_string())
        );
    }

    #[test]
    fn rule1_rejects_start_after_word() {
        // `*` straight after a word character cannot open emphasis.
        let ast = parse("x*y*");
        assert!(find_kind(&ast, NodeKind::Emphasis).is_none());
        assert_eq!(ast.text_content(), "x*y*");
    }

    #[test]
    fn rule2_rejects_start_before_whitespace() {
        let ast = parse("a * b");
        assert!(find_kind(&ast, NodeKind::Emphasis).is_none());
    }

    #[test]
    fn rule7_rejects_matching_closer() {
        // `(` before the marker with `)` right after it: not a start.
        let ast = parse("(*)");
        assert!(find_kind(&ast, NodeKind::Emphasis).is_none());
        assert_eq!(ast.text_content(), "(*)");
    }

    #[test]
    fn rule5_backslash_blocks_start() {
        let ast = parse("a \\*not* b");
        assert!(find_kind(&ast, NodeKind::Emphasis).is_none());
    }

    #[test]
    fn inline_literal_keeps_backslashes() {
        let ast = parse("``a\\b``");
        let lit = find_kind(&ast, NodeKind::InlineLiteral).expect("literal");
        assert_eq!(lit.text_content(), "a\\b");
    }

    #[test]
    fn emphasis_spans_lines_as_single_space() {
        let ast = parse("*two\nwords*");
        let em = find_kind(&ast, NodeKind::Emphasis).expect("emphasis");
        assert_eq!(em.text_content(), "two words");
    }

    #[test]
    fn unterminated_emphasis_is_expected_error() {
        let err = rst_parse(
            "*oops\n\n",
            "test.rst",
            1,
            0,
            ParseOptions::new(),
            Some(Box::new(|_| None)),
            Some(Box::new(|_| {})),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "test.rst(1, 0) Error: '*' expected"
        );
    }

    #[test]
    fn interpreted_text_without_postfix() {
        let ast = parse("`plain`");
        assert!(find_kind(&ast, NodeKind::InterpretedText).is_some());
    }

    #[test]
    fn interpreted_text_with_underscore_is_ref() {
        let ast = parse("`some label`_ x");
        let r = find_kind(&ast, NodeKind::Ref).expect("ref");
        assert_eq!(r.text_content(), "some label");
    }

    #[test]
    fn word_with_trailing_underscore_is_ref() {
        let ast = parse("see label_.");
        let r = find_kind(&ast, NodeKind::Ref).expect("ref");
        assert_eq!(r.text_content(), "label");
    }

    #[test]
    fn snake_case_is_not_a_ref() {
        let ast = parse("foo_bar");
        assert!(find_kind(&ast, NodeKind::Ref).is_none());
        assert_eq!(ast.text_content(), "foo_bar");
    }

    #[test]
    fn known_roles_retag() {
        let ast = parse("`x`:strong: and `y`:sub: and `z`:idx:");
        assert!(find_kind(&ast, NodeKind::StrongEmphasis).is_some());
        assert!(find_kind(&ast, NodeKind::Sub).is_some());
        assert!(find_kind(&ast, NodeKind::Idx).is_some());
    }

    #[test]
    fn unknown_role_wraps_in_general_role() {
        let ast = parse("`x`:fancy:");
        let role = find_kind(&ast, NodeKind::GeneralRole).expect("role");
        assert_eq!(role.children.len(), 2);
        assert_eq!(role.child_kind(0), Some(NodeKind::Inner));
        assert_eq!(role.children[1].text, "fancy");
    }

    #[test]
    fn embedded_hyperlink_target() {
        let ast = parse("`Nim <http://nim-lang.org>`_");
        let link = find_kind(&ast, NodeKind::Hyperlink).expect("hyperlink");
        assert_eq!(link.children[0].text_content(), "Nim");
        assert_eq!(link.children[1].text_content(), "http://nim-lang.org");
    }

    #[test]
    fn embedded_target_without_label_is_standalone() {
        let ast = parse("`<http://x.y>`_");
        let link = find_kind(&ast, NodeKind::StandaloneHyperlink).expect("standalone");
        assert_eq!(link.text_content(), "http://x.y");
    }

    #[test]
    fn bare_url_is_standalone_hyperlink() {
        let ast = parse("see http://x.y/path now");
        let link = find_kind(&ast, NodeKind::StandaloneHyperlink).expect("url");
        assert_eq!(link.text_content(), "http://x.y/path");
    }

    #[test]
    fn sentence_final_period_not_part_of_url() {
        let ast = parse("go to https://nim-lang.org.");
        let link = find_kind(&ast, NodeKind::StandaloneHyperlink).expect("url");
        assert_eq!(link.text_content(), "https://nim-lang.org");
    }

    #[test]
    fn substitution_reference_node() {
        let ast = parse(".. |version| replace:: 1.0\n\nuses |version|\n");
        // Resolved in the post-pass; the raw node is gone.
        assert!(find_kind(&ast, NodeKind::SubstitutionReferences).is_none());
        assert!(ast.text_content().contains("1.0"));
    }

    #[test]
    fn backslash_escapes() {
        let ast = parse("a\\*b and c\\\\d");
        assert!(find_kind(&ast, NodeKind::Emphasis).is_none());
        let text = ast.text_content();
        assert!(text.contains("a*b"));
        assert!(text.contains("c\\d"));
    }

    #[test]
    fn smileys_disabled_by_default() {
        let ast = parse("hi :-)");
        assert!(find_kind(&ast, NodeKind::Smiley).is_none());
    }

    #[test]
    fn smileys_recognized_when_enabled() {
        let options = ParseOptions::new().with_smileys(true);
        let ast = parse_with("hi :-)", options);
        let smiley = find_kind(&ast, NodeKind::Smiley).expect("smiley");
        assert_eq!(smiley.text, "icon_e_smile");
    }

    #[test]
    fn named_smiley_with_colons() {
        let options = ParseOptions::new().with_smileys(true);
        let ast = parse_with("well :roll: then", options);
        let smiley = find_kind(&ast, NodeKind::Smiley).expect("smiley");
        assert_eq!(smiley.text, "icon_rolleyes");
    }

    #[test]
    fn punctuation_wrapped_smiley_prefers_long_spelling() {
        // `:?:` is three one-character punctuation tokens; the table must
        // try it before its prefix `:?`.
        let options = ParseOptions::new().with_smileys(true);
        let ast = parse_with("so :?: indeed", options);
        let smiley = find_kind(&ast, NodeKind::Smiley).expect("smiley");
        assert_eq!(smiley.text, "icon_question");
    }

    #[test]
    fn short_confused_smiley_still_matches() {
        let options = ParseOptions::new().with_smileys(true);
        let ast = parse_with("eh :? then", options);
        let smiley = find_kind(&ast, NodeKind::Smiley).expect("smiley");
        assert_eq!(smiley.text, "icon_e_confused");
    }

    #[test]
    fn partial_smiley_stays_text() {
        let options = ParseOptions::new().with_smileys(true);
        let ast = parse_with(":nonsense", options);
        assert!(find_kind(&ast, NodeKind::Smiley).is_none());
    }

    #[test]
    fn markdown_fence_disabled_by_default() {
        let ast = parse("```\ncode\n```");
        assert!(find_kind(&ast, NodeKind::CodeBlock).is_none());
    }

    #[test]
    fn markdown_fence_with_language() {
        let options = ParseOptions::new().with_markdown(true);
        let ast = parse_with("```nim\necho x\n```", options);
        let code = find_kind(&ast, NodeKind::CodeBlock).expect("code block");
        assert_eq!(code.children[0].kind, NodeKind::DirArg);
        assert_eq!(code.children[0].text_content(), "nim");
        assert!(code.children[1].is_empty_slot());
        let body = &code.children[2];
        assert_eq!(body.kind, NodeKind::LiteralBlock);
        assert_eq!(body.text_content(), "\necho x\n");
    }

    #[test]
    fn markdown_fence_without_language() {
        let options = ParseOptions::new().with_markdown(true);
        let ast = parse_with("```\nraw stuff\n```", options);
        let code = find_kind(&ast, NodeKind::CodeBlock).expect("code block");
        assert!(code.children[0].is_empty_slot());
    }
}
