// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Document tree definitions for parsed RST.
//!
//! The parser produces a homogeneous tree of [`RstNode`]s. Every node has a
//! [`NodeKind`]; leaf-like nodes additionally carry `text`, headings carry a
//! `level`, and everything else is structure expressed through `children`.
//!
//! Keeping the tree homogeneous (one node type, kind-tagged) mirrors how
//! renderers consume it: they dispatch on `kind` and recurse. Directive
//! nodes use a fixed child layout `[argument, field list, body]` where an
//! absent slot is an [`NodeKind::Empty`] node, so child indices stay stable
//! regardless of which parts were present in the source.
//!
//! Trees are fully owned: the resolver clones substitution values into each
//! reference site, so the result is always a tree, never a DAG.

use ecow::EcoString;

/// The kind of a document node.
///
/// Naming follows the rendered construct, not the source syntax: a `*foo*`
/// span is [`NodeKind::Emphasis`], whatever character produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Transparent grouping node; renders only its children.
    Inner,
    /// Placeholder for an absent optional slot (e.g. a directive with no
    /// argument). Renders nothing.
    Empty,
    /// A text leaf. The only kind whose `text` is document content.
    Leaf,

    // --- Block structure ---
    /// An ordinary paragraph.
    Paragraph,
    /// A heading recognized from an underline adornment; `level` is set.
    Headline,
    /// A heading with both overline and underline adornment; `level` is set.
    Overline,
    /// A horizontal rule produced by a standalone adornment line.
    Transition,
    /// An indented verbatim block introduced by `::`.
    LiteralBlock,
    /// A code block with language argument, options and literal body.
    CodeBlock,
    /// A deeper-indented region without a list marker.
    BlockQuote,
    /// A line block (`| ...` lines preserving line breaks).
    LineBlock,
    /// One line of a line block.
    LineBlockItem,

    // --- Lists ---
    /// A bullet list (`*`, `+` or `-` markers).
    BulletList,
    /// One item of a bullet list.
    BulletItem,
    /// An enumerated list (`(e)`, `e)` or `e.` markers).
    EnumList,
    /// One item of an enumerated list.
    EnumItem,
    /// A definition list.
    DefList,
    /// The term line of a definition item.
    DefName,
    /// The indented body of a definition item.
    DefBody,
    /// One term/body pair of a definition list.
    DefItem,
    /// An option list (`-x`, `--long`, `/x` descriptions).
    OptionList,
    /// The option group of an option list item.
    OptionGroup,
    /// One entry of an option list.
    OptionListItem,
    /// The description of an option list entry.
    Description,

    // --- Fields & directives ---
    /// A `:name: value` field list.
    FieldList,
    /// One field of a field list.
    Field,
    /// The name part of a field.
    FieldName,
    /// The body part of a field.
    FieldBody,
    /// The argument of a directive.
    DirArg,
    /// A generic directive node with `[argument, field list, body]` children.
    Directive,

    // --- Tables ---
    /// A simple table.
    Table,
    /// A grid table start. Recognized by the classifier only so the
    /// parser can report that grid tables are not implemented; never
    /// appears in a finished tree.
    GridTable,
    /// One row of a table.
    TableRow,
    /// A data cell.
    TableDataCell,
    /// A header cell (first row when a header separator is present).
    TableHeaderCell,

    // --- Inline markup ---
    /// `*emphasis*`
    Emphasis,
    /// `**strong emphasis**`
    StrongEmphasis,
    /// `***triple emphasis***`
    TripleEmphasis,
    /// ``` ``inline literal`` ```
    InlineLiteral,
    /// `` `interpreted text` `` with no recognized role.
    InterpretedText,
    /// A reference produced by trailing-underscore syntax, resolved in the
    /// post-pass.
    Ref,
    /// An index entry produced by the `idx` role.
    Idx,
    /// Subscript (`sub`/`subscript` role).
    Sub,
    /// Superscript (`sup`/`supscript` role).
    Sup,
    /// An unrecognized role: children are `[content, role-name leaf]`.
    GeneralRole,
    /// A `|name|` substitution reference, replaced by the resolver.
    SubstitutionReferences,
    /// A resolved hyperlink: children are `[label, target]`.
    Hyperlink,
    /// A bare URL recognized in running text.
    StandaloneHyperlink,
    /// A smiley; `text` holds the icon name.
    Smiley,

    // --- Directive results ---
    /// An `image` directive.
    Image,
    /// A `figure` directive.
    Figure,
    /// A `title` directive.
    Title,
    /// A `contents` directive; its presence sets the table-of-contents flag.
    Contents,
    /// An `index` directive.
    Index,
    /// A `container` directive.
    Container,
    /// Raw HTML passthrough (`raw:: html`).
    RawHtml,
    /// Raw LaTeX passthrough (`raw:: latex`).
    RawLatex,
    /// A `raw` directive without a recognized output format argument.
    Raw,
}

/// A node of the parsed document tree.
///
/// # Examples
///
/// ```
/// use restruct_core::ast::{NodeKind, RstNode};
///
/// let mut para = RstNode::new(NodeKind::Paragraph);
/// para.add(RstNode::leaf("hello"));
/// assert_eq!(para.children.len(), 1);
/// assert_eq!(para.text_content(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstNode {
    /// What this node represents.
    pub kind: NodeKind,
    /// Text payload; document content only for [`NodeKind::Leaf`] (the
    /// `Smiley` and raw kinds use it for renderer-facing metadata).
    pub text: EcoString,
    /// Heading level, assigned in first-seen adornment order. Zero for
    /// everything that is not a heading.
    pub level: i32,
    /// Ordered child nodes.
    pub children: Vec<RstNode>,
}

impl RstNode {
    /// Creates a node of the given kind with no text and no children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: EcoString::new(),
            level: 0,
            children: Vec::new(),
        }
    }

    /// Creates a text leaf.
    #[must_use]
    pub fn leaf(text: impl Into<EcoString>) -> Self {
        Self::with_text(NodeKind::Leaf, text)
    }

    /// Creates a node of the given kind carrying text.
    #[must_use]
    pub fn with_text(kind: NodeKind, text: impl Into<EcoString>) -> Self {
        Self {
            kind,
            text: text.into(),
            level: 0,
            children: Vec::new(),
        }
    }

    /// Creates the placeholder for an absent optional slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(NodeKind::Empty)
    }

    /// Returns `true` if this is the absent-slot placeholder.
    #[must_use]
    pub fn is_empty_slot(&self) -> bool {
        self.kind == NodeKind::Empty
    }

    /// Appends a child node.
    pub fn add(&mut self, child: RstNode) {
        self.children.push(child);
    }

    /// Appends a child node if present.
    pub fn add_opt(&mut self, child: Option<RstNode>) {
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Appends a child node, or the absent-slot placeholder if `None`.
    ///
    /// Used for directive slots, where child positions are significant.
    pub fn add_slot(&mut self, child: Option<RstNode>) {
        self.children.push(child.unwrap_or_else(RstNode::empty));
    }

    /// Returns the `i`-th child, if present.
    #[must_use]
    pub fn child(&self, i: usize) -> Option<&RstNode> {
        self.children.get(i)
    }

    /// Returns the kind of the `i`-th child, if present.
    #[must_use]
    pub fn child_kind(&self, i: usize) -> Option<NodeKind> {
        self.children.get(i).map(|c| c.kind)
    }

    /// Concatenates the text of every [`NodeKind::Leaf`] beneath this node,
    /// in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.kind == NodeKind::Leaf {
            out.push_str(&self.text);
        } else {
            for child in &self.children {
                child.collect_text(out);
            }
        }
    }

    /// Normalizes this node's leaf text into a reference name.
    ///
    /// Letters are lowercased, digits kept (with a `Z` prefix when the name
    /// would otherwise start with a digit), and every other character run
    /// collapses into a single `-` separator. Leading separators are
    /// dropped. The result never contains uppercase letters or consecutive
    /// separators, and re-normalizing an already-normalized name is a no-op.
    #[must_use]
    pub fn to_refname(&self) -> String {
        let mut out = String::new();
        let mut pending_sep = false;
        self.refname_aux(&mut out, &mut pending_sep);
        out
    }

    fn refname_aux(&self, out: &mut String, pending_sep: &mut bool) {
        if self.kind == NodeKind::Leaf {
            for ch in self.text.chars() {
                match ch {
                    '0'..='9' => {
                        if *pending_sep {
                            out.push('-');
                            *pending_sep = false;
                        }
                        if out.is_empty() {
                            out.push('Z');
                        }
                        out.push(ch);
                    }
                    'a'..='z' | 'A'..='Z' => {
                        if *pending_sep {
                            out.push('-');
                            *pending_sep = false;
                        }
                        out.push(ch.to_ascii_lowercase());
                    }
                    _ => {
                        if !out.is_empty() {
                            *pending_sep = true;
                        }
                    }
                }
            }
        } else {
            for child in &self.children {
                child.refname_aux(out, pending_sep);
            }
        }
    }
}
