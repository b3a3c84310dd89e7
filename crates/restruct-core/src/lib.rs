// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Core parsing engine for `restruct`: reStructuredText with a subset of
//! Markdown extensions.
//!
//! The crate turns a source text buffer into a tree of typed document
//! nodes ([`ast::RstNode`]) suitable for downstream rendering:
//!
//! - a stateful **lexer** tokenizes whitespace-sensitive input into a
//!   token stream with explicit indent tokens
//! - a recursive, **indentation-driven block parser** with an inline
//!   markup recognizer builds the tree, dispatching `..` blocks to the
//!   directive subsystem (which may recursively include other files)
//! - a **resolver pass** substitutes named references and substitutions
//!   and detects a table-of-contents request
//!
//! # Example
//!
//! ```
//! use restruct_core::{parse_document, ParseOptions};
//!
//! let source = "Title\n=====\n\nSome *emphasized* text.\n";
//! let (ast, has_toc) = parse_document(source, "doc.rst", ParseOptions::new()).unwrap();
//! assert!(!has_toc);
//! assert!(ast.text_content().contains("emphasized"));
//! ```
//!
//! Extensions (smileys, fenced Markdown code blocks, the `raw` directive,
//! `#`-comment-leader stripping) are off by default; see [`ParseOptions`].
//! File access for `include`-style directives goes through an injectable
//! locator and every diagnostic through an injectable sink; see
//! [`source_analysis`] for the full API.

pub mod ast;
pub mod source_analysis;

pub use source_analysis::{
    parse_document, rst_parse, MsgKind, ParseError, ParseOptions, RstMessage, Severity,
};
