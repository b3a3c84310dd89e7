// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for RST source text.
//!
//! # Lexical Analysis
//!
//! [`lex`] converts source text into a stream of [`Token`]s. Whitespace is
//! semantic: every newline becomes an indent token carrying the
//! indentation of the following line, which is what drives block
//! structure.
//!
//! ```
//! use restruct_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("hello world");
//! assert_eq!(tokens.len(), 4); // hello, space, world, EOF
//! assert_eq!(tokens[0].kind(), TokenKind::Word);
//! ```
//!
//! # Parsing
//!
//! [`parse_document`] (and the fully parameterized [`rst_parse`]) turn the
//! token stream into an [`RstNode`](crate::ast::RstNode) tree and resolve
//! substitutions and references in a post-pass. See [`ParseOptions`] for
//! the extension toggles and [`FindFileHandler`]/[`MsgHandler`] for the
//! file-locator and diagnostic-sink callbacks.
//!
//! # Error Handling
//!
//! Diagnostics flow through the message sink as [`RstMessage`] values;
//! error-class kinds additionally abort the parse with a [`ParseError`].

mod error;
mod lexer;
mod parser;
mod resolver;
mod state;
mod token;


pub use error::{MsgKind, ParseError, RstMessage, Severity};
pub use lexer::lex;
pub use parser::{parse_document, rst_parse};
pub use state::{
    default_find_file, default_msg_handler, FindFileHandler, MsgHandler, ParseOptions,
};
pub use token::{Token, TokenKind};
