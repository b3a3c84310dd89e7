// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parse configuration and the state shared across parser frames.
//!
//! A [`SharedState`] lives for one top-level parse. Recursive parses
//! (included files, table cells) get their own frame with their own token
//! stream and indent stack, but share this state, so substitution and
//! reference tables accumulate across files and adornment characters keep
//! their heading levels everywhere.

use camino::{Utf8Path, Utf8PathBuf};
use ecow::EcoString;

use super::error::{RstMessage, Severity};
use crate::ast::RstNode;

/// Configuration toggles for a parse.
///
/// All extensions are off by default.
///
/// # Examples
///
/// ```
/// use restruct_core::ParseOptions;
///
/// let options = ParseOptions::new().with_smileys(true).with_markdown(true);
/// assert!(options.support_smileys);
/// assert!(!options.support_raw_directive);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Strip up to two leading `#` per line, for documentation embedded in
    /// source comments.
    pub skip_pounds: bool,
    /// Recognize the smiley table in inline context.
    pub support_smileys: bool,
    /// Honor the `raw` directive. Leave off for untrusted input.
    pub support_raw_directive: bool,
    /// Enable fenced ``` code blocks in inline context.
    pub support_markdown: bool,
}

impl ParseOptions {
    /// Creates the default option set (everything off).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets comment-leader stripping.
    #[must_use]
    pub fn with_skip_pounds(mut self, on: bool) -> Self {
        self.skip_pounds = on;
        self
    }

    /// Sets smiley recognition.
    #[must_use]
    pub fn with_smileys(mut self, on: bool) -> Self {
        self.support_smileys = on;
        self
    }

    /// Sets `raw` directive support.
    #[must_use]
    pub fn with_raw_directive(mut self, on: bool) -> Self {
        self.support_raw_directive = on;
        self
    }

    /// Sets fenced code block support.
    #[must_use]
    pub fn with_markdown(mut self, on: bool) -> Self {
        self.support_markdown = on;
        self
    }
}

/// Locates a file named by an `include`, `raw` or `code-block` directive.
///
/// Returns `None` when the file cannot be found; the parser then reports
/// a cannot-open-file error.
pub type FindFileHandler = Box<dyn FnMut(&str) -> Option<Utf8PathBuf>>;

/// Receives every diagnostic the parser emits, in source order.
///
/// The sink only observes: error-class messages abort the parse through the
/// returned [`crate::ParseError`] regardless of what the sink does.
pub type MsgHandler = Box<dyn FnMut(&RstMessage)>;

/// The default file locator: a plain filesystem existence probe.
#[must_use]
pub fn default_find_file(name: &str) -> Option<Utf8PathBuf> {
    let path = Utf8Path::new(name);
    if path.is_file() {
        Some(path.to_owned())
    } else {
        None
    }
}

/// The default message sink: prints warnings and hints to standard output.
///
/// Errors are not printed here; they reach the caller as the returned
/// [`crate::ParseError`], already formatted the same way.
pub fn default_msg_handler(msg: &RstMessage) {
    if msg.severity() != Severity::Error {
        println!("{msg}");
    }
}

/// A named substitution or reference entry.
///
/// Stored in definition order; lookups scan linearly, which matches the
/// small table sizes of real documents and keeps redefinition semantics
/// (last value wins) trivial.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) key: EcoString,
    pub(crate) value: RstNode,
}

/// First-seen assignment of heading levels to adornment characters.
///
/// Indexed by byte value for O(1) lookup; level 0 means unassigned.
pub(crate) struct LevelMap {
    levels: [i32; 256],
}

impl LevelMap {
    pub(crate) fn new() -> Self {
        Self { levels: [0; 256] }
    }

    /// Returns the level for `c`, assigning the next level via `counter`
    /// on first sight.
    pub(crate) fn assign(&mut self, counter: &mut i32, c: u8) -> i32 {
        if self.levels[c as usize] == 0 {
            *counter += 1;
            self.levels[c as usize] = *counter;
        }
        self.levels[c as usize]
    }
}

/// State shared by every parser frame of one parse.
pub(crate) struct SharedState {
    /// Configuration toggles.
    pub(crate) options: ParseOptions,
    /// Level counter for underline-only headings.
    pub(crate) underline_level: i32,
    /// Level counter for overline+underline headings.
    pub(crate) overline_level: i32,
    /// Substitution definitions, in definition order.
    pub(crate) subs: Vec<Binding>,
    /// Hyperlink and footnote targets, in definition order.
    pub(crate) refs: Vec<Binding>,
    /// Adornment levels for underline-only headings.
    pub(crate) underline_to_level: LevelMap,
    /// Adornment levels for overline headings.
    pub(crate) overline_to_level: LevelMap,
    /// File locator for directives that read files.
    pub(crate) find_file: FindFileHandler,
    /// Diagnostic sink.
    pub(crate) msg_handler: MsgHandler,
    /// Files currently being included, for cycle detection.
    pub(crate) include_stack: Vec<Utf8PathBuf>,
}

impl SharedState {
    pub(crate) fn new(
        options: ParseOptions,
        find_file: Option<FindFileHandler>,
        msg_handler: Option<MsgHandler>,
    ) -> Self {
        Self {
            options,
            underline_level: 0,
            overline_level: 0,
            subs: Vec::new(),
            refs: Vec::new(),
            underline_to_level: LevelMap::new(),
            overline_to_level: LevelMap::new(),
            find_file: find_file.unwrap_or_else(|| Box::new(default_find_file)),
            msg_handler: msg_handler.unwrap_or_else(|| Box::new(default_msg_handler)),
            include_stack: Vec::new(),
        }
    }

    /// Registers a substitution, replacing any previous value for the key.
    pub(crate) fn set_sub(&mut self, key: EcoString, value: RstNode) {
        for binding in &mut self.subs {
            if binding.key == key {
                binding.value = value;
                return;
            }
        }
        self.subs.push(Binding { key, value });
    }

    /// Looks up a substitution by exact key, then by style-insensitive key.
    pub(crate) fn find_sub(&self, key: &str) -> Option<&RstNode> {
        self.subs
            .iter()
            .find(|b| b.key == key)
            .or_else(|| self.subs.iter().find(|b| eq_ignore_style(&b.key, key)))
            .map(|b| &b.value)
    }

    /// Looks up a reference target by normalized name.
    pub(crate) fn find_ref(&self, key: &str) -> Option<&RstNode> {
        self.refs.iter().find(|b| b.key == key).map(|b| &b.value)
    }
}

/// Compares two names ignoring case and underscores, the way RST matches
/// substitution names and role keywords.
pub(crate) fn eq_ignore_style(a: &str, b: &str) -> bool {
    let mut a = a.chars().filter(|&c| c != '_');
    let mut b = b.chars().filter(|&c| c != '_');
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !x.eq_ignore_ascii_case(&y) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
