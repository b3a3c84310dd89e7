// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the RST parser.
//!
//! These tests use `proptest` to verify parser invariants over generated
//! inputs:
//!
//! 1. **Parser never panics** — arbitrary input returns `Ok` or a
//!    structured `ParseError`, never a crash
//! 2. **Errors and results agree** — the parse fails exactly when an
//!    error-class diagnostic was delivered to the sink
//! 3. **Plain words survive** — for documents of plain word paragraphs,
//!    every word reappears in the tree's text
//! 4. **Adornment levels are stable** — the k-th distinct underline
//!    character always gets level k
//! 5. **Reference names are normal forms** — no uppercase beyond the
//!    digit guard, no doubled separators, stable under re-normalization

use proptest::prelude::*;

use crate::ast::RstNode;
use crate::source_analysis::error::Severity;
use crate::source_analysis::state::ParseOptions;

use super::rst_parse;

/// Runs a parse with quiet callbacks, returning the result and whether an
/// error-class message reached the sink.
fn quiet_parse(text: &str) -> (Result<RstNode, crate::source_analysis::error::ParseError>, bool) {
    use std::cell::RefCell;
    use std::rc::Rc;

    let saw_error = Rc::new(RefCell::new(false));
    let sink = saw_error.clone();
    let result = rst_parse(
        text,
        "prop.rst",
        1,
        0,
        ParseOptions::new(),
        Some(Box::new(|_| None)),
        Some(Box::new(move |m| {
            if m.severity() == Severity::Error {
                *sink.borrow_mut() = true;
            }
        })),
    )
    .map(|(ast, _)| ast);
    let saw = *saw_error.borrow();
    (result, saw)
}

/// Generates a paragraph-only document of plain lowercase words.
fn word_document() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[a-z]{1,8}", 1..6),
        1..4,
    )
}

/// Characters usable as heading adornments in generated documents.
const ADORNMENT_CHARS: &[char] = &['=', '-', '~', '^', '+', '"'];

/// Default is 512 cases; override via `PROPTEST_CASES` env var for
/// extended runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the parser never panics on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,300}") {
        let _ = quiet_parse(&input);
    }

    /// Property 1b: nor on whitespace- and marker-heavy input, which
    /// exercises the indent stack much harder.
    #[test]
    fn parser_never_panics_on_structure_soup(
        input in "[ \n*+\\-.:|=`_#\\[\\]a-c]{0,200}",
    ) {
        let _ = quiet_parse(&input);
    }

    /// Property 2: the parse fails exactly when an error-class diagnostic
    /// was delivered.
    #[test]
    fn errors_and_results_agree(input in "\\PC{0,300}") {
        let (result, saw_error) = quiet_parse(&input);
        prop_assert_eq!(result.is_err(), saw_error, "mismatch for input {:?}", input);
    }

    /// Property 3: plain word paragraphs keep every word.
    #[test]
    fn plain_words_survive(doc in word_document()) {
        let text = doc
            .iter()
            .map(|para| para.join(" "))
            .collect::<Vec<_>>()
            .join("\n\n");
        let (result, _) = quiet_parse(&text);
        let ast = result.expect("plain words must parse");
        let content = ast.text_content();
        for para in &doc {
            for word in para {
                prop_assert!(
                    content.contains(word.as_str()),
                    "word {:?} lost from {:?}",
                    word,
                    text,
                );
            }
        }
    }

    /// Property 4: the k-th distinct underline character gets level k,
    /// and reusing a character reuses its level.
    #[test]
    fn adornment_levels_are_first_seen_stable(
        order in prop::sample::subsequence(ADORNMENT_CHARS.to_vec(), 1..=ADORNMENT_CHARS.len()),
        repeats in prop::collection::vec(0usize..6, 1..12),
    ) {
        // Build a document of headings whose adornment chars follow
        // `repeats` as indices into the distinct `order`.
        let mut text = String::new();
        let mut used: Vec<char> = Vec::new();
        for (i, &pick) in repeats.iter().enumerate() {
            let c = order[pick % order.len()];
            if !used.contains(&c) {
                used.push(c);
            }
            let underline: String = std::iter::repeat(c).take(7).collect();
            text.push_str(&format!("H{i}\n{underline}\n\n"));
        }
        let (result, _) = quiet_parse(&text);
        let ast = result.expect("headings must parse");
        let mut heading_idx = 0;
        for child in &ast.children {
            if child.kind == crate::ast::NodeKind::Headline {
                let c = order[repeats[heading_idx] % order.len()];
                let expected = used.iter().position(|&u| u == c).map(|p| p + 1);
                prop_assert_eq!(
                    Some(child.level as usize),
                    expected,
                    "level mismatch in {:?}",
                    text,
                );
                heading_idx += 1;
            }
        }
        prop_assert_eq!(heading_idx, repeats.len());
    }

    /// Property 5: reference names are normal forms.
    #[test]
    fn refnames_are_normal_forms(input in "\\PC{0,80}") {
        let name = RstNode::leaf(input.as_str()).to_refname();
        prop_assert!(!name.contains("--"), "doubled separator in {:?}", name);
        prop_assert!(!name.starts_with('-'), "leading separator in {:?}", name);
        for (i, c) in name.chars().enumerate() {
            let ok = c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || c == '-'
                || (i == 0 && c == 'Z');
            prop_assert!(ok, "unexpected char {:?} in {:?}", c, name);
        }
        // Idempotent whenever the digit guard is not involved.
        if !name.starts_with('Z') {
            let again = RstNode::leaf(name.as_str()).to_refname();
            prop_assert_eq!(again, name);
        }
    }
}
