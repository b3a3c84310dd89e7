// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reference and substitution resolution.
//!
//! Definitions may appear anywhere in the document, including after their
//! uses and in included files, so resolution runs as one post-order pass
//! after the whole parse. Substitution values are cloned into each use
//! site, keeping the result an owned tree rather than a shared DAG.
//!
//! Substitution lookup tries, in order: the exact key, a case- and
//! underscore-insensitive key, and finally the process environment. A key
//! found nowhere stays in the tree and produces an unknown-substitution
//! warning, so renderers can still show the raw reference.

use crate::ast::{NodeKind, RstNode};

use super::error::{MsgKind, ParseError};
use super::parser::Parser;

impl Parser<'_> {
    /// Resolves substitution references and hyperlink references in `n`,
    /// returning the rewritten tree and recording a table-of-contents
    /// request when one is seen.
    pub(super) fn resolve_subs(&mut self, n: RstNode) -> Result<RstNode, ParseError> {
        match n.kind {
            NodeKind::SubstitutionReferences => {
                let key = n.text_content();
                if let Some(value) = self.shared.find_sub(&key) {
                    return Ok(value.clone());
                }
                match std::env::var(&key) {
                    Ok(value) => Ok(RstNode::leaf(value)),
                    Err(_) => {
                        self.msg(MsgKind::UnknownSubstitution, &key)?;
                        Ok(n)
                    }
                }
            }
            NodeKind::Ref => {
                let key = n.to_refname();
                let Some(target) = self.shared.find_ref(&key) else {
                    return Ok(n);
                };
                let target = target.clone();
                let mut label = n;
                label.kind = NodeKind::Inner;
                let mut link = RstNode::new(NodeKind::Hyperlink);
                link.add(label);
                link.add(target);
                Ok(link)
            }
            NodeKind::Contents => {
                self.has_toc = true;
                Ok(n)
            }
            NodeKind::Leaf => Ok(n),
            _ => {
                let mut n = n;
                let children = std::mem::take(&mut n.children);
                for child in children {
                    n.children.push(self.resolve_subs(child)?);
                }
                Ok(n)
            }
        }
    }
}
