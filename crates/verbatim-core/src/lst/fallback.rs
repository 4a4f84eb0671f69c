//! Error-recovery fallback policy
//!
//! When the grammar engine had to invent a token, the builder for that
//! production can either capture the production's whole source span as an
//! opaque [`FallbackLiteral`], or keep the structure and simply not print
//! the missing trailing delimiter. Which one applies is fixed per production
//! in a lookup table owned by each front end, optionally overridden from
//! configuration.

use super::cursor::Cursor;
use super::grammar::{GrammarElement, GrammarKind, GrammarNode};
use super::space::Space;
use super::tree::{NodeId, Tree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Capture the whole production verbatim
    #[serde(rename = "literal")]
    LiteralCapture,
    /// Keep the structure, omit only the missing trailing delimiter
    #[serde(rename = "omit")]
    PartialOmission,
}

/// What a builder does with one grammar node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Every direct token is real; build the node normally
    Build,
    /// Only the trailing closer is missing; build and leave it out
    OmitCloser,
    /// Capture the node's whole span as a [`FallbackLiteral`]
    Capture,
}

/// Per-production fallback policies of one language
#[derive(Debug, Clone)]
pub struct FallbackTable {
    language: &'static str,
    defaults: &'static [(&'static str, FallbackPolicy)],
    overrides: HashMap<String, FallbackPolicy>,
}

impl FallbackTable {
    pub fn new(language: &'static str, defaults: &'static [(&'static str, FallbackPolicy)]) -> Self {
        Self {
            language,
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, FallbackPolicy>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Policy for `production`; productions without an entry capture literally
    pub fn policy(&self, production: &str) -> FallbackPolicy {
        if let Some(policy) = self.overrides.get(production) {
            return *policy;
        }
        self.defaults
            .iter()
            .find(|(name, _)| *name == production)
            .map(|(_, policy)| *policy)
            .unwrap_or(FallbackPolicy::LiteralCapture)
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    /// Decide how to build `node`, given the token kind that closes it
    ///
    /// Only the node's direct tokens are inspected; a nested production with
    /// a synthetic token recovers on its own. A missing interior token always
    /// forces a capture, whatever the table says.
    pub fn recovery<R: GrammarKind, K: GrammarKind>(
        &self,
        node: &GrammarNode<R, K>,
        closer: Option<K>,
        cursor: &Cursor<'_>,
    ) -> Recovery {
        if !node.has_synthetic() {
            return Recovery::Build;
        }

        let mut missing = node
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| match child {
                GrammarElement::Token(token) if cursor.is_synthetic(token) => Some((i, token.kind)),
                _ => None,
            });

        let recovery = match (missing.next(), missing.next()) {
            (None, _) => Recovery::Build,
            (Some((i, kind)), None)
                if Some(kind) == closer
                    && i + 1 == node.children.len()
                    && self.policy(node.rule.name()) == FallbackPolicy::PartialOmission =>
            {
                Recovery::OmitCloser
            }
            _ => Recovery::Capture,
        };

        if recovery != Recovery::Build {
            tracing::debug!(
                "{} {}: {:?} (policy {:?})",
                self.language,
                node.rule.name(),
                recovery,
                self.policy(node.rule.name())
            );
        }
        recovery
    }
}

/// Source text the builders could not structure, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FallbackLiteral {
    id: NodeId,
    prefix: Space,
    text: Arc<str>,
    /// Production the text was captured for
    production: &'static str,
}

impl FallbackLiteral {
    pub fn new(prefix: Space, text: impl Into<Arc<str>>, production: &'static str) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            text: text.into(),
            production,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn production(&self) -> &'static str {
        self.production
    }

    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

impl Tree for FallbackLiteral {
    fn id(&self) -> NodeId {
        self.id
    }

    fn prefix(&self) -> &Space {
        &self.prefix
    }

    fn with_prefix(&self, prefix: Space) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    fn with_id(&self, id: NodeId) -> Self {
        Self { id, ..self.clone() }
    }
}
