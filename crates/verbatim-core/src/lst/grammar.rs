//! The conventional parse tree a grammar engine hands to the builders
//!
//! Engines discard whitespace and comments; they report, for every token,
//! start and stop offsets in their own index domain (stop exclusive). A
//! token the engine invented during error recovery carries a negative start,
//! which is how builders recognise it.

use std::fmt::Debug;

/// Token and rule kinds of one grammar
pub trait GrammarKind: Copy + Eq + Debug {
    /// Stable production name used in errors, logs and fallback tables
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarToken<K> {
    pub kind: K,
    pub start: i64,
    pub stop: i64,
}

impl<K: GrammarKind> GrammarToken<K> {
    pub fn new(kind: K, start: i64, stop: i64) -> Self {
        Self { kind, start, stop }
    }

    /// A token the engine assumed in order to recover from an error
    pub fn synthetic(kind: K) -> Self {
        Self {
            kind,
            start: -1,
            stop: -1,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.start < 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarElement<R, K> {
    Token(GrammarToken<K>),
    Node(GrammarNode<R, K>),
}

impl<R, K> GrammarElement<R, K> {
    pub fn as_token(&self) -> Option<&GrammarToken<K>> {
        match self {
            GrammarElement::Token(token) => Some(token),
            GrammarElement::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&GrammarNode<R, K>> {
        match self {
            GrammarElement::Node(node) => Some(node),
            GrammarElement::Token(_) => None,
        }
    }

    pub fn start(&self) -> i64 {
        match self {
            GrammarElement::Token(token) => token.start,
            GrammarElement::Node(node) => node.start,
        }
    }

    pub fn stop(&self) -> i64 {
        match self {
            GrammarElement::Token(token) => token.stop,
            GrammarElement::Node(node) => node.stop,
        }
    }
}

/// One production of the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarNode<R, K> {
    pub rule: R,
    pub children: Vec<GrammarElement<R, K>>,
    /// Start of the first real token, `-1` if there is none
    start: i64,
    /// Stop of the last real token, `-1` if there is none
    stop: i64,
    synthetic: bool,
}

impl<R: GrammarKind, K: GrammarKind> GrammarNode<R, K> {
    pub fn new(rule: R, children: Vec<GrammarElement<R, K>>) -> Self {
        let start = children
            .iter()
            .map(GrammarElement::start)
            .find(|&start| start >= 0)
            .unwrap_or(-1);
        let stop = children
            .iter()
            .rev()
            .map(GrammarElement::stop)
            .find(|&stop| stop >= 0)
            .unwrap_or(-1);
        let synthetic = children.iter().any(|child| match child {
            GrammarElement::Token(token) => token.is_synthetic(),
            GrammarElement::Node(node) => node.synthetic,
        });

        Self {
            rule,
            children,
            start,
            stop,
            synthetic,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Whether any token in this subtree was invented by error recovery
    pub fn has_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Whether a direct child token of `kind` is missing or synthetic
    pub fn is_missing(&self, kind: K) -> bool {
        self.token(kind).is_none_or(GrammarToken::is_synthetic)
    }

    pub fn token(&self, kind: K) -> Option<&GrammarToken<K>> {
        self.children
            .iter()
            .filter_map(GrammarElement::as_token)
            .find(|token| token.kind == kind)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &GrammarToken<K>> {
        self.children.iter().filter_map(GrammarElement::as_token)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GrammarNode<R, K>> {
        self.children.iter().filter_map(GrammarElement::as_node)
    }

    pub fn node(&self, rule: R) -> Option<&GrammarNode<R, K>> {
        self.nodes().find(|node| node.rule == rule)
    }
}
