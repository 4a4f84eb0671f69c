use super::space::Space;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tree node
///
/// Identity survives `with_*` copies, which is what lets containers tell a
/// moved element from a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn next() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Common surface of every lossless tree node
pub trait Tree: Clone {
    fn id(&self) -> NodeId;

    /// Whitespace and comments before the node's first significant token
    fn prefix(&self) -> &Space;

    fn with_prefix(&self, prefix: Space) -> Self;

    /// Same node under a fresh identity
    fn with_id(&self, id: NodeId) -> Self;
}
