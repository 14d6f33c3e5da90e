//! Tree construction and teardown.
//!
//! The operations that mutate a live tree (`list`/`create`/`remove`/`mv`)
//! live in [`crate::core`]; this module only owns the root and the
//! constructors/destructor around it, mirroring the split the teacher
//! crate draws between its own `tree.rs` (the struct) and `core.rs` (the
//! logic built on top of it).

use std::sync::Arc;

use crate::limits::Limits;
use crate::node::Node;

/// A concurrent, in-memory directory tree.
///
/// Every method takes `&self`: all mutable state lives behind per-node
/// `parking_lot` primitives, so a `Tree` is `Send + Sync` and is meant to
/// be shared (typically behind an `Arc`) across the client threads that
/// call `list`/`create`/`remove`/`mv` on it concurrently.
pub struct Tree {
    pub(crate) root: Arc<Node>,
    pub(crate) limits: Limits,
}

impl Tree {
    /// Creates a new tree containing only the root directory, using the
    /// default path-length ceilings (see [`Limits::default`]).
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Creates a new tree with custom path/name length ceilings, for an
    /// embedding host that needs a different ceiling than the historical
    /// filesystem-derived defaults.
    pub fn with_limits(limits: Limits) -> Self {
        Tree {
            root: Node::new("/", None),
            limits,
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively tears down the tree. Requires no operation to be in
/// flight on any node (see §5's lifetime rule); this is the caller's
/// responsibility, exactly as the teacher's own free-list drain assumes
/// exclusive access at `Drop` time.
///
/// Implemented iteratively with an explicit work stack rather than by
/// recursing into child `Drop` impls, so a deep tree doesn't blow the
/// stack on teardown.
impl Drop for Tree {
    fn drop(&mut self) {
        let mut stack = vec![Arc::clone(&self.root)];
        while let Some(node) = stack.pop() {
            let mut guard = node.lock_write_for_teardown();
            for (_, child) in guard.drain() {
                stack.push(child);
            }
        }
    }
}
