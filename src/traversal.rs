//! Hand-over-hand descent from a start node to a target, acquiring locks
//! and bumping subtree refcounts as it goes, with the symmetric unwind.
//!
//! Interior nodes of a descent are always locked as a reader; only the
//! final node is locked as a writer, and only if the caller asked for
//! [`Mode::Writer`]. This is what lets sibling subtrees be traversed
//! concurrently while still letting `create`/`remove`/`move` exclude
//! other mutators of the node(s) they touch.

use std::sync::Arc;

use crate::map::Map;
use crate::node::{Node, NodeReadGuard, NodeWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Reader,
    Writer,
}

pub(crate) enum LockGuard {
    Read(NodeReadGuard),
    Write(NodeWriteGuard),
}

impl LockGuard {
    pub(crate) fn as_map(&self) -> &Map {
        match self {
            LockGuard::Read(g) => g,
            LockGuard::Write(g) => g,
        }
    }

    /// Panics if this guard was taken in reader mode; every call site that
    /// reaches for mutable access descended in [`Mode::Writer`].
    pub(crate) fn as_map_mut(&mut self) -> &mut Map {
        match self {
            LockGuard::Read(_) => unreachable!("mutable access requires a writer descent"),
            LockGuard::Write(g) => g,
        }
    }

    pub(crate) fn node(&self) -> &Arc<Node> {
        match self {
            LockGuard::Read(g) => g.node(),
            LockGuard::Write(g) => g.node(),
        }
    }
}

/// The result of a successful descent: every node from the start to the
/// target (inclusive) has had its subtree refcount entered, and the
/// target remains locked in the requested mode.
pub(crate) struct Descent {
    chain: Vec<Arc<Node>>,
    pub(crate) guard: LockGuard,
    pub(crate) target: Arc<Node>,
}

impl Descent {
    /// Decrements the refcount of every node this descent entered, in
    /// reverse acquisition order, and hands back the still-held lock on
    /// the target for the caller to release explicitly.
    pub(crate) fn release(self) -> LockGuard {
        for node in self.chain.iter().rev() {
            node.leave_refcount();
        }
        self.guard
    }

    pub(crate) fn release_and_unlock(self) {
        drop(self.release());
    }
}

/// Descends from `start` (locking and entering it) through `components`
/// in order. Returns `None` if any component is absent, having already
/// released every lock and refcount it had acquired.
pub(crate) fn descend(start: &Arc<Node>, components: &[&str], mode: Mode) -> Option<Descent> {
    start.enter_refcount();
    let mut guard = if components.is_empty() && mode == Mode::Writer {
        LockGuard::Write(start.lock_write())
    } else {
        LockGuard::Read(start.lock_read())
    };
    let mut chain = vec![Arc::clone(start)];
    let mut current = Arc::clone(start);

    for (i, component) in components.iter().enumerate() {
        let is_last = i + 1 == components.len();
        let child = match guard.as_map().get(component) {
            Some(node) => Arc::clone(node),
            None => {
                drop(guard);
                for node in chain.iter().rev() {
                    node.leave_refcount();
                }
                return None;
            }
        };
        child.enter_refcount();
        chain.push(Arc::clone(&child));
        guard = if is_last && mode == Mode::Writer {
            LockGuard::Write(child.lock_write())
        } else {
            LockGuard::Read(child.lock_read())
        };
        current = child;
    }

    Some(Descent {
        chain,
        guard,
        target: current,
    })
}

/// The outcome of [`descend_from`]: either the relative path was empty
/// (the target is the already-pinned node the caller passed in, whose
/// lock and refcount remain owned by the caller), or a genuine descent
/// happened and owns its own chain.
pub(crate) enum PinnedDescent {
    Pinned,
    Owned(Descent),
}

impl PinnedDescent {
    pub(crate) fn map<'a>(&'a self, pinned_map: &'a Map) -> &'a Map {
        match self {
            PinnedDescent::Pinned => pinned_map,
            PinnedDescent::Owned(d) => d.guard.as_map(),
        }
    }

    pub(crate) fn node<'a>(&'a self, pinned_node: &'a Arc<Node>) -> &'a Arc<Node> {
        match self {
            PinnedDescent::Pinned => pinned_node,
            PinnedDescent::Owned(d) => &d.target,
        }
    }

    /// Mutable counterpart of [`PinnedDescent::map`]. When this descent is
    /// `Pinned`, mutation goes through the caller-supplied guard on the
    /// shared ancestor (the LCA, for `mv`) instead of a map of its own.
    pub(crate) fn as_map_mut<'a>(&'a mut self, pinned_guard: &'a mut LockGuard) -> &'a mut Map {
        match self {
            PinnedDescent::Pinned => pinned_guard.as_map_mut(),
            PinnedDescent::Owned(d) => d.guard.as_map_mut(),
        }
    }

    pub(crate) fn release_and_unlock(self) {
        if let PinnedDescent::Owned(descent) = self {
            descent.release_and_unlock();
        }
    }
}

/// Continues a descent from a node whose lock the caller already holds
/// (the LCA of a `move`), without re-acquiring or re-entering it.
pub(crate) fn descend_from(
    pinned_map: &Map,
    components: &[&str],
    mode: Mode,
) -> Option<PinnedDescent> {
    if components.is_empty() {
        return Some(PinnedDescent::Pinned);
    }

    let mut chain = Vec::with_capacity(components.len());
    let mut guard: Option<LockGuard> = None;
    let mut current = None;

    for (i, component) in components.iter().enumerate() {
        let is_last = i + 1 == components.len();
        let map = match &guard {
            Some(g) => g.as_map(),
            None => pinned_map,
        };
        let child = match map.get(component) {
            Some(node) => Arc::clone(node),
            None => {
                drop(guard);
                for node in chain.iter().rev() {
                    node.leave_refcount();
                }
                return None;
            }
        };
        child.enter_refcount();
        chain.push(Arc::clone(&child));
        guard = Some(if is_last && mode == Mode::Writer {
            LockGuard::Write(child.lock_write())
        } else {
            LockGuard::Read(child.lock_read())
        });
        current = Some(child);
    }

    Some(PinnedDescent::Owned(Descent {
        chain,
        guard: guard.expect("non-empty components always produce a guard"),
        target: current.expect("non-empty components always produce a target"),
    }))
}
