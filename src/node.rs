//! A directory node: its name, its (non-owning) parent back-reference,
//! and the reader/writer-locked, refcounted map of its children.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::logger::{self, Event};
use crate::map::Map;
use crate::sync::NodeLock;

/// A node in the tree. Always handled behind an `Arc`: children own their
/// child nodes this way, and a node's `parent` field holds a `Weak`
/// counterpart so ownership flows strictly root-to-leaf.
pub(crate) struct Node {
    name: Box<str>,
    parent: Mutex<Option<Weak<Node>>>,
    lock: NodeLock<Map>,
}

impl Node {
    pub(crate) fn new(name: impl Into<Box<str>>, parent: Option<Weak<Node>>) -> Arc<Node> {
        let name = name.into();
        logger::log(Event::NodeNew { name: &name });
        Arc::new(Node {
            name,
            parent: Mutex::new(parent),
            lock: NodeLock::new(Map::new()),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_parent(&self, parent: Weak<Node>) {
        *self.parent.lock() = Some(parent);
    }

    pub(crate) fn enter_refcount(&self) {
        self.lock.enter();
    }

    pub(crate) fn leave_refcount(&self) {
        self.lock.leave();
    }

    pub(crate) fn wait_quiescent(&self) {
        self.lock.wait_quiescent();
    }

    pub(crate) fn lock_read(self: &Arc<Self>) -> NodeReadGuard {
        self.lock.lock_read();
        logger::log(Event::LockAcquired {
            name: &self.name,
            writer: false,
        });
        NodeReadGuard(Arc::clone(self))
    }

    pub(crate) fn lock_write(self: &Arc<Self>) -> NodeWriteGuard {
        self.lock.lock_write();
        logger::log(Event::LockAcquired {
            name: &self.name,
            writer: true,
        });
        NodeWriteGuard(Arc::clone(self))
    }

    /// Directly locks and returns the child map for iterative teardown.
    /// Safe because `Tree::drop` requires no operation to be in flight.
    pub(crate) fn lock_write_for_teardown(self: &Arc<Self>) -> NodeWriteGuard {
        self.lock_write()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        logger::log(Event::NodeDrop { name: &self.name });
    }
}

/// An owned read-lock guard: holds a strong reference to the locked node
/// so its lifetime is independent of the traversal stack that acquired
/// it, and releases the lock on drop.
pub(crate) struct NodeReadGuard(Arc<Node>);

impl NodeReadGuard {
    pub(crate) fn node(&self) -> &Arc<Node> {
        &self.0
    }
}

impl Deref for NodeReadGuard {
    type Target = Map;

    fn deref(&self) -> &Map {
        // SAFETY: this guard represents a held read lock on `self.0`.
        unsafe { &*self.0.lock.data() }
    }
}

impl Drop for NodeReadGuard {
    fn drop(&mut self) {
        self.0.lock.unlock_read();
        logger::log(Event::LockReleased {
            name: &self.0.name,
            writer: false,
        });
    }
}

/// The write-mode counterpart of [`NodeReadGuard`].
pub(crate) struct NodeWriteGuard(Arc<Node>);

impl NodeWriteGuard {
    pub(crate) fn node(&self) -> &Arc<Node> {
        &self.0
    }
}

impl Deref for NodeWriteGuard {
    type Target = Map;

    fn deref(&self) -> &Map {
        // SAFETY: this guard represents a held write lock on `self.0`.
        unsafe { &*self.0.lock.data() }
    }
}

impl DerefMut for NodeWriteGuard {
    fn deref_mut(&mut self) -> &mut Map {
        // SAFETY: this guard represents a held write lock on `self.0`.
        unsafe { &mut *self.0.lock.data() }
    }
}

impl Drop for NodeWriteGuard {
    fn drop(&mut self) {
        self.0.lock.unlock_write();
        logger::log(Event::LockReleased {
            name: &self.0.name,
            writer: true,
        });
    }
}
