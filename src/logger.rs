//! Instrumentation hooks for node lifecycle and lock-protocol events.
//!
//! Generalizes this crate's original pluggable, trait-object-free logging
//! design beyond node creation/destruction to also cover lock
//! acquisition/release and operation entry/exit. The actual call sites
//! (in `node.rs` and `tree.rs`) forward straight to the `log` facade, so
//! a host application wires up a backend (`env_logger`, or anything else
//! implementing `log::Log`) exactly as it would for any other
//! `log`-instrumented crate; nothing here needs to be implemented or
//! selected by callers of this library.

/// Node lifecycle and protocol events a [`Tree`](crate::Tree) emits.
///
/// Kept as a named taxonomy — rather than ad hoc strings at each call
/// site — so the set of instrumentation points stays discoverable in one
/// place even though every event currently forwards to `log::trace!` or
/// `log::debug!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event<'a> {
    NodeNew { name: &'a str },
    NodeDrop { name: &'a str },
    LockAcquired { name: &'a str, writer: bool },
    LockReleased { name: &'a str, writer: bool },
    OpEnter { op: &'a str },
    OpExit { op: &'a str, ok: bool },
}

pub(crate) fn log(event: Event<'_>) {
    match event {
        Event::NodeNew { name } => log::trace!(target: "dirtree::node", "new {name:?}"),
        Event::NodeDrop { name } => log::trace!(target: "dirtree::node", "drop {name:?}"),
        Event::LockAcquired { name, writer } => log::trace!(
            target: "dirtree::lock",
            "{} lock acquired on {name:?}",
            if writer { "write" } else { "read" },
        ),
        Event::LockReleased { name, writer } => log::trace!(
            target: "dirtree::lock",
            "{} lock released on {name:?}",
            if writer { "write" } else { "read" },
        ),
        Event::OpEnter { op } => log::debug!(target: "dirtree::op", "{op} enter"),
        Event::OpExit { op, ok } => {
            log::debug!(target: "dirtree::op", "{op} exit: {}", if ok { "ok" } else { "err" })
        }
    }
}
