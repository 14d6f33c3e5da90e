//! The operations layer: `list`, `create`, `remove`, `mv` composed over
//! the traversal engine, the per-node synchronizer, and the child map.
//!
//! Each public method is a thin logging wrapper around a private
//! `*_impl` that does the real work, so every entry/exit is visible to a
//! host's `log` backend without cluttering the protocol code with
//! instrumentation calls.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::logger::{self, Event};
use crate::node::Node;
use crate::path;
use crate::traversal::{self, Mode};
use crate::tree::Tree;

impl Tree {
    /// Returns the comma-joined, lexicographically sorted names of
    /// `path`'s children, or an error if `path` is malformed or absent.
    pub fn list(&self, path: &str) -> Result<String> {
        logger::log(Event::OpEnter { op: "list" });
        let result = self.list_impl(path);
        logger::log(Event::OpExit {
            op: "list",
            ok: result.is_ok(),
        });
        result
    }

    fn list_impl(&self, path: &str) -> Result<String> {
        if !path::is_valid_path(path, &self.limits) {
            return Err(Error::InvalidArgument);
        }
        let components = path::path_components(path);
        let descent =
            traversal::descend(&self.root, &components, Mode::Reader).ok_or(Error::NotFound)?;
        let listing = path::list_children(descent.guard.as_map());
        descent.release_and_unlock();
        Ok(listing)
    }

    /// Creates an empty directory at `path`. `path`'s parent must already
    /// exist; `path` itself must not.
    pub fn create(&self, path: &str) -> Result<()> {
        logger::log(Event::OpEnter { op: "create" });
        let result = self.create_impl(path);
        logger::log(Event::OpExit {
            op: "create",
            ok: result.is_ok(),
        });
        result
    }

    fn create_impl(&self, path: &str) -> Result<()> {
        if !path::is_valid_path(path, &self.limits) {
            return Err(Error::InvalidArgument);
        }
        if path == "/" {
            return Err(Error::Exists);
        }
        let (parent_path, name) = path::split_parent(path);
        let components = path::path_components(parent_path);
        let mut descent =
            traversal::descend(&self.root, &components, Mode::Writer).ok_or(Error::NotFound)?;

        if descent.guard.as_map().get(name).is_some() {
            descent.release_and_unlock();
            return Err(Error::Exists);
        }

        let parent = Arc::clone(&descent.target);
        let child = Node::new(name, Some(Arc::downgrade(&parent)));
        descent.guard.as_map_mut().insert(name.to_owned(), child);
        descent.release_and_unlock();
        Ok(())
    }

    /// Removes the empty directory at `path`.
    pub fn remove(&self, path: &str) -> Result<()> {
        logger::log(Event::OpEnter { op: "remove" });
        let result = self.remove_impl(path);
        logger::log(Event::OpExit {
            op: "remove",
            ok: result.is_ok(),
        });
        result
    }

    fn remove_impl(&self, path: &str) -> Result<()> {
        if path == "/" {
            return Err(Error::Busy);
        }
        if !path::is_valid_path(path, &self.limits) {
            return Err(Error::InvalidArgument);
        }
        let (parent_path, name) = path::split_parent(path);
        let components = path::path_components(parent_path);
        let mut descent =
            traversal::descend(&self.root, &components, Mode::Writer).ok_or(Error::NotFound)?;

        let child = match descent.guard.as_map().get(name) {
            Some(child) => Arc::clone(child),
            None => {
                descent.release_and_unlock();
                return Err(Error::NotFound);
            }
        };

        let child_guard = child.lock_write();
        if !child_guard.is_empty() {
            drop(child_guard);
            descent.release_and_unlock();
            return Err(Error::NotEmpty);
        }

        descent
            .guard
            .as_map_mut()
            .remove(name)
            .expect("looked up moments ago under the same writer lock");
        drop(child_guard);
        descent.release_and_unlock();
        Ok(())
    }

    /// Moves the directory at `source` to `target`, rebinding it under a
    /// (possibly different) parent and/or name. A no-op, returning `Ok`,
    /// when `source == target`.
    pub fn mv(&self, source: &str, target: &str) -> Result<()> {
        logger::log(Event::OpEnter { op: "mv" });
        let result = self.mv_impl(source, target);
        logger::log(Event::OpExit {
            op: "mv",
            ok: result.is_ok(),
        });
        result
    }

    fn mv_impl(&self, source: &str, target: &str) -> Result<()> {
        if !path::is_valid_path(source, &self.limits) || !path::is_valid_path(target, &self.limits)
        {
            return Err(Error::InvalidArgument);
        }
        // Idempotent no-op, checked before the busy/exists checks below so
        // that `mv("/", "/")` and any other `mv(p, p)` short-circuit here
        // rather than being rejected by the (otherwise correct) rule that
        // equality counts as an ancestor relation.
        if source == target {
            return Ok(());
        }
        if source == "/" {
            return Err(Error::Busy);
        }
        if target == "/" {
            return Err(Error::Exists);
        }
        if path::is_ancestor(source, target) {
            return Err(Error::InvalidArgument);
        }

        let (sp_path, source_name) = path::split_parent(source);
        let (tp_path, target_name) = path::split_parent(target);
        // Computed from the *parents*, not from `source`/`target`
        // themselves: when `target` is a strict ancestor of `source` (a
        // normal, allowed move — only the reverse is rejected above),
        // `lca_path(source, target)` collapses to `target`, which can sit
        // deeper than `tp_path`, and isn't guaranteed to be an ancestor of
        // it. `lca_path(sp_path, tp_path)` is always an ancestor of both
        // parents by construction.
        let lca = path::lca_path(sp_path, tp_path);

        let lca_components = path::path_components(lca);
        let mut lca_descent = traversal::descend(&self.root, &lca_components, Mode::Writer)
            .ok_or(Error::NotFound)?;

        let sp_rel = path::relative_components(sp_path, lca);
        let mut sp_descent =
            match traversal::descend_from(lca_descent.guard.as_map(), &sp_rel, Mode::Writer) {
                Some(d) => d,
                None => {
                    lca_descent.release_and_unlock();
                    return Err(Error::NotFound);
                }
            };

        let same_parent = sp_path == tp_path;
        let mut tp_descent = if same_parent {
            None
        } else {
            let tp_rel = path::relative_components(tp_path, lca);
            match traversal::descend_from(lca_descent.guard.as_map(), &tp_rel, Mode::Writer) {
                Some(d) => Some(d),
                None => {
                    sp_descent.release_and_unlock();
                    lca_descent.release_and_unlock();
                    return Err(Error::NotFound);
                }
            }
        };

        let source_node = match sp_descent.map(lca_descent.guard.as_map()).get(source_name) {
            Some(node) => Arc::clone(node),
            None => {
                if let Some(tp_descent) = tp_descent {
                    tp_descent.release_and_unlock();
                }
                sp_descent.release_and_unlock();
                lca_descent.release_and_unlock();
                return Err(Error::NotFound);
            }
        };

        let target_exists = match &tp_descent {
            Some(tp_descent) => tp_descent.map(lca_descent.guard.as_map()),
            None => sp_descent.map(lca_descent.guard.as_map()),
        }
        .get(target_name)
        .is_some();
        if target_exists {
            debug_assert!(!path::is_ancestor(source, target));
            if let Some(tp_descent) = tp_descent {
                tp_descent.release_and_unlock();
            }
            sp_descent.release_and_unlock();
            lca_descent.release_and_unlock();
            return Err(Error::Exists);
        }

        source_node.wait_quiescent();

        let target_parent = Arc::clone(match &tp_descent {
            Some(tp_descent) => tp_descent.node(&lca_descent.target),
            None => sp_descent.node(&lca_descent.target),
        });

        let moved = sp_descent
            .as_map_mut(&mut lca_descent.guard)
            .remove(source_name)
            .expect("looked up moments ago under the same writer lock");
        moved.set_parent(Arc::downgrade(&target_parent));
        {
            let tp_map = match &mut tp_descent {
                Some(tp_descent) => tp_descent.as_map_mut(&mut lca_descent.guard),
                None => sp_descent.as_map_mut(&mut lca_descent.guard),
            };
            tp_map.insert(target_name.to_owned(), moved);
        }

        if let Some(tp_descent) = tp_descent {
            tp_descent.release_and_unlock();
        }
        sp_descent.release_and_unlock();
        lca_descent.release_and_unlock();
        Ok(())
    }
}
