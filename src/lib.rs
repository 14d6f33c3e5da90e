//! A concurrent, in-memory hierarchical directory tree with fine-grained,
//! per-node locking.
//!
//! Paths are composed of lowercase ASCII directory names separated by
//! `/`, always written with a leading and trailing slash (`/a/b/`, or
//! `/` for the root). [`Tree`] exposes four structural operations —
//! [`Tree::list`], [`Tree::create`], [`Tree::remove`], [`Tree::mv`] — that
//! may be called concurrently from any number of threads: independent
//! subtrees are read and mutated in parallel, while a `mv` that crosses
//! subtrees still observes (and leaves behind) a consistent tree.
//!
//! ```
//! use dirtree::Tree;
//!
//! let tree = Tree::new();
//! tree.create("/a/").unwrap();
//! tree.create("/a/b/").unwrap();
//! assert_eq!(tree.list("/a/").unwrap(), "b");
//! tree.mv("/a/b/", "/b/").unwrap();
//! assert_eq!(tree.list("/").unwrap(), "a,b");
//! ```

mod core;
mod error;
mod limits;
mod logger;
mod map;
mod node;
mod path;
mod sync;
mod traversal;
mod tree;

pub use self::error::{Error, Result};
pub use self::limits::Limits;
pub use self::tree::Tree;
