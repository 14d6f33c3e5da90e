//! Structural round-trip and invariant properties (§8 properties 1, 4,
//! 5, 6), checked both as literal scenarios and as `proptest`-generated
//! sequences of `create`/`remove`/`mv` calls against a plain in-memory
//! shadow tree.

use std::collections::{BTreeSet, HashMap};

use dirtree::{Error, Tree};
use proptest::prelude::*;

#[test]
fn create_then_list_contains_basename() {
    let tree = Tree::new();
    tree.create("/a/").unwrap();
    tree.create("/a/b/").unwrap();
    assert_eq!(tree.list("/a/").unwrap(), "b");
}

#[test]
fn create_then_remove_returns_to_pre_state() {
    let tree = Tree::new();
    let before = tree.list("/").unwrap();
    tree.create("/a/").unwrap();
    tree.remove("/a/").unwrap();
    assert_eq!(tree.list("/").unwrap(), before);
}

#[test]
fn move_and_move_back_returns_to_pre_state() {
    let tree = Tree::new();
    tree.create("/a/").unwrap();
    tree.create("/b/").unwrap();
    let before_a = tree.list("/a/").unwrap();
    let before_b = tree.list("/b/").unwrap();
    tree.mv("/a/", "/b/a/").unwrap();
    tree.mv("/b/a/", "/a/").unwrap();
    assert_eq!(tree.list("/a/").unwrap(), before_a);
    assert_eq!(tree.list("/b/").unwrap(), before_b);
}

/// A flat shadow of the tree's structure: the set of every directory
/// path that currently exists, `"/"` included. Cheap to keep consistent
/// by hand and independent of the real `Tree`'s locking protocol, which
/// is exactly what makes it useful as a reference model.
#[derive(Default)]
struct ShadowTree {
    paths: BTreeSet<String>,
}

impl ShadowTree {
    fn new() -> Self {
        let mut paths = BTreeSet::new();
        paths.insert("/".to_owned());
        ShadowTree { paths }
    }

    fn parent(path: &str) -> String {
        let body = &path[..path.len() - 1];
        let start = body.rfind('/').unwrap();
        path[..=start].to_owned()
    }

    fn children_of(&self, parent: &str) -> Vec<String> {
        self.paths
            .iter()
            .filter(|p| p.as_str() != parent && Self::parent(p) == parent)
            .cloned()
            .collect()
    }

    fn listing(&self, parent: &str) -> String {
        let mut names: Vec<String> = self
            .children_of(parent)
            .iter()
            .map(|p| {
                let body = &p[..p.len() - 1];
                body.rsplit('/').next().unwrap().to_owned()
            })
            .collect();
        names.sort();
        names.join(",")
    }

    fn create(&mut self, path: &str) -> Result<(), Error> {
        if path == "/" {
            return Err(Error::Exists);
        }
        if !self.paths.contains(&Self::parent(path)) {
            return Err(Error::NotFound);
        }
        if self.paths.contains(path) {
            return Err(Error::Exists);
        }
        self.paths.insert(path.to_owned());
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), Error> {
        if path == "/" {
            return Err(Error::Busy);
        }
        if !self.paths.contains(path) {
            return Err(Error::NotFound);
        }
        if !self.children_of(path).is_empty() {
            return Err(Error::NotEmpty);
        }
        self.paths.remove(path);
        Ok(())
    }

    fn mv(&mut self, source: &str, target: &str) -> Result<(), Error> {
        if source == target {
            return Ok(());
        }
        if source == "/" {
            return Err(Error::Busy);
        }
        if target == "/" {
            return Err(Error::Exists);
        }
        if target.starts_with(source) {
            return Err(Error::InvalidArgument);
        }
        if !self.paths.contains(&Self::parent(source)) {
            return Err(Error::NotFound);
        }
        if !self.paths.contains(&Self::parent(target)) {
            return Err(Error::NotFound);
        }
        if !self.paths.contains(source) {
            return Err(Error::NotFound);
        }
        if self.paths.contains(target) {
            return Err(Error::Exists);
        }
        let moved: Vec<String> = self
            .paths
            .iter()
            .filter(|p| p.starts_with(source))
            .cloned()
            .collect();
        for p in moved {
            let rest = &p[source.len()..];
            self.paths.remove(&p);
            self.paths.insert(format!("{target}{rest}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Remove(String),
    Mv(String, String),
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,2}"
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(name_strategy(), 0..3)
        .prop_map(|segments| format!("/{}", segments.join("/") + if segments.is_empty() { "" } else { "/" }))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        path_strategy().prop_map(Op::Create),
        path_strategy().prop_map(Op::Remove),
        (path_strategy(), path_strategy()).prop_map(|(s, t)| Op::Mv(s, t)),
    ]
}

proptest! {
    /// Property 1/3: after every operation in a random single-threaded
    /// sequence, the real tree's listings match the shadow model's.
    #[test]
    fn random_single_threaded_sequences_match_shadow_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let tree = Tree::new();
        let mut shadow = ShadowTree::new();
        for op in ops {
            let (real, expected) = match &op {
                Op::Create(p) => (tree.create(p).map(|_| String::new()), shadow.create(p).map(|_| String::new())),
                Op::Remove(p) => (tree.remove(p).map(|_| String::new()), shadow.remove(p).map(|_| String::new())),
                Op::Mv(s, t) => (tree.mv(s, t).map(|_| String::new()), shadow.mv(s, t).map(|_| String::new())),
            };
            prop_assert_eq!(real.is_ok(), expected.is_ok());
        }

        let mut to_visit = vec!["/".to_owned()];
        let mut all_paths = HashMap::new();
        while let Some(p) = to_visit.pop() {
            let listing = tree.list(&p).unwrap();
            let shadow_listing = shadow.listing(&p);
            prop_assert_eq!(&listing, &shadow_listing);
            all_paths.insert(p.clone(), listing.clone());
            for name in listing.split(',').filter(|s| !s.is_empty()) {
                to_visit.push(format!("{p}{name}/"));
            }
        }
    }
}
