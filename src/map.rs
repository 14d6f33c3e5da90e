//! The adaptive child-name map.
//!
//! Mirrors the one-then-many representation used elsewhere in this
//! codebase for small node maps: a node with no children carries no heap
//! allocation at all, one with a single child carries just that pair, and
//! only once a node acquires a second child does it pay for a hash map.
//! Nothing outside this module touches the representation directly; the
//! rest of the crate only sees `size`/`insert`/`get`/`remove`/`names`.

use std::sync::Arc;

use fxhash::FxHashMap;

use crate::node::Node;

enum MapInner {
    Empty,
    One(String, Arc<Node>),
    Map(Box<FxHashMap<String, Arc<Node>>>),
}

pub(crate) struct Map(MapInner);

impl Map {
    pub(crate) fn new() -> Self {
        Map(MapInner::Empty)
    }

    pub(crate) fn len(&self) -> usize {
        match &self.0 {
            MapInner::Empty => 0,
            MapInner::One(..) => 1,
            MapInner::Map(m) => m.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Arc<Node>> {
        match &self.0 {
            MapInner::Empty => None,
            MapInner::One(k, v) => (k == name).then_some(v),
            MapInner::Map(m) => m.get(name),
        }
    }

    /// Inserts `node` under `name`. Returns `false` without modifying the
    /// map if `name` is already present.
    pub(crate) fn insert(&mut self, name: String, node: Arc<Node>) -> bool {
        let exists = match &self.0 {
            MapInner::Empty => false,
            MapInner::One(k, _) => *k == name,
            MapInner::Map(m) => m.contains_key(&name),
        };
        if exists {
            return false;
        }
        match std::mem::replace(&mut self.0, MapInner::Empty) {
            MapInner::Empty => {
                self.0 = MapInner::One(name, node);
            }
            MapInner::One(k, v) => {
                let mut m: FxHashMap<String, Arc<Node>> = FxHashMap::default();
                m.insert(k, v);
                m.insert(name, node);
                self.0 = MapInner::Map(Box::new(m));
            }
            MapInner::Map(mut m) => {
                m.insert(name, node);
                self.0 = MapInner::Map(m);
            }
        }
        true
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Arc<Node>> {
        match std::mem::replace(&mut self.0, MapInner::Empty) {
            MapInner::Empty => None,
            MapInner::One(k, v) => {
                if k == name {
                    Some(v)
                } else {
                    self.0 = MapInner::One(k, v);
                    None
                }
            }
            MapInner::Map(mut m) => {
                let removed = m.remove(name);
                match m.len() {
                    0 => self.0 = MapInner::Empty,
                    1 => {
                        let (k, v) = m.into_iter().next().expect("length checked above");
                        self.0 = MapInner::One(k, v);
                    }
                    _ => self.0 = MapInner::Map(m),
                }
                removed
            }
        }
    }

    /// All child names, in unspecified order. Callers that need a
    /// deterministic order (`list`) sort this themselves.
    pub(crate) fn names(&self) -> Vec<&str> {
        match &self.0 {
            MapInner::Empty => Vec::new(),
            MapInner::One(k, _) => vec![k.as_str()],
            MapInner::Map(m) => m.keys().map(String::as_str).collect(),
        }
    }

    /// Removes and returns every entry, leaving the map empty.
    pub(crate) fn drain(&mut self) -> Vec<(String, Arc<Node>)> {
        match std::mem::replace(&mut self.0, MapInner::Empty) {
            MapInner::Empty => Vec::new(),
            MapInner::One(k, v) => vec![(k, v)],
            MapInner::Map(m) => m.into_iter().collect(),
        }
    }
}
