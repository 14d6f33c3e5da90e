//! Pure path utilities: validation, decomposition, and LCA computation.
//!
//! None of these functions touch a node or acquire a lock; they operate
//! entirely on `&str` (and, for `list_children`, a `Map` read through its
//! public contract), which is what makes them exhaustively testable with
//! `proptest` independent of the concurrency protocol.

use crate::limits::Limits;
use crate::map::Map;

/// A valid path matches `(/[a-z]{1,max_name})*/` and is at most `max_path`
/// bytes long. `"/"` denotes the root.
pub(crate) fn is_valid_path(path: &str, limits: &Limits) -> bool {
    if path.is_empty() || path.len() > limits.max_path {
        return false;
    }
    if !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    if path == "/" {
        return true;
    }
    let inner = &path[1..path.len() - 1];
    if inner.is_empty() {
        return true;
    }
    inner.split('/').all(|segment| {
        !segment.is_empty()
            && segment.len() <= limits.max_name
            && segment.bytes().all(|b| b.is_ascii_lowercase())
    })
}

/// Splits a valid path into its first component and the remaining tail
/// (itself a valid path rooted one level down), or `None` when `path` is
/// the root.
pub(crate) fn split_head(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let rest = &path[1..];
    let end = rest.find('/').expect("valid path has a trailing separator");
    Some((&rest[..end], &rest[end..]))
}

/// Splits a valid non-root path into its parent path and last component.
pub(crate) fn split_parent(path: &str) -> (&str, &str) {
    debug_assert_ne!(path, "/");
    let body = &path[..path.len() - 1];
    let start = body.rfind('/').expect("valid path has a leading separator");
    (&path[..=start], &body[start + 1..])
}

/// Decomposes a valid path into its sequence of components.
pub(crate) fn path_components(path: &str) -> Vec<&str> {
    let mut components = Vec::new();
    let mut rest = path;
    while let Some((head, tail)) = split_head(rest) {
        components.push(head);
        rest = tail;
    }
    components
}

/// The longest common prefix of `p` and `q` that ends at a `/`. Always a
/// valid path and an ancestor of both.
pub(crate) fn lca_path<'a>(p: &'a str, q: &'a str) -> &'a str {
    let (bytes_p, bytes_q) = (p.as_bytes(), q.as_bytes());
    let max = bytes_p.len().min(bytes_q.len());
    let mut last_slash = 0;
    let mut i = 0;
    while i < max && bytes_p[i] == bytes_q[i] {
        if bytes_p[i] == b'/' {
            last_slash = i;
        }
        i += 1;
    }
    &p[..=last_slash]
}

/// True iff `b` begins with `a` (both valid paths; equality counts as
/// ancestor).
pub(crate) fn is_ancestor(a: &str, b: &str) -> bool {
    b.starts_with(a)
}

/// Components of `path` relative to `ancestor`. Requires
/// `is_ancestor(ancestor, path)`; returns an empty `Vec` when `path ==
/// ancestor`. Used by `mv` to descend from the LCA to each endpoint's
/// parent without re-walking the path from the root.
pub(crate) fn relative_components<'a>(path: &'a str, ancestor: &str) -> Vec<&'a str> {
    debug_assert!(is_ancestor(ancestor, path));
    path_components(&path[ancestor.len() - 1..])
}

/// Canonical serialization of a node's children: names sorted
/// lexicographically, comma-joined, no trailing separator.
pub(crate) fn list_children(map: &Map) -> String {
    let mut names = map.names();
    names.sort_unstable();
    names.join(",")
}


/// Property-based coverage of the path grammar, independent of the
/// concurrency protocol (§8 property 2). The reference checker below is
/// written as a direct byte-by-byte state machine rather than reusing
/// `split`/`all`, so a bug shared between it and `is_valid_path` would
/// have to be a genuinely identical mistake rather than a shared helper.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn reference_is_valid(s: &str, limits: &Limits) -> bool {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > limits.max_path {
            return false;
        }
        if bytes[0] != b'/' {
            return false;
        }
        let mut component_len = 0usize;
        let mut component_started = false;
        for &b in &bytes[1..] {
            if b == b'/' {
                if component_started && component_len == 0 {
                    return false; // empty component, e.g. "//"
                }
                component_len = 0;
                component_started = true;
            } else if b.is_ascii_lowercase() {
                component_len += 1;
                if component_len > limits.max_name {
                    return false;
                }
            } else {
                return false;
            }
        }
        // Must end on a freshly-closed component (trailing slash) and
        // have seen at least one slash after the leading one.
        component_started && bytes[bytes.len() - 1] == b'/'
    }

    fn valid_path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z]{1,12}", 0..6)
            .prop_map(|segments| format!("/{}", segments.join("/") + if segments.is_empty() { "" } else { "/" }))
    }

    proptest! {
        #[test]
        fn constructed_paths_are_valid(path in valid_path_strategy()) {
            prop_assert!(is_valid_path(&path, &Limits::default()));
            prop_assert!(reference_is_valid(&path, &Limits::default()));
        }

        #[test]
        fn is_valid_path_matches_reference(s in "\\PC{0,40}") {
            prop_assert_eq!(
                is_valid_path(&s, &Limits::default()),
                reference_is_valid(&s, &Limits::default()),
            );
        }

        #[test]
        fn lca_is_always_an_ancestor_of_both(
            a in valid_path_strategy(),
            b in valid_path_strategy(),
        ) {
            let l = lca_path(&a, &b);
            prop_assert!(is_ancestor(l, &a));
            prop_assert!(is_ancestor(l, &b));
            prop_assert!(is_valid_path(l, &Limits::default()));
        }
    }
}
