/// Ceilings applied during path validation.
///
/// `Tree::new` uses [`Limits::default`]; an embedding host with its own
/// path-length ceiling can construct a tree with [`Tree::with_limits`]
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length, in bytes, of a single path component.
    pub max_name: usize,
    /// Maximum length, in bytes, of a full path string.
    pub max_path: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_name: 255,
            max_path: 4096,
        }
    }
}
