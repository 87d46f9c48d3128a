//! Caller-supplied hooks for the transformation pipeline.

use crate::document::Document;
use crate::ir::Leaf;
use std::fmt;
use std::sync::Arc;

/// Pre-parse override consulted for every leaf during compilation.
///
/// Returning a non-empty document replaces the leaf's fragment verbatim and
/// the operator registry is never consulted for that leaf. Returning `None`
/// (or an empty document) lets normal operator resolution proceed.
///
/// # Example
/// ```rust
/// use filtertree::compiler::PreParseHook;
/// use filtertree::operator::coerce::string_to_bool;
/// use filtertree::{doc, Leaf};
/// use std::sync::Arc;
///
/// let status_as_bool: PreParseHook = Arc::new(|leaf: &Leaf| {
///     (leaf.field == "status")
///         .then(|| doc! { leaf.field.as_str(): string_to_bool(&leaf.value_text(), false) })
/// });
/// ```
pub type PreParseHook = Arc<dyn Fn(&Leaf) -> Option<Document> + Send + Sync>;

/// Rewrite applied to every leaf's field name.
pub type FieldTransformFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// In-place mutation applied to every leaf.
pub type LeafTransformFn = Arc<dyn Fn(&mut Leaf) + Send + Sync>;

/// Pre-parse overrides attached to a single leaf.
///
/// Hooks never take part in leaf equality, so two leaves with the same
/// clause compare equal whatever overrides they carry.
#[derive(Clone, Default)]
pub struct LeafHooks(Vec<PreParseHook>);

impl LeafHooks {
    pub fn push(&mut self, hook: PreParseHook) {
        self.0.push(hook);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PreParseHook> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a LeafHooks {
    type Item = &'a PreParseHook;
    type IntoIter = std::slice::Iter<'a, PreParseHook>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq for LeafHooks {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Debug for LeafHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafHooks({})", self.0.len())
    }
}

/// Run `hooks` in order and return the first non-empty replacement.
pub(crate) fn first_override<'a, I>(hooks: I, leaf: &Leaf) -> Option<Document>
where
    I: IntoIterator<Item = &'a PreParseHook>,
{
    hooks
        .into_iter()
        .filter_map(|hook| hook(leaf))
        .find(|doc| !doc.is_empty())
}
