//! Core type definitions for the operator registry.

use crate::config::FallbackPolicy;
use crate::document::Document;
use crate::error::Result;
use crate::ir::Leaf;
use std::sync::Arc;

/// A stateless transformation from one leaf clause to a target fragment.
///
/// Implementations must be side-effect free: the same leaf and policy always
/// produce the same fragment, and a single instance is shared across threads.
///
/// Any `Fn(&Leaf, &FallbackPolicy) -> Result<Document>` closure is an
/// operator, so simple custom operators need no dedicated type.
///
/// # Example
/// ```rust
/// use filtertree::{doc, OperatorRegistry};
///
/// let mut registry = OperatorRegistry::with_defaults();
/// registry.register_fn(
///     |leaf, _policy| Ok(doc! { leaf.field.as_str(): { "$gt": leaf.value.clone() } }),
///     &["gt", "greaterthan"],
/// );
/// assert!(registry.contains("GT"));
/// ```
pub trait Operator: Send + Sync {
    /// Compile `leaf` into a `{field: condition}` fragment.
    fn apply(&self, leaf: &Leaf, policy: &FallbackPolicy) -> Result<Document>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Operator for F
where
    F: Fn(&Leaf, &FallbackPolicy) -> Result<Document> + Send + Sync,
{
    fn apply(&self, leaf: &Leaf, policy: &FallbackPolicy) -> Result<Document> {
        self(leaf, policy)
    }
}

/// Shared handle to a registered operator.
pub type OperatorRef = Arc<dyn Operator>;
