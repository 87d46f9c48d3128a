//! Alias-to-operator registry with a default fallback.

use crate::config::FallbackPolicy;
use crate::document::Document;
use crate::error::Result;
use crate::ir::Leaf;
use crate::operator::defaults::register_defaults;
use crate::operator::types::{Operator, OperatorRef};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static DEFAULT_REGISTRY: OnceLock<Arc<OperatorRegistry>> = OnceLock::new();

/// The process-wide registry holding the built-in operators.
///
/// Built on first use and read-only afterwards. Hosts that need extra
/// operators build their own registry with [`OperatorRegistry::with_defaults`]
/// and hand it to [`Compiler::with_registry`](crate::Compiler::with_registry).
pub fn default_registry() -> Arc<OperatorRegistry> {
    DEFAULT_REGISTRY
        .get_or_init(|| Arc::new(OperatorRegistry::with_defaults()))
        .clone()
}

/// Registry mapping case-insensitive operator aliases to operators.
///
/// A registry is populated while it is exclusively owned, then frozen by
/// wrapping it in an `Arc` and handing it to a compiler. Lookups on a frozen
/// registry need no locking.
///
/// # Example
/// ```rust
/// use filtertree::{BuiltinOperator, OperatorRegistry};
///
/// let mut registry = OperatorRegistry::with_defaults();
/// registry.register(BuiltinOperator::Contain, &["like"]);
///
/// assert!(registry.contains("LIKE"));
/// assert_eq!(registry.resolve("like").map(|op| op.name()), Some("contain"));
/// // Unknown names fall back to the default operator.
/// assert_eq!(registry.resolve("bogus").map(|op| op.name()), Some("equal"));
/// ```
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    /// Operators keyed by lower-cased alias
    operators: HashMap<String, OperatorRef>,

    /// Fallback for empty or unregistered names
    default: Option<OperatorRef>,
}

impl OperatorRegistry {
    /// Create an empty registry with no default operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in operators, `eq` as default.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_defaults(&mut registry);
        registry
    }

    /// Bind `aliases` to `operator`. Re-registering an alias replaces the
    /// previous binding.
    pub fn register<O>(&mut self, operator: O, aliases: &[&str]) -> &mut Self
    where
        O: Operator + 'static,
    {
        self.register_shared(Arc::new(operator), aliases)
    }

    /// Bind `aliases` to a closure operator.
    pub fn register_fn<F>(&mut self, func: F, aliases: &[&str]) -> &mut Self
    where
        F: Fn(&Leaf, &FallbackPolicy) -> Result<Document> + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(func), aliases)
    }

    /// Bind `aliases` to an already shared operator instance.
    pub fn register_shared(&mut self, operator: OperatorRef, aliases: &[&str]) -> &mut Self {
        for alias in aliases {
            self.operators
                .insert(normalize_alias(alias), operator.clone());
        }
        self
    }

    /// Designate the operator used for empty or unregistered names.
    pub fn set_default<O>(&mut self, operator: O) -> &mut Self
    where
        O: Operator + 'static,
    {
        self.set_default_shared(Arc::new(operator))
    }

    pub fn set_default_shared(&mut self, operator: OperatorRef) -> &mut Self {
        self.default = Some(operator);
        self
    }

    /// Exact lookup of a registered alias, without default fallback.
    pub fn lookup(&self, name: &str) -> Option<&OperatorRef> {
        self.operators.get(&normalize_alias(name))
    }

    /// Resolve `name` to an operator.
    ///
    /// Empty and unregistered names both resolve to the default operator.
    /// Returns `None` only when the name is not registered and no default has
    /// been set.
    pub fn resolve(&self, name: &str) -> Option<&OperatorRef> {
        if name.is_empty() {
            return self.default.as_ref();
        }
        self.lookup(name).or(self.default.as_ref())
    }

    pub fn default_operator(&self) -> Option<&OperatorRef> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Check if an alias is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(&normalize_alias(name))
    }

    /// Get the number of registered aliases.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Registered aliases in sorted order.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("aliases", &self.aliases())
            .field("default", &self.default.as_ref().map(|op| op.name()))
            .finish()
    }
}

fn normalize_alias(alias: &str) -> String {
    alias.to_lowercase()
}
