//! Filter tree compiler.
//!
//! This module turns a [`FilterNode`] tree into the ordered [`Document`] a
//! document-store driver accepts as its filter argument.
//!
//! The compiler is organized into several sub-modules:
//! - [`field_mapping`] - Table-driven field renames
//! - [`hooks`] - Pre-parse overrides and transform function types
//! - [`pipeline`] - Ordered field/leaf transforms ahead of compilation
//! - [`sort`] - Sort list compilation
//! - `transform` - In-place rewrites on [`FilterNode`]
//!
//! # Examples
//!
//! Basic usage:
//! ```rust
//! use filtertree::{doc, Compiler, FilterNode};
//!
//! let compiler = Compiler::new();
//! let tree = FilterNode::and([
//!     FilterNode::leaf("_id", "eq", "val"),
//!     FilterNode::leaf("_id", "gte", "val"),
//! ]);
//!
//! let filter = compiler.compile(&tree)?;
//! assert_eq!(
//!     filter,
//!     doc! { "$and": [
//!         { "_id": { "$eq": "val" } },
//!         { "_id": { "$gte": "val" } },
//!     ] }
//! );
//! # Ok::<(), filtertree::FilterError>(())
//! ```
//!
//! With a custom operator:
//! ```rust
//! use filtertree::{doc, Compiler, FilterNode, OperatorRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = OperatorRegistry::with_defaults();
//! registry.register_fn(
//!     |leaf, _| Ok(doc! { leaf.field.as_str(): { "$size": leaf.value.clone() } }),
//!     &["size"],
//! );
//!
//! let compiler = Compiler::with_registry(Arc::new(registry));
//! let filter = compiler.compile(&FilterNode::leaf("tags", "SIZE", 2))?;
//! assert_eq!(filter, doc! { "tags": { "$size": 2 } });
//! # Ok::<(), filtertree::FilterError>(())
//! ```

pub mod field_mapping;
pub mod hooks;
pub mod pipeline;
pub mod sort;
mod transform;

pub use field_mapping::FieldMapping;
pub use hooks::{FieldTransformFn, LeafHooks, LeafTransformFn, PreParseHook};
pub use pipeline::Pipeline;
pub use sort::{compile_sort, SortOrder};

use crate::config::CompilerConfig;
use crate::dialect::{DialectRef, MongoDialect};
use crate::document::{Bson, Document};
use crate::error::{FilterError, Result};
use crate::ir::{FilterNode, Leaf, SortSpec};
use crate::operator::{default_registry, OperatorRef, OperatorRegistry};
use crate::request::{CompiledQuery, DataRequest};
use hooks::first_override;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The filter tree compiler.
///
/// A compiler holds a frozen operator registry, the target dialect, its
/// configuration, and any pre-parse hooks. Compiling never mutates the compiler, so one instance can
/// be shared across threads and requests.
///
/// # Examples
///
/// ```rust
/// use filtertree::Compiler;
///
/// let compiler = Compiler::new();
/// assert!(compiler.registry().contains("eq"));
/// assert_eq!(compiler.pre_parse_count(), 0);
/// ```
#[derive(Clone)]
pub struct Compiler {
    registry: Arc<OperatorRegistry>,
    dialect: DialectRef,
    config: CompilerConfig,
    pre_parse: Vec<PreParseHook>,
}

impl Compiler {
    /// Create a compiler over the built-in operators with the lenient
    /// configuration.
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    /// Create a compiler over a caller-built registry, targeting MongoDB.
    pub fn with_registry(registry: Arc<OperatorRegistry>) -> Self {
        Self {
            registry,
            dialect: Arc::new(MongoDialect),
            config: CompilerConfig::default(),
            pre_parse: Vec::new(),
        }
    }

    /// Target another backend. The registry is replaced by the dialect's.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filtertree::dialect::DboxDialect;
    /// use filtertree::{doc, Compiler, FilterNode};
    /// use std::sync::Arc;
    ///
    /// let compiler = Compiler::new().with_dialect(Arc::new(DboxDialect));
    /// let filter = compiler.compile(&FilterNode::or([
    ///     FilterNode::leaf("a", "eq", 1),
    ///     FilterNode::leaf("b", "gte", 2),
    /// ]))?;
    ///
    /// assert_eq!(
    ///     filter,
    ///     doc! { "op": "$or", "items": [
    ///         { "field": "a", "op": "$eq", "value": 1 },
    ///         { "field": "b", "op": "$gte", "value": 2 },
    ///     ] }
    /// );
    /// # Ok::<(), filtertree::FilterError>(())
    /// ```
    pub fn with_dialect(mut self, dialect: DialectRef) -> Self {
        self.registry = dialect.registry();
        self.dialect = dialect;
        self
    }

    /// Replace the configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filtertree::{Compiler, CompilerConfig, FilterError, FilterNode};
    ///
    /// let compiler = Compiler::new().with_config(CompilerConfig::strict());
    /// let err = compiler.compile(&FilterNode::leaf("a", "bogus", "x")).unwrap_err();
    /// assert!(matches!(err, FilterError::UnknownOperator { .. }));
    /// ```
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a pre-parse hook. Hooks are consulted in the order they were
    /// added; the first non-empty result replaces the leaf's fragment.
    pub fn with_pre_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Leaf) -> Option<Document> + Send + Sync + 'static,
    {
        self.pre_parse.push(Arc::new(hook));
        self
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn dialect(&self) -> &DialectRef {
        &self.dialect
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn pre_parse_count(&self) -> usize {
        self.pre_parse.len()
    }

    /// Compile a filter tree into a target document.
    pub fn compile(&self, tree: &FilterNode) -> Result<Document> {
        self.compile_with_hooks(tree, &[])
    }

    /// Compile a single leaf clause, consulting the pre-parse hooks first.
    /// The leaf's own hooks come before the compiler's.
    pub fn compile_leaf(&self, leaf: &Leaf) -> Result<Document> {
        self.leaf_fragment(leaf, &[])
    }

    /// Compile sort keys, one entry per key in request order.
    pub fn compile_sort(&self, sorts: &[SortSpec]) -> SortOrder {
        compile_sort(sorts)
    }

    /// Render compiled sort keys the way the dialect's driver takes them.
    pub fn render_sort(&self, sort: &SortOrder) -> Bson {
        self.dialect.render_sort(sort)
    }

    /// Compile independent trees in parallel. Results keep the input order.
    pub fn compile_many(&self, trees: &[FilterNode]) -> Vec<Result<Document>> {
        trees.par_iter().map(|tree| self.compile(tree)).collect()
    }

    /// Compile a decoded grid request into filter, sort and paging.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filtertree::{doc, Compiler, DataRequest};
    ///
    /// let request = DataRequest::from_json_str(
    ///     r#"{"filter":{"field":"name","operator":"eq","value":"x"},
    ///         "sort":[{"field":"name","dir":"desc"}],"page":3,"pageSize":20}"#,
    /// )?;
    /// let query = Compiler::new().compile_request(&request)?;
    ///
    /// assert_eq!(query.filter, doc! { "name": { "$eq": "x" } });
    /// assert_eq!(query.sort.to_document(), doc! { "name": -1 });
    /// assert_eq!(query.skip, Some(40));
    /// assert_eq!(query.limit, Some(20));
    /// # Ok::<(), filtertree::FilterError>(())
    /// ```
    pub fn compile_request(&self, request: &DataRequest) -> Result<CompiledQuery> {
        self.compile_request_with_hooks(request, &[])
    }

    pub(crate) fn compile_request_with_hooks(
        &self,
        request: &DataRequest,
        extra: &[PreParseHook],
    ) -> Result<CompiledQuery> {
        let filter = match &request.filter {
            Some(tree) => self.compile_with_hooks(tree, extra)?,
            None => Document::new(),
        };

        Ok(CompiledQuery {
            filter,
            sort: compile_sort(&request.sort),
            skip: request.offset(),
            limit: request.limit(),
        })
    }

    /// Compile with `extra` hooks consulted after the compiler's own.
    pub(crate) fn compile_with_hooks(
        &self,
        tree: &FilterNode,
        extra: &[PreParseHook],
    ) -> Result<Document> {
        self.compile_node(tree, extra, 1)
    }

    fn compile_node(
        &self,
        node: &FilterNode,
        extra: &[PreParseHook],
        depth: usize,
    ) -> Result<Document> {
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(FilterError::DepthExceeded { limit });
            }
        }

        match node {
            FilterNode::Branch { filters, .. } if filters.is_empty() => {
                trace!(depth, "empty branch compiled to no-op filter");
                Ok(Document::new())
            }
            FilterNode::Branch { logic, filters } => {
                let children = filters
                    .iter()
                    .map(|child| self.compile_node(child, extra, depth + 1))
                    .collect::<Result<Vec<Document>>>()?;

                trace!(
                    depth,
                    %logic,
                    dialect = self.dialect.name(),
                    children = children.len(),
                    "compiled branch"
                );
                Ok(self.dialect.combine(*logic, children))
            }
            FilterNode::Leaf(leaf) => self.leaf_fragment(leaf, extra),
        }
    }

    fn leaf_fragment(&self, leaf: &Leaf, extra: &[PreParseHook]) -> Result<Document> {
        let hooks = leaf.hooks.iter().chain(&self.pre_parse).chain(extra);
        if let Some(fragment) = first_override(hooks, leaf) {
            debug!(field = %leaf.field, operator = %leaf.operator, "pre-parse hook replaced leaf");
            return Ok(fragment);
        }

        let operator = self.resolve_operator(leaf)?;
        let fragment = operator.apply(leaf, &self.config.fallback)?;
        trace!(field = %leaf.field, operator = operator.name(), "compiled leaf");
        Ok(fragment)
    }

    fn resolve_operator(&self, leaf: &Leaf) -> Result<&OperatorRef> {
        if !leaf.operator.is_empty() && !self.registry.contains(&leaf.operator) {
            if self.config.fallback.unknown_operator.is_reject() {
                return Err(FilterError::UnknownOperator {
                    field: leaf.field.clone(),
                    operator: leaf.operator.clone(),
                });
            }
            debug!(field = %leaf.field, operator = %leaf.operator, "unknown operator, using default");
        }

        self.registry
            .resolve(&leaf.operator)
            .ok_or(FilterError::NoDefaultOperator)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("registry", &self.registry)
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .field("pre_parse", &self.pre_parse.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnInvalid;
    use crate::dialect::DboxDialect;
    use crate::document::doc;
    use crate::ir::Logic;

    #[test]
    fn test_compiler_creation() {
        let compiler = Compiler::new();
        assert!(compiler.registry().has_default());
        assert_eq!(compiler.config(), &CompilerConfig::default());
        assert_eq!(compiler.pre_parse_count(), 0);
    }

    #[test]
    fn test_compile_leaf() {
        let compiler = Compiler::new();
        let filter = compiler
            .compile(&FilterNode::leaf("_id", "neq", "val"))
            .unwrap();
        assert_eq!(filter, doc! { "_id": { "$ne": "val" } });
    }

    #[test]
    fn test_compile_or_branch() {
        let compiler = Compiler::new();
        let tree = FilterNode::or([
            FilterNode::leaf("a", "eq", 1),
            FilterNode::leaf("b", "eq", 2),
        ]);

        assert_eq!(
            compiler.compile(&tree).unwrap(),
            doc! { "$or": [
                { "a": { "$eq": 1 } },
                { "b": { "$eq": 2 } },
            ] }
        );
    }

    #[test]
    fn test_empty_branch_is_noop() {
        let compiler = Compiler::new();
        assert_eq!(compiler.compile(&FilterNode::empty()).unwrap(), Document::new());
        assert_eq!(
            compiler.compile(&FilterNode::or([])).unwrap(),
            Document::new()
        );
    }

    #[test]
    fn test_nested_empty_branch_kept_as_child() {
        let compiler = Compiler::new();
        let tree = FilterNode::and([FilterNode::empty(), FilterNode::leaf("a", "eq", 1)]);

        assert_eq!(
            compiler.compile(&tree).unwrap(),
            doc! { "$and": [{}, { "a": { "$eq": 1 } }] }
        );
    }

    #[test]
    fn test_unknown_operator_uses_default() {
        let compiler = Compiler::new();
        let unknown = compiler.compile(&FilterNode::leaf("a", "bogus", "x")).unwrap();
        let empty = compiler.compile(&FilterNode::leaf("a", "", "x")).unwrap();
        let eq = compiler.compile(&FilterNode::leaf("a", "eq", "x")).unwrap();

        assert_eq!(unknown, eq);
        assert_eq!(empty, eq);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let compiler = Compiler::new()
            .with_config(CompilerConfig::new().with_unknown_operator(OnInvalid::Reject));

        assert_eq!(
            compiler.compile(&FilterNode::leaf("a", "bogus", "x")),
            Err(FilterError::UnknownOperator {
                field: "a".to_string(),
                operator: "bogus".to_string(),
            })
        );
        // Empty names still mean "use the default".
        assert!(compiler.compile(&FilterNode::leaf("a", "", "x")).is_ok());
    }

    #[test]
    fn test_registry_without_default() {
        let mut registry = OperatorRegistry::new();
        registry.register(crate::BuiltinOperator::Gte, &["gte"]);
        let compiler = Compiler::with_registry(Arc::new(registry));

        assert!(compiler.compile(&FilterNode::leaf("a", "gte", 1)).is_ok());
        assert_eq!(
            compiler.compile(&FilterNode::leaf("a", "eq", 1)),
            Err(FilterError::NoDefaultOperator)
        );
    }

    #[test]
    fn test_pre_parse_short_circuits() {
        let compiler = Compiler::new()
            .with_pre_parse(|leaf| {
                (leaf.field == "status").then(|| doc! { "status": true })
            })
            .with_pre_parse(|_| Some(doc! { "never": "reached" }));

        let filter = compiler
            .compile(&FilterNode::leaf("status", "eq", "true"))
            .unwrap();
        assert_eq!(filter, doc! { "status": true });

        let other = compiler.compile_leaf(&Leaf::new("name", "eq", "x")).unwrap();
        assert_eq!(other, doc! { "never": "reached" });
    }

    #[test]
    fn test_max_depth() {
        let tree = FilterNode::and([FilterNode::or([FilterNode::leaf("a", "eq", 1)])]);
        assert_eq!(tree.depth(), 3);

        let at_limit = Compiler::new().with_config(CompilerConfig::new().with_max_depth(3));
        assert!(at_limit.compile(&tree).is_ok());

        let below = Compiler::new().with_config(CompilerConfig::new().with_max_depth(2));
        assert_eq!(
            below.compile(&tree),
            Err(FilterError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_compile_many_preserves_order() {
        let trees: Vec<FilterNode> = (0..32)
            .map(|i| FilterNode::leaf(format!("f{i}"), "eq", i))
            .collect();

        let results = Compiler::new().compile_many(&trees);
        assert_eq!(results.len(), 32);
        for (i, result) in results.into_iter().enumerate() {
            let expected = doc! { format!("f{i}"): { "$eq": i as i32 } };
            assert_eq!(result.unwrap(), expected);
        }
    }

    #[test]
    fn test_branch_key_follows_logic() {
        let compiler = Compiler::new();
        for (logic, key) in [(Logic::And, "$and"), (Logic::Or, "$or")] {
            let tree = FilterNode::Branch {
                logic,
                filters: vec![FilterNode::leaf("a", "eq", 1)],
            };
            let filter = compiler.compile(&tree).unwrap();
            assert!(filter.contains_key(key));
        }
    }

    #[test]
    fn test_same_tree_under_two_dialects() {
        let tree = FilterNode::and([
            FilterNode::leaf("status", "exists", "true"),
            FilterNode::or([
                FilterNode::leaf("name", "eq", "ann"),
                FilterNode::leaf("name", "neq", "bob"),
            ]),
        ]);
        let sort = compile_sort(&[SortSpec::desc("name"), SortSpec::asc("_id")]);

        let mongo = Compiler::new();
        assert_eq!(mongo.dialect().name(), "mongo");
        assert_eq!(
            mongo.compile(&tree).unwrap(),
            doc! { "$and": [
                { "status": { "$exists": true } },
                { "$or": [
                    { "name": { "$eq": "ann" } },
                    { "name": { "$ne": "bob" } },
                ] },
            ] }
        );
        assert_eq!(
            mongo.render_sort(&sort),
            Bson::Document(doc! { "name": -1, "_id": 1 })
        );

        let dbox = Compiler::new().with_dialect(Arc::new(DboxDialect));
        assert_eq!(dbox.dialect().name(), "dbox");
        assert_eq!(
            dbox.compile(&tree).unwrap(),
            doc! { "op": "$and", "items": [
                { "field": "status", "op": "$eq", "value": { "$exists": true } },
                { "op": "$or", "items": [
                    { "field": "name", "op": "$eq", "value": "ann" },
                    { "field": "name", "op": "$ne", "value": "bob" },
                ] },
            ] }
        );
        assert_eq!(
            dbox.render_sort(&sort),
            Bson::Array(vec![Bson::from("-name"), Bson::from("_id")])
        );
    }

    #[test]
    fn test_leaf_hook_runs_before_compiler_hooks() {
        let compiler = Compiler::new().with_pre_parse(|_| Some(doc! { "from": "compiler" }));

        let mut tree = FilterNode::and([
            FilterNode::leaf("status", "eq", "true"),
            FilterNode::leaf("name", "eq", "x"),
        ]);
        if let FilterNode::Branch { filters, .. } = &mut tree {
            filters[0].before_parse(|_| Some(doc! { "from": "leaf" }));
        }

        assert_eq!(
            compiler.compile(&tree).unwrap(),
            doc! { "$and": [{ "from": "leaf" }, { "from": "compiler" }] }
        );
    }

    #[test]
    fn test_empty_leaf_hook_falls_through() {
        let mut node = FilterNode::leaf("name", "eq", "x");
        node.before_parse(|_| None)
            .before_parse(|_| Some(Document::new()));

        assert_eq!(
            Compiler::new().compile(&node).unwrap(),
            doc! { "name": { "$eq": "x" } }
        );
    }

    #[test]
    fn test_compiler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Compiler>();
    }
}
