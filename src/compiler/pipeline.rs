//! Ordered pre-compile transformation pipeline.
//!
//! A [`Pipeline`] bundles the three kinds of caller hooks and applies them in
//! a fixed order:
//!
//! 1. every field transform, tree-wide, in registration order
//! 2. every leaf transform, tree-wide, in registration order
//! 3. compilation, with the pipeline's pre-parse hooks consulted after each
//!    leaf's own hooks and the compiler's
//!
//! Field names seen by leaf transforms and hooks are therefore already
//! rewritten.

use crate::compiler::field_mapping::FieldMapping;
use crate::compiler::hooks::{FieldTransformFn, LeafTransformFn, PreParseHook};
use crate::compiler::Compiler;
use crate::document::Document;
use crate::error::Result;
use crate::ir::{FilterNode, Leaf};
use crate::request::{CompiledQuery, DataRequest};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Reusable set of field transforms, leaf transforms and pre-parse hooks.
///
/// # Example
/// ```rust
/// use filtertree::operator::coerce::string_to_bool;
/// use filtertree::{doc, Compiler, FilterNode, Pipeline};
///
/// let pipeline = Pipeline::new()
///     .map_fields(str::to_lowercase)
///     .map_leaves(|leaf| {
///         if leaf.field == "id" {
///             leaf.field = "_id".to_string();
///         }
///     })
///     .before_parse(|leaf| {
///         (leaf.field == "status")
///             .then(|| doc! { "status": string_to_bool(&leaf.value_text(), false) })
///     });
///
/// let mut tree = FilterNode::and([
///     FilterNode::leaf("ID", "eq", "val"),
///     FilterNode::leaf("STATUS", "eq", "true"),
/// ]);
/// let filter = pipeline.run(&Compiler::new(), &mut tree)?;
///
/// assert_eq!(
///     filter,
///     doc! { "$and": [
///         { "_id": { "$eq": "val" } },
///         { "status": true },
///     ] }
/// );
/// # Ok::<(), filtertree::FilterError>(())
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    field_transforms: Vec<FieldTransformFn>,
    leaf_transforms: Vec<LeafTransformFn>,
    pre_parse: Vec<PreParseHook>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field-name rewrite.
    pub fn map_fields<F>(mut self, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.field_transforms.push(Arc::new(rewrite));
        self
    }

    /// Add a table-driven field rename.
    pub fn with_field_mapping(self, mapping: FieldMapping) -> Self {
        self.map_fields(move |field| mapping.normalize_field(field))
    }

    /// Add an in-place leaf rewrite.
    pub fn map_leaves<F>(mut self, mutate: F) -> Self
    where
        F: Fn(&mut Leaf) + Send + Sync + 'static,
    {
        self.leaf_transforms.push(Arc::new(mutate));
        self
    }

    /// Add a pre-parse override for every leaf the pipeline compiles.
    pub fn before_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Leaf) -> Option<Document> + Send + Sync + 'static,
    {
        self.pre_parse.push(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_transforms.is_empty()
            && self.leaf_transforms.is_empty()
            && self.pre_parse.is_empty()
    }

    /// Apply the field and leaf transforms to `tree` in place.
    pub fn prepare<'a>(&self, tree: &'a mut FilterNode) -> &'a mut FilterNode {
        for rewrite in &self.field_transforms {
            tree.transform_all_field(|field| rewrite(field));
        }
        for mutate in &self.leaf_transforms {
            tree.transform_all(|leaf| mutate(leaf));
        }
        trace!(
            field_transforms = self.field_transforms.len(),
            leaf_transforms = self.leaf_transforms.len(),
            "prepared filter tree"
        );
        tree
    }

    /// Rewrite a field name with every field transform, in order.
    pub fn map_field(&self, field: &str) -> String {
        self.field_transforms
            .iter()
            .fold(field.to_string(), |current, rewrite| rewrite(&current))
    }

    /// Prepare `tree` and compile it.
    pub fn run(&self, compiler: &Compiler, tree: &mut FilterNode) -> Result<Document> {
        self.prepare(tree);
        compiler.compile_with_hooks(tree, &self.pre_parse)
    }

    /// Prepare a decoded request and compile it.
    ///
    /// Field transforms also rename the sort keys, so a column renamed in the
    /// filter is sorted under the same stored name.
    pub fn run_request(
        &self,
        compiler: &Compiler,
        request: &mut DataRequest,
    ) -> Result<CompiledQuery> {
        if let Some(tree) = request.filter.as_mut() {
            self.prepare(tree);
        }
        for spec in &mut request.sort {
            spec.field = self.map_field(&spec.field);
        }
        compiler.compile_request_with_hooks(request, &self.pre_parse)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("field_transforms", &self.field_transforms.len())
            .field("leaf_transforms", &self.leaf_transforms.len())
            .field("pre_parse", &self.pre_parse.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::ir::SortSpec;

    #[test]
    fn test_empty_pipeline_matches_compiler() {
        let compiler = Compiler::new();
        let tree = FilterNode::or([
            FilterNode::leaf("a", "eq", 1),
            FilterNode::leaf("b", "contains", "x"),
        ]);

        let mut prepared = tree.clone();
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(
            pipeline.run(&compiler, &mut prepared).unwrap(),
            compiler.compile(&tree).unwrap()
        );
        assert_eq!(prepared, tree);
    }

    #[test]
    fn test_field_transforms_run_before_leaf_transforms() {
        // The leaf transform only matches the lower-cased name, so it sees the
        // result of the field transform even though it was added first.
        let pipeline = Pipeline::new()
            .map_leaves(|leaf| {
                if leaf.field == "id" {
                    leaf.field = "_id".to_string();
                }
            })
            .map_fields(str::to_lowercase);

        let mut tree = FilterNode::and([FilterNode::leaf("ID", "eq", "v")]);
        pipeline.prepare(&mut tree);
        assert_eq!(tree.leaves()[0].field, "_id");
    }

    #[test]
    fn test_field_transforms_compose_in_order() {
        let pipeline = Pipeline::new()
            .map_fields(|f| format!("{f}_a"))
            .map_fields(|f| format!("{f}_b"));

        assert_eq!(pipeline.map_field("x"), "x_a_b");
    }

    #[test]
    fn test_compiler_hooks_run_before_pipeline_hooks() {
        let compiler = Compiler::new().with_pre_parse(|_| Some(doc! { "from": "compiler" }));
        let pipeline = Pipeline::new().before_parse(|_| Some(doc! { "from": "pipeline" }));

        let mut tree = FilterNode::leaf("a", "eq", 1);
        assert_eq!(
            pipeline.run(&compiler, &mut tree).unwrap(),
            doc! { "from": "compiler" }
        );
    }

    #[test]
    fn test_leaf_hooks_run_before_pipeline_hooks() {
        let pipeline = Pipeline::new()
            .map_fields(str::to_lowercase)
            .before_parse(|_| Some(doc! { "from": "pipeline" }));

        let mut tree = FilterNode::or([
            FilterNode::leaf("A", "eq", 1),
            FilterNode::leaf("B", "eq", 2),
        ]);
        tree.before_parse_all(|leaf| {
            (leaf.field == "a").then(|| doc! { "from": "leaf" })
        });

        // Leaf hooks see the renamed field because transforms run first.
        assert_eq!(
            pipeline.run(&Compiler::new(), &mut tree).unwrap(),
            doc! { "$or": [{ "from": "leaf" }, { "from": "pipeline" }] }
        );
    }

    #[test]
    fn test_field_mapping_stage() {
        let mapping: FieldMapping = [("id", "_id")].into_iter().collect();
        let pipeline = Pipeline::new().with_field_mapping(mapping);

        let mut tree = FilterNode::leaf("id", "eq", "v");
        let filter = pipeline.run(&Compiler::new(), &mut tree).unwrap();
        assert_eq!(filter, doc! { "_id": { "$eq": "v" } });
    }

    #[test]
    fn test_run_request_renames_sort_fields() {
        let pipeline = Pipeline::new().map_fields(str::to_lowercase);
        let mut request = DataRequest {
            filter: Some(FilterNode::leaf("Name", "eq", "x")),
            sort: vec![SortSpec::desc("Name")],
            ..Default::default()
        };

        let query = pipeline.run_request(&Compiler::new(), &mut request).unwrap();
        assert_eq!(query.filter, doc! { "name": { "$eq": "x" } });
        assert_eq!(query.sort.fields(), vec!["name"]);
        assert_eq!(query.sort.get("name"), Some(-1));
    }
}
