//! In-place rewrites of a filter tree before compilation.
//!
//! The `*_all` variants walk the whole tree; the others touch only the node
//! they are called on. All of them return the node so calls can be chained:
//!
//! ```rust
//! use filtertree::FilterNode;
//!
//! let mut tree = FilterNode::and([FilterNode::leaf("ID", "eq", "val")]);
//! tree.transform_all_field(str::to_lowercase)
//!     .transform_all(|leaf| {
//!         if leaf.field == "id" {
//!             leaf.field = "_id".to_string();
//!         }
//!     });
//!
//! assert_eq!(tree.leaves()[0].field, "_id");
//! ```

use crate::compiler::hooks::PreParseHook;
use crate::document::Document;
use crate::ir::{FilterNode, Leaf};
use std::sync::Arc;

impl FilterNode {
    /// Rewrite this node's field name if it is a leaf. Branches are left
    /// untouched.
    pub fn transform_field<F>(&mut self, rewrite: F) -> &mut Self
    where
        F: Fn(&str) -> String,
    {
        if let FilterNode::Leaf(leaf) = self {
            leaf.field = rewrite(&leaf.field);
        }
        self
    }

    /// Rewrite the field name of every leaf in the tree.
    pub fn transform_all_field<F>(&mut self, rewrite: F) -> &mut Self
    where
        F: Fn(&str) -> String,
    {
        self.for_each_leaf_mut(&mut |leaf| leaf.field = rewrite(&leaf.field));
        self
    }

    /// Mutate this node if it is a leaf.
    pub fn transform<F>(&mut self, mut mutate: F) -> &mut Self
    where
        F: FnMut(&mut Leaf),
    {
        if let FilterNode::Leaf(leaf) = self {
            mutate(leaf);
        }
        self
    }

    /// Mutate every leaf in the tree.
    pub fn transform_all<F>(&mut self, mut mutate: F) -> &mut Self
    where
        F: FnMut(&mut Leaf),
    {
        self.for_each_leaf_mut(&mut mutate);
        self
    }

    /// Attach a pre-parse override to this node if it is a leaf.
    ///
    /// The override travels with the leaf and is consulted before the
    /// compiler's and the pipeline's hooks.
    pub fn before_parse<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Leaf) -> Option<Document> + Send + Sync + 'static,
    {
        if let FilterNode::Leaf(leaf) = self {
            leaf.hooks.push(Arc::new(hook));
        }
        self
    }

    /// Attach a pre-parse override to every leaf currently in the tree.
    pub fn before_parse_all<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Leaf) -> Option<Document> + Send + Sync + 'static,
    {
        let hook: PreParseHook = Arc::new(hook);
        self.for_each_leaf_mut(&mut |leaf| leaf.hooks.push(hook.clone()));
        self
    }

    fn for_each_leaf_mut(&mut self, visit: &mut dyn FnMut(&mut Leaf)) {
        match self {
            FilterNode::Leaf(leaf) => visit(leaf),
            FilterNode::Branch { filters, .. } => {
                for child in filters {
                    child.for_each_leaf_mut(visit);
                }
            }
        }
    }
}
