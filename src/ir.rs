//! Intermediate representation of a grid filter request.
//!
//! This module defines the filter tree and sort list consumed by the
//! [`Compiler`](crate::Compiler). Trees are plain owned values: build one per
//! request, optionally rewrite it, compile it, then drop it.

use crate::compiler::hooks::LeafHooks;
use crate::document::{value_text, Bson};
use std::fmt;

/// Boolean connective joining the children of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    /// Parse a connective, case-insensitively. Anything other than `or`
    /// (including empty text) is `And`.
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("or") {
            Logic::Or
        } else {
            Logic::And
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "and",
            Logic::Or => "or",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field operator value` clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    pub field: String,
    pub operator: String,
    /// Scalar operand; `Null` when the client sent none.
    pub value: Bson,
    /// List operand for `in` and `between`.
    pub values: Vec<Bson>,
    pub ignore_case: bool,
    /// Overrides attached to this leaf only; see [`FilterNode::before_parse`].
    pub(crate) hooks: LeafHooks,
}

impl Leaf {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// A leaf carrying a list operand instead of a scalar.
    pub fn with_list(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Text view of the scalar operand.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }
}

/// A node of the filter tree: either a branch of child clauses joined by a
/// [`Logic`] connective, or a single [`Leaf`] clause.
///
/// Serializes to and from the grid wire shape described in
/// [`request`](crate::request).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    from = "crate::request::WireFilter",
    into = "crate::request::WireFilter"
)]
pub enum FilterNode {
    Branch { logic: Logic, filters: Vec<FilterNode> },
    Leaf(Leaf),
}

impl FilterNode {
    pub fn and(filters: impl IntoIterator<Item = FilterNode>) -> Self {
        FilterNode::Branch {
            logic: Logic::And,
            filters: filters.into_iter().collect(),
        }
    }

    pub fn or(filters: impl IntoIterator<Item = FilterNode>) -> Self {
        FilterNode::Branch {
            logic: Logic::Or,
            filters: filters.into_iter().collect(),
        }
    }

    pub fn leaf(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        FilterNode::Leaf(Leaf::new(field, operator, value))
    }

    /// An empty `And` branch; compiles to a no-op filter.
    pub fn empty() -> Self {
        FilterNode::Branch {
            logic: Logic::And,
            filters: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, FilterNode::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            FilterNode::Leaf(leaf) => Some(leaf),
            FilterNode::Branch { .. } => None,
        }
    }

    /// Append a child clause. A leaf is first wrapped into an `And` branch
    /// holding the original leaf.
    pub fn push(&mut self, child: FilterNode) -> &mut Self {
        if let FilterNode::Leaf(_) = self {
            let leaf = std::mem::replace(self, FilterNode::empty());
            if let FilterNode::Branch { filters, .. } = self {
                filters.push(leaf);
            }
        }
        if let FilterNode::Branch { filters, .. } = self {
            filters.push(child);
        }
        self
    }

    /// Depth of the tree; a lone leaf or empty branch has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::Leaf(_) => 1,
            FilterNode::Branch { filters, .. } => {
                1 + filters.iter().map(FilterNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Visit every leaf in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            FilterNode::Leaf(leaf) => out.push(leaf),
            FilterNode::Branch { filters, .. } => {
                for child in filters {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl From<Leaf> for FilterNode {
    fn from(leaf: Leaf) -> Self {
        FilterNode::Leaf(leaf)
    }
}

/// Sort direction parsed from client text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive; anything other than `desc` sorts ascending.
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn order(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// One sort key as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub dir: String,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: dir.into(),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, "asc")
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, "desc")
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::parse(&self.dir)
    }
}
