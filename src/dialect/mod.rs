//! Target query dialects.
//!
//! The compiler walks the tree and resolves leaves the same way for every
//! backend. What differs between backends is the output shape, and a
//! [`Dialect`] owns exactly those parts:
//!
//! - the operator registry that turns a leaf into a fragment
//! - how compiled children are joined under an `and`/`or` branch
//! - how a compiled [`SortOrder`] is rendered for the driver
//!
//! [`MongoDialect`] is the default. [`DboxDialect`] emits the
//! `{field, op, value}` filter objects used by dbox-style query layers.
//!
//! # Example
//! ```rust
//! use filtertree::dialect::DboxDialect;
//! use filtertree::{doc, Compiler, FilterNode};
//! use std::sync::Arc;
//!
//! let compiler = Compiler::new().with_dialect(Arc::new(DboxDialect));
//! let filter = compiler.compile(&FilterNode::leaf("name", "eq", "ann"))?;
//! assert_eq!(filter, doc! { "field": "name", "op": "$eq", "value": "ann" });
//! # Ok::<(), filtertree::FilterError>(())
//! ```

mod dbox;
mod mongo;

pub use dbox::{dbox_registry, DboxDialect, DboxOperator};
pub use mongo::MongoDialect;

use crate::compiler::sort::SortOrder;
use crate::document::{Bson, Document};
use crate::ir::Logic;
use crate::operator::OperatorRegistry;
use std::fmt;
use std::sync::Arc;

/// Output conventions of one query backend.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Operators for this backend. A compiler built with
    /// [`Compiler::with_dialect`](crate::Compiler::with_dialect) starts from
    /// this registry.
    fn registry(&self) -> Arc<OperatorRegistry>;

    /// Join the compiled children of a non-empty branch.
    fn combine(&self, logic: Logic, children: Vec<Document>) -> Document;

    /// Render compiled sort keys in the form the backend's driver takes.
    fn render_sort(&self, sort: &SortOrder) -> Bson;
}

/// Shared handle to a dialect.
pub type DialectRef = Arc<dyn Dialect>;
