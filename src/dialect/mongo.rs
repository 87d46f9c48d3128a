//! MongoDB query documents.

use crate::compiler::sort::SortOrder;
use crate::dialect::Dialect;
use crate::document::{doc, Bson, Document};
use crate::ir::Logic;
use crate::operator::{default_registry, OperatorRegistry};
use std::sync::Arc;

/// Branches compile to `{"$and": [...]}` or `{"$or": [...]}`, leaves use the
/// built-in operators and sort keys render as a `{field: 1 | -1}` document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MongoDialect;

impl Dialect for MongoDialect {
    fn name(&self) -> &str {
        "mongo"
    }

    fn registry(&self) -> Arc<OperatorRegistry> {
        default_registry()
    }

    fn combine(&self, logic: Logic, children: Vec<Document>) -> Document {
        let key = match logic {
            Logic::And => "$and",
            Logic::Or => "$or",
        };
        doc! { key: children }
    }

    fn render_sort(&self, sort: &SortOrder) -> Bson {
        Bson::Document(sort.to_document())
    }
}
