//! dbox-style filter objects.
//!
//! Every clause is a `{field, op, value}` object and every branch an
//! `{op, items}` object, so the output can be handed to query layers that
//! take a structured filter instead of a raw MongoDB document. Conditions
//! with no dedicated dbox operator are written as `$eq` against a raw
//! condition value.

use crate::compiler::sort::SortOrder;
use crate::config::FallbackPolicy;
use crate::dialect::Dialect;
use crate::document::{datetime, doc, Bson, Document};
use crate::error::Result;
use crate::ir::{Leaf, Logic};
use crate::operator::coerce::{bool_operand, bound_operand, date_operand};
use crate::operator::{BuiltinOperator, Operator, OperatorRegistry};
use std::sync::{Arc, OnceLock};

static DBOX_REGISTRY: OnceLock<Arc<OperatorRegistry>> = OnceLock::new();

/// The process-wide registry of dbox operators, built on first use.
pub fn dbox_registry() -> Arc<OperatorRegistry> {
    DBOX_REGISTRY
        .get_or_init(|| {
            let mut registry = OperatorRegistry::new();
            for op in BuiltinOperator::ALL {
                let shared: Arc<dyn Operator> = Arc::new(DboxOperator(op));
                if op == BuiltinOperator::Equal {
                    registry.set_default_shared(shared.clone());
                }
                registry.register_shared(shared, op.aliases());
            }
            Arc::new(registry)
        })
        .clone()
}

/// `{field, op, value}`
fn filter(field: &str, op: &str, value: impl Into<Bson>) -> Document {
    let value: Bson = value.into();
    doc! { "field": field, "op": op, "value": value }
}

fn group(op: &str, items: Vec<Document>) -> Document {
    doc! { "op": op, "items": items }
}

/// A built-in operator rendered as dbox filter objects.
///
/// Aliases and the default match the built-in set. `ignoreCase` is not
/// applied: dbox matches text with its own collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DboxOperator(pub BuiltinOperator);

impl Operator for DboxOperator {
    fn apply(&self, leaf: &Leaf, policy: &FallbackPolicy) -> Result<Document> {
        let field = leaf.field.as_str();

        let fragment = match self.0 {
            BuiltinOperator::Equal => filter(field, "$eq", leaf.value.clone()),
            BuiltinOperator::NotEqual => filter(field, "$ne", leaf.value.clone()),
            BuiltinOperator::Contain => filter(field, "$contains", vec![leaf.value_text()]),
            BuiltinOperator::NotContain => {
                let pattern = regex::escape(&leaf.value_text());
                filter(
                    field,
                    "$eq",
                    doc! { "$ne": { "$regex": pattern, "$options": "i" } },
                )
            }
            BuiltinOperator::In => filter(field, "$in", leaf.values.clone()),
            BuiltinOperator::Gte => filter(field, "$gte", leaf.value.clone()),
            BuiltinOperator::Lte => filter(field, "$lte", leaf.value.clone()),
            BuiltinOperator::GteDate => {
                filter(field, "$gte", datetime(date_operand(leaf, policy)?))
            }
            BuiltinOperator::LteDate => {
                filter(field, "$lte", datetime(date_operand(leaf, policy)?))
            }
            BuiltinOperator::Exists => {
                filter(field, "$eq", doc! { "$exists": bool_operand(leaf, policy)? })
            }
            BuiltinOperator::Between => {
                let mut items = Vec::new();
                if let Some(lower) = bound_operand(leaf, 0, "lower", policy)? {
                    items.push(filter(field, "$gte", lower));
                }
                if let Some(upper) = bound_operand(leaf, 1, "upper", policy)? {
                    items.push(filter(field, "$lte", upper));
                }
                if items.is_empty() {
                    Document::new()
                } else {
                    group("$and", items)
                }
            }
        };

        Ok(fragment)
    }

    fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Branches compile to `{op: "$and" | "$or", items: [...]}` and sort keys
/// render as a list of field names, descending ones prefixed with `-`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DboxDialect;

impl Dialect for DboxDialect {
    fn name(&self) -> &str {
        "dbox"
    }

    fn registry(&self) -> Arc<OperatorRegistry> {
        dbox_registry()
    }

    fn combine(&self, logic: Logic, children: Vec<Document>) -> Document {
        let op = match logic {
            Logic::And => "$and",
            Logic::Or => "$or",
        };
        group(op, children)
    }

    fn render_sort(&self, sort: &SortOrder) -> Bson {
        sort.iter()
            .map(|(field, order)| {
                if order < 0 {
                    Bson::String(format!("-{field}"))
                } else {
                    Bson::String(field.to_string())
                }
            })
            .collect::<Vec<Bson>>()
            .into()
    }
}
