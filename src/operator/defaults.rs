//! Built-in operators and their aliases.

use crate::config::FallbackPolicy;
use crate::document::{datetime, doc, Bson, Document};
use crate::error::Result;
use crate::ir::Leaf;
use crate::operator::coerce::{
    bool_operand, bound_operand, date_operand, regex_contains, regex_exact_ci,
};
use crate::operator::registry::OperatorRegistry;
use crate::operator::types::Operator;
use std::sync::Arc;

/// The built-in operator set.
///
/// | Operator | Aliases | Fragment |
/// |----------|---------|----------|
/// | `Equal` (default) | eq, equal | `{f: {$eq: v}}`, or an anchored `i` regex when ignoring case and `v` is not null |
/// | `NotEqual` | ne, neq, notequal | `{f: {$ne: v}}` |
/// | `Contain` | contain(s), include(s) | `{f: /escaped/}` |
/// | `NotContain` | notcontain(s), doesnotcontain(s), notinclude(s), doesnotinclude(s) | `{f: {$not: /escaped/}}` |
/// | `In` | in | `{f: {$in: values}}` |
/// | `Gte` / `Lte` | gte / lte | `{f: {$gte/$lte: v}}` |
/// | `GteDate` / `LteDate` | gtedate / ltedate | as above with `v` parsed as RFC 3339 |
/// | `Exists` | exist, exists | `{f: {$exists: bool(v)}}` |
/// | `Between` | between | `{f: {$gte: values[0], $lte: values[1]}}` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOperator {
    Equal,
    NotEqual,
    Contain,
    NotContain,
    In,
    Gte,
    Lte,
    GteDate,
    LteDate,
    Exists,
    Between,
}

impl BuiltinOperator {
    pub const ALL: [BuiltinOperator; 11] = [
        BuiltinOperator::Equal,
        BuiltinOperator::NotEqual,
        BuiltinOperator::Contain,
        BuiltinOperator::NotContain,
        BuiltinOperator::In,
        BuiltinOperator::Gte,
        BuiltinOperator::Lte,
        BuiltinOperator::GteDate,
        BuiltinOperator::LteDate,
        BuiltinOperator::Exists,
        BuiltinOperator::Between,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            BuiltinOperator::Equal => &["eq", "equal"],
            BuiltinOperator::NotEqual => &["ne", "neq", "notequal"],
            BuiltinOperator::Contain => &["contain", "contains", "include", "includes"],
            BuiltinOperator::NotContain => &[
                "notcontain",
                "notcontains",
                "doesnotcontain",
                "doesnotcontains",
                "notinclude",
                "notincludes",
                "doesnotinclude",
                "doesnotincludes",
            ],
            BuiltinOperator::In => &["in"],
            BuiltinOperator::Gte => &["gte"],
            BuiltinOperator::Lte => &["lte"],
            BuiltinOperator::GteDate => &["gtedate"],
            BuiltinOperator::LteDate => &["ltedate"],
            BuiltinOperator::Exists => &["exist", "exists"],
            BuiltinOperator::Between => &["between"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinOperator::Equal => "equal",
            BuiltinOperator::NotEqual => "notequal",
            BuiltinOperator::Contain => "contain",
            BuiltinOperator::NotContain => "notcontain",
            BuiltinOperator::In => "in",
            BuiltinOperator::Gte => "gte",
            BuiltinOperator::Lte => "lte",
            BuiltinOperator::GteDate => "gtedate",
            BuiltinOperator::LteDate => "ltedate",
            BuiltinOperator::Exists => "exists",
            BuiltinOperator::Between => "between",
        }
    }
}

/// `{field: {op: value}}`
fn condition(field: &str, op: &str, value: impl Into<Bson>) -> Document {
    let value: Bson = value.into();
    doc! { field: { op: value } }
}

impl Operator for BuiltinOperator {
    fn apply(&self, leaf: &Leaf, policy: &FallbackPolicy) -> Result<Document> {
        let field = leaf.field.as_str();

        let fragment = match self {
            // A null operand has no text to match, so it stays an `$eq: null`.
            BuiltinOperator::Equal if leaf.ignore_case && leaf.value != Bson::Null => {
                doc! { field: regex_exact_ci(&leaf.value_text()) }
            }
            BuiltinOperator::Equal => condition(field, "$eq", leaf.value.clone()),
            BuiltinOperator::NotEqual => condition(field, "$ne", leaf.value.clone()),
            BuiltinOperator::Contain => {
                doc! { field: regex_contains(&leaf.value_text(), leaf.ignore_case) }
            }
            BuiltinOperator::NotContain => condition(
                field,
                "$not",
                regex_contains(&leaf.value_text(), leaf.ignore_case),
            ),
            BuiltinOperator::In => condition(field, "$in", leaf.values.clone()),
            BuiltinOperator::Gte => condition(field, "$gte", leaf.value.clone()),
            BuiltinOperator::Lte => condition(field, "$lte", leaf.value.clone()),
            BuiltinOperator::GteDate => {
                condition(field, "$gte", datetime(date_operand(leaf, policy)?))
            }
            BuiltinOperator::LteDate => {
                condition(field, "$lte", datetime(date_operand(leaf, policy)?))
            }
            BuiltinOperator::Exists => condition(field, "$exists", bool_operand(leaf, policy)?),
            BuiltinOperator::Between => between(leaf, policy)?,
        };

        Ok(fragment)
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

/// Bounds absent from `values` (or null) leave that side unconstrained. With
/// neither bound the clause matches everything and compiles to `{}`.
fn between(leaf: &Leaf, policy: &FallbackPolicy) -> Result<Document> {
    let mut range = Document::new();
    if let Some(lower) = bound_operand(leaf, 0, "lower", policy)? {
        range.insert("$gte", lower);
    }
    if let Some(upper) = bound_operand(leaf, 1, "upper", policy)? {
        range.insert("$lte", upper);
    }

    if range.is_empty() {
        return Ok(Document::new());
    }
    Ok(doc! { leaf.field.as_str(): range })
}

/// Install the built-in operators into `registry`, with `Equal` as default.
pub fn register_defaults(registry: &mut OperatorRegistry) {
    for op in BuiltinOperator::ALL {
        let shared: Arc<dyn Operator> = Arc::new(op);
        if op == BuiltinOperator::Equal {
            registry.set_default_shared(shared.clone());
        }
        registry.register_shared(shared, op.aliases());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnInvalid;
    use crate::document::bson_regex;
    use crate::error::FilterError;
    use crate::operator::coerce::zero_timestamp;
    use chrono::{TimeZone, Utc};

    fn apply(op: BuiltinOperator, leaf: &Leaf) -> Document {
        op.apply(leaf, &FallbackPolicy::default()).unwrap()
    }

    #[test]
    fn test_equal() {
        let leaf = Leaf::new("_id", "eq", "val");
        assert_eq!(
            apply(BuiltinOperator::Equal, &leaf),
            doc! { "_id": { "$eq": "val" } }
        );
    }

    #[test]
    fn test_equal_ignore_case() {
        let leaf = Leaf::new("name", "eq", "John.Doe").ignore_case(true);
        assert_eq!(
            apply(BuiltinOperator::Equal, &leaf),
            doc! { "name": bson_regex(r"^john\.doe$", "i") }
        );
    }

    #[test]
    fn test_equal_ignore_case_null_value() {
        let leaf = Leaf::new("deleted_at", "eq", Bson::Null).ignore_case(true);
        assert_eq!(
            apply(BuiltinOperator::Equal, &leaf),
            doc! { "deleted_at": { "$eq": Bson::Null } }
        );
    }

    #[test]
    fn test_not_equal_keeps_raw_value() {
        let leaf = Leaf::new("count", "ne", 3);
        assert_eq!(
            apply(BuiltinOperator::NotEqual, &leaf),
            doc! { "count": { "$ne": 3 } }
        );
    }

    #[test]
    fn test_contain() {
        let leaf = Leaf::new("title", "contains", "a+b");
        assert_eq!(
            apply(BuiltinOperator::Contain, &leaf),
            doc! { "title": bson_regex(r"a\+b", "") }
        );

        let leaf = leaf.ignore_case(true);
        assert_eq!(
            apply(BuiltinOperator::Contain, &leaf),
            doc! { "title": bson_regex(r"a\+b", "i") }
        );
    }

    #[test]
    fn test_not_contain() {
        let leaf = Leaf::new("title", "doesnotcontain", "Draft").ignore_case(true);
        assert_eq!(
            apply(BuiltinOperator::NotContain, &leaf),
            doc! { "title": { "$not": bson_regex("draft", "i") } }
        );
    }

    #[test]
    fn test_in() {
        let leaf = Leaf::with_list("status", "in", ["open", "closed"]);
        assert_eq!(
            apply(BuiltinOperator::In, &leaf),
            doc! { "status": { "$in": ["open", "closed"] } }
        );
    }

    #[test]
    fn test_gte_lte() {
        let leaf = Leaf::new("_id", "gte", "val");
        assert_eq!(
            apply(BuiltinOperator::Gte, &leaf),
            doc! { "_id": { "$gte": "val" } }
        );
        assert_eq!(
            apply(BuiltinOperator::Lte, &leaf),
            doc! { "_id": { "$lte": "val" } }
        );
    }

    #[test]
    fn test_date_operators() {
        let leaf = Leaf::new("time", "gtedate", "2020-01-02T03:04:05Z");
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            apply(BuiltinOperator::GteDate, &leaf),
            doc! { "time": { "$gte": datetime(expected) } }
        );

        let leaf = Leaf::new("time", "ltedate", "2006-01-02T15:04:05Z07:00");
        assert_eq!(
            apply(BuiltinOperator::LteDate, &leaf),
            doc! { "time": { "$lte": datetime(zero_timestamp()) } }
        );
    }

    #[test]
    fn test_exists() {
        let leaf = Leaf::new("deleted_at", "exists", "true");
        assert_eq!(
            apply(BuiltinOperator::Exists, &leaf),
            doc! { "deleted_at": { "$exists": true } }
        );

        let leaf = Leaf::new("deleted_at", "exists", "definitely");
        assert_eq!(
            apply(BuiltinOperator::Exists, &leaf),
            doc! { "deleted_at": { "$exists": false } }
        );
    }

    #[test]
    fn test_between() {
        let leaf = Leaf::with_list("age", "between", [18, 65]);
        assert_eq!(
            apply(BuiltinOperator::Between, &leaf),
            doc! { "age": { "$gte": 18, "$lte": 65 } }
        );
    }

    #[test]
    fn test_between_missing_bounds() {
        let leaf = Leaf::with_list("age", "between", [18]);
        assert_eq!(
            apply(BuiltinOperator::Between, &leaf),
            doc! { "age": { "$gte": 18 } }
        );

        let leaf = Leaf::with_list("age", "between", [Bson::Null, Bson::Int32(65)]);
        assert_eq!(
            apply(BuiltinOperator::Between, &leaf),
            doc! { "age": { "$lte": 65 } }
        );

        let leaf = Leaf::new("age", "between", Bson::Null);
        assert_eq!(apply(BuiltinOperator::Between, &leaf), Document::new());
    }

    #[test]
    fn test_between_rejects_missing_bound() {
        let policy = FallbackPolicy {
            missing_bound: OnInvalid::Reject,
            ..Default::default()
        };
        let leaf = Leaf::with_list("age", "between", [18]);

        assert_eq!(
            BuiltinOperator::Between.apply(&leaf, &policy),
            Err(FilterError::MissingBound {
                field: "age".to_string(),
                bound: "upper",
            })
        );
    }

    #[test]
    fn test_register_defaults() {
        let mut registry = OperatorRegistry::new();
        register_defaults(&mut registry);

        let alias_count: usize = BuiltinOperator::ALL.iter().map(|op| op.aliases().len()).sum();
        assert_eq!(registry.len(), alias_count);
        assert!(registry.has_default());
        assert_eq!(registry.resolve("").map(|op| op.name()), Some("equal"));
        assert_eq!(
            registry.resolve("DoesNotContain").map(|op| op.name()),
            Some("notcontain")
        );
    }
}
