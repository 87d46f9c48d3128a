//! Grid request decoding.
//!
//! Data-grid front-ends post their filter, sort and paging state as one JSON
//! payload:
//!
//! ```json
//! {
//!   "filter": {
//!     "logic": "and",
//!     "filters": [
//!       { "field": "name", "operator": "contains", "value": "ann", "ignoreCase": true },
//!       { "logic": "or", "filters": [ ... ] }
//!     ]
//!   },
//!   "sort": [ { "field": "name", "dir": "desc" } ],
//!   "skip": 0,
//!   "take": 20
//! }
//! ```
//!
//! Operand values are decoded as plain JSON and converted to BSON, so an
//! object value such as `{"$regex": ...}` stays a literal document.
//!
//! On the wire a node may carry both child filters and leaf fields. A node
//! with a non-empty `filters` list is a branch and its leaf fields are
//! ignored. A node with neither children nor a field is an empty branch.

use crate::compiler::sort::SortOrder;
use crate::document::{from_json, to_json, Document};
use crate::error::{FilterError, Result};
use crate::ir::{FilterNode, Leaf, Logic, SortSpec};
use serde::{Deserialize, Serialize};

/// Wire shape of one filter node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WireFilter {
    #[serde(skip_serializing_if = "String::is_empty")]
    logic: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<WireFilter>,
    #[serde(skip_serializing_if = "String::is_empty")]
    field: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    operator: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    value: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignore_case: bool,
}

impl From<WireFilter> for FilterNode {
    fn from(wire: WireFilter) -> Self {
        if !wire.filters.is_empty() || wire.field.is_empty() {
            return FilterNode::Branch {
                logic: Logic::parse(&wire.logic),
                filters: wire.filters.into_iter().map(FilterNode::from).collect(),
            };
        }

        FilterNode::Leaf(Leaf {
            field: wire.field,
            operator: wire.operator,
            value: from_json(wire.value),
            values: wire.values.into_iter().map(from_json).collect(),
            ignore_case: wire.ignore_case,
            ..Default::default()
        })
    }
}

impl From<FilterNode> for WireFilter {
    fn from(node: FilterNode) -> Self {
        match node {
            FilterNode::Branch { logic, filters } => WireFilter {
                logic: logic.as_str().to_string(),
                filters: filters.into_iter().map(WireFilter::from).collect(),
                ..Default::default()
            },
            FilterNode::Leaf(leaf) => WireFilter {
                field: leaf.field,
                operator: leaf.operator,
                value: to_json(&leaf.value),
                values: leaf.values.iter().map(to_json).collect(),
                ignore_case: leaf.ignore_case,
                ..Default::default()
            },
        }
    }
}

/// A decoded grid request.
///
/// `skip`/`take` take precedence over `page`/`pageSize`. Pages are numbered
/// from 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl DataRequest {
    /// Decode a request from its JSON payload.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a request from an already parsed JSON value.
    pub fn from_json_value(json: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(json)?)
    }

    /// Decode a request from YAML, for fixtures and saved views.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| FilterError::InvalidRequest(e.to_string()))
    }

    /// Number of documents to skip.
    pub fn offset(&self) -> Option<u64> {
        if self.skip.is_some() {
            return self.skip;
        }
        match (self.page, self.page_size) {
            (Some(page), Some(size)) => Some(page.saturating_sub(1).saturating_mul(size)),
            _ => None,
        }
    }

    /// Maximum number of documents to return.
    pub fn limit(&self) -> Option<u64> {
        self.take.or(self.page_size)
    }
}

/// Output of [`Compiler::compile_request`](crate::Compiler::compile_request).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// Filter document; empty when the request had no filter
    pub filter: Document,
    /// Sort keys in request order
    pub sort: SortOrder,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}
