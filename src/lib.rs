//! # filtertree
//!
//! Compiles the filter trees and sort lists posted by data-grid front-ends
//! into MongoDB-style query documents.
//!
//! A filter tree is a recursive structure of `field operator value` clauses
//! joined by `and`/`or`. The crate walks that tree, resolves each clause's
//! operator through a pluggable, case-insensitive registry, and produces an
//! ordered [`bson`] [`Document`] a MongoDB driver can take as its filter
//! argument. Other backends plug in through a [`Dialect`]. The crate never
//! talks to a database.
//!
//! ## Quick Start
//!
//! ### Basic Usage
//!
//! ```rust
//! use filtertree::{doc, Compiler, FilterNode, SortSpec};
//!
//! let compiler = Compiler::new();
//!
//! let tree = FilterNode::or([
//!     FilterNode::leaf("_id", "eq", "val"),
//!     FilterNode::leaf("_id", "doesnotcontain", "val"),
//! ]);
//! let filter = compiler.compile(&tree)?;
//! let sort = compiler.compile_sort(&[SortSpec::new("foo", "DESC"), SortSpec::asc("bar")]);
//!
//! assert_eq!(sort.to_document(), doc! { "foo": -1, "bar": 1 });
//! println!("{}", filtertree::document::document_to_json(&filter));
//! # Ok::<(), filtertree::FilterError>(())
//! ```
//!
//! ### Decoding a Grid Request
//!
//! ```rust
//! use filtertree::{Compiler, DataRequest};
//!
//! let request = DataRequest::from_json_str(r#"{
//!     "filter": {
//!         "logic": "and",
//!         "filters": [
//!             { "field": "name", "operator": "contains", "value": "ann", "ignoreCase": true },
//!             { "field": "age", "operator": "between", "values": [18, 65] }
//!         ]
//!     },
//!     "sort": [ { "field": "name", "dir": "asc" } ],
//!     "skip": 0,
//!     "take": 20
//! }"#)?;
//!
//! let query = Compiler::new().compile_request(&request)?;
//! assert_eq!(query.limit, Some(20));
//! # Ok::<(), filtertree::FilterError>(())
//! ```
//!
//! ### Rewriting Before Compilation
//!
//! ```rust
//! use filtertree::{Compiler, FieldMapping, FilterNode, Pipeline};
//!
//! let mut mapping = FieldMapping::new();
//! mapping.add_mapping("id".to_string(), "_id".to_string());
//!
//! let pipeline = Pipeline::new()
//!     .map_fields(str::to_lowercase)
//!     .with_field_mapping(mapping);
//!
//! let mut tree = FilterNode::leaf("ID", "eq", "42");
//! let filter = pipeline.run(&Compiler::new(), &mut tree)?;
//! assert!(filter.contains_key("_id"));
//! # Ok::<(), filtertree::FilterError>(())
//! ```
//!
//! ### Strict Mode
//!
//! The default configuration never fails on malformed input: unknown
//! operators fall back to `eq`, unparsable dates become the zero timestamp,
//! and so on. [`CompilerConfig::strict`] turns each of those fallbacks into a
//! [`FilterError`].

pub mod compiler;
pub mod config;
pub mod dialect;
pub mod document;
pub mod error;
pub mod ir;
pub mod operator;
pub mod request;

// Compiler and pipeline
pub use compiler::{compile_sort, Compiler, FieldMapping, Pipeline, PreParseHook, SortOrder};

// Configuration
pub use config::{CompilerConfig, FallbackPolicy, OnInvalid};

// Core types and errors
pub use dialect::{DboxDialect, Dialect, DialectRef, MongoDialect};
pub use document::{doc, Bson, Document, Regex, Value};
pub use error::{FilterError, Result};
pub use ir::{FilterNode, Leaf, Logic, SortDirection, SortSpec};
pub use request::{CompiledQuery, DataRequest};

// Operator system
pub use operator::{default_registry, BuiltinOperator, Operator, OperatorRef, OperatorRegistry};
