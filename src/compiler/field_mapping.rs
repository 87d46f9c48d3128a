//! Field mapping configuration for renaming client field names.
//!
//! This module provides the [`FieldMapping`] struct, a table-driven field
//! transform for the common case where grid column names differ from the
//! stored document's field names.

use crate::ir::FilterNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Table of client field names to stored field names.
///
/// Fields without a mapping pass through unchanged.
///
/// # Examples
///
/// ```rust
/// use filtertree::compiler::FieldMapping;
///
/// let mut mapping = FieldMapping::new();
/// mapping.add_mapping("id".to_string(), "_id".to_string());
/// mapping.add_mapping("owner".to_string(), "meta.owner".to_string());
///
/// assert_eq!(mapping.normalize_field("id"), "_id");
/// assert_eq!(mapping.normalize_field("owner"), "meta.owner");
/// assert_eq!(mapping.normalize_field("UnmappedField"), "UnmappedField");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    field_map: HashMap<String, String>,
}

impl FieldMapping {
    /// Create a new empty field mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filtertree::compiler::FieldMapping;
    ///
    /// let mapping = FieldMapping::new();
    /// assert_eq!(mapping.mappings().len(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every entry of `mappings`, replacing existing ones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filtertree::compiler::FieldMapping;
    /// use std::collections::HashMap;
    ///
    /// let mut mapping = FieldMapping::new();
    /// let mut columns = HashMap::new();
    /// columns.insert("id".to_string(), "_id".to_string());
    /// columns.insert("created".to_string(), "meta.created_at".to_string());
    ///
    /// mapping.load_mappings(columns);
    /// assert_eq!(mapping.mappings().len(), 2);
    /// ```
    pub fn load_mappings(&mut self, mappings: HashMap<String, String>) {
        self.field_map.extend(mappings);
    }

    /// Add a single field mapping.
    pub fn add_mapping(&mut self, source_field: String, target_field: String) {
        self.field_map.insert(source_field, target_field);
    }

    /// Returns the mapped field name, or the original if no mapping exists.
    pub fn normalize_field(&self, field_name: &str) -> String {
        self.field_map
            .get(field_name)
            .cloned()
            .unwrap_or_else(|| field_name.to_string())
    }

    /// Check if a field mapping exists for the given field name.
    pub fn has_mapping(&self, field_name: &str) -> bool {
        self.field_map.contains_key(field_name)
    }

    /// Get all configured field mappings.
    pub fn mappings(&self) -> &HashMap<String, String> {
        &self.field_map
    }

    /// Rename every leaf field in `tree` that has a mapping.
    pub fn apply<'a>(&self, tree: &'a mut FilterNode) -> &'a mut FilterNode {
        tree.transform_all_field(|field| self.normalize_field(field))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            field_map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
