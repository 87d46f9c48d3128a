//! Sort list compilation.

use crate::document::{Bson, Document};
use crate::ir::{SortDirection, SortSpec};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::trace;

/// Compiled sort keys, one `(field, 1 | -1)` entry per requested key.
///
/// Entries keep the request order, and a field listed twice stays listed
/// twice. Use [`SortOrder::to_document`] when a driver wants a plain sort
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    entries: Vec<(String, i32)>,
}

impl SortOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.entries.push((field.into(), direction.order()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(field, order)| (field.as_str(), *order))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direction of the first entry for `field`.
    pub fn get(&self, field: &str) -> Option<i32> {
        self.iter()
            .find(|(name, _)| *name == field)
            .map(|(_, order)| order)
    }

    /// Sort fields in order, duplicates included.
    pub fn fields(&self) -> Vec<&str> {
        self.iter().map(|(field, _)| field).collect()
    }

    /// Render as an ordered `{field: 1 | -1}` document.
    ///
    /// A document holds each key once: a repeated field keeps its first
    /// position and takes its last direction.
    pub fn to_document(&self) -> Document {
        self.iter()
            .map(|(field, order)| (field.to_string(), Bson::Int32(order)))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for SortOrder {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field, order)| (field.into(), order))
                .collect(),
        }
    }
}

/// Serializes as an ordered map, writing a repeated field once per entry.
impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, order) in &self.entries {
            map.serialize_entry(field, order)?;
        }
        map.end()
    }
}

/// Compile sort keys into a [`SortOrder`].
///
/// Entries keep the input order. Directions are matched case-insensitively;
/// anything other than `desc` sorts ascending.
///
/// # Example
/// ```rust
/// use filtertree::{compile_sort, doc, SortSpec};
///
/// let sort = compile_sort(&[SortSpec::new("foo", "DESC"), SortSpec::new("bar", "ASC")]);
/// assert_eq!(sort.fields(), vec!["foo", "bar"]);
/// assert_eq!(sort.to_document(), doc! { "foo": -1, "bar": 1 });
/// ```
pub fn compile_sort(sorts: &[SortSpec]) -> SortOrder {
    let mut order = SortOrder::new();
    for spec in sorts {
        let direction = spec.direction();
        trace!(field = %spec.field, dir = %spec.dir, ?direction, "compiled sort key");
        order.push(spec.field.as_str(), direction);
    }
    order
}
