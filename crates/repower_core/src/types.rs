//! Core type definitions for Repower.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Identifier of a REDCap project.
///
/// Every query issued by a data-access object is filtered by one project id,
/// fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl ProjectId {
    /// Creates a new project ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Ordering applied to record ids returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Lowest record id first.
    #[default]
    Ascending,
    /// Highest record id first.
    Descending,
}

impl SortOrder {
    /// Returns the SQL keyword for this order.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One attribute value of one record, the unit of EAV storage.
///
/// Field names inside a tuple are always storage names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EavTuple {
    /// Owning project.
    pub project_id: ProjectId,
    /// Record the value belongs to.
    pub record_id: String,
    /// Unique event name for longitudinal projects.
    pub event_name: Option<String>,
    /// Storage field name.
    pub field_name: String,
    /// Field value.
    pub value: String,
}

impl EavTuple {
    /// Creates a tuple without an event.
    pub fn new(
        project_id: ProjectId,
        record_id: impl Into<String>,
        field_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            record_id: record_id.into(),
            event_name: None,
            field_name: field_name.into(),
            value: value.into(),
        }
    }

    /// Sets the event name.
    #[must_use]
    pub fn with_event(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = Some(event_name.into());
        self
    }
}

/// A flat view of one record: field name to value.
///
/// Keys are kept sorted so that output is deterministic; order carries no
/// meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.fields.get(field_name).map(String::as_str)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(
        &mut self,
        field_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.fields.insert(field_name.into(), value.into())
    }

    /// Builder form of [`Record::insert`].
    #[must_use]
    pub fn with(mut self, field_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field_name, value);
        self
    }

    /// Removes a field.
    pub fn remove(&mut self, field_name: &str) -> Option<String> {
        self.fields.remove(field_name)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.fields.contains_key(field_name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(field_name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the field names in key order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl From<BTreeMap<String, String>> for Record {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_display() {
        assert_eq!(format!("{}", ProjectId::new(7)), "pid:7");
    }

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
        assert_eq!(SortOrder::Descending.as_sql(), "DESC");
    }

    #[test]
    fn record_insert_overwrites() {
        let mut record = Record::new().with("dob", "1990-01-01");
        let previous = record.insert("dob", "1991-02-02");
        assert_eq!(previous.as_deref(), Some("1990-01-01"));
        assert_eq!(record.get("dob"), Some("1991-02-02"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn record_equality_ignores_insertion_order() {
        let a = Record::new().with("a", "1").with("b", "2");
        let b: Record = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let record = Record::new().with("mrn", "A-1").with("age", "42");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"age":"42","mrn":"A-1"}"#);
    }

    #[test]
    fn tuple_event_builder() {
        let tuple = EavTuple::new(ProjectId::new(3), "10", "visit_date", "2024-05-01")
            .with_event("baseline_arm_1");
        assert_eq!(tuple.event_name.as_deref(), Some("baseline_arm_1"));
    }
}
