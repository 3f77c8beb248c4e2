//! Bidirectional field-name mapping.
//!
//! Application code may use different field names from the ones stored in
//! `redcap_data`. A [`FieldNameMap`] holds the application -> storage table
//! and its inverse. Names missing from the table pass through unchanged in
//! both directions.

use crate::error::{CoreError, CoreResult};
use crate::types::Record;
use std::collections::BTreeMap;

/// Direction of a field-name translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Application name to storage name.
    Forward,
    /// Storage name to application name.
    Reverse,
}

/// Alias table between application and storage field names.
///
/// The inverse table is derived once at construction. The forward table
/// must be injective: two application names may not share a storage name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNameMap {
    forward: BTreeMap<String, String>,
    reverse: BTreeMap<String, String>,
}

impl FieldNameMap {
    /// Builds a map from `(application_name, storage_name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if an application name appears
    /// twice with different storage names, or if two application names map
    /// to the same storage name.
    pub fn new<I, A, S>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (A, S)>,
        A: Into<String>,
        S: Into<String>,
    {
        let mut forward = BTreeMap::new();
        let mut reverse: BTreeMap<String, String> = BTreeMap::new();

        for (app, storage) in pairs {
            let app = app.into();
            let storage = storage.into();

            if let Some(existing) = forward.get(&app) {
                if existing == &storage {
                    continue;
                }
                return Err(CoreError::configuration(format!(
                    "field `{app}` is mapped to both `{existing}` and `{storage}`"
                )));
            }
            if let Some(other) = reverse.get(&storage) {
                return Err(CoreError::configuration(format!(
                    "fields `{other}` and `{app}` both map to storage field `{storage}`"
                )));
            }

            reverse.insert(storage.clone(), app.clone());
            forward.insert(app, storage);
        }

        Ok(Self { forward, reverse })
    }

    /// Creates the identity map.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns true if no aliases are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Returns the number of configured aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Iterates over `(application_name, storage_name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(a, s)| (a.as_str(), s.as_str()))
    }

    /// Translates one field name.
    #[must_use]
    pub fn translate<'a>(&'a self, name: &'a str, direction: Direction) -> &'a str {
        self.table(direction)
            .get(name)
            .map_or(name, String::as_str)
    }

    /// Application name to storage name.
    #[must_use]
    pub fn to_storage<'a>(&'a self, name: &'a str) -> &'a str {
        self.translate(name, Direction::Forward)
    }

    /// Storage name to application name.
    #[must_use]
    pub fn to_application<'a>(&'a self, name: &'a str) -> &'a str {
        self.translate(name, Direction::Reverse)
    }

    /// Translates every key of a record; values are untouched.
    ///
    /// If a translated key collides with a key that passed through
    /// unchanged, the translated one wins.
    #[must_use]
    pub fn translate_record(&self, record: Record, direction: Direction) -> Record {
        if self.is_empty() {
            return record;
        }
        let table = self.table(direction);
        let (mapped, unmapped): (Vec<_>, Vec<_>) =
            record.into_iter().partition(|(key, _)| table.contains_key(key));

        let mut out: Record = unmapped.into_iter().collect();
        for (key, value) in mapped {
            if let Some(target) = table.get(&key) {
                out.insert(target.clone(), value);
            }
        }
        out
    }

    fn table(&self, direction: Direction) -> &BTreeMap<String, String> {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }
}
