//! Result rows with named columns.

use crate::error::{StorageError, StorageResult};

/// A single column value returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Integer column.
    Integer(i64),
    /// Floating point column.
    Real(f64),
    /// Text column (binary data is decoded lossily).
    Text(String),
}

impl Value {
    /// Returns true if the value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value rendered as text, or `None` for NULL.
    ///
    /// The EAV table stores every value as text, but drivers may report
    /// numeric affinity for some columns.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(v) => Some(v.to_string()),
            Self::Real(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
        }
    }
}

/// One result row: column names paired with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Builder form of [`Row::push`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the value of a column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Returns a column that must be present and hold text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingColumn`] if the column is absent and
    /// [`StorageError::UnexpectedNull`] if it is NULL. Numeric columns yield
    /// [`StorageError::TypeMismatch`]; use [`Row::text_lossy`] for those.
    pub fn text(&self, name: &str) -> StorageResult<&str> {
        match self.get(name) {
            Some(Value::Text(value)) => Ok(value),
            Some(Value::Null) => Err(StorageError::UnexpectedNull(name.to_owned())),
            Some(_) => Err(StorageError::TypeMismatch(name.to_owned())),
            None => Err(StorageError::MissingColumn(name.to_owned())),
        }
    }

    /// Returns a column rendered as text, accepting numeric values.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingColumn`] if the column is absent and
    /// [`StorageError::UnexpectedNull`] if it is NULL.
    pub fn text_lossy(&self, name: &str) -> StorageResult<String> {
        self.get(name)
            .ok_or_else(|| StorageError::MissingColumn(name.to_owned()))?
            .to_text()
            .ok_or_else(|| StorageError::UnexpectedNull(name.to_owned()))
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new()
            .with("record", Value::Text("1".into()))
            .with("event_id", Value::Integer(40))
            .with("value", Value::Null)
    }

    #[test]
    fn text_column_lookup() {
        assert_eq!(sample().text("record").unwrap(), "1");
    }

    #[test]
    fn missing_column_is_error() {
        let row = sample();
        let result = row.text("field_name");
        assert!(matches!(result, Err(StorageError::MissingColumn(c)) if c == "field_name"));
    }

    #[test]
    fn null_column_is_error() {
        assert!(matches!(
            sample().text("value"),
            Err(StorageError::UnexpectedNull(_))
        ));
        assert!(matches!(
            sample().text_lossy("value"),
            Err(StorageError::UnexpectedNull(_))
        ));
    }

    #[test]
    fn integer_column_is_not_text() {
        assert!(matches!(
            sample().text("event_id"),
            Err(StorageError::TypeMismatch(_))
        ));
    }

    #[test]
    fn lossy_text_renders_integers() {
        assert_eq!(sample().text_lossy("event_id").unwrap(), "40");
    }

    #[test]
    fn iteration_preserves_select_order() {
        let row = sample();
        let names: Vec<&str> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["record", "event_id", "value"]);
    }
}
