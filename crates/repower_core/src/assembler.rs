//! Conversion between EAV tuples and flat records.

use crate::error::CoreResult;
use crate::mapper::{Direction, FieldNameMap};
use crate::types::{EavTuple, ProjectId, Record};
use repower_storage::{Row, StorageError};
use tracing::debug;

/// Column holding the storage field name in `redcap_data`.
pub(crate) const FIELD_NAME_COLUMN: &str = "field_name";
/// Column holding the value in `redcap_data`.
pub(crate) const VALUE_COLUMN: &str = "value";

/// Collapses EAV tuples into records and expands records into tuples.
///
/// The assembler owns the project's [`FieldNameMap`]. Reading applies the
/// reverse mapping, writing applies the forward mapping, each exactly once,
/// so a record read and then written back lands on the same storage names.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    project_id: ProjectId,
    field_names: FieldNameMap,
}

impl RecordAssembler {
    /// Creates an assembler for one project.
    #[must_use]
    pub fn new(project_id: ProjectId, field_names: FieldNameMap) -> Self {
        Self {
            project_id,
            field_names,
        }
    }

    /// Returns the bound project.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the field-name map.
    #[must_use]
    pub fn field_names(&self) -> &FieldNameMap {
        &self.field_names
    }

    /// Collapses tuples sharing one record scope into a record.
    ///
    /// Later tuples overwrite earlier ones with the same field name. An empty
    /// slice gives an empty record.
    #[must_use]
    pub fn to_record(&self, tuples: &[EavTuple]) -> Record {
        let stored: Record = tuples
            .iter()
            .map(|t| (t.field_name.as_str(), t.value.as_str()))
            .collect();
        self.field_names.translate_record(stored, Direction::Reverse)
    }

    /// Expands a record into one tuple per field.
    ///
    /// If a mapped key and an unmapped key land on the same storage name,
    /// the mapped key's value is the one sent.
    #[must_use]
    pub fn to_tuples(
        &self,
        record: &Record,
        record_id: &str,
        event_name: Option<&str>,
    ) -> Vec<EavTuple> {
        self.field_names
            .translate_record(record.clone(), Direction::Forward)
            .into_iter()
            .map(|(field_name, value)| EavTuple {
                project_id: self.project_id,
                record_id: record_id.to_owned(),
                event_name: event_name.map(str::to_owned),
                field_name,
                value,
            })
            .collect()
    }

    /// Collapses `(field_name, value)` rows from storage into a record.
    ///
    /// NULL values are skipped; `redcap_data` never stores them for real
    /// answers.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a row lacks the `field_name` or `value`
    /// column, or has a NULL field name.
    pub fn rows_to_record(&self, rows: &[Row]) -> CoreResult<Record> {
        let mut stored = Record::new();
        for row in rows {
            let field_name = row.text_lossy(FIELD_NAME_COLUMN)?;
            let value = row
                .get(VALUE_COLUMN)
                .ok_or_else(|| StorageError::MissingColumn(VALUE_COLUMN.into()))?;
            match value.to_text() {
                Some(value) => {
                    stored.insert(field_name, value);
                }
                None => debug!(field_name = %field_name, "skipping NULL value"),
            }
        }
        Ok(self.field_names.translate_record(stored, Direction::Reverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use repower_storage::Value;

    fn field_row(field_name: &str, value: Value) -> Row {
        Row::new()
            .with(FIELD_NAME_COLUMN, Value::Text(field_name.into()))
            .with(VALUE_COLUMN, value)
    }

    fn pid() -> ProjectId {
        ProjectId::new(7)
    }

    fn mapped() -> RecordAssembler {
        RecordAssembler::new(pid(), FieldNameMap::new([("dob_alias", "dob")]).unwrap())
    }

    #[test]
    fn empty_tuples_give_empty_record() {
        let assembler = RecordAssembler::new(pid(), FieldNameMap::identity());
        assert!(assembler.to_record(&[]).is_empty());
    }

    #[test]
    fn last_write_wins() {
        let assembler = RecordAssembler::new(pid(), FieldNameMap::identity());
        let tuples = vec![
            EavTuple::new(pid(), "1", "weight", "70"),
            EavTuple::new(pid(), "1", "weight", "72"),
        ];
        let record = assembler.to_record(&tuples);
        assert_eq!(record.get("weight"), Some("72"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn reading_applies_reverse_map() {
        let tuples = vec![EavTuple::new(pid(), "1", "dob", "1990-01-01")];
        let record = mapped().to_record(&tuples);
        assert_eq!(record, Record::new().with("dob_alias", "1990-01-01"));
    }

    #[test]
    fn writing_applies_forward_map_and_stamps_scope() {
        let record = Record::new().with("dob_alias", "1990-01-01").with("site", "2");
        let tuples = mapped().to_tuples(&record, "15", Some("baseline_arm_1"));

        assert_eq!(tuples.len(), 2);
        for tuple in &tuples {
            assert_eq!(tuple.project_id, pid());
            assert_eq!(tuple.record_id, "15");
            assert_eq!(tuple.event_name.as_deref(), Some("baseline_arm_1"));
        }
        let names: Vec<&str> = tuples.iter().map(|t| t.field_name.as_str()).collect();
        assert!(names.contains(&"dob"));
        assert!(names.contains(&"site"));
    }

    #[test]
    fn chained_map_is_applied_once_per_direction() {
        let assembler =
            RecordAssembler::new(pid(), FieldNameMap::new([("a", "b"), ("b", "c")]).unwrap());
        let stored = vec![
            EavTuple::new(pid(), "1", "b", "from_b"),
            EavTuple::new(pid(), "1", "c", "from_c"),
        ];

        let record = assembler.to_record(&stored);
        assert_eq!(record.get("a"), Some("from_b"));
        assert_eq!(record.get("b"), Some("from_c"));

        let back = assembler.to_tuples(&record, "1", None);
        let mut names: Vec<&str> = back.iter().map(|t| t.field_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn mapped_key_wins_storage_name_collision() {
        let assembler = RecordAssembler::new(pid(), FieldNameMap::new([("a", "b")]).unwrap());
        let record = Record::new().with("a", "from_a").with("b", "from_b");

        let tuples = assembler.to_tuples(&record, "1", None);

        assert_eq!(tuples, [EavTuple::new(pid(), "1", "b", "from_a")]);
        assert_eq!(
            assembler.to_record(&tuples),
            Record::new().with("a", "from_a")
        );
    }

    #[test]
    fn rows_to_record_skips_nulls() {
        let rows = vec![
            field_row("dob", Value::Text("1990-01-01".into())),
            field_row("notes", Value::Null),
            field_row("age", Value::Integer(34)),
        ];
        let record = mapped().rows_to_record(&rows).unwrap();
        assert_eq!(record.get("dob_alias"), Some("1990-01-01"));
        assert_eq!(record.get("age"), Some("34"));
        assert!(!record.contains("notes"));
    }

    #[test]
    fn rows_without_value_column_fail() {
        let rows = vec![Row::new().with("field_name", Value::Text("dob".into()))];
        assert!(mapped().rows_to_record(&rows).is_err());
    }

    proptest! {
        #[test]
        fn identity_round_trip(
            fields in proptest::collection::btree_map("[a-z_]{1,16}", ".{0,24}", 0..20),
            record_id in "[0-9]{1,5}",
        ) {
            let assembler = RecordAssembler::new(pid(), FieldNameMap::identity());
            let record = Record::from(fields);
            let tuples = assembler.to_tuples(&record, &record_id, None);
            prop_assert_eq!(assembler.to_record(&tuples), record);
        }
    }
}
