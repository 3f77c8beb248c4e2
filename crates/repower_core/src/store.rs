//! Read path over the `redcap_data` table.

use crate::assembler::RecordAssembler;
use crate::error::{CoreError, CoreResult};
use crate::mapper::FieldNameMap;
use crate::types::{ProjectId, Record, SortOrder};
use repower_storage::{BindParam, Connection};
use tracing::debug;

/// Field name that addresses the record id itself rather than an attribute.
///
/// The record id is a column of `redcap_data`, not an EAV field, so lookups
/// on it go straight to [`EntityStore::fetch_record`].
pub const RECORD_SENTINEL: &str = "record";

const RECORD_DATA_QUERY: &str =
    "SELECT field_name, value FROM redcap_data WHERE project_id = ? AND record = ?";

fn record_ids_query(order: SortOrder) -> String {
    format!(
        "SELECT record FROM redcap_data \
         WHERE project_id = ? AND field_name = ? AND value = ? \
         GROUP BY record ORDER BY record {}",
        order.as_sql()
    )
}

/// Resolves and fetches records of one project.
///
/// The store borrows a [`Connection`] owned by the host and holds no state
/// of its own beyond the project id and field-name map. Every call
/// re-queries storage.
///
/// # Transactions
///
/// [`begin`](Self::begin), [`commit`](Self::commit) and
/// [`rollback`](Self::rollback) go straight to the connection. Reads issued
/// in between see whatever the engine's default isolation level gives them.
/// Nesting is not tracked here; a second `begin` is passed through and the
/// engine decides what happens.
pub struct EntityStore<'c, C: Connection + ?Sized> {
    conn: &'c C,
    assembler: RecordAssembler,
}

impl<'c, C: Connection + ?Sized> EntityStore<'c, C> {
    /// Creates a store bound to one project.
    pub fn new(project_id: ProjectId, conn: &'c C, field_names: FieldNameMap) -> Self {
        Self {
            conn,
            assembler: RecordAssembler::new(project_id, field_names),
        }
    }

    /// Returns the bound project.
    pub fn project_id(&self) -> ProjectId {
        self.assembler.project_id()
    }

    /// Returns the record assembler (and through it the field-name map).
    pub fn assembler(&self) -> &RecordAssembler {
        &self.assembler
    }

    /// Returns the borrowed connection.
    pub fn connection(&self) -> &'c C {
        self.conn
    }

    /// Returns the ids of every record whose `field_name` equals `value`.
    ///
    /// `field_name` is an application name and is mapped to its storage
    /// name. Each id appears once, ordered by the `record` column.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the query fails. No match is an
    /// empty vector, not an error.
    pub fn resolve_ids(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
        order: SortOrder,
    ) -> CoreResult<Vec<String>> {
        let storage_name = self.assembler.field_names().to_storage(field_name);
        let params = [
            BindParam::Int(self.project_id().as_i64()),
            BindParam::text(storage_name),
            value.into(),
        ];

        let rows = self.conn.execute(&record_ids_query(order), &params)?;
        let ids = rows
            .iter()
            .map(|row| row.text_lossy(RECORD_SENTINEL))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            project = %self.project_id(),
            field = storage_name,
            matches = ids.len(),
            "resolved record ids"
        );
        Ok(ids)
    }

    /// Returns the first id [`resolve_ids`](Self::resolve_ids) would return.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if nothing matches, or
    /// [`CoreError::Storage`] if the query fails.
    pub fn resolve_first_id(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
        order: SortOrder,
    ) -> CoreResult<String> {
        let value = value.into();
        let ids = self.resolve_ids(field_name, value.clone(), order)?;
        ids.into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found(self.project_id().as_i64(), field_name, value))
    }

    /// Fetches the first record whose `field_name` equals `value`.
    ///
    /// With [`RECORD_SENTINEL`] as the field name, `value` is taken as the
    /// record id and fetched directly, without a lookup query.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if a lookup matches nothing, or
    /// [`CoreError::Storage`] if a query fails.
    pub fn get_by(&self, field_name: &str, value: impl Into<BindParam>) -> CoreResult<Record> {
        let value = value.into();
        if field_name == RECORD_SENTINEL {
            return self.fetch_record(&value.to_string());
        }
        let record_id = self.resolve_first_id(field_name, value, SortOrder::Ascending)?;
        self.fetch_record(&record_id)
    }

    /// Fetches every record whose `field_name` equals `value`, in ascending
    /// id order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if a query fails. No match is an empty
    /// vector.
    pub fn get_all_by(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
    ) -> CoreResult<Vec<Record>> {
        self.resolve_ids(field_name, value, SortOrder::Ascending)?
            .iter()
            .map(|id| self.fetch_record(id))
            .collect()
    }

    /// Fetches all fields of one record.
    ///
    /// An id with no stored fields yields an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the query fails.
    pub fn fetch_record(&self, record_id: &str) -> CoreResult<Record> {
        let params = [
            BindParam::Int(self.project_id().as_i64()),
            BindParam::text(record_id),
        ];
        let rows = self.conn.execute(RECORD_DATA_QUERY, &params)?;
        if rows.is_empty() {
            debug!(project = %self.project_id(), record_id, "record has no stored fields");
        }
        self.assembler.rows_to_record(&rows)
    }

    /// Starts a transaction on the connection.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the engine refuses.
    pub fn begin(&self) -> CoreResult<()> {
        Ok(self.conn.begin()?)
    }

    /// Commits the connection's open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the commit fails.
    pub fn commit(&self) -> CoreResult<()> {
        Ok(self.conn.commit()?)
    }

    /// Rolls back the connection's open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the rollback fails.
    pub fn rollback(&self) -> CoreResult<()> {
        Ok(self.conn.rollback()?)
    }

    /// Runs `f` inside a transaction.
    ///
    /// If `f` returns `Ok`, the transaction is committed. If it returns
    /// `Err`, the transaction is rolled back and the original error is
    /// returned even if the rollback itself fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error from begin/commit.
    pub fn transaction<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Self) -> CoreResult<T>,
    {
        self.begin()?;
        match f(self) {
            Ok(result) => {
                self.commit()?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback() {
                    debug!(error = %rollback, "rollback after failed transaction body also failed");
                }
                Err(e)
            }
        }
    }
}

impl<C: Connection + ?Sized> std::fmt::Debug for EntityStore<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("project_id", &self.project_id())
            .field("field_names", &self.assembler.field_names().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repower_storage::SqliteConnection;

    const SCHEMA: &str = "CREATE TABLE redcap_data (
        project_id INTEGER NOT NULL,
        event_id INTEGER,
        record TEXT NOT NULL,
        field_name TEXT NOT NULL,
        value TEXT,
        instance INTEGER
    );";

    fn seeded() -> SqliteConnection {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.raw().execute_batch(SCHEMA).unwrap();
        conn.raw()
            .execute_batch(
                "INSERT INTO redcap_data (project_id, record, field_name, value) VALUES
                 (7, '1', 'dob', '1990-01-01'),
                 (7, '1', 'site', '2'),
                 (7, '3', 'dob', '1990-01-01'),
                 (7, '3', 'site', '2'),
                 (7, '2', 'site', '2'),
                 (7, '2', 'site', '2'),
                 (8, '1', 'site', '2');",
            )
            .unwrap();
        conn
    }

    fn store(conn: &SqliteConnection) -> EntityStore<'_, SqliteConnection> {
        EntityStore::new(ProjectId::new(7), conn, FieldNameMap::identity())
    }

    #[test]
    fn resolve_ids_ascending_and_descending() {
        let conn = seeded();
        let store = store(&conn);

        let asc = store.resolve_ids("site", "2", SortOrder::Ascending).unwrap();
        assert_eq!(asc, ["1", "2", "3"]);

        let mut desc = store.resolve_ids("site", "2", SortOrder::Descending).unwrap();
        desc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn resolve_ids_scoped_to_project() {
        let conn = seeded();
        let other = EntityStore::new(ProjectId::new(8), &conn, FieldNameMap::identity());
        assert_eq!(
            other.resolve_ids("site", "2", SortOrder::Ascending).unwrap(),
            ["1"]
        );
    }

    #[test]
    fn integer_value_matches_text_column() {
        let conn = seeded();
        let ids = store(&conn)
            .resolve_ids("site", 2i64, SortOrder::Ascending)
            .unwrap();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn resolve_first_id_not_found() {
        let conn = seeded();
        let err = store(&conn)
            .resolve_first_id("dob", "2000-12-31", SortOrder::Ascending)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn get_by_returns_first_match() {
        let conn = seeded();
        let record = store(&conn).get_by("dob", "1990-01-01").unwrap();
        assert_eq!(
            record,
            Record::new().with("dob", "1990-01-01").with("site", "2")
        );
    }

    #[test]
    fn get_by_record_sentinel_fetches_directly() {
        let conn = seeded();
        let store = store(&conn);
        assert_eq!(
            store.get_by(RECORD_SENTINEL, "2").unwrap(),
            store.fetch_record("2").unwrap()
        );
    }

    #[test]
    fn get_all_by_preserves_id_order() {
        let conn = seeded();
        let records = store(&conn).get_all_by("dob", "1990-01-01").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("dob") == Some("1990-01-01")));
    }

    #[test]
    fn get_all_by_no_match_is_empty() {
        let conn = seeded();
        assert!(store(&conn).get_all_by("dob", "nope").unwrap().is_empty());
    }

    #[test]
    fn missing_table_is_storage_error_not_empty() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let err = store(&conn)
            .resolve_ids("dob", "x", SortOrder::Ascending)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Storage(repower_storage::StorageError::Prepare { .. })
        ));
    }

    #[test]
    fn transaction_helper_rolls_back_on_error() {
        let conn = seeded();
        let store = store(&conn);

        let result: CoreResult<()> = store.transaction(|s| {
            s.connection()
                .execute("DELETE FROM redcap_data WHERE record = '1'", &[])?;
            Err(CoreError::configuration("abort"))
        });
        assert!(result.unwrap_err().is_configuration());

        assert_eq!(store.fetch_record("1").unwrap().len(), 2);
    }

    #[test]
    fn transaction_helper_commits_on_ok() {
        let conn = seeded();
        let store = store(&conn);

        let ids = store
            .transaction(|s| s.resolve_ids("site", "2", SortOrder::Ascending))
            .unwrap();
        assert_eq!(ids.len(), 3);
        // No transaction left open.
        store.begin().unwrap();
        store.rollback().unwrap();
    }
}
