//! The project data service facade.

use crate::error::{ProjectError, ProjectResult};
use repower_core::{
    CoreError, EavTuple, EntityStore, FieldNameMap, ProjectConfig, ProjectId, Record, SortOrder,
};
use repower_remote::{HttpClient, RemoteWriter, UreqClient, WriteCredentials, WriteResult};
use repower_storage::{BindParam, Connection};
use tracing::{debug, info};

/// Read and write access to one REDCap project's records.
///
/// Reads go to the borrowed storage [`Connection`]; writes go to the record
/// import API through `H`. The service starts read-only; call
/// [`make_writeable`](Self::make_writeable) to attach API credentials.
///
/// The connection is owned by the host and must outlive the service.
pub struct ProjectDataService<'c, C: Connection + ?Sized, H: HttpClient = UreqClient> {
    store: EntityStore<'c, C>,
    writer: RemoteWriter<H>,
}

impl<'c, C: Connection + ?Sized> ProjectDataService<'c, C, UreqClient> {
    /// Creates a read-only service using the default HTTP client.
    pub fn new(project_id: ProjectId, conn: &'c C, field_names: FieldNameMap) -> Self {
        Self::with_client(project_id, conn, field_names, UreqClient::new())
    }

    /// Creates a service from configuration.
    ///
    /// Credentials are attached when the configuration has both URL and
    /// token; the HTTP timeout is applied to the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the alias table is not injective or
    /// the credentials are empty.
    pub fn from_config(config: &ProjectConfig, conn: &'c C) -> ProjectResult<Self> {
        let client = match config.http_timeout {
            Some(timeout) => UreqClient::with_timeout(timeout),
            None => UreqClient::new(),
        };
        Self::from_config_with_client(config, conn, client)
    }
}

impl<'c, C: Connection + ?Sized, H: HttpClient> ProjectDataService<'c, C, H> {
    /// Creates a read-only service with a specific HTTP client.
    pub fn with_client(
        project_id: ProjectId,
        conn: &'c C,
        field_names: FieldNameMap,
        client: H,
    ) -> Self {
        Self {
            store: EntityStore::new(project_id, conn, field_names),
            writer: RemoteWriter::new(client),
        }
    }

    /// Creates a service from configuration with a specific HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the alias table is not injective or
    /// the credentials are empty.
    pub fn from_config_with_client(
        config: &ProjectConfig,
        conn: &'c C,
        client: H,
    ) -> ProjectResult<Self> {
        let mut service = Self::with_client(config.project_id, conn, config.field_names()?, client);
        if let Some((api_url, api_token)) = config.credentials() {
            service.make_writeable(api_url, api_token)?;
        }
        Ok(service)
    }

    /// Attaches API credentials so that saves are possible.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or token is empty.
    pub fn make_writeable(
        &mut self,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> ProjectResult<()> {
        let credentials = WriteCredentials::new(api_url, api_token)?;
        debug!(project = %self.project_id(), url = credentials.api_url(), "service made writeable");
        self.writer.set_credentials(credentials);
        Ok(())
    }

    /// Returns true if API credentials are attached.
    pub fn is_writeable(&self) -> bool {
        self.writer.is_writeable()
    }

    /// Returns the bound project.
    pub fn project_id(&self) -> ProjectId {
        self.store.project_id()
    }

    /// Returns the read path.
    pub fn store(&self) -> &EntityStore<'c, C> {
        &self.store
    }

    /// Returns the write path.
    pub fn writer(&self) -> &RemoteWriter<H> {
        &self.writer
    }

    /// Fetches the first record whose `field_name` equals `value`.
    ///
    /// `"record"` as the field name fetches the record with id `value`.
    ///
    /// # Errors
    ///
    /// Not found if nothing matches; storage errors propagate.
    pub fn get_record_by(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
    ) -> ProjectResult<Record> {
        Ok(self.store.get_by(field_name, value)?)
    }

    /// Fetches every record whose `field_name` equals `value`.
    ///
    /// # Errors
    ///
    /// Storage errors propagate. No match is an empty vector.
    pub fn get_records_by(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
    ) -> ProjectResult<Vec<Record>> {
        Ok(self.store.get_all_by(field_name, value)?)
    }

    /// Returns the ids of records whose `field_name` equals `value`.
    ///
    /// # Errors
    ///
    /// Storage errors propagate.
    pub fn record_ids_by(
        &self,
        field_name: &str,
        value: impl Into<BindParam>,
        order: SortOrder,
    ) -> ProjectResult<Vec<String>> {
        Ok(self.store.resolve_ids(field_name, value, order)?)
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// Storage errors propagate.
    pub fn fetch_record(&self, record_id: &str) -> ProjectResult<Record> {
        Ok(self.store.fetch_record(record_id)?)
    }

    /// Saves one record's fields through the import API.
    ///
    /// Field names are application names and are mapped to storage names.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service is not writeable. API
    /// rejections and transport failures are reported in the
    /// [`WriteResult`].
    pub fn save_record(
        &self,
        record_id: &str,
        field_values: &Record,
        event_name: Option<&str>,
    ) -> ProjectResult<WriteResult> {
        let tuples = self
            .store
            .assembler()
            .to_tuples(field_values, record_id, event_name);
        info!(
            project = %self.project_id(),
            record_id,
            fields = tuples.len(),
            "saving record"
        );
        Ok(self.writer.submit(&tuples)?)
    }

    /// Saves EAV tuples as given, without name mapping.
    ///
    /// Meant for bulk imports that already hold storage-shaped batches
    /// spanning several records.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service is not writeable or a
    /// tuple belongs to another project.
    pub fn save_raw(&self, tuples: &[EavTuple]) -> ProjectResult<WriteResult> {
        let project_id = self.project_id();
        if let Some(foreign) = tuples.iter().find(|t| t.project_id != project_id) {
            return Err(ProjectError::Core(CoreError::configuration(format!(
                "tuple for {} submitted through service for {}",
                foreign.project_id, project_id
            ))));
        }
        info!(project = %project_id, tuples = tuples.len(), "saving raw tuples");
        Ok(self.writer.submit(tuples)?)
    }

    /// Starts a storage transaction. Writes are not part of it.
    ///
    /// # Errors
    ///
    /// Storage errors propagate.
    pub fn begin(&self) -> ProjectResult<()> {
        Ok(self.store.begin()?)
    }

    /// Commits the storage transaction.
    ///
    /// # Errors
    ///
    /// Storage errors propagate.
    pub fn commit(&self) -> ProjectResult<()> {
        Ok(self.store.commit()?)
    }

    /// Rolls back the storage transaction.
    ///
    /// # Errors
    ///
    /// Storage errors propagate.
    pub fn rollback(&self) -> ProjectResult<()> {
        Ok(self.store.rollback()?)
    }

    /// Runs `f` between `begin` and `commit`, rolling back if it fails.
    ///
    /// Saves made inside `f` are sent immediately and are not undone by a
    /// rollback.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error from begin/commit.
    pub fn transaction<F, T>(&self, f: F) -> ProjectResult<T>
    where
        F: FnOnce(&Self) -> ProjectResult<T>,
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

impl<C: Connection + ?Sized, H: HttpClient> std::fmt::Debug for ProjectDataService<'_, C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectDataService")
            .field("store", &self.store)
            .field("writer", &self.writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repower_remote::MockHttpClient;
    use repower_storage::SqliteConnection;

    fn conn() -> SqliteConnection {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.raw()
            .execute_batch(
                "CREATE TABLE redcap_data (
                     project_id INTEGER, record TEXT, field_name TEXT, value TEXT
                 );
                 INSERT INTO redcap_data VALUES (7, '1', 'dob', '1990-01-01');",
            )
            .unwrap();
        conn
    }

    #[test]
    fn starts_read_only() {
        let conn = conn();
        let service = ProjectDataService::new(ProjectId::new(7), &conn, FieldNameMap::identity());
        assert!(!service.is_writeable());
        assert_eq!(service.project_id(), ProjectId::new(7));
    }

    #[test]
    fn make_writeable_rejects_empty_token() {
        let conn = conn();
        let mut service = ProjectDataService::with_client(
            ProjectId::new(7),
            &conn,
            FieldNameMap::identity(),
            MockHttpClient::new(),
        );
        assert!(service.make_writeable("https://h/api/", "").unwrap_err().is_configuration());
        assert!(!service.is_writeable());
    }

    #[test]
    fn save_raw_rejects_foreign_project() {
        let conn = conn();
        let mut service = ProjectDataService::with_client(
            ProjectId::new(7),
            &conn,
            FieldNameMap::identity(),
            MockHttpClient::responding(200, ""),
        );
        service.make_writeable("https://h/api/", "T").unwrap();

        let tuples = [EavTuple::new(ProjectId::new(8), "1", "dob", "x")];
        assert!(service.save_raw(&tuples).unwrap_err().is_configuration());
        assert_eq!(service.writer().client().calls(), 0);
    }

    #[test]
    fn from_config_attaches_credentials() {
        let conn = conn();
        let config = ProjectConfig::new(ProjectId::new(7))
            .with_alias("dob_alias", "dob")
            .with_credentials("https://h/api/", "T");
        let service =
            ProjectDataService::from_config_with_client(&config, &conn, MockHttpClient::new())
                .unwrap();

        assert!(service.is_writeable());
        assert_eq!(
            service.get_record_by("dob_alias", "1990-01-01").unwrap().get("dob_alias"),
            Some("1990-01-01")
        );
    }

    #[test]
    fn failed_rollback_keeps_body_error() {
        let conn = conn();
        let service = ProjectDataService::new(ProjectId::new(7), &conn, FieldNameMap::identity());

        let err = service
            .transaction(|s| -> ProjectResult<()> {
                s.rollback()?;
                Err(CoreError::not_found(7, "dob", "x").into())
            })
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn from_config_without_credentials_is_read_only() {
        let conn = conn();
        let service =
            ProjectDataService::from_config(&ProjectConfig::new(ProjectId::new(7)), &conn)
                .unwrap();
        assert!(!service.is_writeable());
    }
}
