//! A connection wrapper that records what it is asked to do.

use parking_lot::Mutex;
use repower_storage::{BindParam, Connection, Row, StorageResult};

/// One call made through a [`CountingConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// A query with its parameters.
    Execute {
        /// The SQL text.
        query: String,
        /// The bound parameters.
        params: Vec<BindParam>,
    },
    /// `begin`.
    Begin,
    /// `commit`.
    Commit,
    /// `rollback`.
    Rollback,
}

/// Wraps a connection and records every call before forwarding it.
pub struct CountingConnection<C> {
    inner: C,
    calls: Mutex<Vec<Call>>,
}

impl<C: Connection> CountingConnection<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the wrapped connection.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns the SQL of every executed query.
    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Execute { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Counts executed queries whose SQL contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.queries().iter().filter(|q| q.contains(needle)).count()
    }

    /// Counts record-id lookups, i.e. queries selecting only the record column.
    pub fn lookup_count(&self) -> usize {
        self.count_matching("SELECT record FROM")
    }

    /// Forgets recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl<C: Connection> Connection for CountingConnection<C> {
    fn execute(&self, query: &str, params: &[BindParam]) -> StorageResult<Vec<Row>> {
        self.calls.lock().push(Call::Execute {
            query: query.to_owned(),
            params: params.to_vec(),
        });
        self.inner.execute(query, params)
    }

    fn begin(&self) -> StorageResult<()> {
        self.calls.lock().push(Call::Begin);
        self.inner.begin()
    }

    fn commit(&self) -> StorageResult<()> {
        self.calls.lock().push(Call::Commit);
        self.inner.commit()
    }

    fn rollback(&self) -> StorageResult<()> {
        self.calls.lock().push(Call::Rollback);
        self.inner.rollback()
    }
}
