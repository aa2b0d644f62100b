//! Load events, executors and result collection.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::jaql::JaqlQuery;

/// Result type for data-load operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

/// Errors raised while loading query results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataLoadError {
    /// The query could not be serialized for hashing or transport.
    #[error("failed to serialize query: {0}")]
    Serialize(String),

    /// The executor refused the query.
    #[error("query execution failed: {0}")]
    Executor(String),

    /// The stream reported a failure.
    #[error("data load failed: {0}")]
    Failed(String),

    /// The stream closed before `Completed`.
    #[error("result stream ended before completion")]
    Incomplete,
}

impl From<serde_json::Error> for DataLoadError {
    fn from(err: serde_json::Error) -> Self {
        DataLoadError::Serialize(err.to_string())
    }
}

/// One event of a streamed query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LoadEvent {
    /// Column headers, sent once before any rows.
    Metadata(Vec<String>),
    /// A chunk of rows.
    Rows(Vec<Vec<Value>>),
    Completed,
    Failed(String),
}

impl LoadEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadEvent::Completed | LoadEvent::Failed(_))
    }
}

/// Runs a JAQL query and streams its result.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &JaqlQuery) -> DataLoadResult<mpsc::Receiver<LoadEvent>>;
}

/// A fully collected result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value at `row` of the column named `column`.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Drain a stream into a [`QueryResult`].
pub async fn load_result(mut events: mpsc::Receiver<LoadEvent>) -> DataLoadResult<QueryResult> {
    let mut result = QueryResult::default();
    while let Some(event) = events.recv().await {
        match event {
            LoadEvent::Metadata(columns) => result.columns = columns,
            LoadEvent::Rows(rows) => result.rows.extend(rows),
            LoadEvent::Completed => return Ok(result),
            LoadEvent::Failed(message) => return Err(DataLoadError::Failed(message)),
        }
    }
    Err(DataLoadError::Incomplete)
}
