//! [`QueryExecutor`] backed by the JAQL endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::api::RestApi;
use super::transport::HttpTransport;
use crate::data_load::{DataLoadResult, LoadEvent, QueryExecutor};
use crate::jaql::JaqlQuery;

const DEFAULT_CHUNK_ROWS: usize = 500;

/// Runs queries through [`RestApi::execute_jaql`] and streams the rows in
/// chunks.
pub struct RestQueryExecutor<T> {
    api: Arc<RestApi<T>>,
    chunk_rows: usize,
}

impl<T: HttpTransport + 'static> RestQueryExecutor<T> {
    pub fn new(api: Arc<RestApi<T>>) -> Self {
        Self {
            api,
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }

    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows.max(1);
        self
    }
}

#[async_trait]
impl<T: HttpTransport + 'static> QueryExecutor for RestQueryExecutor<T> {
    async fn execute(&self, query: &JaqlQuery) -> DataLoadResult<mpsc::Receiver<LoadEvent>> {
        let (tx, rx) = mpsc::channel(16);
        let api = Arc::clone(&self.api);
        let query = query.clone();
        let chunk_rows = self.chunk_rows;

        tokio::spawn(async move {
            let response = match api.execute_jaql(&query).await {
                Ok(response) => response,
                Err(err) => {
                    let _ = tx.send(LoadEvent::Failed(err.to_string())).await;
                    return;
                }
            };

            let rows = response.data_rows();
            debug!(rows = rows.len(), "streaming JAQL result");
            if tx.send(LoadEvent::Metadata(response.headers)).await.is_err() {
                return;
            }
            for chunk in rows.chunks(chunk_rows) {
                if tx.send(LoadEvent::Rows(chunk.to_vec())).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(LoadEvent::Completed).await;
        });

        Ok(rx)
    }
}
