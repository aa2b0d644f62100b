//! Typed endpoints of the analytics server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::{RestError, RestResult};
use super::transport::HttpTransport;
use crate::config::NarrationSettings;
use crate::jaql::JaqlQuery;

const NARRATIVE_PATH: &[&str] = &["api", "v2", "ai", "widget", "narrative"];
const LEGACY_NARRATIVE_PATH: &[&str] = &["api", "v2", "ai", "nlg", "queryResult"];

/// Tabular JAQL response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct JaqlResponse {
    #[serde(default)]
    pub headers: Vec<String>,

    /// Cells are `{data, text}` objects or bare values
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl JaqlResponse {
    /// Row values with `{data, text}` cells unwrapped to `data`.
    pub fn data_rows(&self) -> Vec<Vec<Value>> {
        self.values
            .iter()
            .map(|row| row.iter().map(cell_data).collect())
            .collect()
    }
}

fn cell_data(cell: &Value) -> Value {
    match cell.get("data") {
        Some(data) => data.clone(),
        None => cell.clone(),
    }
}

/// Request for a generated narrative of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub jaql: JaqlQuery,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
}

impl NarrativeRequest {
    pub fn new(jaql: JaqlQuery) -> Self {
        Self {
            jaql,
            chart_type: None,
            verbosity: None,
        }
    }

    pub fn with_chart_type(mut self, chart_type: impl Into<String>) -> Self {
        self.chart_type = Some(chart_type.into());
        self
    }

    pub fn with_verbosity(mut self, verbosity: impl Into<String>) -> Self {
        self.verbosity = Some(verbosity.into());
        self
    }

    /// Body for the legacy query-result endpoint: datasource and metadata
    /// at the top level instead of nested under `jaql`.
    fn legacy_body(&self, verbosity: &str) -> Value {
        json!({
            "datasource": self.jaql.datasource,
            "metadata": self.jaql.metadata,
            "verbosity": self.verbosity.as_deref().unwrap_or(verbosity),
        })
    }
}

/// Client for the JAQL and narration endpoints.
pub struct RestApi<T> {
    transport: T,
    narration: NarrationSettings,
}

impl<T: HttpTransport> RestApi<T> {
    pub fn new(transport: T) -> Self {
        Self::with_narration(transport, NarrationSettings::default())
    }

    pub fn with_narration(transport: T, narration: NarrationSettings) -> Self {
        Self {
            transport,
            narration,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST the query to `api/datasources/{title}/jaql`.
    pub async fn execute_jaql(&self, query: &JaqlQuery) -> RestResult<JaqlResponse> {
        let body = serde_json::to_value(query)?;
        let path = ["api", "datasources", query.datasource.title.as_str(), "jaql"];
        debug!(datasource = %query.datasource.title, "executing JAQL");

        let value = self.transport.post(&path, &body).await?.error_for_status()?;
        if value.get("error").and_then(Value::as_bool) == Some(true) {
            let details = value
                .get("details")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(RestError::Remote(details.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Generate a narrative, retrying the legacy endpoint on 404.
    pub async fn get_narrative(&self, request: &NarrativeRequest) -> RestResult<String> {
        let mut request = request.clone();
        if request.verbosity.is_none() {
            request.verbosity = Some(self.narration.verbosity.clone());
        }
        let body = serde_json::to_value(&request)?;

        let value = match self
            .transport
            .post(NARRATIVE_PATH, &body)
            .await?
            .error_for_status()
        {
            Err(err) if err.is_not_found() && self.narration.fallback => {
                warn!(
                    endpoint = %NARRATIVE_PATH.join("/"),
                    "narrative endpoint not found, falling back to {}",
                    LEGACY_NARRATIVE_PATH.join("/")
                );
                let legacy = request.legacy_body(&self.narration.verbosity);
                self.transport
                    .post(LEGACY_NARRATIVE_PATH, &legacy)
                    .await?
                    .error_for_status()?
            }
            other => other?,
        };

        narrative_text(&value)
            .ok_or_else(|| RestError::Remote(format!("narrative missing from response: {value}")))
    }
}

/// `data.answer`, `answer`, or a bare string body.
fn narrative_text(value: &Value) -> Option<String> {
    value
        .pointer("/data/answer")
        .or_else(|| value.get("answer"))
        .and_then(Value::as_str)
        .or_else(|| value.as_str())
        .map(str::to_string)
}
