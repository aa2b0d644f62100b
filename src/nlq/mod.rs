//! NLQ translation: simple query JSON ↔ dimensional queries.
//!
//! ```text
//! {dataSource, dimensions: ["DM.T.C"], measures: [{function, args}], ...}
//!        │ translate_query_json (errors collected, never thrown)
//!        ▼
//! NlqResult::Success(QueryDescription) | NlqResult::Failure([NlqError])
//! ```

pub mod functions;
pub mod schema;
mod translate;

pub use functions::{evaluate, is_supported, Built, FunctionCall};
pub use schema::{DataSchema, SchemaColumn, SchemaTable};
pub use translate::{to_query_json, translate_query_json, translate_query_str};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::query::QueryDescription;

/// Simple query JSON as produced by the NLQ service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<Value>,
    #[serde(default)]
    pub measures: Vec<Value>,
    #[serde(default)]
    pub filters: Vec<Value>,
    #[serde(default)]
    pub highlights: Vec<Value>,
}

/// Section of the query JSON an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NlqCategory {
    Dimensions,
    Measures,
    Filters,
    Highlights,
}

/// One translation problem, pointing at the offending input item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlqError {
    pub category: NlqCategory,
    pub index: usize,
    pub input: Value,
    pub message: String,
}

impl NlqError {
    pub fn new(
        category: NlqCategory,
        index: usize,
        input: Value,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            index,
            input,
            message: message.into(),
        }
    }
}

/// Outcome of a translation.
#[derive(Debug, Clone, PartialEq)]
pub enum NlqResult {
    Success(QueryDescription),
    Failure(Vec<NlqError>),
}

impl NlqResult {
    pub fn is_success(&self) -> bool {
        matches!(self, NlqResult::Success(_))
    }

    pub fn errors(&self) -> &[NlqError] {
        match self {
            NlqResult::Success(_) => &[],
            NlqResult::Failure(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<QueryDescription, Vec<NlqError>> {
        match self {
            NlqResult::Success(query) => Ok(query),
            NlqResult::Failure(errors) => Err(errors),
        }
    }
}

/// `{success: true, data: <jaql query>}` or `{success: false, errors: [...]}`.
impl Serialize for NlqResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NlqResult", 2)?;
        match self {
            NlqResult::Success(query) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", &query.jaql_query_unchecked())?;
            }
            NlqResult::Failure(errors) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", errors)?;
            }
        }
        state.end()
    }
}
