//! Error type shared by the dimensional model.

use std::collections::BTreeMap;

use crate::translation;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, TranslatableError>;

/// An error identified by a translation key plus interpolation parameters.
///
/// `Display` renders the English catalog message; hosts with their own
/// catalogs can use [`TranslatableError::key`] and
/// [`TranslatableError::params`] directly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct TranslatableError {
    key: String,
    params: BTreeMap<String, String>,
}

impl TranslatableError {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add an interpolation parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// The English message for this error.
    pub fn message(&self) -> String {
        translation::translate(&self.key, &self.params)
    }
}
