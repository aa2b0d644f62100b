//! The flat JAQL filter object.
//!
//! JAQL encodes every filter kind in one object shape and tells them apart
//! by which keys are present. `FilterJaql` mirrors that shape with every
//! field optional; classification lives in `model::filter::condition`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::element::JaqlElement;
use super::value::JaqlValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterJaql {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_selection: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<JaqlValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Box<FilterJaql>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doesnt_equal: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_not_equal: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_not_equal: Option<JaqlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doesnt_contain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doesnt_start_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doesnt_end_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<i64>,

    /// Ranking measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Box<JaqlElement>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<PeriodJaql>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PeriodJaql>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<FilterJaql>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<FilterJaql>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_between: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_condition: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<bool>,

    /// Background filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Box<FilterJaql>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FilterJaql {
    /// True for `{}`: no keys at all.
    pub fn is_empty(&self) -> bool {
        *self == FilterJaql::default()
    }

    /// True if any comparison or text operator key is present.
    pub fn has_condition_operator(&self) -> bool {
        self.equals.is_some()
            || self.doesnt_equal.is_some()
            || self.from_not_equal.is_some()
            || self.to_not_equal.is_some()
            || self.contains.is_some()
            || self.doesnt_contain.is_some()
            || self.starts_with.is_some()
            || self.doesnt_start_with.is_some()
            || self.ends_with.is_some()
            || self.doesnt_end_with.is_some()
            || self.like.is_some()
            || self.top.is_some()
            || self.bottom.is_some()
            || self.and.is_some()
            || self.or.is_some()
            || self.exclude.is_some()
    }

    /// Compact JSON for diagnostics and error parameters.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// `{offset, count, anchor?}` body of a `last`/`next` relative filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodJaql {
    #[serde(default)]
    pub offset: i64,

    #[serde(default)]
    pub count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}
