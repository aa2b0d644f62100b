//! JAQL metadata elements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::filter::FilterJaql;
use crate::model::types::DataType;

/// A single JAQL element: an attribute, a measure or a filtered attribute.
///
/// Field order here is the wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaqlElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DataType>,

    /// Date level (`years`, `months`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Minute bucket for rounded minute levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Aggregation (`sum`, `avg`, `countduplicates`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<String>,

    /// Calculated measure formula
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    /// Formula context keyed by `[name]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, JaqlElement>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterJaql>,

    /// Highlight selection
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_selection: Option<InJaql>,

    /// Keys this crate does not model, kept for round-tripping
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl JaqlElement {
    /// True if this element describes a measure.
    pub fn is_measure(&self) -> bool {
        self.agg.is_some() || self.formula.is_some()
    }

    /// Compact JSON for diagnostics and error parameters.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// `in: {selected: {jaql}}` highlight selection on a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InJaql {
    pub selected: SelectedJaql,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedJaql {
    pub jaql: Box<JaqlElement>,
}

impl InJaql {
    pub fn selected(jaql: JaqlElement) -> Self {
        Self {
            selected: SelectedJaql {
                jaql: Box::new(jaql),
            },
        }
    }
}

/// Query panel a metadata item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Rows,
    Columns,
    Measures,
    Scope,
}

/// `{jaql: ..., panel?}` wrapper used in query metadata and dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub jaql: JaqlElement,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<Panel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instanceid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl MetadataItem {
    pub fn new(jaql: JaqlElement) -> Self {
        Self {
            jaql,
            ..Default::default()
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = Some(panel);
        self
    }
}
