//! JAQL query payloads.

use serde::{Deserialize, Serialize};

use super::element::MetadataItem;

/// The data source a query runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub title: String,

    /// `elasticube` or `live`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<bool>,
}

impl DataSource {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Boolean operator of a filter-relations node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationOperator {
    And,
    Or,
}

/// Wire form of filter relations: leaves reference filters by instanceid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterRelationsJaql {
    Node {
        operator: RelationOperator,
        left: Box<FilterRelationsJaql>,
        right: Box<FilterRelationsJaql>,
    },
    Leaf {
        instanceid: String,
    },
}

/// A complete JAQL request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaqlQuery {
    pub datasource: DataSource,

    pub metadata: Vec<MetadataItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_relations: Option<FilterRelationsJaql>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query_guid: String,
}
