//! Data schema used to resolve NLQ column paths.
//!
//! Paths look like `DM.<Table>.<Column>` or, for date columns,
//! `DM.<Table>.<Column>.<Level>`. Table names may themselves contain dots.

use serde::{Deserialize, Serialize};

use crate::model::{Attribute, DataType, DateDimension, Granularity};

/// Prefix of every column path.
pub const PATH_PREFIX: &str = "DM.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaColumn {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<SchemaColumn>,
}

/// Tables and columns of one data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSchema {
    #[serde(default)]
    pub data_source: String,
    #[serde(default)]
    pub tables: Vec<SchemaTable>,
}

impl DataSchema {
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, DataType)]) -> Self {
        self.tables.push(SchemaTable {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(column, data_type)| SchemaColumn {
                    name: column.to_string(),
                    data_type: *data_type,
                    description: None,
                })
                .collect(),
        });
        self
    }

    /// Resolve a column path to an attribute.
    ///
    /// Date columns without a level resolve to their years level.
    pub fn resolve(&self, path: &str) -> Option<Attribute> {
        let rest = path.strip_prefix(PATH_PREFIX).unwrap_or(path);

        // Longest table name first so `A.B` wins over `A`
        let mut tables: Vec<&SchemaTable> = self.tables.iter().collect();
        tables.sort_by_key(|t| std::cmp::Reverse(t.name.len()));

        for table in tables {
            let Some(column_path) = rest
                .strip_prefix(table.name.as_str())
                .and_then(|r| r.strip_prefix('.'))
            else {
                continue;
            };

            if let Some(column) = table.columns.iter().find(|c| c.name == column_path) {
                return Some(column_attribute(table, column, None));
            }

            if let Some((column_name, level)) = column_path.rsplit_once('.') {
                let column = table
                    .columns
                    .iter()
                    .find(|c| c.name == column_name && c.data_type == DataType::DateTime);
                if let (Some(column), Some(granularity)) = (column, Granularity::from_name(level))
                {
                    return Some(column_attribute(table, column, Some(granularity)));
                }
            }
        }
        None
    }

    /// The path of an attribute, if it belongs to this schema's naming scheme.
    pub fn path_of(attribute: &Attribute) -> Option<String> {
        let inner = attribute
            .expression
            .strip_prefix('[')?
            .strip_suffix(']')?;
        let inner = inner.strip_suffix(" (Calendar)").unwrap_or(inner);
        Some(match attribute.granularity {
            Some(g) => format!("{}{}.{}", PATH_PREFIX, inner, g.name()),
            None => format!("{}{}", PATH_PREFIX, inner),
        })
    }
}

fn column_attribute(
    table: &SchemaTable,
    column: &SchemaColumn,
    granularity: Option<Granularity>,
) -> Attribute {
    let attribute = match column.data_type {
        DataType::DateTime => DateDimension::for_column(&table.name, &column.name)
            .level(granularity.unwrap_or(Granularity::Years)),
        data_type => Attribute::new(
            column.name.clone(),
            format!("[{}.{}]", table.name, column.name),
            data_type,
        ),
    };
    match &column.description {
        Some(description) => attribute.with_description(description.clone()),
        None => attribute,
    }
}
