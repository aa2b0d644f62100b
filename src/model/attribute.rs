// src/model/attribute.rs
use crate::error::{ModelResult, TranslatableError};
use crate::jaql::{JaqlElement, MetadataItem};
use crate::model::types::{DataType, Granularity, Sort};

/// A queryable column. With a granularity it is a date level attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    /// Dimensional expression, e.g. `[Commerce.Age Range]`
    pub expression: String,
    pub data_type: DataType,
    pub granularity: Option<Granularity>,
    /// Display format (level attributes default to the granularity format)
    pub format: Option<String>,
    pub sort: Sort,
    pub description: Option<String>,
    pub data_source: Option<String>,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        expression: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            data_type,
            granularity: None,
            format: None,
            sort: Sort::None,
            description: None,
            data_source: None,
        }
    }

    pub fn text(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::new(name, expression, DataType::Text)
    }

    pub fn numeric(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::new(name, expression, DataType::Numeric)
    }

    /// A date level attribute.
    pub fn level(
        name: impl Into<String>,
        expression: impl Into<String>,
        granularity: Granularity,
    ) -> Self {
        Self::new(name, expression, DataType::DateTime).with_granularity(granularity)
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.data_type = DataType::DateTime;
        self.granularity = Some(granularity);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    pub fn is_level(&self) -> bool {
        self.granularity.is_some()
    }

    /// Model type string: `text-attribute`, `numeric-attribute` or `datetime-level`.
    pub fn type_name(&self) -> &'static str {
        match (self.granularity, self.data_type) {
            (Some(_), _) | (None, DataType::DateTime) => "datetime-level",
            (None, DataType::Numeric) => "numeric-attribute",
            (None, DataType::Text) => "text-attribute",
        }
    }

    /// Identity of the attribute: the expression, plus the level name.
    pub fn id(&self) -> String {
        match self.granularity {
            Some(g) => format!("{}.{}", self.expression, g.name()),
            None => self.expression.clone(),
        }
    }

    /// Effective display format.
    pub fn effective_format(&self) -> Option<String> {
        self.format
            .clone()
            .or_else(|| self.granularity.map(|g| g.default_format().to_string()))
    }

    /// Nested JAQL element (no `{jaql: ...}` wrapper).
    pub fn to_jaql(&self) -> JaqlElement {
        JaqlElement {
            dim: Some(self.expression.clone()),
            title: Some(self.name.clone()),
            datatype: Some(self.data_type),
            level: self.granularity.map(|g| g.level().to_string()),
            bucket: self
                .granularity
                .and_then(|g| g.bucket())
                .map(str::to_string),
            sort: self.sort.to_jaql(),
            ..Default::default()
        }
    }

    /// `{jaql: ...}` metadata item.
    pub fn metadata_item(&self) -> MetadataItem {
        MetadataItem::new(self.to_jaql())
    }

    /// Rebuild an attribute from a JAQL element.
    pub fn from_jaql(jaql: &JaqlElement) -> ModelResult<Self> {
        let dim = jaql.dim.clone().ok_or_else(|| {
            TranslatableError::new("errors.attribute.missingDim")
                .with_param("jaql", jaql.to_json_string())
        })?;

        let granularity = match jaql.level.as_deref() {
            Some(level) => Some(
                Granularity::from_level(level, jaql.bucket.as_deref()).ok_or_else(|| {
                    TranslatableError::new("errors.attribute.unknownLevel")
                        .with_param("level", level)
                        .with_param("attribute", dim.clone())
                })?,
            ),
            None => None,
        };

        let data_type = match (jaql.datatype, granularity) {
            (_, Some(_)) => DataType::DateTime,
            (Some(dt), None) => dt,
            (None, None) => DataType::Text,
        };

        let name = jaql.title.clone().unwrap_or_else(|| default_title(&dim));

        Ok(Self {
            name,
            expression: dim,
            data_type,
            granularity,
            format: None,
            sort: Sort::from_jaql(jaql.sort.as_deref()),
            description: None,
            data_source: None,
        })
    }
}

/// Title derived from an expression: `[Commerce.Age Range]` → `Age Range`.
pub fn default_title(expression: &str) -> String {
    let trimmed = expression.trim_start_matches('[').trim_end_matches(']');
    let column = trimmed.rsplit('.').next().unwrap_or(trimmed);
    // Strip a calendar suffix such as "Date (Calendar)"
    match column.find(" (") {
        Some(idx) => column[..idx].to_string(),
        None => column.to_string(),
    }
}
