// src/model/dimension.rs
use crate::jaql::JaqlElement;
use crate::model::attribute::{default_title, Attribute};
use crate::model::types::{DataType, Granularity};

/// A group of attributes, optionally with nested dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub expression: String,
    pub attributes: Vec<Attribute>,
    pub dimensions: Vec<Dimension>,
    /// Index into `attributes` of the attribute used when the dimension
    /// itself is queried
    pub default_attribute: Option<usize>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            attributes: Vec::new(),
            dimensions: Vec::new(),
            default_attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Mark the attribute called `name` as the default.
    pub fn with_default(mut self, name: &str) -> Self {
        self.default_attribute = self.attributes.iter().position(|a| a.name == name);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// The attribute used when the dimension itself is queried: the marked
    /// default, else the first attribute.
    pub fn default_attribute(&self) -> Option<&Attribute> {
        self.default_attribute
            .and_then(|idx| self.attributes.get(idx))
            .or_else(|| self.attributes.first())
    }

    /// JAQL of the default attribute; a bare text element if there is none.
    pub fn to_jaql(&self) -> JaqlElement {
        match self.default_attribute() {
            Some(attr) => attr.to_jaql(),
            None => Attribute::new(self.name.clone(), self.expression.clone(), DataType::Text)
                .to_jaql(),
        }
    }
}

/// A date dimension exposing one level attribute per granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct DateDimension {
    pub name: String,
    pub expression: String,
}

impl DateDimension {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// Date dimension for a table column: `[Table.Column (Calendar)]`.
    pub fn for_column(table: &str, column: &str) -> Self {
        Self::new(column, format!("[{}.{} (Calendar)]", table, column))
    }

    pub fn level(&self, granularity: Granularity) -> Attribute {
        let name = if self.name.is_empty() {
            default_title(&self.expression)
        } else {
            self.name.clone()
        };
        Attribute::level(
            format!("{} in {}", name, granularity.name().to_ascii_lowercase()),
            self.expression.clone(),
            granularity,
        )
    }

    pub fn years(&self) -> Attribute {
        self.level(Granularity::Years)
    }

    pub fn quarters(&self) -> Attribute {
        self.level(Granularity::Quarters)
    }

    pub fn months(&self) -> Attribute {
        self.level(Granularity::Months)
    }

    pub fn weeks(&self) -> Attribute {
        self.level(Granularity::Weeks)
    }

    pub fn days(&self) -> Attribute {
        self.level(Granularity::Days)
    }

    pub fn hours(&self) -> Attribute {
        self.level(Granularity::Hours)
    }

    pub fn minutes_round_to_30(&self) -> Attribute {
        self.level(Granularity::MinutesRoundTo30)
    }

    pub fn minutes_round_to_15(&self) -> Attribute {
        self.level(Granularity::MinutesRoundTo15)
    }

    /// All level attributes, coarsest first.
    pub fn levels(&self) -> Vec<Attribute> {
        Granularity::ALL.iter().map(|g| self.level(*g)).collect()
    }

    /// The default level (years).
    pub fn to_jaql(&self) -> JaqlElement {
        self.years().to_jaql()
    }
}
