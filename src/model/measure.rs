// src/model/measure.rs
use std::collections::BTreeMap;

use crate::error::{ModelResult, TranslatableError};
use crate::jaql::{JaqlElement, MetadataItem};
use crate::model::attribute::{default_title, Attribute};
use crate::model::filter::{filter_from_jaql, Filter};
use crate::model::types::{AggregationType, Sort};

/// A measure: an aggregated attribute or a formula over other elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    Base(BaseMeasure),
    Calculated(CalculatedMeasure),
}

/// `agg(attribute)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMeasure {
    pub name: String,
    pub attribute: Attribute,
    pub aggregation: AggregationType,
    pub format: Option<String>,
    pub sort: Sort,
}

/// A formula whose `[key]` references resolve through `context`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedMeasure {
    pub name: String,
    pub expression: String,
    /// Keys include the brackets: `[Revenue]`
    pub context: BTreeMap<String, ContextItem>,
    pub format: Option<String>,
    pub sort: Sort,
}

/// An element referenced from a formula.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextItem {
    Attribute(Attribute),
    Measure(Box<Measure>),
    Filter(Box<Filter>),
}

impl ContextItem {
    pub fn to_jaql(&self) -> JaqlElement {
        match self {
            ContextItem::Attribute(a) => a.to_jaql(),
            ContextItem::Measure(m) => m.to_jaql(),
            ContextItem::Filter(f) => f.jaql_element(),
        }
    }

    /// Classify a context element: measures carry `agg`/`formula`,
    /// filters carry `filter`, anything else is an attribute.
    pub fn from_jaql(jaql: &JaqlElement) -> ModelResult<Self> {
        if jaql.is_measure() {
            return Ok(ContextItem::Measure(Box::new(Measure::from_jaql(jaql)?)));
        }
        if jaql.filter.is_some() {
            return Ok(ContextItem::Filter(Box::new(filter_from_jaql(jaql, None))));
        }
        Ok(ContextItem::Attribute(Attribute::from_jaql(jaql)?))
    }
}

impl From<Attribute> for ContextItem {
    fn from(a: Attribute) -> Self {
        ContextItem::Attribute(a)
    }
}

impl From<Measure> for ContextItem {
    fn from(m: Measure) -> Self {
        ContextItem::Measure(Box::new(m))
    }
}

impl From<Filter> for ContextItem {
    fn from(f: Filter) -> Self {
        ContextItem::Filter(Box::new(f))
    }
}

impl Measure {
    pub fn name(&self) -> &str {
        match self {
            Measure::Base(m) => &m.name,
            Measure::Calculated(m) => &m.name,
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            Measure::Base(m) => m.sort,
            Measure::Calculated(m) => m.sort,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            Measure::Base(m) => m.format.as_deref(),
            Measure::Calculated(m) => m.format.as_deref(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        match &mut self {
            Measure::Base(m) => m.sort = sort,
            Measure::Calculated(m) => m.sort = sort,
        }
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        let format = Some(format.into());
        match &mut self {
            Measure::Base(m) => m.format = format,
            Measure::Calculated(m) => m.format = format,
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self {
            Measure::Base(m) => m.name = name,
            Measure::Calculated(m) => m.name = name,
        }
        self
    }

    /// Identity used for matching measures across queries.
    pub fn id(&self) -> String {
        match self {
            Measure::Base(m) => format!("{}.{}", m.attribute.id(), m.aggregation.factory_name()),
            Measure::Calculated(m) => m.expression.clone(),
        }
    }

    /// Nested JAQL element (no `{jaql: ...}` wrapper).
    pub fn to_jaql(&self) -> JaqlElement {
        match self {
            Measure::Base(m) => JaqlElement {
                dim: Some(m.attribute.expression.clone()),
                title: Some(m.name.clone()),
                datatype: Some(m.attribute.data_type),
                level: m.attribute.granularity.map(|g| g.level().to_string()),
                agg: Some(m.aggregation.jaql_name().to_string()),
                sort: m.sort.to_jaql(),
                ..Default::default()
            },
            Measure::Calculated(m) => JaqlElement {
                title: Some(m.name.clone()),
                formula: Some(m.expression.clone()),
                context: Some(
                    m.context
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_jaql()))
                        .collect(),
                ),
                sort: m.sort.to_jaql(),
                ..Default::default()
            },
        }
    }

    pub fn metadata_item(&self) -> MetadataItem {
        MetadataItem::new(self.to_jaql())
    }

    /// Rebuild a measure from a JAQL element.
    pub fn from_jaql(jaql: &JaqlElement) -> ModelResult<Self> {
        if let Some(formula) = &jaql.formula {
            let mut context = BTreeMap::new();
            if let Some(ctx) = &jaql.context {
                for (key, el) in ctx {
                    context.insert(key.clone(), ContextItem::from_jaql(el)?);
                }
            }
            return Ok(Measure::Calculated(CalculatedMeasure {
                name: jaql.title.clone().unwrap_or_else(|| formula.clone()),
                expression: formula.clone(),
                context,
                format: None,
                sort: Sort::from_jaql(jaql.sort.as_deref()),
            }));
        }

        if let Some(agg) = &jaql.agg {
            let aggregation = AggregationType::from_jaql(agg)?;
            let mut attr_jaql = jaql.clone();
            attr_jaql.agg = None;
            attr_jaql.sort = None;
            let attribute = Attribute::from_jaql(&attr_jaql)?;
            let name = jaql
                .title
                .clone()
                .unwrap_or_else(|| format!("{} {}", aggregation.factory_name(), attribute.name));
            return Ok(Measure::Base(BaseMeasure {
                name,
                attribute,
                aggregation,
                format: None,
                sort: Sort::from_jaql(jaql.sort.as_deref()),
            }));
        }

        Err(TranslatableError::new("errors.measure.unsupportedType")
            .with_param("jaql", jaql.to_json_string()))
    }
}

/// An attribute waiting for an aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureTemplate {
    pub name: String,
    pub attribute: Attribute,
}

impl MeasureTemplate {
    pub fn new(attribute: Attribute) -> Self {
        Self {
            name: default_title(&attribute.expression),
            attribute,
        }
    }

    pub fn aggregate(&self, aggregation: AggregationType) -> Measure {
        Measure::Base(BaseMeasure {
            name: format!("{} {}", aggregation.factory_name(), self.name),
            attribute: self.attribute.clone(),
            aggregation,
            format: None,
            sort: Sort::None,
        })
    }

    pub fn sum(&self) -> Measure {
        self.aggregate(AggregationType::Sum)
    }

    pub fn average(&self) -> Measure {
        self.aggregate(AggregationType::Average)
    }

    pub fn min(&self) -> Measure {
        self.aggregate(AggregationType::Min)
    }

    pub fn max(&self) -> Measure {
        self.aggregate(AggregationType::Max)
    }

    pub fn median(&self) -> Measure {
        self.aggregate(AggregationType::Median)
    }

    pub fn count(&self) -> Measure {
        self.aggregate(AggregationType::Count)
    }

    pub fn count_distinct(&self) -> Measure {
        self.aggregate(AggregationType::CountDistinct)
    }
}
