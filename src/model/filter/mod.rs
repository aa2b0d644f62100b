//! Filters and their JAQL emission.
//!
//! A [`Filter`] is a [`FilterKind`] plus a [`FilterConfig`]. Kinds nest:
//! exclude filters wrap another filter, logical filters combine filters on
//! one attribute, cascading filters chain levels.
//!
//! ```text
//! Filter::jaql_element()  → {dim, title, datatype, ..., filter: {...}}
//! Filter::metadata_items() → [{jaql: ...}]   (one per cascading level)
//! ```

pub mod condition;
pub mod factory;
pub mod from_jaql;
pub mod relations;

pub use condition::{classify, create_condition_filter, ConditionType};
pub use from_jaql::{
    extract_filter_type, filter_from_jaql, filter_from_metadata_item, filter_to_dto,
    filters_from_dtos, FilterDto, FilterType,
};
pub use relations::{
    calculate_new_relations, merge_filters_and_relations, split_filters_and_relations,
    FilterRelations, FilterTree, FiltersOrRelations,
};

use serde_json::Value;

use crate::jaql::{FilterJaql, JaqlElement, JaqlValue, MetadataItem, PeriodJaql};
use crate::model::attribute::Attribute;
use crate::model::measure::Measure;

/// Per-filter settings shared by every kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub guid: String,
    /// A disabled filter stays in the query but emits `filter: {}`
    pub disabled: bool,
    pub locked: bool,
    pub background_filter: Option<Box<Filter>>,
    pub exclude_members: bool,
    pub enable_multi_selection: bool,
    /// Members kept in the filter but not applied
    pub deactivated_members: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            guid: new_guid(),
            disabled: false,
            locked: false,
            background_filter: None,
            exclude_members: false,
            enable_multi_selection: true,
            deactivated_members: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn excluding(mut self, exclude: bool) -> Self {
        self.exclude_members = exclude;
        self
    }

    pub fn multi_selection(mut self, enabled: bool) -> Self {
        self.enable_multi_selection = enabled;
        self
    }

    pub fn with_background_filter(mut self, filter: Filter) -> Self {
        self.background_filter = Some(Box::new(filter));
        self
    }

    pub fn with_deactivated_members(mut self, members: Vec<String>) -> Self {
        self.deactivated_members = members;
        self
    }
}

/// A fresh filter guid.
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Comparison operators of numeric and measure filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericOperator {
    Equals,
    DoesntEqual,
    From,
    FromNotEqual,
    To,
    ToNotEqual,
}

impl NumericOperator {
    pub fn jaql_key(&self) -> &'static str {
        match self {
            NumericOperator::Equals => "equals",
            NumericOperator::DoesntEqual => "doesntEqual",
            NumericOperator::From => "from",
            NumericOperator::FromNotEqual => "fromNotEqual",
            NumericOperator::To => "to",
            NumericOperator::ToNotEqual => "toNotEqual",
        }
    }

    fn apply(&self, jaql: &mut FilterJaql, value: JaqlValue) {
        let slot = match self {
            NumericOperator::Equals => &mut jaql.equals,
            NumericOperator::DoesntEqual => &mut jaql.doesnt_equal,
            NumericOperator::From => &mut jaql.from,
            NumericOperator::FromNotEqual => &mut jaql.from_not_equal,
            NumericOperator::To => &mut jaql.to,
            NumericOperator::ToNotEqual => &mut jaql.to_not_equal,
        };
        *slot = Some(value);
    }
}

/// Text operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOperator {
    Contains,
    DoesntContain,
    StartsWith,
    DoesntStartWith,
    EndsWith,
    DoesntEndWith,
    Equals,
    DoesntEqual,
    Like,
}

impl TextOperator {
    pub fn jaql_key(&self) -> &'static str {
        match self {
            TextOperator::Contains => "contains",
            TextOperator::DoesntContain => "doesntContain",
            TextOperator::StartsWith => "startsWith",
            TextOperator::DoesntStartWith => "doesntStartWith",
            TextOperator::EndsWith => "endsWith",
            TextOperator::DoesntEndWith => "doesntEndWith",
            TextOperator::Equals => "equals",
            TextOperator::DoesntEqual => "doesntEqual",
            TextOperator::Like => "like",
        }
    }

    fn apply(&self, jaql: &mut FilterJaql, value: &str) {
        let value = value.to_string();
        match self {
            TextOperator::Contains => jaql.contains = Some(value),
            TextOperator::DoesntContain => jaql.doesnt_contain = Some(value),
            TextOperator::StartsWith => jaql.starts_with = Some(value),
            TextOperator::DoesntStartWith => jaql.doesnt_start_with = Some(value),
            TextOperator::EndsWith => jaql.ends_with = Some(value),
            TextOperator::DoesntEndWith => jaql.doesnt_end_with = Some(value),
            TextOperator::Equals => jaql.equals = Some(JaqlValue::Text(value)),
            TextOperator::DoesntEqual => jaql.doesnt_equal = Some(JaqlValue::Text(value)),
            TextOperator::Like => jaql.like = Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingOperator {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeOperator {
    Last,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

/// One side of a numeric or measure condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: NumericOperator,
    pub value: JaqlValue,
}

impl Condition {
    pub fn new(operator: NumericOperator, value: impl Into<JaqlValue>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }
}

/// What a filter does.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Members {
        attribute: Attribute,
        members: Vec<String>,
    },
    /// Everything except what `filter` selects, optionally within `input`
    Exclude {
        filter: Box<Filter>,
        input: Option<Box<Filter>>,
    },
    Numeric {
        attribute: Attribute,
        a: Option<Condition>,
        b: Option<Condition>,
    },
    Text {
        attribute: Attribute,
        operator: TextOperator,
        value: String,
    },
    DateRange {
        attribute: Attribute,
        from: Option<String>,
        to: Option<String>,
    },
    RelativeDate {
        attribute: Attribute,
        operator: RelativeOperator,
        offset: i64,
        count: i64,
        anchor: Option<String>,
    },
    Ranking {
        attribute: Attribute,
        measure: Measure,
        operator: RankingOperator,
        count: i64,
    },
    /// Condition on a measure value
    MeasureValue {
        measure: Measure,
        a: Option<Condition>,
        b: Option<Condition>,
    },
    Logical {
        operator: LogicalOperator,
        filters: Vec<Filter>,
    },
    Cascading {
        levels: Vec<Filter>,
    },
    Custom {
        attribute: Attribute,
        filter: FilterJaql,
    },
}

/// A filter: kind plus config.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub kind: FilterKind,
    pub config: FilterConfig,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            config: FilterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.config.guid = guid.into();
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn guid(&self) -> &str {
        &self.config.guid
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Kind name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            FilterKind::Members { .. } => "members",
            FilterKind::Exclude { .. } => "exclude",
            FilterKind::Numeric { .. } => "numeric",
            FilterKind::Text { .. } => "text",
            FilterKind::DateRange { .. } => "dateRange",
            FilterKind::RelativeDate { .. } => "relativeDate",
            FilterKind::Ranking { .. } => "ranking",
            FilterKind::MeasureValue { .. } => "measure",
            FilterKind::Logical { .. } => "logical",
            FilterKind::Cascading { .. } => "cascading",
            FilterKind::Custom { .. } => "custom",
        }
    }

    /// The filtered attribute. Measure filters have none; cascading filters
    /// report their first level.
    pub fn attribute(&self) -> Option<&Attribute> {
        match &self.kind {
            FilterKind::Members { attribute, .. }
            | FilterKind::Numeric { attribute, .. }
            | FilterKind::Text { attribute, .. }
            | FilterKind::DateRange { attribute, .. }
            | FilterKind::RelativeDate { attribute, .. }
            | FilterKind::Ranking { attribute, .. }
            | FilterKind::Custom { attribute, .. } => Some(attribute),
            FilterKind::Exclude { filter, .. } => filter.attribute(),
            FilterKind::Logical { filters, .. } => filters.first().and_then(Filter::attribute),
            FilterKind::Cascading { levels } => levels.first().and_then(Filter::attribute),
            FilterKind::MeasureValue { .. } => None,
        }
    }

    /// The inner filter object, ignoring the disabled flag.
    pub fn filter_jaql(&self) -> FilterJaql {
        let mut jaql = match &self.kind {
            FilterKind::Members { members, .. } => self.members_jaql(members),
            FilterKind::Exclude { filter, input } => {
                let mut jaql = input
                    .as_ref()
                    .map(|f| f.filter_jaql())
                    .unwrap_or_default();
                jaql.exclude = Some(Box::new(filter.filter_jaql()));
                jaql
            }
            FilterKind::Numeric { a, b, .. } | FilterKind::MeasureValue { a, b, .. } => {
                let mut jaql = FilterJaql::default();
                for cond in [a, b].into_iter().flatten() {
                    cond.operator.apply(&mut jaql, cond.value.clone());
                }
                jaql
            }
            FilterKind::Text {
                operator, value, ..
            } => {
                let mut jaql = FilterJaql::default();
                operator.apply(&mut jaql, value);
                jaql
            }
            FilterKind::DateRange { from, to, .. } => FilterJaql {
                from: from.clone().map(JaqlValue::Text),
                to: to.clone().map(JaqlValue::Text),
                ..Default::default()
            },
            FilterKind::RelativeDate {
                operator,
                offset,
                count,
                anchor,
                ..
            } => {
                let period = PeriodJaql {
                    offset: *offset,
                    count: *count,
                    anchor: anchor.clone(),
                };
                match operator {
                    RelativeOperator::Last => FilterJaql {
                        last: Some(period),
                        ..Default::default()
                    },
                    RelativeOperator::Next => FilterJaql {
                        next: Some(period),
                        ..Default::default()
                    },
                }
            }
            FilterKind::Ranking {
                measure,
                operator,
                count,
                ..
            } => {
                let mut jaql = FilterJaql {
                    by: Some(Box::new(measure.to_jaql())),
                    ..Default::default()
                };
                match operator {
                    RankingOperator::Top => jaql.top = Some(*count),
                    RankingOperator::Bottom => jaql.bottom = Some(*count),
                }
                jaql
            }
            FilterKind::Logical { operator, filters } => {
                let children: Vec<FilterJaql> = filters.iter().map(Filter::filter_jaql).collect();
                match operator {
                    LogicalOperator::And => FilterJaql {
                        and: Some(children),
                        ..Default::default()
                    },
                    LogicalOperator::Or => FilterJaql {
                        or: Some(children),
                        ..Default::default()
                    },
                }
            }
            FilterKind::Cascading { levels } => levels
                .first()
                .map(Filter::filter_jaql)
                .unwrap_or_default(),
            FilterKind::Custom { filter, .. } => filter.clone(),
        };

        if let Some(background) = &self.config.background_filter {
            if !background.is_disabled() {
                jaql.filter = Some(Box::new(background.filter_jaql()));
            }
        }
        jaql
    }

    fn members_jaql(&self, members: &[String]) -> FilterJaql {
        let active: Vec<JaqlValue> = members
            .iter()
            .filter(|m| !self.config.deactivated_members.contains(m))
            .map(|m| JaqlValue::Text(m.clone()))
            .collect();

        if self.config.exclude_members {
            return FilterJaql {
                multi_selection: Some(self.config.enable_multi_selection),
                exclude: Some(Box::new(FilterJaql {
                    members: Some(active),
                    ..Default::default()
                })),
                ..Default::default()
            };
        }

        if active.is_empty() {
            return FilterJaql {
                all: Some(true),
                ..Default::default()
            };
        }

        FilterJaql {
            explicit: Some(true),
            multi_selection: Some(self.config.enable_multi_selection),
            members: Some(active),
            ..Default::default()
        }
    }

    /// The element this filter applies to, with its `filter` attached.
    ///
    /// Disabled filters attach `filter: {}`.
    pub fn jaql_element(&self) -> JaqlElement {
        let mut element = match &self.kind {
            FilterKind::MeasureValue { measure, .. } => measure.to_jaql(),
            FilterKind::Cascading { levels } => {
                return levels
                    .first()
                    .map(|f| {
                        let mut el = f.jaql_element();
                        if self.is_disabled() {
                            el.filter = Some(FilterJaql::default());
                        }
                        el
                    })
                    .unwrap_or_default();
            }
            _ => match self.attribute() {
                Some(attr) => {
                    let mut el = attr.to_jaql();
                    el.sort = None;
                    el
                }
                None => JaqlElement::default(),
            },
        };
        element.filter = Some(if self.is_disabled() {
            FilterJaql::default()
        } else {
            self.filter_jaql()
        });
        element
    }

    /// `{jaql: ...}` items; cascading filters yield one per level.
    pub fn metadata_items(&self) -> Vec<MetadataItem> {
        match &self.kind {
            FilterKind::Cascading { levels } => levels
                .iter()
                .map(|level| {
                    let mut item = MetadataItem::new(level.jaql_element());
                    if self.is_disabled() {
                        item.jaql.filter = Some(FilterJaql::default());
                    }
                    item
                })
                .collect(),
            _ => vec![MetadataItem::new(self.jaql_element())],
        }
    }

    /// JSON form: an object, or an array of objects for cascading filters.
    pub fn jaql(&self) -> Value {
        let items = self.metadata_items();
        match &self.kind {
            FilterKind::Cascading { .. } => serde_json::to_value(items).unwrap_or(Value::Null),
            _ => items
                .into_iter()
                .next()
                .and_then(|item| serde_json::to_value(item).ok())
                .unwrap_or(Value::Null),
        }
    }
}
