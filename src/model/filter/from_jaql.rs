//! Rebuilding typed filters from JAQL.
//!
//! Parsing never fails on well-formed JSON: anything the typed model cannot
//! express comes back as a custom filter carrying the raw JAQL.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition::{classify, create_condition_filter, ConditionType};
use super::{factory, new_guid, Condition, Filter, FilterConfig, FilterKind, NumericOperator};
use crate::error::ModelResult;
use crate::jaql::{FilterJaql, JaqlElement, MetadataItem};
use crate::model::attribute::Attribute;
use crate::model::measure::Measure;
use crate::model::types::DataType;

/// Broad family of a JAQL filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    IncludeAll,
    SpecificItems,
    Period,
    NumericRange,
    DateRange,
    Condition,
    Advanced,
    Invalid,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::IncludeAll => "includeAll",
            FilterType::SpecificItems => "specificItems",
            FilterType::Period => "period",
            FilterType::NumericRange => "numericRange",
            FilterType::DateRange => "dateRange",
            FilterType::Condition => "condition",
            FilterType::Advanced => "advanced",
            FilterType::Invalid => "invalid",
        }
    }
}

/// Work out the filter family, checking in a fixed order.
pub fn extract_filter_type(filter: &FilterJaql, data_type: Option<DataType>) -> FilterType {
    let has_range = filter.from.is_some() || filter.to.is_some();

    if filter.all == Some(true) {
        return FilterType::IncludeAll;
    }
    if filter.members.is_some() {
        return FilterType::SpecificItems;
    }
    if filter.last.is_some() || filter.next.is_some() {
        return FilterType::Period;
    }
    if data_type == Some(DataType::Numeric)
        && filter.from.is_some()
        && filter.to.is_some()
        && !filter.has_condition_operator()
    {
        return FilterType::NumericRange;
    }
    if data_type == Some(DataType::DateTime) && has_range && !filter.has_condition_operator() {
        return FilterType::DateRange;
    }
    if classify(filter) != ConditionType::None {
        return FilterType::Condition;
    }
    if filter.custom == Some(true) || !filter.extra.is_empty() {
        return FilterType::Advanced;
    }
    FilterType::Invalid
}

/// Build a filter from a JAQL element carrying `filter`.
///
/// Without `guid` a fresh one is generated.
pub fn filter_from_jaql(jaql: &JaqlElement, guid: Option<&str>) -> Filter {
    let guid = guid.map(str::to_string).unwrap_or_else(new_guid);
    match build_filter(jaql, &guid) {
        Ok(filter) => filter,
        Err(err) => {
            debug!(error = %err, "falling back to custom filter");
            let filter = jaql.filter.clone().unwrap_or_default();
            factory::custom(&fallback_attribute(jaql), filter).with_guid(guid)
        }
    }
}

/// Build a filter from a metadata item, honouring its `disabled` flag
/// and `instanceid`.
pub fn filter_from_metadata_item(item: &MetadataItem) -> Filter {
    filter_from_jaql(&item.jaql, item.instanceid.as_deref())
        .with_disabled(item.disabled.unwrap_or(false))
}

fn fallback_attribute(jaql: &JaqlElement) -> Attribute {
    let mut attr_el = jaql.clone();
    attr_el.filter = None;
    Attribute::from_jaql(&attr_el).unwrap_or_else(|_| {
        Attribute::text(
            jaql.title.clone().unwrap_or_default(),
            jaql.dim.clone().unwrap_or_default(),
        )
    })
}

fn build_filter(jaql: &JaqlElement, guid: &str) -> ModelResult<Filter> {
    let filter = jaql.filter.clone().unwrap_or_default();

    if jaql.is_measure() {
        return measure_filter(jaql, &filter).map(|f| f.with_guid(guid));
    }

    let mut attr_el = jaql.clone();
    attr_el.filter = None;
    let attribute = Attribute::from_jaql(&attr_el)?;

    let mut built = match extract_filter_type(&filter, Some(attribute.data_type)) {
        FilterType::IncludeAll => factory::members(&attribute, &[] as &[String]),
        FilterType::SpecificItems => {
            let members: Vec<String> = filter
                .members
                .iter()
                .flatten()
                .map(|v| v.to_string())
                .collect();
            factory::members(&attribute, &members).with_config(
                FilterConfig::new().multi_selection(filter.multi_selection.unwrap_or(true)),
            )
        }
        FilterType::Period | FilterType::Condition => {
            create_condition_filter(&attribute, &filter, guid)?
        }
        FilterType::NumericRange => match (&filter.from, &filter.to) {
            (Some(from), Some(to)) => factory::between(&attribute, from.clone(), to.clone()),
            _ => factory::custom(&attribute, filter.clone()),
        },
        FilterType::DateRange => {
            let from = filter.from.as_ref().map(|v| v.to_string());
            let to = filter.to.as_ref().map(|v| v.to_string());
            factory::date_range(&attribute, from.as_deref(), to.as_deref())?
        }
        FilterType::Advanced | FilterType::Invalid => {
            return Ok(factory::custom(&attribute, filter).with_guid(guid));
        }
    };

    if let Some(background) = filter.filter.as_deref() {
        let mut bg_el = attr_el.clone();
        bg_el.filter = Some(background.clone());
        built.config.background_filter = Some(Box::new(filter_from_jaql(&bg_el, None)));
    }

    Ok(built.with_guid(guid))
}

/// A measure element with a numeric condition attached.
fn measure_filter(jaql: &JaqlElement, filter: &FilterJaql) -> ModelResult<Filter> {
    let mut measure_el = jaql.clone();
    measure_el.filter = None;
    let measure = Measure::from_jaql(&measure_el)?;

    let pairs = [
        (NumericOperator::Equals, &filter.equals),
        (NumericOperator::DoesntEqual, &filter.doesnt_equal),
        (NumericOperator::From, &filter.from),
        (NumericOperator::FromNotEqual, &filter.from_not_equal),
        (NumericOperator::To, &filter.to),
        (NumericOperator::ToNotEqual, &filter.to_not_equal),
    ];
    let mut conditions = pairs
        .into_iter()
        .filter_map(|(op, value)| value.clone().map(|v| Condition::new(op, v)));

    Ok(Filter::new(FilterKind::MeasureValue {
        measure,
        a: conditions.next(),
        b: conditions.next(),
    }))
}

/// Dashboard filter DTO: a single filter or a cascading chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterDto {
    Cascading {
        levels: Vec<JaqlElement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instanceid: Option<String>,
        #[serde(default)]
        disabled: bool,
        #[serde(rename = "isCascading", default)]
        is_cascading: bool,
    },
    Single {
        jaql: JaqlElement,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instanceid: Option<String>,
        #[serde(default)]
        disabled: bool,
    },
}

/// Translate dashboard filter DTOs into typed filters.
pub fn filters_from_dtos(dtos: &[FilterDto]) -> Vec<Filter> {
    dtos.iter()
        .map(|dto| match dto {
            FilterDto::Single {
                jaql,
                instanceid,
                disabled,
            } => filter_from_jaql(jaql, instanceid.as_deref()).with_disabled(*disabled),
            FilterDto::Cascading {
                levels,
                instanceid,
                disabled,
                ..
            } => {
                let levels = levels.iter().map(|l| filter_from_jaql(l, None)).collect();
                let filter = factory::cascading(levels).with_disabled(*disabled);
                match instanceid {
                    Some(id) => filter.with_guid(id.clone()),
                    None => filter,
                }
            }
        })
        .collect()
}

/// Translate a typed filter into its dashboard DTO.
pub fn filter_to_dto(filter: &Filter) -> FilterDto {
    match &filter.kind {
        FilterKind::Cascading { levels } => FilterDto::Cascading {
            levels: levels.iter().map(Filter::jaql_element).collect(),
            instanceid: Some(filter.guid().to_string()),
            disabled: filter.is_disabled(),
            is_cascading: true,
        },
        _ => {
            let mut jaql = filter.jaql_element();
            // The DTO carries the disabled flag; keep the real filter body
            jaql.filter = Some(filter.filter_jaql());
            FilterDto::Single {
                jaql,
                instanceid: Some(filter.guid().to_string()),
                disabled: filter.is_disabled(),
            }
        }
    }
}
