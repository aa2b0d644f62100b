//! Classification of flat condition filters.
//!
//! A condition filter arrives as one JAQL object whose keys say what it
//! means. [`classify`] maps that shape to a [`ConditionType`] by checking
//! key presence in a fixed order (first match wins) and
//! [`create_condition_filter`] dispatches the result to the factory.

use std::fmt;

use tracing::debug;

use super::{factory, Filter, FilterConfig};
use crate::error::{ModelResult, TranslatableError};
use crate::jaql::FilterJaql;
use crate::model::attribute::Attribute;
use crate::model::measure::Measure;
use crate::model::types::DataType;

/// What a condition filter does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    Top,
    Bottom,
    IsNot,
    IsWithin,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    Equals,
    DoesntEqual,
    Between,
    IsNotBetween,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    DoesntContain,
    StartsWith,
    DoesntStartWith,
    EndsWith,
    DoesntEndWith,
    Like,
    MultipleCondition,
    None,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Top => "top",
            ConditionType::Bottom => "bottom",
            ConditionType::IsNot => "isNot",
            ConditionType::IsWithin => "isWithin",
            ConditionType::GreaterThan => "greaterThan",
            ConditionType::LessThan => "lessThan",
            ConditionType::IsEmpty => "isEmpty",
            ConditionType::IsNotEmpty => "isNotEmpty",
            ConditionType::Equals => "equals",
            ConditionType::DoesntEqual => "doesntEqual",
            ConditionType::Between => "between",
            ConditionType::IsNotBetween => "isNotBetween",
            ConditionType::GreaterThanOrEqual => "greaterThanOrEqual",
            ConditionType::LessThanOrEqual => "lessThanOrEqual",
            ConditionType::Contains => "contains",
            ConditionType::DoesntContain => "doesntContain",
            ConditionType::StartsWith => "startsWith",
            ConditionType::DoesntStartWith => "doesntStartWith",
            ConditionType::EndsWith => "endsWith",
            ConditionType::DoesntEndWith => "doesntEndWith",
            ConditionType::Like => "like",
            ConditionType::MultipleCondition => "multipleCondition",
            ConditionType::None => "none",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a condition filter. First match wins.
///
/// Between is checked before GreaterThanOrEqual/LessThanOrEqual because
/// some payloads carry `from` and `to` without `isBetween`.
pub fn classify(filter: &FilterJaql) -> ConditionType {
    let exclude = filter.exclude.as_deref();

    if filter.top.is_some() {
        return ConditionType::Top;
    }
    if filter.bottom.is_some() {
        return ConditionType::Bottom;
    }
    if exclude.is_some_and(|e| e.members.is_some()) {
        return ConditionType::IsNot;
    }
    if filter.last.is_some() || filter.next.is_some() {
        return ConditionType::IsWithin;
    }
    if filter.from_not_equal.is_some() {
        return ConditionType::GreaterThan;
    }
    if filter.to_not_equal.is_some() {
        return ConditionType::LessThan;
    }
    // Empty checks precede the general equality checks they overlap with
    if filter.equals.as_ref().is_some_and(|v| v.is_empty_text()) {
        return ConditionType::IsEmpty;
    }
    if filter.doesnt_equal.as_ref().is_some_and(|v| v.is_empty_text()) {
        return ConditionType::IsNotEmpty;
    }
    if filter.equals.is_some() {
        return ConditionType::Equals;
    }
    if filter.doesnt_equal.is_some() {
        return ConditionType::DoesntEqual;
    }
    if filter.from.is_some() && filter.to.is_some() {
        return ConditionType::Between;
    }
    if exclude.is_some_and(|e| e.from.is_some() && e.to.is_some()) {
        return ConditionType::IsNotBetween;
    }
    if filter.from.is_some() {
        return ConditionType::GreaterThanOrEqual;
    }
    if filter.to.is_some() {
        return ConditionType::LessThanOrEqual;
    }
    if filter.contains.is_some() {
        return ConditionType::Contains;
    }
    if filter.doesnt_contain.is_some() {
        return ConditionType::DoesntContain;
    }
    if filter.starts_with.is_some() {
        return ConditionType::StartsWith;
    }
    if filter.doesnt_start_with.is_some() {
        return ConditionType::DoesntStartWith;
    }
    if filter.ends_with.is_some() {
        return ConditionType::EndsWith;
    }
    if filter.doesnt_end_with.is_some() {
        return ConditionType::DoesntEndWith;
    }
    if filter.like.is_some() {
        return ConditionType::Like;
    }
    if filter.and.is_some() || filter.or.is_some() {
        return ConditionType::MultipleCondition;
    }
    ConditionType::None
}

fn unsupported(filter: &FilterJaql) -> TranslatableError {
    TranslatableError::new("errors.filter.unsupportedConditionFilter")
        .with_param("filter", filter.to_json_string())
}

fn ranking_measure(filter: &FilterJaql) -> ModelResult<Measure> {
    let by = filter.by.as_deref().ok_or_else(|| {
        TranslatableError::new("errors.filter.rankingWithoutMeasure")
            .with_param("filter", filter.to_json_string())
    })?;
    let mut measure = Measure::from_jaql(by)?;
    if let Some(message) = &filter.ranking_message {
        measure = measure.with_name(message.clone());
    }
    Ok(measure)
}

fn text_value(filter: &FilterJaql, value: Option<&String>) -> ModelResult<String> {
    value.cloned().ok_or_else(|| unsupported(filter))
}

/// Build a typed filter from a condition filter.
///
/// The result carries `guid`; condition types with no typed counterpart
/// are an error.
pub fn create_condition_filter(
    attribute: &Attribute,
    filter: &FilterJaql,
    guid: &str,
) -> ModelResult<Filter> {
    let condition = classify(filter);
    debug!(condition = %condition, attribute = %attribute.expression, "classified condition filter");

    let built = match condition {
        ConditionType::Top => {
            let count = filter.top.ok_or_else(|| unsupported(filter))?;
            factory::top_ranking(attribute, &ranking_measure(filter)?, count)
        }
        ConditionType::Bottom => {
            let count = filter.bottom.ok_or_else(|| unsupported(filter))?;
            factory::bottom_ranking(attribute, &ranking_measure(filter)?, count)
        }
        ConditionType::IsNot => {
            let members: Vec<String> = filter
                .exclude
                .as_ref()
                .and_then(|e| e.members.as_ref())
                .map(|m| m.iter().map(|v| v.to_string()).collect())
                .unwrap_or_default();
            factory::members(attribute, &members).with_config(
                FilterConfig::new()
                    .excluding(true)
                    .multi_selection(filter.multi_selection.unwrap_or(true)),
            )
        }
        ConditionType::IsWithin => {
            let (period, is_last) = match (&filter.last, &filter.next) {
                (Some(p), _) => (p, true),
                (None, Some(p)) => (p, false),
                (None, None) => return Err(unsupported(filter)),
            };
            if is_last {
                factory::date_relative_to(attribute, period.offset, period.count, period.anchor.as_deref())?
            } else {
                factory::date_relative_from(attribute, period.offset, period.count, period.anchor.as_deref())?
            }
        }
        ConditionType::GreaterThan => match &filter.to_not_equal {
            // fromNotEqual + toNotEqual is an exclusive range
            Some(to) => factory::between_not_equal(
                attribute,
                filter.from_not_equal.clone().ok_or_else(|| unsupported(filter))?,
                to.clone(),
            ),
            None => factory::greater_than(
                attribute,
                filter.from_not_equal.clone().ok_or_else(|| unsupported(filter))?,
            ),
        },
        ConditionType::LessThan => factory::less_than(
            attribute,
            filter.to_not_equal.clone().ok_or_else(|| unsupported(filter))?,
        ),
        ConditionType::IsEmpty => factory::equals(attribute, ""),
        ConditionType::IsNotEmpty => factory::doesnt_equal(attribute, ""),
        ConditionType::Equals => factory::equals(
            attribute,
            filter.equals.clone().ok_or_else(|| unsupported(filter))?,
        ),
        ConditionType::DoesntEqual => factory::doesnt_equal(
            attribute,
            filter.doesnt_equal.clone().ok_or_else(|| unsupported(filter))?,
        ),
        ConditionType::Between => {
            let from = filter.from.clone().ok_or_else(|| unsupported(filter))?;
            let to = filter.to.clone().ok_or_else(|| unsupported(filter))?;
            if attribute.data_type == DataType::DateTime {
                factory::date_range(
                    attribute,
                    Some(&from.to_string()),
                    Some(&to.to_string()),
                )?
            } else {
                factory::between(attribute, from, to)
            }
        }
        ConditionType::IsNotBetween => {
            let inner = filter.exclude.as_deref().ok_or_else(|| unsupported(filter))?;
            let from = inner.from.clone().ok_or_else(|| unsupported(filter))?;
            let to = inner.to.clone().ok_or_else(|| unsupported(filter))?;
            factory::exclude(factory::between(attribute, from, to), None)
        }
        ConditionType::GreaterThanOrEqual => {
            let from = filter.from.clone().ok_or_else(|| unsupported(filter))?;
            if attribute.data_type == DataType::DateTime {
                factory::date_from(attribute, &from.to_string())?
            } else {
                factory::greater_than_or_equal(attribute, from)
            }
        }
        ConditionType::LessThanOrEqual => {
            let to = filter.to.clone().ok_or_else(|| unsupported(filter))?;
            if attribute.data_type == DataType::DateTime {
                factory::date_to(attribute, &to.to_string())?
            } else {
                factory::less_than_or_equal(attribute, to)
            }
        }
        ConditionType::Contains => {
            factory::contains(attribute, &text_value(filter, filter.contains.as_ref())?)
        }
        ConditionType::DoesntContain => {
            factory::doesnt_contain(attribute, &text_value(filter, filter.doesnt_contain.as_ref())?)
        }
        ConditionType::StartsWith => {
            factory::starts_with(attribute, &text_value(filter, filter.starts_with.as_ref())?)
        }
        ConditionType::DoesntStartWith => factory::doesnt_start_with(
            attribute,
            &text_value(filter, filter.doesnt_start_with.as_ref())?,
        ),
        ConditionType::EndsWith => {
            factory::ends_with(attribute, &text_value(filter, filter.ends_with.as_ref())?)
        }
        ConditionType::DoesntEndWith => factory::doesnt_end_with(
            attribute,
            &text_value(filter, filter.doesnt_end_with.as_ref())?,
        ),
        ConditionType::Like => factory::like(attribute, &text_value(filter, filter.like.as_ref())?),
        ConditionType::MultipleCondition => {
            let (children, is_and) = match (&filter.and, &filter.or) {
                (Some(c), _) => (c, true),
                (None, Some(c)) => (c, false),
                (None, None) => return Err(unsupported(filter)),
            };
            let filters = children
                .iter()
                .map(|child| create_condition_filter(attribute, child, &super::new_guid()))
                .collect::<ModelResult<Vec<_>>>()?;
            if is_and {
                factory::intersection(filters)?
            } else {
                factory::union(filters)?
            }
        }
        ConditionType::None => return Err(unsupported(filter)),
    };

    Ok(built.with_guid(guid))
}
