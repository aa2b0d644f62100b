//! Filter constructors.
//!
//! Every constructor returns a filter with a fresh guid; use
//! [`Filter::with_config`] or [`Filter::with_guid`] to override.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{
    Condition, Filter, FilterConfig, FilterKind, LogicalOperator, NumericOperator,
    RankingOperator, RelativeOperator, TextOperator,
};
use crate::error::{ModelResult, TranslatableError};
use crate::jaql::{FilterJaql, JaqlValue};
use crate::model::attribute::Attribute;
use crate::model::measure::Measure;

/// Include only `members`.
pub fn members<S: AsRef<str>>(attribute: &Attribute, members: &[S]) -> Filter {
    Filter::new(FilterKind::Members {
        attribute: attribute.clone(),
        members: members.iter().map(|m| m.as_ref().to_string()).collect(),
    })
}

/// Exclude `members`.
pub fn exclude_members<S: AsRef<str>>(attribute: &Attribute, excluded: &[S]) -> Filter {
    members(attribute, excluded).with_config(FilterConfig::new().excluding(true))
}

/// Everything `filter` does not select, optionally restricted to `input`.
pub fn exclude(filter: Filter, input: Option<Filter>) -> Filter {
    Filter::new(FilterKind::Exclude {
        filter: Box::new(filter),
        input: input.map(Box::new),
    })
}

fn numeric(attribute: &Attribute, a: Option<Condition>, b: Option<Condition>) -> Filter {
    Filter::new(FilterKind::Numeric {
        attribute: attribute.clone(),
        a,
        b,
    })
}

fn text(attribute: &Attribute, operator: TextOperator, value: &str) -> Filter {
    Filter::new(FilterKind::Text {
        attribute: attribute.clone(),
        operator,
        value: value.to_string(),
    })
}

/// Text attributes get a text filter, everything else a numeric one.
pub fn equals(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    match value.into() {
        JaqlValue::Text(s) => text(attribute, TextOperator::Equals, &s),
        v => numeric(attribute, Some(Condition::new(NumericOperator::Equals, v)), None),
    }
}

pub fn doesnt_equal(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    match value.into() {
        JaqlValue::Text(s) => text(attribute, TextOperator::DoesntEqual, &s),
        v => numeric(
            attribute,
            Some(Condition::new(NumericOperator::DoesntEqual, v)),
            None,
        ),
    }
}

pub fn greater_than(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    numeric(
        attribute,
        Some(Condition::new(NumericOperator::FromNotEqual, value)),
        None,
    )
}

pub fn greater_than_or_equal(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    numeric(attribute, Some(Condition::new(NumericOperator::From, value)), None)
}

pub fn less_than(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    numeric(
        attribute,
        Some(Condition::new(NumericOperator::ToNotEqual, value)),
        None,
    )
}

pub fn less_than_or_equal(attribute: &Attribute, value: impl Into<JaqlValue>) -> Filter {
    numeric(attribute, Some(Condition::new(NumericOperator::To, value)), None)
}

/// Inclusive range.
pub fn between(
    attribute: &Attribute,
    from: impl Into<JaqlValue>,
    to: impl Into<JaqlValue>,
) -> Filter {
    numeric(
        attribute,
        Some(Condition::new(NumericOperator::From, from)),
        Some(Condition::new(NumericOperator::To, to)),
    )
}

/// Exclusive range.
pub fn between_not_equal(
    attribute: &Attribute,
    from: impl Into<JaqlValue>,
    to: impl Into<JaqlValue>,
) -> Filter {
    numeric(
        attribute,
        Some(Condition::new(NumericOperator::FromNotEqual, from)),
        Some(Condition::new(NumericOperator::ToNotEqual, to)),
    )
}

pub fn contains(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::Contains, value)
}

pub fn doesnt_contain(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::DoesntContain, value)
}

pub fn starts_with(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::StartsWith, value)
}

pub fn doesnt_start_with(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::DoesntStartWith, value)
}

pub fn ends_with(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::EndsWith, value)
}

pub fn doesnt_end_with(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::DoesntEndWith, value)
}

pub fn like(attribute: &Attribute, value: &str) -> Filter {
    text(attribute, TextOperator::Like, value)
}

fn ranking(
    attribute: &Attribute,
    measure: &Measure,
    operator: RankingOperator,
    count: i64,
) -> Filter {
    Filter::new(FilterKind::Ranking {
        attribute: attribute.clone(),
        measure: measure.clone(),
        operator,
        count,
    })
}

pub fn top_ranking(attribute: &Attribute, measure: &Measure, count: i64) -> Filter {
    ranking(attribute, measure, RankingOperator::Top, count)
}

pub fn bottom_ranking(attribute: &Attribute, measure: &Measure, count: i64) -> Filter {
    ranking(attribute, measure, RankingOperator::Bottom, count)
}

/// Check that `value` is a date or date-time JAQL understands.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
pub fn validate_date(attribute: &Attribute, value: &str) -> ModelResult<()> {
    let ok = NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok();
    if ok {
        Ok(())
    } else {
        Err(TranslatableError::new("errors.filter.invalidDate")
            .with_param("value", value)
            .with_param("attribute", attribute.expression.clone()))
    }
}

/// Date range; either bound may be open.
pub fn date_range(
    attribute: &Attribute,
    from: Option<&str>,
    to: Option<&str>,
) -> ModelResult<Filter> {
    for value in [from, to].into_iter().flatten() {
        validate_date(attribute, value)?;
    }
    Ok(Filter::new(FilterKind::DateRange {
        attribute: attribute.clone(),
        from: from.map(str::to_string),
        to: to.map(str::to_string),
    }))
}

pub fn date_from(attribute: &Attribute, from: &str) -> ModelResult<Filter> {
    date_range(attribute, Some(from), None)
}

pub fn date_to(attribute: &Attribute, to: &str) -> ModelResult<Filter> {
    date_range(attribute, None, Some(to))
}

/// Relative date window: `count` periods, `offset` periods back from
/// `anchor` (default: now).
pub fn date_relative(
    attribute: &Attribute,
    offset: i64,
    count: i64,
    anchor: Option<&str>,
) -> ModelResult<Filter> {
    relative(attribute, RelativeOperator::Next, offset, count, anchor)
}

/// Periods after the anchor.
pub fn date_relative_from(
    attribute: &Attribute,
    offset: i64,
    count: i64,
    anchor: Option<&str>,
) -> ModelResult<Filter> {
    relative(attribute, RelativeOperator::Next, offset, count, anchor)
}

/// Periods before the anchor.
pub fn date_relative_to(
    attribute: &Attribute,
    offset: i64,
    count: i64,
    anchor: Option<&str>,
) -> ModelResult<Filter> {
    relative(attribute, RelativeOperator::Last, offset, count, anchor)
}

fn relative(
    attribute: &Attribute,
    operator: RelativeOperator,
    offset: i64,
    count: i64,
    anchor: Option<&str>,
) -> ModelResult<Filter> {
    if let Some(anchor) = anchor {
        validate_date(attribute, anchor)?;
    }
    Ok(Filter::new(FilterKind::RelativeDate {
        attribute: attribute.clone(),
        operator,
        offset,
        count,
        anchor: anchor.map(str::to_string),
    }))
}

fn measure_condition(measure: &Measure, a: Condition, b: Option<Condition>) -> Filter {
    Filter::new(FilterKind::MeasureValue {
        measure: measure.clone(),
        a: Some(a),
        b,
    })
}

pub fn measure_equals(measure: &Measure, value: impl Into<JaqlValue>) -> Filter {
    measure_condition(measure, Condition::new(NumericOperator::Equals, value), None)
}

pub fn measure_greater_than(measure: &Measure, value: impl Into<JaqlValue>) -> Filter {
    measure_condition(
        measure,
        Condition::new(NumericOperator::FromNotEqual, value),
        None,
    )
}

pub fn measure_greater_than_or_equal(measure: &Measure, value: impl Into<JaqlValue>) -> Filter {
    measure_condition(measure, Condition::new(NumericOperator::From, value), None)
}

pub fn measure_less_than(measure: &Measure, value: impl Into<JaqlValue>) -> Filter {
    measure_condition(
        measure,
        Condition::new(NumericOperator::ToNotEqual, value),
        None,
    )
}

pub fn measure_less_than_or_equal(measure: &Measure, value: impl Into<JaqlValue>) -> Filter {
    measure_condition(measure, Condition::new(NumericOperator::To, value), None)
}

pub fn measure_between(
    measure: &Measure,
    from: impl Into<JaqlValue>,
    to: impl Into<JaqlValue>,
) -> Filter {
    measure_condition(
        measure,
        Condition::new(NumericOperator::From, from),
        Some(Condition::new(NumericOperator::To, to)),
    )
}

fn logical(operator: LogicalOperator, filters: Vec<Filter>) -> ModelResult<Filter> {
    if filters.is_empty() {
        return Err(TranslatableError::new("errors.filter.emptyLogical"));
    }
    let mut ids: Vec<String> = filters
        .iter()
        .filter_map(|f| f.attribute().map(Attribute::id))
        .collect();
    ids.dedup();
    if ids.len() > 1 {
        return Err(TranslatableError::new("errors.filter.mixedAttributes")
            .with_param("attributes", ids.join(", ")));
    }
    Ok(Filter::new(FilterKind::Logical { operator, filters }))
}

/// OR of filters on one attribute.
pub fn union(filters: Vec<Filter>) -> ModelResult<Filter> {
    logical(LogicalOperator::Or, filters)
}

/// AND of filters on one attribute.
pub fn intersection(filters: Vec<Filter>) -> ModelResult<Filter> {
    logical(LogicalOperator::And, filters)
}

/// Dependent filters applied level by level.
pub fn cascading(levels: Vec<Filter>) -> Filter {
    Filter::new(FilterKind::Cascading { levels })
}

/// A raw JAQL filter the model does not interpret.
pub fn custom(attribute: &Attribute, filter: FilterJaql) -> Filter {
    Filter::new(FilterKind::Custom {
        attribute: attribute.clone(),
        filter,
    })
}
