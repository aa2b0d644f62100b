//! Constructors for base and calculated measures.
//!
//! Calculated measures built here use bracketed context keys (`[a]`,
//! `[b]`, `[m]`, `[f0]` ...) so that the generated formula and its context
//! always agree.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::error::{ModelResult, TranslatableError};
use crate::model::attribute::Attribute;
use crate::model::filter::Filter;
use crate::model::measure::{BaseMeasure, CalculatedMeasure, ContextItem, Measure};
use crate::model::types::{AggregationType, Sort};

static CONTEXT_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("valid context reference regex"));

/// Aggregate `attribute` with `aggregation`. Without a name the measure is
/// titled `<agg> <attribute>`.
pub fn aggregate(
    attribute: &Attribute,
    aggregation: AggregationType,
    name: Option<&str>,
) -> Measure {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", aggregation.factory_name(), attribute.name));
    Measure::Base(BaseMeasure {
        name,
        attribute: attribute.clone(),
        aggregation,
        format: None,
        sort: Sort::None,
    })
}

pub fn sum(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Sum, name)
}

pub fn average(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Average, name)
}

pub fn min(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Min, name)
}

pub fn max(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Max, name)
}

pub fn median(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Median, name)
}

pub fn count(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Count, name)
}

pub fn count_distinct(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::CountDistinct, name)
}

pub fn variance(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::Variance, name)
}

pub fn std_dev(attribute: &Attribute, name: Option<&str>) -> Measure {
    aggregate(attribute, AggregationType::StandardDeviation, name)
}

/// Normalize a context key to its bracketed form.
fn bracket(key: &str) -> String {
    if key.starts_with('[') && key.ends_with(']') {
        key.to_string()
    } else {
        format!("[{}]", key)
    }
}

/// Every `[key]` referenced by a formula.
pub fn formula_references(formula: &str) -> Vec<String> {
    CONTEXT_REF
        .captures_iter(formula)
        .map(|c| format!("[{}]", &c[1]))
        .collect()
}

/// A calculated measure from a user formula.
///
/// Context keys may be given with or without brackets. Every reference in
/// the formula must resolve through the context.
pub fn custom_formula(
    title: &str,
    formula: &str,
    context: BTreeMap<String, ContextItem>,
) -> ModelResult<Measure> {
    let context: BTreeMap<String, ContextItem> =
        context.into_iter().map(|(k, v)| (bracket(&k), v)).collect();

    if let Some(missing) = formula_references(formula)
        .into_iter()
        .find(|r| !context.contains_key(r))
    {
        return Err(TranslatableError::new("errors.measure.unknownContextKey")
            .with_param("formula", formula)
            .with_param("key", missing));
    }

    Ok(Measure::Calculated(CalculatedMeasure {
        name: title.to_string(),
        expression: formula.to_string(),
        context,
        format: None,
        sort: Sort::None,
    }))
}

/// A constant-valued measure.
pub fn constant(value: f64, name: Option<&str>) -> Measure {
    let expression = value.to_string();
    Measure::Calculated(CalculatedMeasure {
        name: name.map(str::to_string).unwrap_or_else(|| expression.clone()),
        expression,
        context: BTreeMap::new(),
        format: None,
        sort: Sort::None,
    })
}

/// Operand of an arithmetic measure.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Measure(Measure),
    Number(f64),
}

impl From<Measure> for Operand {
    fn from(m: Measure) -> Self {
        Operand::Measure(m)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Number(v)
    }
}

fn arithmetic(
    left: Operand,
    op: &str,
    right: Operand,
    name: Option<&str>,
    wrap: bool,
) -> Measure {
    let mut context = BTreeMap::new();
    let mut side = |operand: Operand, key: &str| -> String {
        match operand {
            Operand::Measure(m) => {
                let key = bracket(key);
                context.insert(key.clone(), ContextItem::Measure(Box::new(m)));
                key
            }
            Operand::Number(v) => v.to_string(),
        }
    };
    let l = side(left, "a");
    let r = side(right, "b");
    let expression = if wrap {
        format!("({} {} {})", l, op, r)
    } else {
        format!("{} {} {}", l, op, r)
    };
    Measure::Calculated(CalculatedMeasure {
        name: name.map(str::to_string).unwrap_or_else(|| expression.clone()),
        expression,
        context,
        format: None,
        sort: Sort::None,
    })
}

pub fn add(left: impl Into<Operand>, right: impl Into<Operand>, name: Option<&str>) -> Measure {
    arithmetic(left.into(), "+", right.into(), name, false)
}

pub fn subtract(
    left: impl Into<Operand>,
    right: impl Into<Operand>,
    name: Option<&str>,
) -> Measure {
    arithmetic(left.into(), "-", right.into(), name, false)
}

pub fn multiply(
    left: impl Into<Operand>,
    right: impl Into<Operand>,
    name: Option<&str>,
) -> Measure {
    arithmetic(left.into(), "*", right.into(), name, true)
}

pub fn divide(left: impl Into<Operand>, right: impl Into<Operand>, name: Option<&str>) -> Measure {
    arithmetic(left.into(), "/", right.into(), name, true)
}

/// `measure` evaluated under `filters`: `([m], [f0], [f1])`.
pub fn measured_value(measure: &Measure, filters: &[Filter], name: Option<&str>) -> Measure {
    let mut context = BTreeMap::new();
    context.insert("[m]".to_string(), ContextItem::from(measure.clone()));
    let mut parts = vec!["[m]".to_string()];
    for (i, filter) in filters.iter().enumerate() {
        let key = format!("[f{}]", i);
        context.insert(key.clone(), ContextItem::from(filter.clone()));
        parts.push(key);
    }
    Measure::Calculated(CalculatedMeasure {
        name: name
            .map(str::to_string)
            .unwrap_or_else(|| measure.name().to_string()),
        expression: format!("({})", parts.join(", ")),
        context,
        format: None,
        sort: Sort::None,
    })
}

/// A single-argument formula function over `measure`.
fn wrap_function(function: &str, measure: &Measure, name: Option<&str>) -> Measure {
    let mut context = BTreeMap::new();
    context.insert("[m]".to_string(), ContextItem::from(measure.clone()));
    Measure::Calculated(CalculatedMeasure {
        name: name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", function, measure.name())),
        expression: format!("{}([m])", function),
        context,
        format: None,
        sort: Sort::None,
    })
}

pub fn contribution(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("contribution", measure, name)
}

pub fn growth(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("growth", measure, name)
}

pub fn difference(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("diffpastperiod", measure, name)
}

pub fn past_year(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("PASTYEAR", measure, name)
}

pub fn running_sum(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("RSUM", measure, name)
}

pub fn year_to_date_sum(measure: &Measure, name: Option<&str>) -> Measure {
    wrap_function("YTDSUM", measure, name)
}
