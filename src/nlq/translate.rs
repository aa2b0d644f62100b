//! NLQ query JSON to model objects, and back.

use serde_json::{json, Value};
use tracing::debug;

use super::functions::{evaluate, Built, FunctionCall};
use super::schema::DataSchema;
use super::{NlqCategory, NlqError, NlqResult, QueryJson};
use crate::jaql::{DataSource, JaqlValue};
use crate::model::filter::{
    Condition, FilterKind, LogicalOperator, NumericOperator, RankingOperator, RelativeOperator,
    TextOperator,
};
use crate::model::{Attribute, ContextItem, Filter, Measure, Sort};
use crate::query::QueryDescription;

/// Translate simple query JSON into a dimensional query.
///
/// Every item is translated; all problems are reported together.
pub fn translate_query_json(query: &QueryJson, schema: &DataSchema) -> NlqResult {
    let mut errors = Vec::new();
    let title = query
        .data_source
        .clone()
        .unwrap_or_else(|| schema.data_source.clone());
    let mut description = QueryDescription::new(DataSource::new(title));

    for (index, input) in query.dimensions.iter().enumerate() {
        match translate_dimension(input, schema) {
            Ok(attribute) => description.dimensions.push(attribute),
            Err(message) => errors.push(NlqError::new(
                NlqCategory::Dimensions,
                index,
                input.clone(),
                message,
            )),
        }
    }

    for (index, input) in query.measures.iter().enumerate() {
        match translate_measure(input, schema) {
            Ok(measure) => description.measures.push(measure),
            Err(message) => errors.push(NlqError::new(
                NlqCategory::Measures,
                index,
                input.clone(),
                message,
            )),
        }
    }

    for (category, items) in [
        (NlqCategory::Filters, &query.filters),
        (NlqCategory::Highlights, &query.highlights),
    ] {
        for (index, input) in items.iter().enumerate() {
            match translate_filter(input, schema) {
                Ok(filter) if category == NlqCategory::Filters => {
                    description.filters.push(filter)
                }
                Ok(filter) => description.highlights.push(filter),
                Err(message) => {
                    errors.push(NlqError::new(category, index, input.clone(), message))
                }
            }
        }
    }

    if errors.is_empty() {
        NlqResult::Success(description)
    } else {
        debug!(count = errors.len(), "NLQ translation failed");
        NlqResult::Failure(errors)
    }
}

/// Parse and translate a query JSON string.
pub fn translate_query_str(
    json: &str,
    schema: &DataSchema,
) -> Result<NlqResult, serde_json::Error> {
    let query: QueryJson = serde_json::from_str(json)?;
    Ok(translate_query_json(&query, schema))
}

fn translate_dimension(input: &Value, schema: &DataSchema) -> Result<Attribute, String> {
    let path = input
        .as_str()
        .ok_or_else(|| format!("Expected a column path, got {}", input))?;
    schema
        .resolve(path)
        .ok_or_else(|| format!("Dimension \"{}\" not found in the data schema", path))
}

fn parse_call(input: &Value, namespace: &str, what: &str) -> Result<FunctionCall, String> {
    let call: FunctionCall = serde_json::from_value(input.clone())
        .map_err(|_| format!("Expected a {{function, args}} object, got {}", input))?;
    if !call.function.starts_with(namespace) {
        return Err(format!(
            "Function \"{}\" is not a {} function",
            call.function, what
        ));
    }
    Ok(call)
}

fn translate_measure(input: &Value, schema: &DataSchema) -> Result<Measure, String> {
    let call = parse_call(input, "measureFactory.", "measure")?;
    match evaluate(&call, schema)? {
        Built::Measure(measure) => {
            let sort = match call.sort_type.as_deref() {
                Some("sortAsc") => Sort::Ascending,
                Some("sortDesc") => Sort::Descending,
                _ => Sort::None,
            };
            Ok(measure.with_sort(sort))
        }
        Built::Filter(_) => Err(format!(
            "Function \"{}\" does not build a measure",
            call.function
        )),
    }
}

fn translate_filter(input: &Value, schema: &DataSchema) -> Result<Filter, String> {
    let call = parse_call(input, "filterFactory.", "filter")?;
    match evaluate(&call, schema)? {
        Built::Filter(filter) => Ok(filter),
        Built::Measure(_) => Err(format!(
            "Function \"{}\" does not build a filter",
            call.function
        )),
    }
}

/// Express a dimensional query as simple query JSON.
///
/// Items with no function-call form (custom filters, attributes outside the
/// `[Table.Column]` naming scheme) are reported as errors.
pub fn to_query_json(query: &QueryDescription) -> Result<QueryJson, Vec<NlqError>> {
    let mut errors = Vec::new();
    let mut out = QueryJson {
        data_source: Some(query.data_source.title.clone()),
        ..Default::default()
    };

    for (index, attribute) in query.dimensions.iter().enumerate() {
        match attribute_path(attribute) {
            Ok(path) => out.dimensions.push(Value::String(path)),
            Err(message) => errors.push(NlqError::new(
                NlqCategory::Dimensions,
                index,
                Value::String(attribute.expression.clone()),
                message,
            )),
        }
    }

    for (index, measure) in query.measures.iter().enumerate() {
        match measure_call(measure) {
            Ok(mut call) => {
                call.sort_type = match measure.sort() {
                    Sort::Ascending => Some("sortAsc".to_string()),
                    Sort::Descending => Some("sortDesc".to_string()),
                    Sort::None => None,
                };
                out.measures.push(call.to_value());
            }
            Err(message) => errors.push(NlqError::new(
                NlqCategory::Measures,
                index,
                Value::String(measure.name().to_string()),
                message,
            )),
        }
    }

    for (category, filters) in [
        (NlqCategory::Filters, &query.filters),
        (NlqCategory::Highlights, &query.highlights),
    ] {
        for (index, filter) in filters.iter().enumerate() {
            match filter_call(filter) {
                Ok(call) if category == NlqCategory::Filters => {
                    out.filters.push(call.to_value())
                }
                Ok(call) => out.highlights.push(call.to_value()),
                Err(message) => errors.push(NlqError::new(
                    category,
                    index,
                    filter.jaql(),
                    message,
                )),
            }
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

fn attribute_path(attribute: &Attribute) -> Result<String, String> {
    DataSchema::path_of(attribute).ok_or_else(|| {
        format!(
            "Attribute \"{}\" cannot be expressed as a column path",
            attribute.expression
        )
    })
}

fn value(v: &JaqlValue) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

fn optional_text(v: Option<&str>) -> Value {
    v.map(|s| Value::String(s.to_string())).unwrap_or(Value::Null)
}

fn measure_call(measure: &Measure) -> Result<FunctionCall, String> {
    match measure {
        Measure::Base(m) => Ok(FunctionCall::new(
            format!("measureFactory.{}", m.aggregation.factory_name()),
            vec![json!(attribute_path(&m.attribute)?), json!(m.name)],
        )),
        Measure::Calculated(m) => {
            let mut context = serde_json::Map::new();
            for (key, item) in &m.context {
                let entry = match item {
                    ContextItem::Attribute(a) => Value::String(attribute_path(a)?),
                    ContextItem::Measure(inner) => measure_call(inner)?.to_value(),
                    ContextItem::Filter(f) => filter_call(f)?.to_value(),
                };
                context.insert(key.clone(), entry);
            }
            Ok(FunctionCall::new(
                "measureFactory.customFormula",
                vec![
                    json!(m.name),
                    json!(m.expression),
                    Value::Object(context),
                ],
            ))
        }
    }
}

/// Factory suffix for a one- or two-sided numeric condition.
fn numeric_function(
    a: Option<&Condition>,
    b: Option<&Condition>,
    measure: bool,
) -> Option<&'static str> {
    use NumericOperator::*;
    let name = match (a.map(|c| c.operator), b.map(|c| c.operator)) {
        (Some(Equals), None) => "Equals",
        (Some(DoesntEqual), None) if !measure => "DoesntEqual",
        (Some(FromNotEqual), None) => "GreaterThan",
        (Some(From), None) => "GreaterThanOrEqual",
        (Some(ToNotEqual), None) => "LessThan",
        (Some(To), None) => "LessThanOrEqual",
        (Some(From), Some(To)) => "Between",
        (Some(FromNotEqual), Some(ToNotEqual)) if !measure => "BetweenNotEqual",
        _ => return None,
    };
    Some(name)
}

fn filter_call(filter: &Filter) -> Result<FunctionCall, String> {
    let call = match &filter.kind {
        FilterKind::Members { attribute, members } => {
            let inner = FunctionCall::new(
                "filterFactory.members",
                vec![json!(attribute_path(attribute)?), json!(members)],
            );
            if filter.config.exclude_members {
                FunctionCall::new("filterFactory.exclude", vec![inner.to_value()])
            } else {
                inner
            }
        }
        FilterKind::Exclude { filter: inner, input } => {
            let mut args = vec![filter_call(inner)?.to_value()];
            if let Some(input) = input {
                args.push(filter_call(input)?.to_value());
            }
            FunctionCall::new("filterFactory.exclude", args)
        }
        FilterKind::Numeric { attribute, a, b } => {
            let name = numeric_function(a.as_ref(), b.as_ref(), false)
                .ok_or_else(|| "Unsupported numeric condition".to_string())?;
            let mut function = name.to_string();
            if let Some(first) = function.get_mut(0..1) {
                first.make_ascii_lowercase();
            }
            let mut args = vec![json!(attribute_path(attribute)?)];
            args.extend(a.iter().chain(b.iter()).map(|c| value(&c.value)));
            FunctionCall::new(format!("filterFactory.{}", function), args)
        }
        FilterKind::Text {
            attribute,
            operator,
            value: text,
        } => {
            let function = match operator {
                TextOperator::Contains => "contains",
                TextOperator::DoesntContain => "doesntContain",
                TextOperator::StartsWith => "startsWith",
                TextOperator::DoesntStartWith => "doesntStartWith",
                TextOperator::EndsWith => "endsWith",
                TextOperator::DoesntEndWith => "doesntEndWith",
                TextOperator::Equals => "equals",
                TextOperator::DoesntEqual => "doesntEqual",
                TextOperator::Like => "like",
            };
            FunctionCall::new(
                format!("filterFactory.{}", function),
                vec![json!(attribute_path(attribute)?), json!(text)],
            )
        }
        FilterKind::DateRange {
            attribute,
            from,
            to,
        } => FunctionCall::new(
            "filterFactory.dateRange",
            vec![
                json!(attribute_path(attribute)?),
                optional_text(from.as_deref()),
                optional_text(to.as_deref()),
            ],
        ),
        FilterKind::RelativeDate {
            attribute,
            operator,
            offset,
            count,
            anchor,
        } => {
            let function = match operator {
                RelativeOperator::Next => "filterFactory.dateRelativeFrom",
                RelativeOperator::Last => "filterFactory.dateRelativeTo",
            };
            let mut args = vec![json!(attribute_path(attribute)?), json!(offset), json!(count)];
            if let Some(anchor) = anchor {
                args.push(json!(anchor));
            }
            FunctionCall::new(function, args)
        }
        FilterKind::Ranking {
            attribute,
            measure,
            operator,
            count,
        } => {
            let function = match operator {
                RankingOperator::Top => "filterFactory.topRanking",
                RankingOperator::Bottom => "filterFactory.bottomRanking",
            };
            FunctionCall::new(
                function,
                vec![
                    json!(attribute_path(attribute)?),
                    measure_call(measure)?.to_value(),
                    json!(count),
                ],
            )
        }
        FilterKind::MeasureValue { measure, a, b } => {
            let name = numeric_function(a.as_ref(), b.as_ref(), true)
                .ok_or_else(|| "Unsupported measure condition".to_string())?;
            let mut args = vec![measure_call(measure)?.to_value()];
            args.extend(a.iter().chain(b.iter()).map(|c| value(&c.value)));
            FunctionCall::new(format!("filterFactory.measure{}", name), args)
        }
        FilterKind::Logical { operator, filters } => {
            let function = match operator {
                LogicalOperator::And => "filterFactory.intersection",
                LogicalOperator::Or => "filterFactory.union",
            };
            let children = filters
                .iter()
                .map(|f| filter_call(f).map(|c| c.to_value()))
                .collect::<Result<Vec<_>, _>>()?;
            FunctionCall::new(function, vec![Value::Array(children)])
        }
        FilterKind::Cascading { levels } => {
            let children = levels
                .iter()
                .map(|f| filter_call(f).map(|c| c.to_value()))
                .collect::<Result<Vec<_>, _>>()?;
            FunctionCall::new("filterFactory.cascading", vec![Value::Array(children)])
        }
        FilterKind::Custom { .. } => {
            return Err("Custom filters cannot be expressed as function calls".to_string())
        }
    };
    Ok(call)
}
