//! Message catalog for translatable errors.
//!
//! Errors raised by the model carry a translation key and a set of
//! interpolation parameters. This module resolves keys to English message
//! templates and substitutes `{{param}}` placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid placeholder regex"));

static CATALOG: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "errors.attribute.missingDim",
            "Attribute JAQL is missing the 'dim' field: {{jaql}}",
        ),
        (
            "errors.attribute.unknownDataType",
            "Unknown attribute data type: {{dataType}}",
        ),
        (
            "errors.attribute.unknownLevel",
            "Unknown date level '{{level}}' on attribute {{attribute}}",
        ),
        (
            "errors.measure.unsupportedType",
            "Unsupported measure type for JAQL: {{jaql}}",
        ),
        (
            "errors.measure.unknownAggregation",
            "Unknown aggregation type: {{agg}}",
        ),
        (
            "errors.measure.unknownContextKey",
            "Formula '{{formula}}' references unknown context key {{key}}",
        ),
        (
            "errors.filter.unsupportedConditionFilter",
            "Failed to apply condition filter: unsupported filter {{filter}}",
        ),
        (
            "errors.filter.invalidDate",
            "Invalid date value '{{value}}' for filter on {{attribute}}",
        ),
        (
            "errors.filter.emptyLogical",
            "A logical filter needs at least one child filter",
        ),
        (
            "errors.filter.mixedAttributes",
            "Logical filter children must share one attribute, got {{attributes}}",
        ),
        (
            "errors.filter.rankingWithoutMeasure",
            "Ranking condition is missing the 'by' measure: {{filter}}",
        ),
        (
            "errors.filterRelations.unknownFilter",
            "Filter relations reference an unknown filter with instanceid {{guid}}",
        ),
        (
            "errors.query.empty",
            "A query needs at least one dimension or measure",
        ),
        (
            "errors.query.missingDataSource",
            "A query needs a data source",
        ),
    ])
});

/// Look up the message template for a key.
pub fn template(key: &str) -> Option<&'static str> {
    CATALOG.get(key).copied()
}

/// Render a message for `key`, substituting `{{name}}` placeholders.
///
/// Unknown keys render as the key itself so the caller still gets
/// something meaningful. Missing parameters are left as-is.
pub fn translate(key: &str, params: &BTreeMap<String, String>) -> String {
    let Some(template) = template(key) else {
        return key.to_string();
    };
    interpolate(template, params)
}

/// Substitute `{{name}}` placeholders in `template`.
pub fn interpolate(template: &str, params: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            params
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
