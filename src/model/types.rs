//! Primitive enums shared across the dimensional model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TranslatableError;

/// Attribute data type as written in JAQL `datatype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Numeric,
    #[serde(rename = "datetime")]
    DateTime,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Numeric => "numeric",
            DataType::DateTime => "datetime",
        }
    }
}

impl FromStr for DataType {
    type Err = TranslatableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "string" | "text-attribute" => Ok(DataType::Text),
            "numeric" | "number" | "numeric-attribute" => Ok(DataType::Numeric),
            "datetime" | "date" | "datetime-level" => Ok(DataType::DateTime),
            _ => Err(TranslatableError::new("errors.attribute.unknownDataType")
                .with_param("dataType", s)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date granularity of a level attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    MinutesRoundTo30,
    MinutesRoundTo15,
    Minutes,
    Seconds,
}

impl Granularity {
    pub const ALL: [Granularity; 10] = [
        Granularity::Years,
        Granularity::Quarters,
        Granularity::Months,
        Granularity::Weeks,
        Granularity::Days,
        Granularity::Hours,
        Granularity::MinutesRoundTo30,
        Granularity::MinutesRoundTo15,
        Granularity::Minutes,
        Granularity::Seconds,
    ];

    /// JAQL `level` value.
    pub fn level(&self) -> &'static str {
        match self {
            Granularity::Years => "years",
            Granularity::Quarters => "quarters",
            Granularity::Months => "months",
            Granularity::Weeks => "weeks",
            Granularity::Days => "days",
            Granularity::Hours => "hours",
            Granularity::MinutesRoundTo30
            | Granularity::MinutesRoundTo15
            | Granularity::Minutes => "minutes",
            Granularity::Seconds => "seconds",
        }
    }

    /// JAQL `bucket` for rounded minute levels.
    pub fn bucket(&self) -> Option<&'static str> {
        match self {
            Granularity::MinutesRoundTo30 => Some("30"),
            Granularity::MinutesRoundTo15 => Some("15"),
            _ => None,
        }
    }

    /// Name used in attribute ids and NLQ paths (`Years`, `MinutesRoundTo30`).
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Years => "Years",
            Granularity::Quarters => "Quarters",
            Granularity::Months => "Months",
            Granularity::Weeks => "Weeks",
            Granularity::Days => "Days",
            Granularity::Hours => "Hours",
            Granularity::MinutesRoundTo30 => "MinutesRoundTo30",
            Granularity::MinutesRoundTo15 => "MinutesRoundTo15",
            Granularity::Minutes => "Minutes",
            Granularity::Seconds => "Seconds",
        }
    }

    /// Default display format.
    pub fn default_format(&self) -> &'static str {
        match self {
            Granularity::Years => "yyyy",
            Granularity::Quarters => "Q yyyy",
            Granularity::Months => "yyyy-MM",
            Granularity::Weeks => "ww yyyy",
            Granularity::Days => "yyyy-MM-dd",
            Granularity::Hours
            | Granularity::MinutesRoundTo30
            | Granularity::MinutesRoundTo15
            | Granularity::Minutes => "yyyy-MM-dd HH:mm",
            Granularity::Seconds => "yyyy-MM-dd HH:mm:ss",
        }
    }

    /// Resolve a JAQL `level` (+ optional `bucket`) pair.
    pub fn from_level(level: &str, bucket: Option<&str>) -> Option<Granularity> {
        match (level.to_ascii_lowercase().as_str(), bucket) {
            ("years", _) => Some(Granularity::Years),
            ("quarters", _) => Some(Granularity::Quarters),
            ("months", _) => Some(Granularity::Months),
            ("weeks", _) => Some(Granularity::Weeks),
            ("days", _) => Some(Granularity::Days),
            ("hours", _) => Some(Granularity::Hours),
            ("minutes", Some("30")) => Some(Granularity::MinutesRoundTo30),
            ("minutes", Some("15")) => Some(Granularity::MinutesRoundTo15),
            ("minutes", _) => Some(Granularity::Minutes),
            ("seconds", _) => Some(Granularity::Seconds),
            _ => None,
        }
    }

    /// Resolve a granularity by its name (`Years`) or level (`years`).
    pub fn from_name(name: &str) -> Option<Granularity> {
        Granularity::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(name))
            .or_else(|| Granularity::from_level(name, None))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort direction of an attribute or measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sort {
    #[default]
    None,
    Ascending,
    Descending,
}

impl Sort {
    /// JAQL `sort` value; `None` is omitted from the wire.
    pub fn to_jaql(&self) -> Option<String> {
        match self {
            Sort::None => None,
            Sort::Ascending => Some("asc".to_string()),
            Sort::Descending => Some("desc".to_string()),
        }
    }

    pub fn from_jaql(value: Option<&str>) -> Sort {
        match value.map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "asc" || v == "ascending" => Sort::Ascending,
            Some(v) if v == "desc" || v == "descending" => Sort::Descending,
            _ => Sort::None,
        }
    }
}

/// Measure aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationType {
    Sum,
    Average,
    Min,
    Max,
    Count,
    CountDistinct,
    Median,
    Variance,
    StandardDeviation,
}

impl AggregationType {
    /// JAQL `agg` value. Note that JAQL `count` means distinct count.
    pub fn jaql_name(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Average => "avg",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::Count => "countduplicates",
            AggregationType::CountDistinct => "count",
            AggregationType::Median => "median",
            AggregationType::Variance => "var",
            AggregationType::StandardDeviation => "stdev",
        }
    }

    /// Factory name (`sum`, `average`, `countDistinct`, ...).
    pub fn factory_name(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Average => "average",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::Count => "count",
            AggregationType::CountDistinct => "countDistinct",
            AggregationType::Median => "median",
            AggregationType::Variance => "variance",
            AggregationType::StandardDeviation => "stdev",
        }
    }

    /// Parse a JAQL `agg` value.
    pub fn from_jaql(agg: &str) -> Result<Self, TranslatableError> {
        match agg.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "avg" => Ok(AggregationType::Average),
            "min" => Ok(AggregationType::Min),
            "max" => Ok(AggregationType::Max),
            "countduplicates" => Ok(AggregationType::Count),
            "count" => Ok(AggregationType::CountDistinct),
            "median" => Ok(AggregationType::Median),
            "var" => Ok(AggregationType::Variance),
            "stdev" => Ok(AggregationType::StandardDeviation),
            _ => Err(TranslatableError::new("errors.measure.unknownAggregation")
                .with_param("agg", agg)),
        }
    }

    /// Parse a factory name (`average`, `countDistinct`, ...).
    pub fn from_factory_name(name: &str) -> Result<Self, TranslatableError> {
        match name.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "average" | "avg" => Ok(AggregationType::Average),
            "min" => Ok(AggregationType::Min),
            "max" => Ok(AggregationType::Max),
            "count" => Ok(AggregationType::Count),
            "countdistinct" => Ok(AggregationType::CountDistinct),
            "median" => Ok(AggregationType::Median),
            "variance" | "var" => Ok(AggregationType::Variance),
            "stdev" | "standarddeviation" => Ok(AggregationType::StandardDeviation),
            _ => Err(TranslatableError::new("errors.measure.unknownAggregation")
                .with_param("agg", name)),
        }
    }
}
