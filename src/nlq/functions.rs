//! Factory functions callable from NLQ JSON.
//!
//! Each entry declares its argument kinds; arguments are parsed and checked
//! before the factory runs. Measure and filter arguments may be nested
//! calls, which are evaluated recursively.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::schema::DataSchema;
use crate::jaql::JaqlValue;
use crate::model::filter::{factory, Filter};
use crate::model::measure_factory::{self, Operand};
use crate::model::{Attribute, ContextItem, Measure};

/// `{function, args}` as written in NLQ JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// `sortAsc` / `sortDesc` on measures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
}

impl FunctionCall {
    pub fn new(function: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            args,
            sort_type: None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// What a call evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub enum Built {
    Measure(Measure),
    Filter(Filter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    /// Column path resolved through the schema
    Attribute,
    Measure,
    /// Measure call or number
    Operand,
    Filter,
    Filters,
    Text,
    Number,
    /// Number, string or bool
    Scalar,
    Members,
    Date,
    /// Formula context: key → column path or call
    Context,
}

impl ArgKind {
    fn describe(&self) -> &'static str {
        match self {
            ArgKind::Attribute => "an attribute path",
            ArgKind::Measure => "a measure function call",
            ArgKind::Operand => "a measure function call or a number",
            ArgKind::Filter => "a filter function call",
            ArgKind::Filters => "an array of filter function calls",
            ArgKind::Text => "a string",
            ArgKind::Number => "a number",
            ArgKind::Scalar => "a number, string or boolean",
            ArgKind::Members => "an array of members",
            ArgKind::Date => "a date string",
            ArgKind::Context => "a formula context object",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ArgSpec {
    kind: ArgKind,
    required: bool,
}

const fn req(kind: ArgKind) -> ArgSpec {
    ArgSpec {
        kind,
        required: true,
    }
}

const fn opt(kind: ArgKind) -> ArgSpec {
    ArgSpec {
        kind,
        required: false,
    }
}

#[derive(Debug, Clone)]
enum Arg {
    Attribute(Attribute),
    Measure(Measure),
    Operand(Operand),
    Filter(Filter),
    Filters(Vec<Filter>),
    Text(String),
    Number(Number),
    Scalar(JaqlValue),
    Members(Vec<String>),
    Context(BTreeMap<String, ContextItem>),
    Missing,
}

/// Parsed arguments of one call.
struct Args {
    values: Vec<Arg>,
}

impl Args {
    fn get(&self, i: usize) -> Option<&Arg> {
        self.values.get(i)
    }

    fn mismatch(i: usize) -> String {
        format!("argument {} has an unexpected type", i + 1)
    }

    fn attribute(&self, i: usize) -> Result<&Attribute, String> {
        match self.get(i) {
            Some(Arg::Attribute(a)) => Ok(a),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn measure(&self, i: usize) -> Result<&Measure, String> {
        match self.get(i) {
            Some(Arg::Measure(m)) => Ok(m),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn operand(&self, i: usize) -> Result<Operand, String> {
        match self.get(i) {
            Some(Arg::Operand(o)) => Ok(o.clone()),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn filter(&self, i: usize) -> Result<&Filter, String> {
        match self.get(i) {
            Some(Arg::Filter(f)) => Ok(f),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn opt_filter(&self, i: usize) -> Option<&Filter> {
        match self.get(i) {
            Some(Arg::Filter(f)) => Some(f),
            _ => None,
        }
    }

    fn filters(&self, i: usize) -> Result<&[Filter], String> {
        match self.get(i) {
            Some(Arg::Filters(f)) => Ok(f),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn text(&self, i: usize) -> Result<&str, String> {
        match self.get(i) {
            Some(Arg::Text(s)) => Ok(s),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn opt_text(&self, i: usize) -> Option<&str> {
        match self.get(i) {
            Some(Arg::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn number(&self, i: usize) -> Result<JaqlValue, String> {
        match self.get(i) {
            Some(Arg::Number(n)) => Ok(JaqlValue::Number(n.clone())),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn float(&self, i: usize) -> Result<f64, String> {
        match self.get(i) {
            Some(Arg::Number(n)) => n.as_f64().ok_or_else(|| Self::mismatch(i)),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn integer(&self, i: usize) -> Result<i64, String> {
        match self.get(i) {
            Some(Arg::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .ok_or_else(|| Self::mismatch(i)),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn scalar(&self, i: usize) -> Result<JaqlValue, String> {
        match self.get(i) {
            Some(Arg::Scalar(v)) => Ok(v.clone()),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn members(&self, i: usize) -> Result<&[String], String> {
        match self.get(i) {
            Some(Arg::Members(m)) => Ok(m),
            _ => Err(Self::mismatch(i)),
        }
    }

    fn context(&self, i: usize) -> BTreeMap<String, ContextItem> {
        match self.get(i) {
            Some(Arg::Context(c)) => c.clone(),
            _ => BTreeMap::new(),
        }
    }
}

type Builder = fn(&Args) -> Result<Built, String>;

struct FunctionDef {
    args: &'static [ArgSpec],
    build: Builder,
}

const AGGREGATE: &[ArgSpec] = &[req(ArgKind::Attribute), opt(ArgKind::Text)];
const WRAP: &[ArgSpec] = &[req(ArgKind::Measure), opt(ArgKind::Text)];
const ARITHMETIC: &[ArgSpec] = &[
    req(ArgKind::Operand),
    req(ArgKind::Operand),
    opt(ArgKind::Text),
];
const ATTR_SCALAR: &[ArgSpec] = &[req(ArgKind::Attribute), req(ArgKind::Scalar)];
const ATTR_NUMBER: &[ArgSpec] = &[req(ArgKind::Attribute), req(ArgKind::Number)];
const ATTR_RANGE: &[ArgSpec] = &[
    req(ArgKind::Attribute),
    req(ArgKind::Number),
    req(ArgKind::Number),
];
const ATTR_TEXT: &[ArgSpec] = &[req(ArgKind::Attribute), req(ArgKind::Text)];
const RANKING: &[ArgSpec] = &[
    req(ArgKind::Attribute),
    req(ArgKind::Measure),
    req(ArgKind::Number),
];
const RELATIVE: &[ArgSpec] = &[
    req(ArgKind::Attribute),
    req(ArgKind::Number),
    req(ArgKind::Number),
    opt(ArgKind::Date),
];
const MEASURE_NUMBER: &[ArgSpec] = &[req(ArgKind::Measure), req(ArgKind::Number)];
const MEASURE_RANGE: &[ArgSpec] = &[
    req(ArgKind::Measure),
    req(ArgKind::Number),
    req(ArgKind::Number),
];
const CONSTANT: &[ArgSpec] = &[req(ArgKind::Number), opt(ArgKind::Text)];
const CUSTOM_FORMULA: &[ArgSpec] = &[
    req(ArgKind::Text),
    req(ArgKind::Text),
    opt(ArgKind::Context),
];
const MEASURED_VALUE: &[ArgSpec] = &[
    req(ArgKind::Measure),
    req(ArgKind::Filters),
    opt(ArgKind::Text),
];
const MEMBERS: &[ArgSpec] = &[req(ArgKind::Attribute), req(ArgKind::Members)];
const EXCLUDE: &[ArgSpec] = &[req(ArgKind::Filter), opt(ArgKind::Filter)];
const ATTR_DATE: &[ArgSpec] = &[req(ArgKind::Attribute), req(ArgKind::Date)];
const DATE_RANGE: &[ArgSpec] = &[
    req(ArgKind::Attribute),
    opt(ArgKind::Date),
    opt(ArgKind::Date),
];
const FILTERS: &[ArgSpec] = &[req(ArgKind::Filters)];

fn measure(m: Measure) -> Result<Built, String> {
    Ok(Built::Measure(m))
}

fn filter(f: Filter) -> Result<Built, String> {
    Ok(Built::Filter(f))
}

static FUNCTIONS: Lazy<HashMap<&'static str, FunctionDef>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, FunctionDef> = HashMap::new();
    let mut add = |name: &'static str, args: &'static [ArgSpec], build: Builder| {
        m.insert(name, FunctionDef { args, build });
    };

    // Aggregations
    add("measureFactory.sum", AGGREGATE, |a| {
        measure(measure_factory::sum(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.average", AGGREGATE, |a| {
        measure(measure_factory::average(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.min", AGGREGATE, |a| {
        measure(measure_factory::min(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.max", AGGREGATE, |a| {
        measure(measure_factory::max(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.median", AGGREGATE, |a| {
        measure(measure_factory::median(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.count", AGGREGATE, |a| {
        measure(measure_factory::count(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.countDistinct", AGGREGATE, |a| {
        measure(measure_factory::count_distinct(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.variance", AGGREGATE, |a| {
        measure(measure_factory::variance(a.attribute(0)?, a.opt_text(1)))
    });
    add("measureFactory.stdev", AGGREGATE, |a| {
        measure(measure_factory::std_dev(a.attribute(0)?, a.opt_text(1)))
    });

    // Formulas
    add(
        "measureFactory.constant",
        CONSTANT,
        |a| measure(measure_factory::constant(a.float(0)?, a.opt_text(1))),
    );
    add(
        "measureFactory.customFormula",
        CUSTOM_FORMULA,
        |a| {
            measure_factory::custom_formula(a.text(0)?, a.text(1)?, a.context(2))
                .map(Built::Measure)
                .map_err(|e| e.to_string())
        },
    );
    add("measureFactory.add", ARITHMETIC, |a| {
        measure(measure_factory::add(a.operand(0)?, a.operand(1)?, a.opt_text(2)))
    });
    add("measureFactory.subtract", ARITHMETIC, |a| {
        measure(measure_factory::subtract(a.operand(0)?, a.operand(1)?, a.opt_text(2)))
    });
    add("measureFactory.multiply", ARITHMETIC, |a| {
        measure(measure_factory::multiply(a.operand(0)?, a.operand(1)?, a.opt_text(2)))
    });
    add("measureFactory.divide", ARITHMETIC, |a| {
        measure(measure_factory::divide(a.operand(0)?, a.operand(1)?, a.opt_text(2)))
    });
    add(
        "measureFactory.measuredValue",
        MEASURED_VALUE,
        |a| {
            measure(measure_factory::measured_value(
                a.measure(0)?,
                a.filters(1)?,
                a.opt_text(2),
            ))
        },
    );
    add("measureFactory.contribution", WRAP, |a| {
        measure(measure_factory::contribution(a.measure(0)?, a.opt_text(1)))
    });
    add("measureFactory.growth", WRAP, |a| {
        measure(measure_factory::growth(a.measure(0)?, a.opt_text(1)))
    });
    add("measureFactory.difference", WRAP, |a| {
        measure(measure_factory::difference(a.measure(0)?, a.opt_text(1)))
    });
    add("measureFactory.pastYear", WRAP, |a| {
        measure(measure_factory::past_year(a.measure(0)?, a.opt_text(1)))
    });
    add("measureFactory.runningSum", WRAP, |a| {
        measure(measure_factory::running_sum(a.measure(0)?, a.opt_text(1)))
    });
    add("measureFactory.yearToDateSum", WRAP, |a| {
        measure(measure_factory::year_to_date_sum(a.measure(0)?, a.opt_text(1)))
    });

    // Member filters
    add(
        "filterFactory.members",
        MEMBERS,
        |a| filter(factory::members(a.attribute(0)?, a.members(1)?)),
    );
    add(
        "filterFactory.exclude",
        EXCLUDE,
        |a| {
            filter(factory::exclude(
                a.filter(0)?.clone(),
                a.opt_filter(1).cloned(),
            ))
        },
    );

    // Value filters
    add("filterFactory.equals", ATTR_SCALAR, |a| {
        filter(factory::equals(a.attribute(0)?, a.scalar(1)?))
    });
    add("filterFactory.doesntEqual", ATTR_SCALAR, |a| {
        filter(factory::doesnt_equal(a.attribute(0)?, a.scalar(1)?))
    });
    add("filterFactory.greaterThan", ATTR_NUMBER, |a| {
        filter(factory::greater_than(a.attribute(0)?, a.number(1)?))
    });
    add("filterFactory.greaterThanOrEqual", ATTR_NUMBER, |a| {
        filter(factory::greater_than_or_equal(a.attribute(0)?, a.number(1)?))
    });
    add("filterFactory.lessThan", ATTR_NUMBER, |a| {
        filter(factory::less_than(a.attribute(0)?, a.number(1)?))
    });
    add("filterFactory.lessThanOrEqual", ATTR_NUMBER, |a| {
        filter(factory::less_than_or_equal(a.attribute(0)?, a.number(1)?))
    });
    add("filterFactory.between", ATTR_RANGE, |a| {
        filter(factory::between(a.attribute(0)?, a.number(1)?, a.number(2)?))
    });
    add("filterFactory.betweenNotEqual", ATTR_RANGE, |a| {
        filter(factory::between_not_equal(
            a.attribute(0)?,
            a.number(1)?,
            a.number(2)?,
        ))
    });

    // Text filters
    add("filterFactory.contains", ATTR_TEXT, |a| {
        filter(factory::contains(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.doesntContain", ATTR_TEXT, |a| {
        filter(factory::doesnt_contain(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.startsWith", ATTR_TEXT, |a| {
        filter(factory::starts_with(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.doesntStartWith", ATTR_TEXT, |a| {
        filter(factory::doesnt_start_with(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.endsWith", ATTR_TEXT, |a| {
        filter(factory::ends_with(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.doesntEndWith", ATTR_TEXT, |a| {
        filter(factory::doesnt_end_with(a.attribute(0)?, a.text(1)?))
    });
    add("filterFactory.like", ATTR_TEXT, |a| {
        filter(factory::like(a.attribute(0)?, a.text(1)?))
    });

    // Ranking
    add("filterFactory.topRanking", RANKING, |a| {
        filter(factory::top_ranking(
            a.attribute(0)?,
            a.measure(1)?,
            a.integer(2)?,
        ))
    });
    add("filterFactory.bottomRanking", RANKING, |a| {
        filter(factory::bottom_ranking(
            a.attribute(0)?,
            a.measure(1)?,
            a.integer(2)?,
        ))
    });

    // Dates
    add(
        "filterFactory.dateFrom",
        ATTR_DATE,
        |a| {
            factory::date_from(a.attribute(0)?, a.text(1)?)
                .map(Built::Filter)
                .map_err(|e| e.to_string())
        },
    );
    add(
        "filterFactory.dateTo",
        ATTR_DATE,
        |a| {
            factory::date_to(a.attribute(0)?, a.text(1)?)
                .map(Built::Filter)
                .map_err(|e| e.to_string())
        },
    );
    add(
        "filterFactory.dateRange",
        DATE_RANGE,
        |a| {
            factory::date_range(a.attribute(0)?, a.opt_text(1), a.opt_text(2))
                .map(Built::Filter)
                .map_err(|e| e.to_string())
        },
    );
    add("filterFactory.dateRelative", RELATIVE, |a| {
        factory::date_relative(a.attribute(0)?, a.integer(1)?, a.integer(2)?, a.opt_text(3))
            .map(Built::Filter)
            .map_err(|e| e.to_string())
    });
    add("filterFactory.dateRelativeFrom", RELATIVE, |a| {
        factory::date_relative_from(a.attribute(0)?, a.integer(1)?, a.integer(2)?, a.opt_text(3))
            .map(Built::Filter)
            .map_err(|e| e.to_string())
    });
    add("filterFactory.dateRelativeTo", RELATIVE, |a| {
        factory::date_relative_to(a.attribute(0)?, a.integer(1)?, a.integer(2)?, a.opt_text(3))
            .map(Built::Filter)
            .map_err(|e| e.to_string())
    });

    // Measure values
    add("filterFactory.measureEquals", MEASURE_NUMBER, |a| {
        filter(factory::measure_equals(a.measure(0)?, a.number(1)?))
    });
    add("filterFactory.measureGreaterThan", MEASURE_NUMBER, |a| {
        filter(factory::measure_greater_than(a.measure(0)?, a.number(1)?))
    });
    add("filterFactory.measureGreaterThanOrEqual", MEASURE_NUMBER, |a| {
        filter(factory::measure_greater_than_or_equal(
            a.measure(0)?,
            a.number(1)?,
        ))
    });
    add("filterFactory.measureLessThan", MEASURE_NUMBER, |a| {
        filter(factory::measure_less_than(a.measure(0)?, a.number(1)?))
    });
    add("filterFactory.measureLessThanOrEqual", MEASURE_NUMBER, |a| {
        filter(factory::measure_less_than_or_equal(a.measure(0)?, a.number(1)?))
    });
    add(
        "filterFactory.measureBetween",
        MEASURE_RANGE,
        |a| {
            filter(factory::measure_between(
                a.measure(0)?,
                a.number(1)?,
                a.number(2)?,
            ))
        },
    );

    // Logical
    add("filterFactory.union", FILTERS, |a| {
        factory::union(a.filters(0)?.to_vec())
            .map(Built::Filter)
            .map_err(|e| e.to_string())
    });
    add("filterFactory.intersection", FILTERS, |a| {
        factory::intersection(a.filters(0)?.to_vec())
            .map(Built::Filter)
            .map_err(|e| e.to_string())
    });
    add("filterFactory.cascading", FILTERS, |a| {
        filter(factory::cascading(a.filters(0)?.to_vec()))
    });

    m
});

/// True if `name` is a registered function.
pub fn is_supported(name: &str) -> bool {
    FUNCTIONS.contains_key(name)
}

/// Evaluate a call against a schema.
pub fn evaluate(call: &FunctionCall, schema: &DataSchema) -> Result<Built, String> {
    let def = FUNCTIONS
        .get(call.function.as_str())
        .ok_or_else(|| format!("Function \"{}\" is not supported", call.function))?;

    if call.args.len() > def.args.len() {
        return Err(format!(
            "Function \"{}\" takes at most {} arguments, got {}",
            call.function,
            def.args.len(),
            call.args.len()
        ));
    }

    let mut values = Vec::with_capacity(def.args.len());
    for (i, spec) in def.args.iter().enumerate() {
        let arg = match call.args.get(i).filter(|v| !v.is_null()) {
            None if spec.required => {
                return Err(format!(
                    "Missing argument {} of \"{}\": expected {}",
                    i + 1,
                    call.function,
                    spec.kind.describe()
                ))
            }
            None => Arg::Missing,
            Some(value) => parse_arg(value, spec.kind, schema).map_err(|msg| {
                format!("Invalid argument {} of \"{}\": {}", i + 1, call.function, msg)
            })?,
        };
        values.push(arg);
    }

    (def.build)(&Args { values })
        .map_err(|msg| format!("Failed to apply \"{}\": {}", call.function, msg))
}

fn expected(kind: ArgKind, value: &Value) -> String {
    format!("expected {}, got {}", kind.describe(), value)
}

fn nested(value: &Value, kind: ArgKind, schema: &DataSchema) -> Result<Built, String> {
    let call: FunctionCall =
        serde_json::from_value(value.clone()).map_err(|_| expected(kind, value))?;
    evaluate(&call, schema)
}

fn parse_arg(value: &Value, kind: ArgKind, schema: &DataSchema) -> Result<Arg, String> {
    match kind {
        ArgKind::Attribute => {
            let path = value.as_str().ok_or_else(|| expected(kind, value))?;
            schema
                .resolve(path)
                .map(Arg::Attribute)
                .ok_or_else(|| format!("attribute \"{}\" not found in the data schema", path))
        }
        ArgKind::Measure => match nested(value, kind, schema)? {
            Built::Measure(m) => Ok(Arg::Measure(m)),
            Built::Filter(_) => Err(expected(kind, value)),
        },
        ArgKind::Operand => match value {
            Value::Number(n) => n
                .as_f64()
                .map(|f| Arg::Operand(Operand::Number(f)))
                .ok_or_else(|| expected(kind, value)),
            _ => match nested(value, kind, schema)? {
                Built::Measure(m) => Ok(Arg::Operand(Operand::Measure(m))),
                Built::Filter(_) => Err(expected(kind, value)),
            },
        },
        ArgKind::Filter => match nested(value, kind, schema)? {
            Built::Filter(f) => Ok(Arg::Filter(f)),
            Built::Measure(_) => Err(expected(kind, value)),
        },
        ArgKind::Filters => {
            let items = value.as_array().ok_or_else(|| expected(kind, value))?;
            let mut filters = Vec::with_capacity(items.len());
            for item in items {
                match nested(item, ArgKind::Filter, schema)? {
                    Built::Filter(f) => filters.push(f),
                    Built::Measure(_) => return Err(expected(ArgKind::Filter, item)),
                }
            }
            Ok(Arg::Filters(filters))
        }
        ArgKind::Text | ArgKind::Date => value
            .as_str()
            .map(|s| Arg::Text(s.to_string()))
            .ok_or_else(|| expected(kind, value)),
        ArgKind::Number => match value {
            Value::Number(n) => Ok(Arg::Number(n.clone())),
            _ => Err(expected(kind, value)),
        },
        ArgKind::Scalar => match value {
            Value::Number(n) => Ok(Arg::Scalar(JaqlValue::Number(n.clone()))),
            Value::String(s) => Ok(Arg::Scalar(JaqlValue::Text(s.clone()))),
            Value::Bool(b) => Ok(Arg::Scalar(JaqlValue::Bool(*b))),
            _ => Err(expected(kind, value)),
        },
        ArgKind::Members => {
            let items = value.as_array().ok_or_else(|| expected(kind, value))?;
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err(expected(kind, value)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Arg::Members)
        }
        ArgKind::Context => {
            let entries = value.as_object().ok_or_else(|| expected(kind, value))?;
            let mut context = BTreeMap::new();
            for (key, item) in entries {
                let resolved = match item {
                    Value::String(path) => schema
                        .resolve(path)
                        .map(ContextItem::Attribute)
                        .ok_or_else(|| {
                            format!("attribute \"{}\" not found in the data schema", path)
                        })?,
                    _ => match nested(item, kind, schema)? {
                        Built::Measure(m) => ContextItem::from(m),
                        Built::Filter(f) => ContextItem::from(f),
                    },
                };
                context.insert(key.clone(), resolved);
            }
            Ok(Arg::Context(context))
        }
    }
}
