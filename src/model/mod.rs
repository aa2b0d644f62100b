//! Dimensional model: attributes, dimensions, measures and filters.
//!
//! Every type converts to JAQL via `to_jaql` / `jaql` and back via
//! `from_jaql`. Factories live in [`measure_factory`] and
//! [`filter::factory`].

pub mod attribute;
pub mod dimension;
pub mod filter;
pub mod measure;
pub mod measure_factory;
pub mod types;

pub use attribute::{default_title, Attribute};
pub use dimension::{DateDimension, Dimension};
pub use filter::{Filter, FilterConfig, FilterKind, FilterRelations};
pub use measure::{BaseMeasure, CalculatedMeasure, ContextItem, Measure, MeasureTemplate};
pub use types::{AggregationType, DataType, Granularity, Sort};
