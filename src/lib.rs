//! # jaql-model
//!
//! A dimensional data model (attributes, dimensions, measures, filters)
//! with JAQL serialization, plus the services that sit on top of it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Model (Attribute / Dimension / Measure /         │
//! │               Filter / FilterRelations)                 │
//! └─────────────────────────────────────────────────────────┘
//!          ▲ [nlq]                        │ [jaql_element]
//!          │                              ▼
//! ┌──────────────────┐     ┌─────────────────────────────────┐
//! │  NLQ query JSON  │     │  JAQL (wire DTOs, serde)         │
//! └──────────────────┘     │  ◄── [filter::from_jaql]         │
//!                          └─────────────────────────────────┘
//!                                         │ [query]
//!                                         ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  JaqlQuery → [rest] → [data_load] cache → QueryResult    │
//! │                                   → [pivot] grid/plugins │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod data_load;
pub mod error;
pub mod jaql;
pub mod model;
pub mod nlq;
pub mod pivot;
pub mod query;
pub mod rest;
pub mod translation;

pub use error::{ModelResult, TranslatableError};
pub use query::QueryDescription;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::error::{ModelResult, TranslatableError};
    pub use crate::jaql::{DataSource, JaqlElement, JaqlQuery, MetadataItem};
    pub use crate::model::filter::factory;
    pub use crate::model::{
        default_title, AggregationType, Attribute, BaseMeasure, CalculatedMeasure, DataType,
        DateDimension, Dimension, Filter, FilterConfig, FilterKind, FilterRelations, Granularity,
        Measure, Sort,
    };
    pub use crate::model::measure_factory;
    pub use crate::query::QueryDescription;
}
