//! JAQL wire-format types.
//!
//! These are plain serde DTOs. The typed model in [`crate::model`] converts
//! to and from them; nothing here knows about filter semantics.

mod element;
mod filter;
mod query;
mod value;

pub use element::{InJaql, JaqlElement, MetadataItem, Panel, SelectedJaql};
pub use filter::{FilterJaql, PeriodJaql};
pub use query::{DataSource, FilterRelationsJaql, JaqlQuery, RelationOperator};
pub use value::JaqlValue;
