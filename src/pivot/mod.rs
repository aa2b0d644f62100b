//! Pivot services: indexed header trees, cell metadata and cell plugins.
//!
//! ```text
//! rows: [PivotNode]    columns: [PivotNode]    values[row_leaf][col_leaf]
//!            \              /
//!             PivotGrid ── cell_metadata(row, col)
//!                 │
//!           PluginService ── process_grid → [[FormattedCell]]
//! ```

mod grid;
mod plugins;
mod tree;

pub use grid::{CellKind, CellMetadata, PivotError, PivotGrid};
pub use plugins::{CellContext, FormattedCell, PivotPlugin, PluginService};
pub use tree::{IndexedNode, NodeType, PivotNode, PivotTree};
