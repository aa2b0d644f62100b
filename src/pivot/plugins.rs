//! Cell plugins: per-cell hooks that rewrite formatted text and style.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::grid::{CellMetadata, PivotError, PivotGrid};

/// A data cell after formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormattedCell {
    pub value: Option<f64>,
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
}

impl FormattedCell {
    /// Plain rendering: integers without a fraction, empty for no value.
    pub fn from_value(value: Option<f64>) -> Self {
        let text = match value {
            Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
            Some(v) => v.to_string(),
            None => String::new(),
        };
        Self {
            value,
            text,
            style: BTreeMap::new(),
        }
    }
}

/// Where a cell sits and what it shows.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub row: usize,
    pub column: usize,
    pub metadata: &'a CellMetadata,
}

pub trait PivotPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn process_cell(&self, cell: &mut FormattedCell, context: &CellContext<'_>);
}

/// Runs plugins over grid cells, first-registered first.
#[derive(Default)]
pub struct PluginService {
    plugins: Vec<Box<dyn PivotPlugin>>,
}

impl PluginService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn PivotPlugin>) {
        debug!(plugin = plugin.name(), "registered pivot plugin");
        self.plugins.push(plugin);
    }

    pub fn with_plugin(mut self, plugin: impl PivotPlugin + 'static) -> Self {
        self.register(Box::new(plugin));
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn process_cell(
        &self,
        grid: &PivotGrid,
        row: usize,
        column: usize,
    ) -> Result<FormattedCell, PivotError> {
        let metadata = grid.cell_metadata(row, column)?;
        let mut cell = FormattedCell::from_value(metadata.value);
        let context = CellContext {
            row,
            column,
            metadata: &metadata,
        };
        for plugin in &self.plugins {
            plugin.process_cell(&mut cell, &context);
        }
        Ok(cell)
    }

    /// Format every data cell of `grid`, row by row.
    pub fn process_grid(&self, grid: &PivotGrid) -> Result<Vec<Vec<FormattedCell>>, PivotError> {
        (0..grid.row_count())
            .map(|row| {
                (0..grid.column_count())
                    .map(|column| self.process_cell(grid, row, column))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

impl std::fmt::Debug for PluginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginService")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}
