use serde::Serialize;

use super::tree::{IndexedNode, NodeType, PivotNode, PivotTree};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PivotError {
    #[error("Cell ({row}, {column}) is outside the {rows}x{columns} grid")]
    CellOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Grid has {actual} value rows but the row headers have {expected} leaves")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Value row {row} has {actual} cells but the column headers have {expected} leaves")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// What a data cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Value,
    Subtotal,
    Grandtotal,
}

/// Everything known about one data cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMetadata {
    pub kind: CellKind,
    pub row_path: Vec<String>,
    pub column_path: Vec<String>,
    pub measure: Option<String>,
    pub value: Option<f64>,
}

/// Pivot result: header trees plus values indexed by leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotGrid {
    pub rows: PivotTree,
    pub columns: PivotTree,
    pub row_titles: Vec<String>,
    pub column_titles: Vec<String>,
    pub measures: Vec<String>,
    /// `values[row_leaf][column_leaf]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl PivotGrid {
    /// Build a grid, checking the value matrix against the header leaves.
    pub fn new(
        rows: &[PivotNode],
        columns: &[PivotNode],
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, PivotError> {
        let rows = PivotTree::build(rows);
        let columns = PivotTree::build(columns);

        if values.len() != rows.leaf_count() {
            return Err(PivotError::RowCountMismatch {
                expected: rows.leaf_count(),
                actual: values.len(),
            });
        }
        if let Some((row, cells)) = values
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.leaf_count())
        {
            return Err(PivotError::ColumnCountMismatch {
                row,
                expected: columns.leaf_count(),
                actual: cells.len(),
            });
        }

        Ok(Self {
            rows,
            columns,
            row_titles: Vec::new(),
            column_titles: Vec::new(),
            measures: Vec::new(),
            values,
        })
    }

    pub fn with_row_titles(mut self, titles: Vec<String>) -> Self {
        self.row_titles = titles;
        self
    }

    pub fn with_column_titles(mut self, titles: Vec<String>) -> Self {
        self.column_titles = titles;
        self
    }

    pub fn with_measures(mut self, measures: Vec<String>) -> Self {
        self.measures = measures;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.leaf_count()
    }

    pub fn column_count(&self) -> usize {
        self.columns.leaf_count()
    }

    fn check(&self, row: usize, column: usize) -> Result<(), PivotError> {
        if row >= self.row_count() || column >= self.column_count() {
            return Err(PivotError::CellOutOfRange {
                row,
                column,
                rows: self.row_count(),
                columns: self.column_count(),
            });
        }
        Ok(())
    }

    pub fn value(&self, row: usize, column: usize) -> Result<Option<f64>, PivotError> {
        self.check(row, column)?;
        Ok(self.values[row][column])
    }

    /// Metadata of the data cell at (`row`, `column`) leaf indexes.
    pub fn cell_metadata(&self, row: usize, column: usize) -> Result<CellMetadata, PivotError> {
        self.check(row, column)?;

        let row_path = self.rows.leaf_path(row);
        let column_path = self.columns.leaf_path(column);
        let both = || row_path.iter().chain(column_path.iter());

        let kind = if both().any(|n| n.node_type == NodeType::Grandtotal) {
            CellKind::Grandtotal
        } else if both().any(|n| n.node_type == NodeType::Subtotal) {
            CellKind::Subtotal
        } else {
            CellKind::Value
        };

        // Column measure headers win over row measure headers
        let measure_index = column_path
            .iter()
            .rev()
            .chain(row_path.iter().rev())
            .find_map(|n| n.measure_index);
        let measure = match measure_index {
            Some(i) => self.measures.get(i).cloned(),
            None if self.measures.len() == 1 => self.measures.first().cloned(),
            None => None,
        };

        Ok(CellMetadata {
            kind,
            row_path: values_of(&row_path),
            column_path: values_of(&column_path),
            measure,
            value: self.values[row][column],
        })
    }
}

fn values_of(path: &[&IndexedNode]) -> Vec<String> {
    path.iter().map(|n| n.value.clone()).collect()
}
