//! Cell storage implementation
//!
//! This module provides sparse storage for spreadsheet cells.
//! Only written cells are stored, using a row-based BTreeMap structure.

use std::collections::BTreeMap;

use super::{CellAddress, CellRange, CellValue, CellValueType};

/// Complete data for a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// The cell's value (for formula cells, the last cached result)
    pub value: CellValue,
    /// Display text
    pub text: String,
    /// Formula source text, if this is a formula cell
    pub formula: Option<String>,
}

impl Cell {
    /// Create a new cell holding a plain value
    pub fn new(value: CellValue) -> Self {
        let text = value.to_string();
        Self {
            value,
            text,
            formula: None,
        }
    }

    /// Create a formula cell with an empty cache
    pub fn formula<S: Into<String>>(formula: S) -> Self {
        Self {
            value: CellValue::Empty,
            text: String::new(),
            formula: Some(formula.into()),
        }
    }

    /// The type tag of the stored value
    pub fn value_type(&self) -> CellValueType {
        self.value.value_type()
    }

    /// Check if the cell holds a formula
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Replace the cached value and display text, keeping the formula
    pub fn set_cached(&mut self, value: CellValue, text: String) {
        self.value = value;
        self.text = text;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(CellValue::Empty)
    }
}

/// Sparse row-based storage for cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, Cell>>`. Iteration is
/// row-major. Entries are created on first write and removed only on clear.
#[derive(Debug, Default, Clone)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Store a cell, replacing any previous one
    pub fn set(&mut self, row: u32, col: u32, cell: Cell) {
        self.rows.entry(row).or_default().insert(col, cell);
    }

    /// Remove a cell, returning it
    pub fn remove(&mut self, row: u32, col: u32) -> Option<Cell> {
        let row_map = self.rows.get_mut(&row)?;
        let removed = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Remove every cell inside a range
    pub fn clear_range(&mut self, range: &CellRange) {
        let rows: Vec<u32> = self
            .rows
            .range(range.start.row..=range.end.row)
            .map(|(row, _)| *row)
            .collect();

        for row in rows {
            if let Some(row_map) = self.rows.get_mut(&row) {
                row_map.retain(|col, _| *col < range.start.col || *col > range.end.col);
                if row_map.is_empty() {
                    self.rows.remove(&row);
                }
            }
        }
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.rows.iter().flat_map(|(row, cols)| {
            cols.iter()
                .map(move |(col, cell)| (CellAddress::new(*row, *col), cell))
        })
    }

    /// Smallest range containing every stored cell
    pub fn bounds(&self) -> Option<CellRange> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;
        let min_col = self.rows.values().filter_map(|r| r.keys().next()).min()?;
        let max_col = self
            .rows
            .values()
            .filter_map(|r| r.keys().next_back())
            .max()?;
        Some(CellRange::from_indices(min_row, *min_col, max_row, *max_col))
    }
}
