//! Sheet type

use crate::cell::{Cell, CellAddress, CellRange, CellStorage, CellValue};
use crate::error::Result;
use crate::store::CellStore;

/// A single sheet of cells
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
}

impl Sheet {
    /// Create a new sheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(row, col)
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u32) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.cells.iter()
    }

    /// Addresses and source text of every formula cell, row-major
    pub fn formula_cells(&self) -> Vec<(CellAddress, String)> {
        self.cells
            .iter()
            .filter_map(|(addr, cell)| cell.formula.clone().map(|f| (addr, f)))
            .collect()
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value);
        Ok(())
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) {
        self.cells.set(row, col, Cell::new(value.into()));
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula);
        Ok(())
    }

    /// Set a cell formula by row and column indices
    pub fn set_cell_formula_at(&mut self, row: u32, col: u32, formula: &str) {
        // Ensure formula starts with '='
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.cells.set(row, col, Cell::formula(formula));
    }

    /// Set a cell from typed input: `=...` is a formula, anything else a value
    pub fn set_cell_input(&mut self, address: &str, input: &str) -> Result<()> {
        if input.starts_with('=') {
            self.set_cell_formula(address, input)
        } else {
            self.set_cell_value(address, CellValue::from_input(input))
        }
    }

    /// Store a refreshed result in a cell's cache
    ///
    /// Returns `false` when no cell exists at the address.
    pub fn set_cached_result(&mut self, addr: CellAddress, value: CellValue, text: String) -> bool {
        match self.cells.get_mut(addr.row, addr.col) {
            Some(cell) => {
                cell.set_cached(value, text);
                true
            }
            None => false,
        }
    }

    /// Clear a cell
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.clear_cell_at(addr.row, addr.col);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u32) {
        self.cells.remove(row, col);
    }

    // === Range Operations ===

    /// Get the used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells.bounds()
    }

    /// Clear all cells in a range
    pub fn clear_range(&mut self, range: &CellRange) {
        self.cells.clear_range(range);
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

impl CellStore for Sheet {
    fn cell(&self, address: &CellAddress) -> Option<&Cell> {
        self.cells.get(address.row, address.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValueType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get_values() {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell_value("A1", 10.0).unwrap();
        sheet.set_cell_value("B2", "hello").unwrap();
        sheet.set_cell_value("C3", true).unwrap();

        assert_eq!(sheet.name(), "Data");
        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(10.0));
        assert_eq!(sheet.get_value("b2").unwrap(), CellValue::from("hello"));
        assert_eq!(sheet.get_value("Z9").unwrap(), CellValue::Empty);
        assert_eq!(sheet.cell("C3").unwrap().unwrap().text, "TRUE");
        assert!(sheet.set_cell_value("A0", 1.0).is_err());
    }

    #[test]
    fn test_formula_cells() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A3", "SUM(A1:A2)").unwrap();
        sheet.set_cell_input("A1", "=1+1").unwrap();
        sheet.set_cell_input("A2", "42").unwrap();

        let formulas = sheet.formula_cells();
        assert_eq!(
            formulas,
            vec![
                (CellAddress::new(0, 0), "=1+1".to_string()),
                (CellAddress::new(2, 0), "=SUM(A1:A2)".to_string()),
            ]
        );
        assert_eq!(sheet.get_value("A2").unwrap(), CellValue::Number(42.0));
    }

    #[test]
    fn test_cached_result() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=2*3").unwrap();
        assert!(sheet.set_cached_result(CellAddress::new(0, 0), CellValue::Number(6.0), "6".into()));
        assert!(!sheet.set_cached_result(CellAddress::new(5, 5), CellValue::Empty, String::new()));

        let cell = sheet.cell("A1").unwrap().unwrap();
        assert_eq!(cell.value_type(), CellValueType::Number);
        assert_eq!(cell.text, "6");
        assert!(cell.has_formula());
    }

    #[test]
    fn test_clear() {
        let mut sheet = Sheet::default();
        sheet.set_cell_value("A1", 1.0).unwrap();
        sheet.set_cell_value("B1", 2.0).unwrap();
        sheet.set_cell_value("C5", 3.0).unwrap();
        assert_eq!(sheet.used_range(), Some(CellRange::parse("A1:C5").unwrap()));

        sheet.clear_cell("C5").unwrap();
        assert_eq!(sheet.used_range(), Some(CellRange::parse("A1:B1").unwrap()));

        sheet.clear_range(&CellRange::parse("A1:B1").unwrap());
        assert_eq!(sheet.cell_count(), 0);
        assert!(sheet.get_cell("A1").is_none());
    }
}
