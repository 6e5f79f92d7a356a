//! Read access to cells for formula evaluation

use crate::cell::{Cell, CellAddress, CellRange};

/// A source of cells that formulas read from
///
/// The store is owned by the hosting sheet or document. Evaluation only reads
/// through this trait; writing refreshed results back is the host's job.
pub trait CellStore {
    /// Look up the cell at an address
    fn cell(&self, address: &CellAddress) -> Option<&Cell>;

    /// Look up a cell by its A1-style label
    ///
    /// Invalid labels resolve to `None`, the same as an unwritten address.
    fn get_cell(&self, label: &str) -> Option<&Cell> {
        CellAddress::parse(label)
            .ok()
            .and_then(|addr| self.cell(&addr))
    }

    /// Cells of a rectangle, row by row; unwritten addresses are `None`
    fn range_cells(&self, range: &CellRange) -> Vec<Vec<Option<&Cell>>> {
        (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.cell(&CellAddress::new(row, col)))
                    .collect()
            })
            .collect()
    }
}

impl CellStore for crate::cell::CellStorage {
    fn cell(&self, address: &CellAddress) -> Option<&Cell> {
        self.get(address.row, address.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellStorage, CellValue};

    #[test]
    fn test_get_cell_by_label() {
        let mut storage = CellStorage::new();
        storage.set(1, 26, Cell::new(CellValue::Number(7.0)));

        assert_eq!(storage.get_cell("AA2").unwrap().value, CellValue::Number(7.0));
        assert_eq!(storage.get_cell("aa2").unwrap().value, CellValue::Number(7.0));
        assert!(storage.get_cell("A1").is_none());
        assert!(storage.get_cell("not a label").is_none());
    }

    #[test]
    fn test_range_cells_shape() {
        let mut storage = CellStorage::new();
        storage.set(0, 0, Cell::new(CellValue::Number(1.0)));
        storage.set(1, 1, Cell::new(CellValue::Number(4.0)));

        let range = CellRange::parse("A1:C2").unwrap();
        let rows = storage.range_cells(&range);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert!(rows[0][0].is_some());
        assert!(rows[0][1].is_none());
        assert_eq!(rows[1][1].unwrap().value, CellValue::Number(4.0));
    }
}
