//! Document recalculation
//!
//! Formula cells are evaluated in row-major order and each result is written
//! back into the cell's cached value and display text. References are
//! resolved on read by the evaluator, so no calculation order is needed;
//! cell values resolved once are reused for the rest of the pass.
//!
//! # Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut document = Document::new();
//! let sheet = document.sheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//! sheet.set_cell_formula("A3", "=A1+A2").unwrap();
//!
//! let stats = document.calculate();
//! assert_eq!(stats.cells_calculated, 1);
//! assert_eq!(document.sheet(0).unwrap().get_value("A3").unwrap(), CellValue::Number(30.0));
//! ```

use crate::{
    CellAddress, Evaluator, Formula, FormulaExpr, FormulaResult, FunctionRegistry, Sheet,
};

/// Options for a recalculation pass
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Recalculate cells that call volatile functions (TODAY, NOW)
    pub calculate_volatile: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            calculate_volatile: true,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of cells whose result is a circular reference
    pub circular_references: usize,
    /// Number of formula cells calling a volatile function
    pub volatile_cells: usize,
    /// Number of cells whose result is an error
    pub errors: usize,
}

impl CalculationStats {
    pub(crate) fn merge(&mut self, other: &CalculationStats) {
        self.formula_count += other.formula_count;
        self.cells_calculated += other.cells_calculated;
        self.circular_references += other.circular_references;
        self.volatile_cells += other.volatile_cells;
        self.errors += other.errors;
    }
}

/// Recalculate every formula cell of one sheet
pub(crate) fn calculate_sheet(
    evaluator: &Evaluator,
    sheet: &mut Sheet,
    options: &CalculationOptions,
) -> CalculationStats {
    let mut stats = CalculationStats::default();
    let mut results: Vec<(CellAddress, FormulaResult)> = Vec::new();
    let mut formulas: Vec<(CellAddress, Formula)> = Vec::new();

    for (addr, source) in sheet.formula_cells() {
        stats.formula_count += 1;

        match evaluator.parse(&source) {
            Ok(formula) => {
                if contains_volatile_function(formula.expr(), evaluator.registry()) {
                    stats.volatile_cells += 1;
                    if !options.calculate_volatile {
                        continue;
                    }
                }
                formulas.push((addr, formula));
            }
            Err(e) => {
                log::warn!("Failed to parse formula at {}: {}", addr, e);
                results.push((addr, FormulaResult::from_fault(&e)));
            }
        }
    }

    results.extend(evaluator.evaluate_all(&*sheet, formulas.iter().map(|(addr, f)| (*addr, f))));

    for (_, result) in &results {
        if result.is_circular_reference() {
            stats.circular_references += 1;
        }
        if result.is_error() {
            stats.errors += 1;
        }
    }

    // Every formula saw the caches as they were before this pass
    for (addr, result) in results {
        if sheet.set_cached_result(addr, result.to_cell_value(), result.text()) {
            stats.cells_calculated += 1;
        }
    }

    log::debug!(
        "Calculated {} of {} formulas on {} ({} errors)",
        stats.cells_calculated,
        stats.formula_count,
        sheet.name(),
        stats.errors
    );
    stats
}

/// Check if a formula calls any volatile function
fn contains_volatile_function(expr: &FormulaExpr, registry: &FunctionRegistry) -> bool {
    match expr {
        FormulaExpr::Function { name, args } => {
            if registry.get(name).map_or(false, |def| def.volatile) {
                return true;
            }
            args.iter()
                .any(|arg| contains_volatile_function(arg, registry))
        }
        FormulaExpr::BinaryOp { left, right, .. } => {
            contains_volatile_function(left, registry) || contains_volatile_function(right, registry)
        }
        FormulaExpr::UnaryOp { operand, .. } => contains_volatile_function(operand, registry),
        // These can't contain volatile functions
        FormulaExpr::Number(_)
        | FormulaExpr::String(_)
        | FormulaExpr::Boolean(_)
        | FormulaExpr::Empty
        | FormulaExpr::CellRef(_)
        | FormulaExpr::RangeRef(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellError, CellValue};
    use pretty_assertions::assert_eq;

    fn calculate(sheet: &mut Sheet) -> CalculationStats {
        calculate_sheet(&Evaluator::new(), sheet, &CalculationOptions::default())
    }

    #[test]
    fn test_simple_calculation() {
        let mut sheet = Sheet::default();
        sheet.set_cell_value("A1", 10.0).unwrap();
        sheet.set_cell_value("A2", 20.0).unwrap();
        sheet.set_cell_formula("A3", "=A1+A2").unwrap();

        let stats = calculate(&mut sheet);

        assert_eq!(stats.formula_count, 1);
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(sheet.get_value_at(2, 0), CellValue::Number(30.0));
        assert_eq!(sheet.cell("A3").unwrap().unwrap().text, "30");
    }

    #[test]
    fn test_chain_calculation() {
        let mut sheet = Sheet::default();
        sheet.set_cell_value("A1", 5.0).unwrap();
        sheet.set_cell_formula("A2", "=A1*2").unwrap();
        sheet.set_cell_formula("A3", "=A2+10").unwrap();
        sheet.set_cell_formula("A4", "=A3*A1").unwrap();

        let stats = calculate(&mut sheet);
        assert_eq!(stats.formula_count, 3);
        assert_eq!(stats.cells_calculated, 3);

        // A2 = 5*2 = 10
        assert_eq!(sheet.get_value_at(1, 0), CellValue::Number(10.0));
        // A3 = 10+10 = 20
        assert_eq!(sheet.get_value_at(2, 0), CellValue::Number(20.0));
        // A4 = 20*5 = 100
        assert_eq!(sheet.get_value_at(3, 0), CellValue::Number(100.0));
    }

    #[test]
    fn test_long_running_total() {
        let mut sheet = Sheet::default();
        sheet.set_cell_value("A1", 1.0).unwrap();
        for row in 1..1000 {
            sheet.set_cell_formula_at(row, 0, &format!("=A{}+1", row));
        }

        let stats = calculate(&mut sheet);
        assert_eq!(stats.formula_count, 999);
        assert_eq!(stats.cells_calculated, 999);
        assert_eq!(stats.errors, 0);
        assert_eq!(sheet.get_value_at(299, 0), CellValue::Number(300.0));
        assert_eq!(sheet.get_value_at(999, 0), CellValue::Number(1000.0));
    }

    #[test]
    fn test_self_reference_is_circular() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=A1+1").unwrap();
        sheet.set_cell_value("B1", 2.0).unwrap();
        sheet.set_cell_formula("B2", "=SUM(B1:B2)").unwrap();

        let stats = calculate(&mut sheet);
        assert_eq!(stats.circular_references, 2);
        assert_eq!(sheet.get_value_at(0, 0), CellValue::Error(CellError::Ref));
        assert_eq!(sheet.get_value_at(1, 1), CellValue::Error(CellError::Ref));
    }

    #[test]
    fn test_circular_reference_detection() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=B1").unwrap();
        sheet.set_cell_formula("B1", "=A1").unwrap();
        sheet.set_cell_formula("C1", "=1/0").unwrap();

        let stats = calculate(&mut sheet);
        assert_eq!(stats.circular_references, 2);
        assert_eq!(stats.errors, 3);
        assert_eq!(sheet.get_value_at(0, 0), CellValue::Error(CellError::Ref));
        assert_eq!(sheet.get_value_at(0, 2), CellValue::Error(CellError::Div0));
    }

    #[test]
    fn test_volatile_function_detection() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=TODAY()").unwrap();
        sheet.set_cell_formula("A2", "=YEAR(NOW())+1").unwrap();
        sheet.set_cell_formula("A3", "=1+1").unwrap();

        let stats = calculate(&mut sheet);
        assert_eq!(stats.volatile_cells, 2);
        assert_eq!(stats.cells_calculated, 3);

        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=TODAY()").unwrap();
        sheet.set_cell_formula("A2", "=1+1").unwrap();
        let options = CalculationOptions {
            calculate_volatile: false,
        };
        let stats = calculate_sheet(&Evaluator::new(), &mut sheet, &options);
        assert_eq!(stats.volatile_cells, 1);
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(sheet.get_value_at(0, 0), CellValue::Empty);
    }

    #[test]
    fn test_unparsable_formula_counts_as_error() {
        let mut sheet = Sheet::default();
        sheet.set_cell_formula("A1", "=SUM(1,2").unwrap();

        let stats = calculate(&mut sheet);
        assert_eq!(stats.errors, 1);
        assert_eq!(sheet.get_value_at(0, 0), CellValue::Error(CellError::Generic));
    }
}
