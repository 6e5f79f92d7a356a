//! Document: the hosting object for sheets and their shared evaluator

use crate::calculation::{calculate_sheet, CalculationOptions, CalculationStats};
use crate::{
    CellAddress, Error, EvaluationContext, Evaluator, EvaluatorSettings, FormulaResult,
    FormulaValue, Result, Sheet,
};

/// A set of sheets evaluated by one [`Evaluator`]
///
/// Custom functions registered on the document are visible to formulas on
/// every sheet.
#[derive(Debug, Clone)]
pub struct Document {
    sheets: Vec<Sheet>,
    evaluator: Evaluator,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with one empty sheet named "Sheet1"
    pub fn new() -> Self {
        Self::with_evaluator(Evaluator::new())
    }

    /// Create a document whose evaluator uses the given settings
    pub fn with_settings(settings: EvaluatorSettings) -> Self {
        Self::with_evaluator(Evaluator::with_settings(settings))
    }

    /// Create a document around an existing evaluator
    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        Self {
            sheets: vec![Sheet::new("Sheet1")],
            evaluator,
        }
    }

    // === Sheets ===

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a mutable sheet by index
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Index of the sheet with this name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Get a sheet by name
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).and_then(|i| self.sheets.get(i))
    }

    /// Append an empty sheet and return its index
    pub fn add_sheet<S: Into<String>>(&mut self, name: S) -> Result<usize> {
        let name = name.into();
        if self.sheet_index(&name).is_some() {
            return Err(Error::other(format!("Sheet '{}' already exists", name)));
        }
        self.sheets.push(Sheet::new(name));
        Ok(self.sheets.len() - 1)
    }

    /// Remove a sheet by index
    pub fn remove_sheet(&mut self, index: usize) -> Result<Sheet> {
        if index >= self.sheets.len() {
            return Err(Error::other(format!("Sheet {} not found", index)));
        }
        Ok(self.sheets.remove(index))
    }

    // === Evaluation ===

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Register a custom function for every sheet of this document
    pub fn register_function<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[FormulaValue], &EvaluationContext<'_>) -> sheetcalc_formula::Result<FormulaValue>
            + Send
            + Sync
            + 'static,
    {
        self.evaluator.register_function(name, f);
    }

    /// Evaluate formula text as if it were entered at `at` on a sheet
    pub fn evaluate(&self, sheet: usize, formula: &str, at: &str) -> Result<FormulaResult> {
        let store = self
            .sheets
            .get(sheet)
            .ok_or_else(|| Error::other(format!("Sheet {} not found", sheet)))?;
        let at = CellAddress::parse(at)?;
        Ok(self.evaluator.evaluate(formula, store, at))
    }

    /// Recalculate every formula cell of every sheet with default options
    pub fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    /// Recalculate every formula cell of every sheet
    pub fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let mut stats = CalculationStats::default();
        for sheet in &mut self.sheets {
            stats.merge(&calculate_sheet(&self.evaluator, sheet, options));
        }
        log::debug!(
            "Calculated {} formula cells across {} sheets",
            stats.cells_calculated,
            self.sheets.len()
        );
        stats
    }
}
