//! # sheetcalc
//!
//! A spreadsheet formula engine over a sparse cell store.
//!
//! sheetcalc evaluates spreadsheet formulas the way a grid component does:
//! references are resolved on read, so a formula that points at another
//! formula cell evaluates that cell first.
//!
//! ## Features
//!
//! - A1-style addresses and ranges
//! - Formula parsing with first-match or standard operator precedence
//! - Built-in math, logical, text, date, lookup and information functions
//! - Custom function registration
//! - Circular reference detection
//! - Document-wide recalculation that refreshes cached cell values
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut document = Document::new();
//! let sheet = document.sheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 100.0).unwrap();
//!
//! let result = document.evaluate(0, "=IF(A1>50,\"big\",\"small\")", "B1").unwrap();
//! assert_eq!(result.result_type(), ResultType::String);
//! assert_eq!(result.text(), "big");
//! ```

pub mod calculation;
pub mod document;
pub mod prelude;

// Re-export calculation types
pub use calculation::{CalculationOptions, CalculationStats};
pub use document::Document;

// Re-export core types
pub use sheetcalc_core::{
    // Addressing
    from_address,
    parse_range,
    to_address,
    // Cell types
    Cell,
    CellAddress,
    CellError,
    CellRange,
    CellStore,
    CellValue,
    CellValueType,
    // Error types
    Error,
    Result,
    // Main types
    Sheet,
};

// Re-export formula types
pub use sheetcalc_formula::{
    flatten, parse_formula, ErrorPolicy, EvaluationContext, Evaluator, EvaluatorSettings,
    Formula, FormulaError, FormulaExpr, FormulaFunction, FormulaResult, FormulaValue, FunctionDef,
    FunctionRegistry, Precedence, ResultType,
};
