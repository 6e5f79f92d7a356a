//! Prelude module - common imports for sheetcalc users
//!
//! ```rust
//! use sheetcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    CellAddress,
    CellError,
    CellRange,
    CellStore,
    CellValue,
    // Main types
    Document,
    // Error types
    Error,
    // Evaluation types
    ErrorPolicy,
    Evaluator,
    EvaluatorSettings,
    FormulaResult,
    FormulaValue,
    Precedence,
    Result,
    ResultType,
    Sheet,
};
