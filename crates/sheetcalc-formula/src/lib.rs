//! # sheetcalc-formula
//!
//! Formula parser and evaluator for sheetcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST), with the operator splitting mode chosen
//!   by [`EvaluatorSettings`]
//! - Formula evaluation against any [`CellStore`](sheetcalc_core::CellStore),
//!   resolving referenced formula cells on read
//! - Built-in math, logical, text, date, lookup and information functions
//! - Registration of custom functions
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{CellAddress, Sheet};
//! use sheetcalc_formula::{Evaluator, ResultType};
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//! sheet.set_cell_formula("A3", "=A1+A2").unwrap();
//!
//! let evaluator = Evaluator::new();
//! let result = evaluator.evaluate("=SUM(A1:A3)", &sheet, CellAddress::new(3, 0));
//! assert_eq!(result.result_type(), ResultType::Number);
//! assert_eq!(result.as_number(), Some(60.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod result;
pub mod scanner;
pub mod settings;
pub mod value;

pub use ast::{BinaryOperator, Formula, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, Result};
pub use evaluator::{EvaluationContext, Evaluator};
pub use functions::{FormulaFunction, FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
pub use result::{FormulaResult, ResultType};
pub use settings::{ErrorPolicy, EvaluatorSettings, Precedence};
pub use value::{flatten, FormulaValue};
