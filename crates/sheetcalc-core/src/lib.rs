//! # sheetcalc-core
//!
//! Core data structures for the sheetcalc formula engine.
//!
//! This crate provides the types formulas are evaluated over:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing and ranges
//! - [`CellValue`] and [`CellValueType`] - Cell values and their type tags
//! - [`Cell`] - A stored cell (value, display text, optional formula)
//! - [`CellStore`] - Read access used by the evaluator
//! - [`Sheet`] - A sparse, addressable cell store
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{CellStore, CellValue, Sheet};
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_cell_value("A1", 42.0).unwrap();
//! sheet.set_cell_formula("B1", "=A1*2").unwrap();
//!
//! assert_eq!(sheet.get_cell("A1").unwrap().value, CellValue::Number(42.0));
//! assert!(sheet.get_cell("B1").unwrap().has_formula());
//! ```

pub mod cell;
pub mod error;
pub mod serial;
pub mod sheet;
pub mod store;

// Re-exports for convenience
pub use cell::{
    from_address, parse_range, to_address, Cell, CellAddress, CellError, CellRange,
    CellStorage, CellValue, CellValueType, SharedString,
};
pub use error::{Error, Result};
pub use sheet::Sheet;
pub use store::CellStore;
