//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`Cell`] - Complete cell record including display text and formula

mod address;
mod storage;
mod value;

pub use address::{
    from_address, parse_range, to_address, CellAddress, CellRange, CellRangeIterator,
};
pub use storage::{Cell, CellStorage};
pub use value::{CellError, CellValue, CellValueType, SharedString};
