//! Formula engine API.
//!
//! This module provides everything the cell graph needs from formulas:
//!
//! - [`Position`] - Cell coordinates (A1 notation ↔ row/col indices)
//! - [`CellValue`], [`FormulaError`] - Computed values and evaluation errors
//! - [`Formula`], [`CellLookup`] - The formula capability and its view of the sheet
//! - [`ArithmeticFormula`], [`parse_formula`] - The built-in arithmetic grammar
//! - [`ShiftOperation`] - Position rewriting for row/column insert and delete

mod expr;
mod formula;
mod parser;
mod position;
mod shift;
mod value;

pub use expr::{BinaryOp, Expr, UnaryOp};
pub use formula::{ArithmeticFormula, CellLookup, Formula, FormulaParser, parse_formula};
pub use parser::{FormulaParseError, parse_expression};
pub use position::{MAX_COLS, MAX_ROWS, Position};
pub use shift::{ShiftOperation, ShiftOutcome, Shifted};
pub use value::{CellValue, FormulaError, FormulaValue};
