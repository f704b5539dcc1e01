//! tabula - Incremental spreadsheet engine.
//!
//! Cells hold literals or arithmetic formulas. Edits keep the dependency
//! graph acyclic and mark dependents stale; values are computed on read.
//!
//! ```
//! use tabula::{CellValue, Position, Sheet};
//!
//! let mut sheet = Sheet::new();
//! let a1 = Position::from_a1("A1").unwrap();
//! let a2 = Position::from_a1("A2").unwrap();
//! sheet.set_cell(a1, "5").unwrap();
//! sheet.set_cell(a2, "=A1*2").unwrap();
//! assert_eq!(sheet.value(a2).unwrap(), CellValue::Number(10.0));
//! ```

pub use tabula_core::{CellView, Result, Sheet, SheetConfig, SheetError, Size, config, graph};
pub use tabula_engine::engine::{
    ArithmeticFormula, CellLookup, CellValue, Formula, FormulaError, FormulaParseError,
    FormulaParser, FormulaValue, MAX_COLS, MAX_ROWS, Position, ShiftOutcome, parse_formula,
};
