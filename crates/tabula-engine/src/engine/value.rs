//! Cell values and evaluation errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An error produced while evaluating a formula.
///
/// Evaluation errors are data: they are cached and propagated through
/// dependent formulas like any other value.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FormulaError {
    /// Reference to a cell that does not exist (deleted or out of range).
    Ref,
    /// Operand cannot be interpreted as a number.
    Value,
    /// Division by zero or a non-finite result.
    Div0,
}

impl FormulaError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaError::Ref => "#REF!",
            FormulaError::Value => "#VALUE!",
            FormulaError::Div0 => "#DIV/0!",
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of evaluating a formula.
pub type FormulaValue = Result<f64, FormulaError>;

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl CellValue {
    pub fn empty() -> CellValue {
        CellValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Interpret the value as a formula operand.
    ///
    /// - Empty text is `0`
    /// - Other text must parse as a finite number, otherwise `#VALUE!`
    /// - Errors propagate unchanged
    pub fn as_operand(&self) -> FormulaValue {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Error(e) => Err(*e),
            CellValue::Text(s) if s.is_empty() => Ok(0.0),
            CellValue::Text(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(FormulaError::Value),
            },
        }
    }
}

impl From<FormulaValue> for CellValue {
    fn from(result: FormulaValue) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}
