//! The formula capability consumed by the cell graph.
//!
//! A [`Formula`] is anything that can evaluate itself against a sheet, list
//! the positions it reads, render canonical text, and rewrite its references
//! when rows or columns move. [`ArithmeticFormula`] is the built-in grammar.

use std::fmt;

use super::expr::Expr;
use super::parser::{FormulaParseError, parse_expression};
use super::position::Position;
use super::shift::{ShiftOperation, ShiftOutcome};
use super::value::{CellValue, FormulaValue};

/// Non-vivifying read access to computed cell values.
pub trait CellLookup {
    /// Value of the cell at `pos`, or None if no cell exists there.
    fn value_at(&self, pos: Position) -> Option<CellValue>;
}

pub trait Formula: fmt::Debug {
    fn evaluate(&self, cells: &dyn CellLookup) -> FormulaValue;

    /// Canonical expression text, without the leading formula marker.
    fn expression(&self) -> String;

    /// Positions this formula reads: sorted, deduplicated, all valid.
    fn referenced_cells(&self) -> Vec<Position>;

    fn handle_inserted_rows(&mut self, before: usize, count: usize) -> ShiftOutcome;
    fn handle_inserted_cols(&mut self, before: usize, count: usize) -> ShiftOutcome;
    fn handle_deleted_rows(&mut self, first: usize, count: usize) -> ShiftOutcome;
    fn handle_deleted_cols(&mut self, first: usize, count: usize) -> ShiftOutcome;
}

/// Builds a formula from expression text (the part after `=`).
pub type FormulaParser = fn(&str) -> Result<Box<dyn Formula>, FormulaParseError>;

/// Parse expression text with the built-in arithmetic grammar.
pub fn parse_formula(expression: &str) -> Result<Box<dyn Formula>, FormulaParseError> {
    Ok(Box::new(ArithmeticFormula::parse(expression)?))
}

/// Numbers, A1 references, `+ - * /`, unary signs, and parentheses.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticFormula {
    root: Expr,
}

impl ArithmeticFormula {
    pub fn parse(expression: &str) -> Result<Self, FormulaParseError> {
        Ok(ArithmeticFormula {
            root: parse_expression(expression)?,
        })
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    fn shift(&mut self, op: ShiftOperation) -> ShiftOutcome {
        self.root.shift(op)
    }
}

impl Formula for ArithmeticFormula {
    fn evaluate(&self, cells: &dyn CellLookup) -> FormulaValue {
        self.root.evaluate(cells)
    }

    fn expression(&self) -> String {
        self.root.to_string()
    }

    fn referenced_cells(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        self.root.collect_refs(&mut refs);
        refs.sort();
        refs.dedup();
        refs
    }

    fn handle_inserted_rows(&mut self, before: usize, count: usize) -> ShiftOutcome {
        self.shift(ShiftOperation::InsertRows { before, count })
    }

    fn handle_inserted_cols(&mut self, before: usize, count: usize) -> ShiftOutcome {
        self.shift(ShiftOperation::InsertCols { before, count })
    }

    fn handle_deleted_rows(&mut self, first: usize, count: usize) -> ShiftOutcome {
        self.shift(ShiftOperation::DeleteRows { first, count })
    }

    fn handle_deleted_cols(&mut self, first: usize, count: usize) -> ShiftOutcome {
        self.shift(ShiftOperation::DeleteCols { first, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FormulaError;
    use rstest::rstest;
    use std::collections::HashMap;

    struct Cells(HashMap<Position, CellValue>);

    impl Cells {
        fn new(entries: &[(&str, CellValue)]) -> Self {
            Cells(
                entries
                    .iter()
                    .map(|(name, v)| (Position::from_a1(name).unwrap(), v.clone()))
                    .collect(),
            )
        }
    }

    impl CellLookup for Cells {
        fn value_at(&self, pos: Position) -> Option<CellValue> {
            self.0.get(&pos).cloned()
        }
    }

    fn eval(expression: &str, cells: &Cells) -> FormulaValue {
        parse_formula(expression).unwrap().evaluate(cells)
    }

    #[rstest]
    #[case("1+2*3", Ok(7.0))]
    #[case("(1+2)*3", Ok(9.0))]
    #[case("-2*-3", Ok(6.0))]
    #[case("10/4", Ok(2.5))]
    #[case("1/0", Err(FormulaError::Div0))]
    #[case("0/0", Err(FormulaError::Div0))]
    #[case("1e308*10", Err(FormulaError::Div0))]
    fn test_evaluate_constants(#[case] expression: &str, #[case] expected: FormulaValue) {
        assert_eq!(eval(expression, &Cells::new(&[])), expected);
    }

    #[test]
    fn test_evaluate_references() {
        let cells = Cells::new(&[
            ("A1", CellValue::Number(5.0)),
            ("A2", CellValue::Text("3".into())),
            ("A3", CellValue::Text("three".into())),
            ("A4", CellValue::Error(FormulaError::Div0)),
            ("A5", CellValue::empty()),
        ]);
        assert_eq!(eval("A1*2", &cells), Ok(10.0));
        assert_eq!(eval("A1+A2", &cells), Ok(8.0));
        assert_eq!(eval("A1+A3", &cells), Err(FormulaError::Value));
        assert_eq!(eval("A4+A3", &cells), Err(FormulaError::Div0));
        assert_eq!(eval("A5+1", &cells), Ok(1.0));
        // Absent cells read as zero.
        assert_eq!(eval("Z99+1", &cells), Ok(1.0));
    }

    #[test]
    fn test_referenced_cells_sorted_and_deduplicated() {
        let formula = parse_formula("C1+A2+B1+A2").unwrap();
        let refs: Vec<String> = formula
            .referenced_cells()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(refs, vec!["B1", "C1", "A2"]);
    }

    #[test]
    fn test_inserted_rows_rename_references() {
        let mut formula = parse_formula("A1+B3").unwrap();
        assert_eq!(
            formula.handle_inserted_rows(1, 2),
            ShiftOutcome::ReferencesRenamedOnly
        );
        assert_eq!(formula.expression(), "A1+B5");
        assert_eq!(
            formula.handle_inserted_rows(10, 1),
            ShiftOutcome::NothingChanged
        );
    }

    #[test]
    fn test_inserted_cols_rename_references() {
        let mut formula = parse_formula("A1+C1").unwrap();
        formula.handle_inserted_cols(1, 1);
        assert_eq!(formula.expression(), "A1+D1");
    }

    #[test]
    fn test_deleted_rows_invalidate_references() {
        let mut formula = parse_formula("A1+A2+A5").unwrap();
        assert_eq!(
            formula.handle_deleted_rows(1, 2),
            ShiftOutcome::ReferencesChanged
        );
        assert_eq!(formula.expression(), "A1+#REF!+A3");
        assert_eq!(
            formula.referenced_cells(),
            vec![Position::new(0, 0), Position::new(2, 0)]
        );
        assert_eq!(formula.evaluate(&Cells::new(&[])), Err(FormulaError::Ref));
    }

    #[test]
    fn test_deleted_cols_shift_back() {
        let mut formula = parse_formula("C1*2").unwrap();
        assert_eq!(
            formula.handle_deleted_cols(0, 1),
            ShiftOutcome::ReferencesRenamedOnly
        );
        assert_eq!(formula.expression(), "B1*2");
    }
}
