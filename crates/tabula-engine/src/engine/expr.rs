//! Arithmetic expression tree.
//!
//! Produced by the parser, evaluated against a [`CellLookup`], and rendered
//! back to canonical text with only the parentheses the grammar requires.

use std::fmt;

use super::formula::CellLookup;
use super::position::Position;
use super::shift::{ShiftOperation, ShiftOutcome, Shifted};
use super::value::{FormulaError, FormulaValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// `a op (b op' c)` differs from `a op b op' c` when op' has the same precedence.
    fn needs_grouped_rhs(self) -> bool {
        matches!(self, BinaryOp::Sub | BinaryOp::Div)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(Position),
    /// A reference whose target was removed by a structural edit.
    InvalidRef,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    pub fn evaluate(&self, cells: &dyn CellLookup) -> FormulaValue {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::InvalidRef => Err(FormulaError::Ref),
            Expr::Ref(pos) => {
                if !pos.is_valid() {
                    return Err(FormulaError::Ref);
                }
                match cells.value_at(*pos) {
                    Some(value) => value.as_operand(),
                    None => Ok(0.0),
                }
            }
            Expr::Unary { op, operand } => {
                let v = operand.evaluate(cells)?;
                Ok(match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Minus => -v,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(cells)?;
                let r = rhs.evaluate(cells)?;
                let result = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                };
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(FormulaError::Div0)
                }
            }
        }
    }

    /// Collect every valid reference, in tree order (may contain duplicates).
    pub fn collect_refs(&self, out: &mut Vec<Position>) {
        match self {
            Expr::Ref(pos) if pos.is_valid() => out.push(*pos),
            Expr::Unary { operand, .. } => operand.collect_refs(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_refs(out);
                rhs.collect_refs(out);
            }
            _ => {}
        }
    }

    /// Rewrite references in place for a structural edit.
    pub fn shift(&mut self, op: ShiftOperation) -> ShiftOutcome {
        match self {
            Expr::Ref(pos) => match op.apply(*pos) {
                Shifted::Unchanged => ShiftOutcome::NothingChanged,
                Shifted::Moved(moved) => {
                    *pos = moved;
                    ShiftOutcome::ReferencesRenamedOnly
                }
                Shifted::Deleted => {
                    *self = Expr::InvalidRef;
                    ShiftOutcome::ReferencesChanged
                }
            },
            Expr::Unary { operand, .. } => operand.shift(op),
            Expr::Binary { lhs, rhs, .. } => lhs.shift(op).max(rhs.shift(op)),
            Expr::Number(_) | Expr::InvalidRef => ShiftOutcome::NothingChanged,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, grouped: bool) -> fmt::Result {
    if grouped {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Ref(pos) => write!(f, "{}", pos),
            Expr::InvalidRef => f.write_str("#REF!"),
            Expr::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                })?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                write_operand(f, lhs, lhs.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                let rhs_prec = rhs.precedence();
                let grouped = rhs_prec < prec || (rhs_prec == prec && op.needs_grouped_rhs());
                write_operand(f, rhs, grouped)
            }
        }
    }
}
