//! Tokenizer and recursive-descent parser for arithmetic formulas.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | CELL | '(' expr ')'
//! ```

use thiserror::Error;

use super::expr::{BinaryOp, Expr, UnaryOp};
use super::position::Position;

/// Malformed formula text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse formula `{input}`: {reason}")]
pub struct FormulaParseError {
    pub input: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Cell(Position),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push(Token::Op(c as char));
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal = &input[start..i];
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number `{}`", literal))?;
                tokens.push(Token::Number(n));
            }
            b'A'..=b'Z' | b'a'..=b'z' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let name = &input[start..i];
                let pos = Position::from_a1(name)
                    .ok_or_else(|| format!("invalid cell reference `{}`", name))?;
                tokens.push(Token::Cell(pos));
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(format!("unexpected character `{}`", ch));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_op(&self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => Some(*c),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        while let Some(c) = self.peek_op(&['+', '-']) {
            self.pos += 1;
            let rhs = self.term()?;
            let op = if c == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while let Some(c) = self.peek_op(&['*', '/']) {
            self.pos += 1;
            let rhs = self.unary()?;
            let op = if c == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if let Some(c) = self.peek_op(&['+', '-']) {
            self.pos += 1;
            let operand = self.unary()?;
            let op = if c == '+' { UnaryOp::Plus } else { UnaryOp::Minus };
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Cell(pos)) => Ok(Expr::Ref(pos)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(Token::RParen) => Err("unexpected `)`".to_string()),
            Some(Token::Op(c)) => Err(format!("unexpected operator `{}`", c)),
            None => Err("unexpected end of formula".to_string()),
        }
    }
}

/// Parse expression text (without the leading `=`) into an expression tree.
pub fn parse_expression(input: &str) -> Result<Expr, FormulaParseError> {
    let fail = |reason: String| FormulaParseError {
        input: input.to_string(),
        reason,
    };

    let tokens = tokenize(input).map_err(fail)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr().map_err(fail)?;
    if parser.pos < parser.tokens.len() {
        return Err(fail("unexpected trailing input".to_string()));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", "1")]
    #[case(" 1 + 2 ", "1+2")]
    #[case("(1+2)*3", "(1+2)*3")]
    #[case("((A1))+(2*3)", "A1+2*3")]
    #[case("1-(2-3)", "1-(2-3)")]
    #[case("1-(2+3)", "1-(2+3)")]
    #[case("1+(2-3)", "1+2-3")]
    #[case("(1-2)-3", "1-2-3")]
    #[case("2/(3*4)", "2/(3*4)")]
    #[case("2*(3/4)", "2*3/4")]
    #[case("-(1+2)", "-(1+2)")]
    #[case("-(-1)", "--1")]
    #[case("+a1*b2", "+A1*B2")]
    #[case("1.50", "1.5")]
    #[case("1e3", "1000")]
    #[case("2.5E-1", "0.25")]
    fn test_canonical_rendering(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_expression(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1+")]
    #[case("(1+2")]
    #[case("1+2)")]
    #[case("1 2")]
    #[case("A0")]
    #[case("ZZZZZ1")]
    #[case("A1B2")]
    #[case("1..2")]
    #[case("2^3")]
    #[case("*1")]
    fn test_rejects_malformed(#[case] input: &str) {
        let err = parse_expression(input).unwrap_err();
        assert_eq!(err.input, input);
    }

    #[test]
    fn test_error_message() {
        let err = parse_expression("1+$").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot parse formula `1+$`: unexpected character `$`"
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = parse_expression("8/4/2").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::Div,
                ref lhs,
                ..
            } if matches!(**lhs, Expr::Binary { op: BinaryOp::Div, .. })
        ));
    }
}
