//! Cell positions and A1 notation.
//!
//! Provides bidirectional conversion between spreadsheet-style references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use tabula_engine::engine::Position;
//!
//! let pos = Position::from_a1("B3").unwrap();
//! assert_eq!(pos.row, 2);
//! assert_eq!(pos.col, 1);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Number of addressable rows in a sheet.
pub const MAX_ROWS: usize = 16384;
/// Number of addressable columns in a sheet.
pub const MAX_COLS: usize = 16384;

/// A cell position by row and column indices (0-indexed).
///
/// Ordering is row-major: `(row, col)`.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// True if the position lies inside the addressable area.
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from spreadsheet notation (e.g., "A1", "b2", "AA10").
    /// Returns None if the input is malformed or outside the addressable area.
    pub fn from_a1(name: &str) -> Option<Position> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        // Anything longer would overflow the fold and is out of range anyway.
        if letters.len() > 4 || numbers.len() > 6 {
            return None;
        }

        let col = letters
            .to_ascii_uppercase()
            .bytes()
            .fold(0usize, |acc, c| acc * 26 + (c - b'A') as usize + 1)
            - 1;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        let pos = Position::new(row, col);
        pos.is_valid().then_some(pos)
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("A1 position regex must compile")
    })
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s).ok_or_else(|| format!("Invalid cell position: {}", s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}
