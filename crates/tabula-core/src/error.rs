//! Error types for Tabula core.

use thiserror::Error;

use tabula_engine::engine::{FormulaParseError, Position};

/// Errors that can occur while editing a sheet.
///
/// Evaluation problems (`#REF!`, `#VALUE!`, `#DIV/0!`) are not errors here:
/// they are cell values.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid position: row {}, column {}", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error("Formula error: {0}")]
    FormulaParse(#[from] FormulaParseError),

    #[error("Circular dependency detected at {at}")]
    CircularDependency { at: Position },

    #[error("Table too big: structural edit would move cells past the sheet limits")]
    TableTooBig,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
