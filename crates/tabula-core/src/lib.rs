//! tabula-core - Cell graph with dependency tracking and cached values.
//!
//! A [`Sheet`] owns cells addressed by position. Editing a cell updates the
//! dependency edges, rejects edits that would form a cycle, and marks every
//! transitive dependent stale; values are recomputed lazily on the next read.

pub mod config;
pub mod error;
pub mod graph;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{Result, SheetError};
pub use sheet::{CellView, Sheet, Size};

pub use tabula_engine::engine::{CellValue, FormulaError, Position};
