//! Sheet state and logic.

mod io;
mod ops;
mod state;

pub use io::Size;
pub use state::{CellView, Sheet};
