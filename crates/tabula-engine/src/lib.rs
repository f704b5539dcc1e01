//! tabula_engine - Positions, values, and the arithmetic formula engine.

pub mod engine;

pub use engine::*;
