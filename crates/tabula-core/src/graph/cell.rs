//! A single node of the cell graph.
//!
//! A [`Cell`] owns its raw text, the parsed formula (if the text is one),
//! the cached value, and both directions of its dependency edges. Edges are
//! only changed through [`super::link`] and [`super::unlink`].

use std::collections::BTreeSet;

use tabula_engine::engine::{CellLookup, CellValue, Formula, Position, ShiftOutcome};

use super::arena::CellId;
use super::cache::{CacheState, ValueCache};

/// Marks text that should be parsed as a formula.
pub const FORMULA_SIGN: char = '=';
/// Marks text that should be shown verbatim even if it looks like a formula.
pub const ESCAPE_SIGN: char = '\'';

#[derive(Debug)]
pub struct Cell {
    position: Position,
    text: String,
    formula: Option<Box<dyn Formula>>,
    cache: ValueCache,
    /// Cells this cell's formula reads.
    pub(crate) refs_to: BTreeSet<CellId>,
    /// Cells whose formulas read this cell.
    pub(crate) refs_from: BTreeSet<CellId>,
    computations: std::cell::Cell<u64>,
}

impl Cell {
    /// An empty cell, as created when a position is first written or referenced.
    pub fn new(position: Position) -> Cell {
        Cell {
            position,
            text: String::new(),
            formula: None,
            cache: ValueCache::default(),
            refs_to: BTreeSet::new(),
            refs_from: BTreeSet::new(),
            computations: std::cell::Cell::new(0),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Text exactly as authored.
    pub fn raw_text(&self) -> &str {
        &self.text
    }

    pub fn formula(&self) -> Option<&dyn Formula> {
        self.formula.as_deref()
    }

    /// Editable text: `=` plus the canonical expression for formulas,
    /// otherwise the raw text.
    pub fn text(&self) -> String {
        match &self.formula {
            Some(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
            None => self.text.clone(),
        }
    }

    pub fn value(&self, cells: &dyn CellLookup) -> CellValue {
        self.cache
            .get_or_compute(|| {
                self.computations.set(self.computations.get() + 1);
                tracing::trace!(cell = %self.position, "computing value");
                self.compute(cells)
            })
            .clone()
    }

    fn compute(&self, cells: &dyn CellLookup) -> CellValue {
        if self.text.is_empty() {
            CellValue::empty()
        } else if let Some(rest) = self.text.strip_prefix(ESCAPE_SIGN) {
            CellValue::Text(rest.to_string())
        } else if let Some(formula) = &self.formula {
            formula.evaluate(cells).into()
        } else {
            CellValue::Text(self.text.clone())
        }
    }

    pub fn cache_state(&self) -> CacheState<'_> {
        self.cache.state()
    }

    /// How many times the value was actually computed (cache misses).
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.formula
            .as_ref()
            .map(|f| f.referenced_cells())
            .unwrap_or_default()
    }

    /// No other cell reads this one.
    pub fn is_free(&self) -> bool {
        self.refs_from.is_empty()
    }

    /// Free and without content: the sheet may reclaim it.
    pub fn is_unused(&self) -> bool {
        self.is_free() && self.text.is_empty()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = CellId> + '_ {
        self.refs_to.iter().copied()
    }

    pub fn dependents(&self) -> impl Iterator<Item = CellId> + '_ {
        self.refs_from.iter().copied()
    }

    /// Replace text and formula. Edges and cache are the caller's job.
    pub(crate) fn install(&mut self, text: String, formula: Option<Box<dyn Formula>>) {
        self.text = text;
        self.formula = formula;
    }

    pub(crate) fn invalidate(&mut self) -> bool {
        self.cache.invalidate()
    }

    pub fn handle_inserted_rows(&mut self, before: usize, count: usize) -> ShiftOutcome {
        match &mut self.formula {
            Some(formula) => formula.handle_inserted_rows(before, count),
            None => ShiftOutcome::NothingChanged,
        }
    }

    pub fn handle_inserted_cols(&mut self, before: usize, count: usize) -> ShiftOutcome {
        match &mut self.formula {
            Some(formula) => formula.handle_inserted_cols(before, count),
            None => ShiftOutcome::NothingChanged,
        }
    }

    pub fn handle_deleted_rows(&mut self, first: usize, count: usize) -> ShiftOutcome {
        match &mut self.formula {
            Some(formula) => formula.handle_deleted_rows(first, count),
            None => ShiftOutcome::NothingChanged,
        }
    }

    pub fn handle_deleted_cols(&mut self, first: usize, count: usize) -> ShiftOutcome {
        match &mut self.formula {
            Some(formula) => formula.handle_deleted_cols(first, count),
            None => ShiftOutcome::NothingChanged,
        }
    }
}
