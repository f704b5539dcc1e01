use std::collections::BTreeMap;

use tabula_engine::engine::{
    CellLookup, CellValue, FormulaParser, Position, parse_formula,
};

use crate::config::SheetConfig;
use crate::error::{Result, SheetError};
use crate::graph::{self, CacheState, Cell, CellArena, CellId};

/// A sheet of cells addressed by [`Position`].
///
/// The sheet owns every [`Cell`] through its arena. It creates cells on
/// demand (when a position is written or referenced) and is the only place
/// cells are destroyed, and only once nothing reads them.
///
/// Not internally synchronized: edits need `&mut self`, and reads fill value
/// caches through `&self`, so wrap the whole sheet in one lock if it must be
/// shared across threads.
pub struct Sheet {
    pub(crate) arena: CellArena,
    pub(crate) index: BTreeMap<Position, CellId>,
    pub(crate) config: SheetConfig,
    pub(crate) parser: FormulaParser,
}

impl Sheet {
    pub fn new() -> Self {
        Self::with_config(SheetConfig::default())
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Sheet {
            arena: CellArena::new(),
            index: BTreeMap::new(),
            config: config.clamped(),
            parser: parse_formula,
        }
    }

    /// Use a different formula grammar for subsequent edits.
    pub fn with_parser(mut self, parser: FormulaParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Number of cells held, including empty cells kept alive by references.
    pub fn cell_count(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn check_position(&self, pos: Position) -> Result<()> {
        if self.config.contains(pos) {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition(pos))
        }
    }

    pub(crate) fn id_at(&self, pos: Position) -> Option<CellId> {
        self.index.get(&pos).copied()
    }

    /// Existing cell at `pos`, or a new empty one.
    pub(crate) fn vivify(&mut self, pos: Position) -> CellId {
        if let Some(id) = self.id_at(pos) {
            return id;
        }
        let id = self.arena.insert(Cell::new(pos));
        self.index.insert(pos, id);
        tracing::trace!(cell = %pos, "created cell");
        id
    }

    pub(crate) fn position_of(&self, id: CellId) -> Option<Position> {
        self.arena.get(id).map(Cell::position)
    }

    pub fn cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        self.check_position(pos)?;
        Ok(self.id_at(pos).and_then(|id| {
            let cell = self.arena.get(id)?;
            Some(CellView {
                sheet: self,
                id,
                cell,
            })
        }))
    }

    /// Computed value; positions without a cell read as empty text.
    pub fn value(&self, pos: Position) -> Result<CellValue> {
        Ok(self
            .cell(pos)?
            .map(|cell| cell.value())
            .unwrap_or_else(CellValue::empty))
    }

    pub fn text(&self, pos: Position) -> Result<String> {
        Ok(self.cell(pos)?.map(|cell| cell.text()).unwrap_or_default())
    }

    pub fn referenced_cells(&self, pos: Position) -> Result<Vec<Position>> {
        Ok(self
            .cell(pos)?
            .map(|cell| cell.referenced_cells())
            .unwrap_or_default())
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Formulas read their operands through this. Callers outside evaluation go
/// through [`CellView::value`], which fills stale dependencies first.
impl CellLookup for Sheet {
    fn value_at(&self, pos: Position) -> Option<CellValue> {
        let cell = self.arena.get(self.id_at(pos)?)?;
        Some(cell.value(self))
    }
}

/// Read-only handle to a cell, able to evaluate it against its sheet.
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    id: CellId,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.cell.position()
    }

    pub fn value(&self) -> CellValue {
        if !self.is_cached() {
            graph::fill_stale(&self.sheet.arena, self.id, self.sheet);
        }
        self.cell.value(self.sheet)
    }

    pub fn text(&self) -> String {
        self.cell.text()
    }

    pub fn raw_text(&self) -> &'a str {
        self.cell.raw_text()
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.cell.referenced_cells()
    }

    pub fn is_free(&self) -> bool {
        self.cell.is_free()
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.cell.cache_state(), CacheState::Fresh(_))
    }

    pub fn computations(&self) -> u64 {
        self.cell.computations()
    }

    /// Positions of the cells this cell reads, per the graph edges.
    pub fn dependencies(&self) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .cell
            .dependencies()
            .filter_map(|id| self.sheet.position_of(id))
            .collect();
        out.sort();
        out
    }

    /// Positions of the cells that read this cell.
    pub fn dependents(&self) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .cell
            .dependents()
            .filter_map(|id| self.sheet.position_of(id))
            .collect();
        out.sort();
        out
    }
}
