use std::collections::BTreeSet;
use std::time::Instant;

use tabula_engine::engine::{Position, ShiftOperation, ShiftOutcome};

use super::Sheet;
use crate::error::{Result, SheetError};
use crate::graph::{self, Cell, CellId, FORMULA_SIGN};

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// Get the coordinate value from a Position for this dimension
    fn coord(&self, pos: Position) -> usize {
        match self {
            Dimension::Row => pos.row,
            Dimension::Column => pos.col,
        }
    }

    fn limit(&self, sheet: &Sheet) -> usize {
        match self {
            Dimension::Row => sheet.config.max_rows,
            Dimension::Column => sheet.config.max_cols,
        }
    }

    fn insert(&self, before: usize, count: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::InsertRows { before, count },
            Dimension::Column => ShiftOperation::InsertCols { before, count },
        }
    }

    fn delete(&self, first: usize, count: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::DeleteRows { first, count },
            Dimension::Column => ShiftOperation::DeleteCols { first, count },
        }
    }
}

fn forward_shift(cell: &mut Cell, op: ShiftOperation) -> ShiftOutcome {
    match op {
        ShiftOperation::InsertRows { before, count } => cell.handle_inserted_rows(before, count),
        ShiftOperation::InsertCols { before, count } => cell.handle_inserted_cols(before, count),
        ShiftOperation::DeleteRows { first, count } => cell.handle_deleted_rows(first, count),
        ShiftOperation::DeleteCols { first, count } => cell.handle_deleted_cols(first, count),
    }
}

impl Sheet {
    /// Set cell contents from input text.
    ///
    /// - Text starting with `=` (and longer than one character) is a formula
    /// - Text starting with `'` is shown without the mark and never evaluated
    /// - Anything else is a literal
    ///
    /// Fails without changing the sheet if the formula does not parse, reads
    /// a position outside the sheet, or would make a cell depend on itself.
    /// Cells the formula reads are created empty if missing, but only once
    /// the edit is known to succeed.
    pub fn set_cell(&mut self, pos: Position, text: impl Into<String>) -> Result<()> {
        self.check_position(pos)?;
        let text = text.into();
        let started = Instant::now();

        let existing = self.id_at(pos);
        match existing.and_then(|id| self.arena.get(id)) {
            Some(cell) if cell.raw_text() == text => return Ok(()),
            None if text.is_empty() => return Ok(()),
            _ => {}
        }

        let formula = match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => Some((self.parser)(expression)?),
            _ => None,
        };
        let parse_time = started.elapsed();

        let new_refs = formula
            .as_ref()
            .map(|f| f.referenced_cells())
            .unwrap_or_default();
        if let Some(outside) = new_refs.iter().find(|p| !self.config.contains(**p)) {
            return Err(SheetError::InvalidPosition(*outside));
        }

        let old_ids: BTreeSet<CellId> = existing
            .and_then(|id| self.arena.get(id))
            .map(|cell| cell.dependencies().collect())
            .unwrap_or_default();

        // Positions without a cell read nothing, so they cannot lead back here.
        let circular = new_refs.contains(&pos)
            || existing.is_some_and(|id| {
                let added = new_refs
                    .iter()
                    .filter_map(|p| self.id_at(*p))
                    .filter(|target| !old_ids.contains(target));
                graph::would_create_cycle(&self.arena, id, added)
            });
        if circular {
            tracing::debug!(cell = %pos, text = %text, "rejected circular formula");
            return Err(SheetError::CircularDependency { at: pos });
        }
        let check_time = started.elapsed() - parse_time;

        let id = self.vivify(pos);
        let new_ids: BTreeSet<CellId> = new_refs.iter().map(|p| self.vivify(*p)).collect();
        let removed: Vec<CellId> = old_ids.difference(&new_ids).copied().collect();
        for &target in &removed {
            graph::unlink(&mut self.arena, id, target);
        }
        for &target in new_ids.difference(&old_ids) {
            graph::link(&mut self.arena, id, target);
        }
        if let Some(cell) = self.arena.get_mut(id) {
            cell.install(text, formula);
        }

        let invalidate_started = Instant::now();
        let dropped = graph::invalidate(&mut self.arena, id);
        let invalidate_time = invalidate_started.elapsed();

        for target in removed {
            self.reclaim_if_unused(target);
        }
        self.reclaim_if_unused(id);

        tracing::debug!(
            cell = %pos,
            refs = new_ids.len(),
            invalidated = dropped,
            "committed edit"
        );
        let total = started.elapsed();
        if total > self.config.slow_edit_threshold() {
            tracing::warn!(
                cell = %pos,
                total_us = total.as_micros() as u64,
                parse_us = parse_time.as_micros() as u64,
                refs_us = check_time.as_micros() as u64,
                invalidate_us = invalidate_time.as_micros() as u64,
                "slow cell edit"
            );
        }
        Ok(())
    }

    /// Clear the cell at `pos`.
    ///
    /// The cell is removed if nothing reads it; otherwise it stays as an
    /// empty cell so the formulas reading it keep a target.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.set_cell(pos, String::new())
    }

    /// Drop content and outgoing edges so the cell can be destroyed.
    /// Returns the cells it used to read.
    pub(crate) fn prepare_to_delete(&mut self, id: CellId) -> Vec<CellId> {
        let targets = graph::unlink_all(&mut self.arena, id);
        if let Some(cell) = self.arena.get_mut(id) {
            cell.install(String::new(), None);
        }
        graph::invalidate(&mut self.arena, id);
        targets
    }

    fn remove_cell(&mut self, id: CellId) {
        let Some(cell) = self.arena.get(id) else {
            return;
        };
        debug_assert!(cell.is_free(), "removing a cell that is still read");
        let pos = cell.position();
        if self.index.get(&pos) == Some(&id) {
            self.index.remove(&pos);
        }
        self.arena.remove(id);
        tracing::trace!(cell = %pos, "removed cell");
    }

    /// Destroy the cell if it is empty and nothing reads it.
    pub(crate) fn reclaim_if_unused(&mut self, id: CellId) -> bool {
        if !self.arena.get(id).is_some_and(Cell::is_unused) {
            return false;
        }
        self.prepare_to_delete(id);
        self.remove_cell(id);
        true
    }

    /// Move every indexed cell according to `op`. Deleted positions must
    /// already be gone.
    fn relocate(&mut self, op: ShiftOperation) {
        let old_index = std::mem::take(&mut self.index);
        for (pos, id) in old_index {
            let Some(new_pos) = op.map(pos) else {
                continue;
            };
            if new_pos != pos
                && let Some(cell) = self.arena.get_mut(id)
            {
                cell.set_position(new_pos);
            }
            self.index.insert(new_pos, id);
        }
    }

    fn forward_to_formulas(&mut self, op: ShiftOperation) -> usize {
        self.arena
            .iter_mut()
            .map(|(_, cell)| forward_shift(cell, op))
            .filter(|outcome| *outcome != ShiftOutcome::NothingChanged)
            .count()
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, before: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        // Every referenced position holds a cell, so checking cells covers references too.
        let limit = dim.limit(self);
        let too_big = self.index.keys().any(|pos| {
            let coord = dim.coord(*pos);
            coord >= before && coord.checked_add(count).is_none_or(|moved| moved >= limit)
        });
        if too_big {
            return Err(SheetError::TableTooBig);
        }

        let op = dim.insert(before, count);
        self.relocate(op);
        let changed = self.forward_to_formulas(op);
        tracing::debug!(?dim, before, count, formulas = changed, "inserted");
        Ok(())
    }

    /// Generic delete operation for row or column
    fn delete_dimension(&mut self, dim: Dimension, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        let op = dim.delete(first, count);
        let doomed: Vec<CellId> = self
            .index
            .iter()
            .filter(|(pos, _)| op.map(**pos).is_none())
            .map(|(_, id)| *id)
            .collect();

        // Readers of deleted cells lose the edge; their formulas turn the
        // reference into #REF! below.
        let mut invalidated = 0;
        for &id in &doomed {
            let readers: Vec<CellId> = self
                .arena
                .get(id)
                .map(|cell| cell.dependents().collect())
                .unwrap_or_default();
            for reader in readers {
                graph::unlink(&mut self.arena, reader, id);
                invalidated += graph::invalidate(&mut self.arena, reader);
            }
        }

        let mut orphans = Vec::new();
        for &id in &doomed {
            orphans.extend(self.prepare_to_delete(id));
            self.remove_cell(id);
        }

        self.relocate(op);
        let changed = self.forward_to_formulas(op);

        for id in orphans {
            self.reclaim_if_unused(id);
        }
        tracing::debug!(
            ?dim,
            first,
            count,
            removed = doomed.len(),
            formulas = changed,
            invalidated,
            "deleted"
        );
    }

    /// Insert `count` rows above row `before`.
    pub fn insert_rows(&mut self, before: usize, count: usize) -> Result<()> {
        self.insert_dimension(Dimension::Row, before, count)
    }

    /// Insert `count` columns left of column `before`.
    pub fn insert_cols(&mut self, before: usize, count: usize) -> Result<()> {
        self.insert_dimension(Dimension::Column, before, count)
    }

    /// Delete rows `first..first + count`.
    pub fn delete_rows(&mut self, first: usize, count: usize) {
        self.delete_dimension(Dimension::Row, first, count);
    }

    /// Delete columns `first..first + count`.
    pub fn delete_cols(&mut self, first: usize, count: usize) {
        self.delete_dimension(Dimension::Column, first, count);
    }
}
