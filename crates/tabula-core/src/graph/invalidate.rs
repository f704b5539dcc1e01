//! Transitive cache invalidation.

use std::collections::VecDeque;

use super::arena::{CellArena, CellId};

/// Mark `start` and every cell that transitively reads it as stale.
///
/// Walks `refs_from` breadth-first. Past the start cell, a branch is pruned
/// as soon as it reaches a cell that is already stale: a stale cell's
/// dependents cannot hold a value computed after it went stale. This also
/// bounds the work on diamond-shaped graphs.
///
/// Returns the number of values dropped.
pub fn invalidate(arena: &mut CellArena, start: CellId) -> usize {
    let mut dropped = 0;
    let mut queue = VecDeque::new();

    match arena.get_mut(start) {
        Some(cell) => {
            if cell.invalidate() {
                dropped += 1;
            }
        }
        None => return 0,
    }
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let dependents: Vec<CellId> = match arena.get(current) {
            Some(cell) => cell.dependents().collect(),
            None => continue,
        };
        for dep in dependents {
            if let Some(cell) = arena.get_mut(dep)
                && cell.invalidate()
            {
                dropped += 1;
                queue.push_back(dep);
            }
        }
    }

    dropped
}
