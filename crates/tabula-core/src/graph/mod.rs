//! Cell graph: storage, edges, cycle detection, and cache invalidation.
//!
//! - [`CellArena`], [`CellId`] - Slot storage; cells name each other by id
//! - [`Cell`] - Text, formula, cached value, and edge sets of one cell
//! - [`link`], [`unlink`] - The only edge mutators
//! - [`would_create_cycle`] - Reachability check run before an edit commits
//! - [`invalidate`] - Transitive cache invalidation over dependents
//! - [`fill_stale`] - Iterative bottom-up evaluation of stale dependencies
//!
//! # Edge direction
//!
//! ```text
//! A.refs_to ∋ B   ⇔   B.refs_from ∋ A   ⇔   "A's formula reads B"
//! ```

mod arena;
mod cache;
mod cell;
mod cycle;
mod evaluate;
mod invalidate;

pub use arena::{CellArena, CellId};
pub use cache::{CacheState, ValueCache};
pub use cell::{Cell, ESCAPE_SIGN, FORMULA_SIGN};
pub use cycle::would_create_cycle;
pub use evaluate::fill_stale;
pub use invalidate::invalidate;

/// Record that `from` reads `to`, on both sides.
///
/// Returns false if either cell is missing or the edge already existed.
pub fn link(arena: &mut CellArena, from: CellId, to: CellId) -> bool {
    if !arena.contains(from) || !arena.contains(to) {
        return false;
    }
    let inserted = arena
        .get_mut(from)
        .is_some_and(|cell| cell.refs_to.insert(to));
    if let Some(cell) = arena.get_mut(to) {
        cell.refs_from.insert(from);
    }
    inserted
}

/// Remove the edge `from -> to` from both sides.
///
/// Returns false if the edge did not exist.
pub fn unlink(arena: &mut CellArena, from: CellId, to: CellId) -> bool {
    let removed = arena
        .get_mut(from)
        .is_some_and(|cell| cell.refs_to.remove(&to));
    if let Some(cell) = arena.get_mut(to) {
        cell.refs_from.remove(&from);
    }
    removed
}

/// Remove every outgoing edge of `id`. Returns the former dependencies.
pub fn unlink_all(arena: &mut CellArena, id: CellId) -> Vec<CellId> {
    let targets: Vec<CellId> = match arena.get(id) {
        Some(cell) => cell.dependencies().collect(),
        None => return Vec::new(),
    };
    for &target in &targets {
        unlink(arena, id, target);
    }
    targets
}
