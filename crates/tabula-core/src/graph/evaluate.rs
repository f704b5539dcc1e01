//! Bottom-up filling of stale value caches.

use std::collections::HashSet;

use tabula_engine::engine::CellLookup;

use super::arena::{CellArena, CellId};
use super::cache::CacheState;

/// Compute every stale cell that `start` transitively reads, dependencies
/// before dependents.
///
/// Walks `refs_to` depth-first with an explicit stack and stops at fresh
/// cells. Afterwards evaluating `start` only ever reads filled caches, so
/// the depth of a dependency chain never turns into call-stack depth.
///
/// `start` itself is left for the caller. Returns the number of cells
/// computed.
pub fn fill_stale(arena: &CellArena, start: CellId, cells: &dyn CellLookup) -> usize {
    let mut computed = 0;
    let mut seen = HashSet::new();
    let mut stack = vec![(start, false)];

    while let Some((id, expanded)) = stack.pop() {
        let Some(cell) = arena.get(id) else {
            continue;
        };
        if expanded {
            if id != start {
                cell.value(cells);
                computed += 1;
            }
            continue;
        }
        if matches!(cell.cache_state(), CacheState::Fresh(_)) || !seen.insert(id) {
            continue;
        }
        stack.push((id, true));
        stack.extend(
            cell.dependencies()
                .filter(|dep| !seen.contains(dep))
                .map(|dep| (dep, false)),
        );
    }
    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{arena_with, assert_edges_consistent};
    use crate::graph::link;
    use tabula_engine::engine::{CellValue, Position};

    struct NoCells;

    impl CellLookup for NoCells {
        fn value_at(&self, _pos: Position) -> Option<CellValue> {
            None
        }
    }

    fn is_fresh(arena: &CellArena, id: CellId) -> bool {
        matches!(arena.get(id).unwrap().cache_state(), CacheState::Fresh(_))
    }

    #[test]
    fn test_fills_chain_below_start_only() {
        let (mut arena, ids) = arena_with(4);
        for pair in ids.windows(2) {
            link(&mut arena, pair[1], pair[0]);
        }
        assert_edges_consistent(&arena);

        assert_eq!(fill_stale(&arena, ids[3], &NoCells), 3);
        assert!(ids[..3].iter().all(|id| is_fresh(&arena, *id)));
        assert!(!is_fresh(&arena, ids[3]));
    }

    #[test]
    fn test_diamond_computes_shared_dependency_once() {
        let (mut arena, ids) = arena_with(4);
        link(&mut arena, ids[1], ids[0]);
        link(&mut arena, ids[2], ids[0]);
        link(&mut arena, ids[3], ids[1]);
        link(&mut arena, ids[3], ids[2]);

        assert_eq!(fill_stale(&arena, ids[3], &NoCells), 3);
        assert_eq!(arena.get(ids[0]).unwrap().computations(), 1);
    }

    #[test]
    fn test_stops_at_fresh_cells() {
        let (mut arena, ids) = arena_with(3);
        link(&mut arena, ids[1], ids[0]);
        link(&mut arena, ids[2], ids[1]);
        arena.get(ids[1]).unwrap().value(&NoCells);

        assert_eq!(fill_stale(&arena, ids[2], &NoCells), 0);
        assert!(!is_fresh(&arena, ids[0]));
    }
}
