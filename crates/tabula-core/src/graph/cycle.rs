//! Circular dependency detection for formula edits.
//!
//! When a formula is entered, we must verify it doesn't create a cycle
//! (e.g., A1 reads B1, B1 reads C1, C1 reads A1). The check runs before any
//! edge is changed: starting from the cells the edit would newly read, it
//! walks existing dependency edges breadth-first. Reaching the edited cell
//! means the new edge would close a cycle.

use std::collections::{HashSet, VecDeque};

use super::arena::{CellArena, CellId};

/// True if making `cell` read every cell in `added` would form a cycle.
pub fn would_create_cycle<I>(arena: &CellArena, cell: CellId, added: I) -> bool
where
    I: IntoIterator<Item = CellId>,
{
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    for id in added {
        if visited.insert(id) {
            queue.push_back(id);
        }
    }

    while let Some(current) = queue.pop_front() {
        if current == cell {
            return true;
        }
        let Some(entry) = arena.get(current) else {
            continue;
        };
        for dep in entry.dependencies() {
            if visited.insert(dep) {
                queue.push_back(dep);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::super::link;
    use super::super::tests::arena_with;
    use super::*;

    #[test]
    fn test_self_reference() {
        let (arena, ids) = arena_with(1);
        assert!(would_create_cycle(&arena, ids[0], [ids[0]]));
    }

    #[test]
    fn test_direct_back_edge() {
        // 0 reads 1; making 1 read 0 closes the loop.
        let (mut arena, ids) = arena_with(2);
        link(&mut arena, ids[0], ids[1]);
        assert!(would_create_cycle(&arena, ids[1], [ids[0]]));
        assert!(!would_create_cycle(&arena, ids[0], [ids[1]]));
    }

    #[test]
    fn test_long_chain() {
        let (mut arena, ids) = arena_with(5);
        for pair in ids.windows(2) {
            link(&mut arena, pair[0], pair[1]);
        }
        assert!(would_create_cycle(&arena, ids[4], [ids[0]]));
        assert!(would_create_cycle(&arena, ids[4], [ids[2]]));
        assert!(!would_create_cycle(&arena, ids[0], [ids[4]]));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // 0 -> {1, 2} -> 3
        let (mut arena, ids) = arena_with(5);
        link(&mut arena, ids[0], ids[1]);
        link(&mut arena, ids[0], ids[2]);
        link(&mut arena, ids[1], ids[3]);
        link(&mut arena, ids[2], ids[3]);
        assert!(!would_create_cycle(&arena, ids[4], [ids[0], ids[3]]));
        assert!(would_create_cycle(&arena, ids[3], [ids[4], ids[0]]));
    }

    #[test]
    fn test_empty_addition() {
        let (arena, ids) = arena_with(1);
        assert!(!would_create_cycle(&arena, ids[0], []));
    }
}
