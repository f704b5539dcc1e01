//! Slot storage for cells.
//!
//! Cells refer to each other by [`CellId`] instead of by reference. An id
//! carries the generation of its slot, so an id kept after its cell was
//! removed never resolves to a newer cell that reused the slot.

use super::cell::Cell;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

#[derive(Debug, Default)]
pub struct CellArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl CellArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, cell: Cell) -> CellId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.cell = Some(cell);
            return CellId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        CellId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_mut())
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.get(id).is_some()
    }

    /// The single removal path. Callers must have detached the cell from the graph.
    pub(crate) fn remove(&mut self, id: CellId) -> Option<Cell> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let cell = slot.cell.take()?;
        self.free.push(id.index);
        self.len -= 1;
        Some(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.cell.as_ref().map(|cell| {
                (
                    CellId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    cell,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CellId, &mut Cell)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.cell.as_mut().map(|cell| {
                (
                    CellId {
                        index: index as u32,
                        generation,
                    },
                    cell,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_engine::engine::Position;

    #[test]
    fn test_insert_get_remove() {
        let mut arena = CellArena::new();
        let a = arena.insert(Cell::new(Position::new(0, 0)));
        let b = arena.insert(Cell::new(Position::new(0, 1)));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).unwrap().position(), Position::new(0, 1));

        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_reused_slot_does_not_alias_stale_id() {
        let mut arena = CellArena::new();
        let old = arena.insert(Cell::new(Position::new(0, 0)));
        arena.remove(old);
        let new = arena.insert(Cell::new(Position::new(5, 5)));
        assert_ne!(old, new);
        assert!(!arena.contains(old));
        assert_eq!(arena.get(new).unwrap().position(), Position::new(5, 5));
    }

    #[test]
    fn test_iter_skips_vacant_slots() {
        let mut arena = CellArena::new();
        let ids: Vec<CellId> = (0..3)
            .map(|i| arena.insert(Cell::new(Position::new(i, 0))))
            .collect();
        arena.remove(ids[1]);
        let rows: Vec<usize> = arena.iter().map(|(_, c)| c.position().row).collect();
        assert_eq!(rows, vec![0, 2]);
        assert!(arena.iter_mut().all(|(id, _)| id != ids[1]));
    }
}
