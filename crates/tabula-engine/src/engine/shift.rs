//! Reference shifting for structural edits.
//!
//! When rows or columns are inserted or deleted, every position at or after
//! the affected index moves. The same rules apply to stored cells and to the
//! references held by formulas:
//!
//! - Insert at `before`: indices `>= before` move forward by `count`
//! - Delete `[first, first + count)`: indices inside the range are gone,
//!   indices after it move back by `count`

use super::position::Position;

/// A structural edit of the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOperation {
    InsertRows { before: usize, count: usize },
    InsertCols { before: usize, count: usize },
    DeleteRows { first: usize, count: usize },
    DeleteCols { first: usize, count: usize },
}

/// Where a position ends up after a [`ShiftOperation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shifted {
    Unchanged,
    Moved(Position),
    Deleted,
}

/// What a structural edit did to a formula.
///
/// Ordered by severity so outcomes of several references can be combined
/// with `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShiftOutcome {
    /// No reference was affected.
    NothingChanged,
    /// Some references point to new positions; the cells they name are the same.
    ReferencesRenamedOnly,
    /// Some references were invalidated by a deletion.
    ReferencesChanged,
}

impl ShiftOperation {
    pub fn apply(&self, pos: Position) -> Shifted {
        match *self {
            ShiftOperation::InsertRows { before, count } => {
                if count > 0 && pos.row >= before {
                    Shifted::Moved(Position::new(pos.row + count, pos.col))
                } else {
                    Shifted::Unchanged
                }
            }
            ShiftOperation::InsertCols { before, count } => {
                if count > 0 && pos.col >= before {
                    Shifted::Moved(Position::new(pos.row, pos.col + count))
                } else {
                    Shifted::Unchanged
                }
            }
            ShiftOperation::DeleteRows { first, count } => match shrink(pos.row, first, count) {
                Some(row) if row == pos.row => Shifted::Unchanged,
                Some(row) => Shifted::Moved(Position::new(row, pos.col)),
                None => Shifted::Deleted,
            },
            ShiftOperation::DeleteCols { first, count } => match shrink(pos.col, first, count) {
                Some(col) if col == pos.col => Shifted::Unchanged,
                Some(col) => Shifted::Moved(Position::new(pos.row, col)),
                None => Shifted::Deleted,
            },
        }
    }

    /// Resulting position, or None if the position was deleted.
    pub fn map(&self, pos: Position) -> Option<Position> {
        match self.apply(pos) {
            Shifted::Unchanged => Some(pos),
            Shifted::Moved(moved) => Some(moved),
            Shifted::Deleted => None,
        }
    }
}

fn shrink(index: usize, first: usize, count: usize) -> Option<usize> {
    if index < first {
        Some(index)
    } else if index - first < count {
        None
    } else {
        Some(index - count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rows_moves_at_and_after() {
        let op = ShiftOperation::InsertRows { before: 2, count: 3 };
        assert_eq!(op.apply(Position::new(1, 0)), Shifted::Unchanged);
        assert_eq!(op.apply(Position::new(2, 4)), Shifted::Moved(Position::new(5, 4)));
    }

    #[test]
    fn test_insert_cols_zero_count_is_noop() {
        let op = ShiftOperation::InsertCols { before: 0, count: 0 };
        assert_eq!(op.apply(Position::new(3, 3)), Shifted::Unchanged);
    }

    #[test]
    fn test_delete_rows_range() {
        let op = ShiftOperation::DeleteRows { first: 2, count: 2 };
        assert_eq!(op.apply(Position::new(1, 0)), Shifted::Unchanged);
        assert_eq!(op.apply(Position::new(2, 0)), Shifted::Deleted);
        assert_eq!(op.apply(Position::new(3, 0)), Shifted::Deleted);
        assert_eq!(op.apply(Position::new(4, 7)), Shifted::Moved(Position::new(2, 7)));
    }

    #[test]
    fn test_delete_cols_map() {
        let op = ShiftOperation::DeleteCols { first: 0, count: 1 };
        assert_eq!(op.map(Position::new(0, 0)), None);
        assert_eq!(op.map(Position::new(0, 1)), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_outcome_ordering() {
        assert!(ShiftOutcome::NothingChanged < ShiftOutcome::ReferencesRenamedOnly);
        assert!(ShiftOutcome::ReferencesRenamedOnly < ShiftOutcome::ReferencesChanged);
    }
}
