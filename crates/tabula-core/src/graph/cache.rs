//! Two-state cache for computed cell values.

use std::cell::OnceCell;

use tabula_engine::engine::CellValue;

/// Observable state of a [`ValueCache`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CacheState<'a> {
    Fresh(&'a CellValue),
    Stale,
}

/// Memoized cell value.
///
/// Filling happens through a shared reference (reads are pull-based);
/// invalidation needs `&mut`, so it can only happen while the sheet is
/// being edited.
#[derive(Debug, Default)]
pub struct ValueCache {
    slot: OnceCell<CellValue>,
}

impl ValueCache {
    pub fn state(&self) -> CacheState<'_> {
        match self.slot.get() {
            Some(value) => CacheState::Fresh(value),
            None => CacheState::Stale,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Return the cached value, computing and storing it first if stale.
    pub fn get_or_compute<F>(&self, compute: F) -> &CellValue
    where
        F: FnOnce() -> CellValue,
    {
        self.slot.get_or_init(compute)
    }

    /// Mark stale. Returns true if a value was dropped.
    pub fn invalidate(&mut self) -> bool {
        self.slot.take().is_some()
    }
}
