use std::io::Write;

use serde::{Deserialize, Serialize};
use tabula_engine::engine::Position;

use super::Sheet;
use crate::error::Result;
use crate::graph::Cell;

/// Extent of the area holding non-empty cells, counted from `A1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

impl Sheet {
    /// Smallest `A1`-anchored rectangle containing every cell with text.
    /// Empty cells kept alive only by references do not count.
    pub fn printable_size(&self) -> Size {
        self.index
            .iter()
            .filter(|(_, id)| {
                self.arena
                    .get(**id)
                    .is_some_and(|cell| !cell.raw_text().is_empty())
            })
            .fold(Size::default(), |size, (pos, _)| Size {
                rows: size.rows.max(pos.row + 1),
                cols: size.cols.max(pos.col + 1),
            })
    }

    /// Write computed values of the printable area, tab separated.
    pub fn print_values<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print_with(out, |cell| cell.value(self).to_string())
    }

    /// Write cell texts of the printable area, tab separated.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print_with(out, Cell::text)
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> Result<()>
    where
        W: Write,
        F: Fn(&Cell) -> String,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                let cell = self
                    .id_at(Position::new(row, col))
                    .and_then(|id| self.arena.get(id));
                if let Some(cell) = cell {
                    out.write_all(render(cell).as_bytes())?;
                }
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
