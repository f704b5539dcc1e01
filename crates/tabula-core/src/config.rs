//! Sheet configuration.
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! max_rows = 1000
//! max_cols = 26
//! slow_edit_threshold_ms = 20
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use tabula_engine::engine::{MAX_COLS, MAX_ROWS, Position};

use crate::error::Result;

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;
const DEFAULT_SLOW_EDIT_THRESHOLD_MS: u64 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Addressable rows; clamped to the engine maximum.
    pub max_rows: usize,
    /// Addressable columns; clamped to the engine maximum.
    pub max_cols: usize,
    /// Edits slower than this are logged at warn level.
    pub slow_edit_threshold_ms: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
            slow_edit_threshold_ms: DEFAULT_SLOW_EDIT_THRESHOLD_MS,
        }
    }
}

impl SheetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SheetConfig = toml::from_str(content)?;
        Ok(config.clamped())
    }

    /// Read a config file. Oversized files are rejected before parsing.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "refusing to read {}: file too large ({} bytes, max {})",
                    path.display(),
                    meta.len(),
                    MAX_CONFIG_FILE_BYTES
                ),
            )
            .into());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub(crate) fn clamped(mut self) -> Self {
        self.max_rows = self.max_rows.min(MAX_ROWS);
        self.max_cols = self.max_cols.min(MAX_COLS);
        self
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.max_rows && pos.col < self.max_cols
    }

    pub fn slow_edit_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_edit_threshold_ms)
    }
}
