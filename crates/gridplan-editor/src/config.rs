//! Editor configuration, read from TOML.
//!
//! Every field has a default, so an empty file is a valid config.

use std::path::Path;

use gridplan_core::geometry::GridSize;
use gridplan_power::PowerRules;
use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Bounds and default size of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub default_cols: u32,
    pub default_rows: u32,
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_cols: 70,
            default_rows: 70,
            min_size: 10,
            max_size: 200,
        }
    }
}

impl GridConfig {
    /// Clamp each dimension to `[min_size, max_size]`.
    pub fn clamp(&self, cols: u32, rows: u32) -> GridSize {
        GridSize::new(
            cols.clamp(self.min_size, self.max_size),
            rows.clamp(self.min_size, self.max_size),
        )
    }

    pub fn default_size(&self) -> GridSize {
        self.clamp(self.default_cols, self.default_rows)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub power: PowerRules,
}

impl EditorConfig {
    /// Parse a config from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, EditorError> {
        let config: EditorConfig = toml::from_str(content).map_err(|e| EditorError::Parse {
            file: origin.to_path_buf(),
            detail: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    fn validate(&self, origin: &Path) -> Result<(), EditorError> {
        let grid = &self.grid;
        if grid.min_size == 0 || grid.min_size > grid.max_size {
            return Err(EditorError::Config {
                file: origin.to_path_buf(),
                detail: format!(
                    "grid size bounds [{}, {}] are empty",
                    grid.min_size, grid.max_size
                ),
            });
        }
        Ok(())
    }
}
