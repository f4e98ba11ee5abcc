//! JSON save/load of grid snapshots.
//!
//! The document stores every cell with its position and state, as columns:
//! `cells[x][y]` is the cell at (x, y).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::simulation::{Cell, Grid, Position};

/// On-disk form of a grid
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl SavedSnapshot {
    pub fn from_grid(grid: &Grid) -> Self {
        let (width, height) = grid.dimensions();
        let mut cells: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(height)).collect();

        // Row-major iteration fills each column top to bottom
        for cell in grid.cells() {
            cells[cell.position().x].push(*cell);
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Validate the document and build a grid from it
    pub fn into_grid(self) -> Result<Grid, SnapshotError> {
        if self.cells.len() != self.width {
            return Err(SnapshotError::Malformed(format!(
                "expected {} columns, found {}",
                self.width,
                self.cells.len()
            )));
        }

        for (x, column) in self.cells.iter().enumerate() {
            if column.len() != self.height {
                return Err(SnapshotError::Malformed(format!(
                    "column {} has {} cells, expected {}",
                    x,
                    column.len(),
                    self.height
                )));
            }

            for (y, cell) in column.iter().enumerate() {
                if cell.position() != Position::new(x, y) {
                    return Err(SnapshotError::Malformed(format!(
                        "cell stored at ({}, {}) claims position ({}, {})",
                        x,
                        y,
                        cell.position().x,
                        cell.position().y
                    )));
                }
            }
        }

        let grid = Grid::from_cells(self.width, self.height, self.cells.into_iter().flatten())?;
        Ok(grid)
    }
}

pub fn to_json(grid: &Grid) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(&SavedSnapshot::from_grid(grid))?)
}

pub fn from_json(json: &str) -> Result<Grid, SnapshotError> {
    let snapshot: SavedSnapshot = serde_json::from_str(json)?;
    snapshot.into_grid()
}

/// Write `grid` to `path` as JSON
pub fn save(path: &Path, grid: &Grid) -> Result<(), SnapshotError> {
    fs::write(path, to_json(grid)?)?;
    log::info!(
        "Saved {}x{} snapshot to {}",
        grid.width(),
        grid.height(),
        path.display()
    );
    Ok(())
}

/// Read a grid from a JSON file written by [`save`]
pub fn load(path: &Path) -> Result<Grid, SnapshotError> {
    let json = fs::read_to_string(path)?;
    let grid = from_json(&json)?;
    log::info!(
        "Loaded {}x{} snapshot from {}",
        grid.width(),
        grid.height(),
        path.display()
    );
    Ok(grid)
}
