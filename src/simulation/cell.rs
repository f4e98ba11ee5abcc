use serde::{Deserialize, Serialize};

/// Grid coordinates. `x` grows to the right, `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Alive,
    #[default]
    Dead,
}

impl CellState {
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }

    /// Alive <-> Dead
    pub fn toggled(self) -> Self {
        match self {
            CellState::Alive => CellState::Dead,
            CellState::Dead => CellState::Alive,
        }
    }
}

/// A single grid cell. The position is fixed at construction; only the state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    position: Position,
    pub state: CellState,
}

impl Cell {
    /// Create a dead cell at the given position
    pub fn new(position: Position) -> Self {
        Self {
            position,
            state: CellState::Dead,
        }
    }

    pub fn with_state(position: Position, state: CellState) -> Self {
        Self { position, state }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }
}

/// GPU-compatible cell: one `u32` per cell, 1 = alive, 0 = dead.
///
/// Layout must match `array<u32>` in `shaders/render.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuCell {
    pub state: u32,
}

impl From<CellState> for GpuCell {
    fn from(state: CellState) -> Self {
        Self {
            state: state.is_alive() as u32,
        }
    }
}
