mod cell;
mod engine;
mod grid;

pub use cell::{Cell, CellState, GpuCell, Position};
pub use engine::{next_state, Engine};
pub use grid::Grid;
