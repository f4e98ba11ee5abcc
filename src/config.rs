/// Default grid dimensions (16:9, 2304 cells)
pub const GRID_WIDTH: usize = 64;
pub const GRID_HEIGHT: usize = 36;

/// Timer interval between generations while running
pub const TICK_INTERVAL_MS: u64 = 100;

/// Initial on-screen size of one cell in logical pixels
pub const CELL_SIZE_PX: u32 = 16;

/// Where S/L save and load when no path is given
pub const DEFAULT_SNAPSHOT_PATH: &str = "life.json";

// ============================================
// Colors (linear RGBA)
// ============================================

pub const ALIVE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const DEAD_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Grid line color, drawn only in edit mode
pub const GRID_LINE_COLOR: [f32; 4] = [0.25, 0.25, 0.3, 1.0];

/// Grid line thickness as a fraction of a cell
pub const GRID_LINE_WIDTH: f32 = 0.06;
