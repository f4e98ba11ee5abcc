//! Error types for the grid, snapshots and the GPU shell

use thiserror::Error;

/// Grid and engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {width}x{height}: must be non-zero and fit in memory")]
    InvalidDimension { width: usize, height: usize },

    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("snapshot is {found:?} but the engine grid is {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("cell ({x}, {y}) appears more than once")]
    DuplicateCell { x: usize, y: usize },

    #[error("cell ({x}, {y}) is missing")]
    MissingCell { x: usize, y: usize },
}

/// Snapshot save/load errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// GPU initialization errors
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("a {width}x{height} grid exceeds the GPU storage buffer limit of {limit} bytes")]
    GridTooLarge {
        width: usize,
        height: usize,
        limit: u64,
    },
}
