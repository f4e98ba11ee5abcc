use std::sync::Arc;
use wgpu::{Buffer, BufferUsages, Device, Queue};
use winit::window::Window;

use crate::config::{ALIVE_COLOR, DEAD_COLOR, GRID_LINE_COLOR, GRID_LINE_WIDTH};
use crate::error::GpuError;
use crate::render::Renderer;
use crate::simulation::{GpuCell, Grid};

/// Render parameters passed to the render shader (64 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    // Grid info (16 bytes)
    pub grid_width: u32,
    pub grid_height: u32,
    pub editing: u32, // 0 = off, 1 = draw grid lines
    pub line_width: f32,

    // Colors (48 bytes)
    pub alive_color: [f32; 4],
    pub dead_color: [f32; 4],
    pub line_color: [f32; 4],
}

/// Cell storage and parameter buffers for drawing the grid.
///
/// This is the engine's renderer in windowed mode: every engine mutation
/// uploads the full grid and asks the window for a redraw.
pub struct GridBuffers {
    /// One `GpuCell` per grid cell, row-major
    pub cells_buffer: Buffer,
    /// Uniform buffer for render parameters
    pub render_params_buffer: Buffer,
    queue: Arc<Queue>,
    window: Arc<Window>,
    editing: bool,
    /// Grid dimensions the cell buffer was sized for
    pub width: usize,
    pub height: usize,
}

impl GridBuffers {
    /// Create buffers sized for a `width` x `height` grid.
    ///
    /// Fails if the cell buffer would not fit the device's storage binding limit.
    pub fn new(
        device: &Device,
        queue: Arc<Queue>,
        window: Arc<Window>,
        width: usize,
        height: usize,
    ) -> Result<Self, GpuError> {
        let limits = device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        let buffer_size = cells_buffer_size(width, height)
            .filter(|&size| size <= limit)
            .ok_or(GpuError::GridTooLarge {
                width,
                height,
                limit,
            })?;

        let cells_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grid-cells-buffer"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render-params-buffer"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            cells_buffer,
            render_params_buffer,
            queue,
            window,
            editing: false,
            width,
            height,
        })
    }

    /// Show or hide grid lines
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
        self.update_render_params();
        self.window.request_redraw();
    }

    fn update_render_params(&self) {
        let params = RenderParams {
            grid_width: self.width as u32,
            grid_height: self.height as u32,
            editing: self.editing as u32,
            line_width: GRID_LINE_WIDTH,
            alive_color: ALIVE_COLOR,
            dead_color: DEAD_COLOR,
            line_color: GRID_LINE_COLOR,
        };
        self.queue
            .write_buffer(&self.render_params_buffer, 0, bytemuck::bytes_of(&params));
    }

    fn upload_cells(&self, grid: &Grid) {
        if grid.dimensions() != (self.width, self.height) {
            log::error!(
                "Grid is {}x{} but cell buffer holds {}x{}, skipping upload",
                grid.width(),
                grid.height(),
                self.width,
                self.height
            );
            return;
        }

        let cells = grid.to_gpu_cells();
        self.queue
            .write_buffer(&self.cells_buffer, 0, bytemuck::cast_slice(&cells));
    }
}

/// Bytes needed to hold one `GpuCell` per cell, or `None` on overflow
fn cells_buffer_size(width: usize, height: usize) -> Option<u64> {
    let cells = u64::try_from(width)
        .ok()?
        .checked_mul(u64::try_from(height).ok()?)?;
    cells.checked_mul(std::mem::size_of::<GpuCell>() as u64)
}

impl Renderer for GridBuffers {
    fn setup(&mut self, grid: &Grid) {
        log::info!("Cell buffer ready for {}x{} grid", grid.width(), grid.height());
        self.update_render_params();
        self.upload_cells(grid);
    }

    fn render_cells(&mut self, grid: &Grid) {
        self.upload_cells(grid);
        self.window.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_params_size() {
        // Must match the WGSL RenderParams struct
        assert_eq!(std::mem::size_of::<RenderParams>(), 64);
    }

    #[test]
    fn test_cells_buffer_size() {
        assert_eq!(cells_buffer_size(64, 36), Some(64 * 36 * 4));
        assert_eq!(cells_buffer_size(usize::MAX, 2), None);
        assert_eq!(cells_buffer_size(1 << 31, 1 << 31), None);
    }
}
