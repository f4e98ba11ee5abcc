use std::io::Write;

use crate::simulation::Grid;

/// Output sink the engine notifies after every mutation.
///
/// Both calls receive the complete grid, never a delta.
pub trait Renderer {
    /// Called once, right after the engine builds its first grid
    fn setup(&mut self, grid: &Grid);

    /// Called after every mutating engine operation
    fn render_cells(&mut self, grid: &Grid);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn setup(&mut self, grid: &Grid) {
        (**self).setup(grid);
    }

    fn render_cells(&mut self, grid: &Grid) {
        (**self).render_cells(grid);
    }
}

/// Prints each frame as text: `#` for alive, `.` for dead
pub struct ConsoleRenderer<W: Write> {
    out: W,
    frame: u64,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frame: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, grid: &Grid) -> std::io::Result<()> {
        writeln!(
            self.out,
            "frame {} ({} alive)",
            self.frame,
            grid.alive_count()
        )?;

        let mut line = String::with_capacity(grid.width());
        for cell in grid.cells() {
            line.push(if cell.is_alive() { '#' } else { '.' });
            if line.len() == grid.width() {
                writeln!(self.out, "{}", line)?;
                line.clear();
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn draw(&mut self, grid: &Grid) {
        // Output errors (e.g. closed pipe) must not stop the simulation
        if let Err(e) = self.write_frame(grid) {
            log::warn!("Console render failed: {}", e);
        }
        self.frame += 1;
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn setup(&mut self, grid: &Grid) {
        log::debug!("Console renderer for {}x{} grid", grid.width(), grid.height());
    }

    fn render_cells(&mut self, grid: &Grid) {
        self.draw(grid);
    }
}
