use crate::error::GridError;
use crate::simulation::cell::{Cell, CellState, GpuCell, Position};

/// Fixed-size grid of cells, stored row-major (`y * width + x`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new grid with every cell dead.
    ///
    /// Rejects zero dimensions and sizes whose cell storage cannot be addressed.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let addressable = width
            .checked_mul(height)
            .and_then(|count| count.checked_mul(std::mem::size_of::<Cell>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);

        if width == 0 || height == 0 || !addressable {
            return Err(GridError::InvalidDimension { width, height });
        }

        Ok(Self::dead(width, height))
    }

    fn dead(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Position::new(x, y)));
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// A new all-dead grid with the same dimensions
    pub fn empty_like(&self) -> Self {
        Self::dead(self.width, self.height)
    }

    /// Build a grid from cells in any order.
    ///
    /// Every position in the grid must appear exactly once.
    pub fn from_cells<I>(width: usize, height: usize, cells: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut grid = Self::new(width, height)?;
        let mut seen = vec![false; width * height];

        for cell in cells {
            let Position { x, y } = cell.position();
            let index = grid.index(x, y)?;
            if seen[index] {
                return Err(GridError::DuplicateCell { x, y });
            }
            seen[index] = true;
            grid.cells[index].state = cell.state;
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(GridError::MissingCell {
                x: missing % width,
                y: missing / width,
            });
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if self.contains(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(GridError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Result<CellState, GridError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index].state)
    }

    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> Result<(), GridError> {
        let index = self.index(x, y)?;
        self.cells[index].state = state;
        Ok(())
    }

    /// All cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Write a batch of precomputed states. Positions come from this grid's own cells.
    pub(crate) fn apply_changes(&mut self, changes: &[(Position, CellState)]) {
        for &(Position { x, y }, state) in changes {
            debug_assert!(self.contains(x, y));
            self.cells[y * self.width + x].state = state;
        }
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Count alive cells in the Moore neighborhood of (x, y).
    ///
    /// Neighbors outside the grid are skipped; there is no wraparound.
    pub fn alive_neighbors(&self, x: usize, y: usize) -> usize {
        let mut count = 0;

        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };

                if self.contains(nx, ny) && self.cells[ny * self.width + nx].is_alive() {
                    count += 1;
                }
            }
        }

        count
    }

    /// Cell states in the layout the render shader reads
    pub fn to_gpu_cells(&self) -> Vec<GpuCell> {
        self.cells.iter().map(|c| GpuCell::from(c.state)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(grid: &mut Grid) {
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                grid.set(x, y, CellState::Alive).unwrap();
            }
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(100, 50).unwrap();
        assert_eq!(grid.cells().count(), 5000);
        assert_eq!(grid.dimensions(), (100, 50));
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(GridError::InvalidDimension { width: 0, height: 5 })
        );
        assert_eq!(
            Grid::new(5, 0),
            Err(GridError::InvalidDimension { width: 5, height: 0 })
        );
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        assert_eq!(
            Grid::new(usize::MAX, 2),
            Err(GridError::InvalidDimension { width: usize::MAX, height: 2 })
        );
        // Cell count fits in usize but the cell storage would not
        assert_eq!(
            Grid::new(usize::MAX / 4, 4),
            Err(GridError::InvalidDimension { width: usize::MAX / 4, height: 4 })
        );
    }

    #[test]
    fn test_one_cell_per_position() {
        let grid = Grid::new(7, 3).unwrap();
        for (i, cell) in grid.cells().enumerate() {
            assert_eq!(cell.position(), Position::new(i % 7, i / 7));
        }
    }

    #[test]
    fn test_out_of_range_access() {
        let mut grid = Grid::new(4, 3).unwrap();
        assert_eq!(
            grid.get(4, 0),
            Err(GridError::OutOfRange { x: 4, y: 0, width: 4, height: 3 })
        );
        assert!(grid.set(0, 3, CellState::Alive).is_err());
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(1, 1, CellState::Alive).unwrap();

        let copy = grid.clone();
        grid.set(1, 1, CellState::Dead).unwrap();

        assert_eq!(copy.get(1, 1), Ok(CellState::Alive));
        assert_eq!(grid.get(1, 1), Ok(CellState::Dead));
    }

    #[test]
    fn test_corner_and_edge_neighbor_limits() {
        let mut grid = Grid::new(5, 5).unwrap();
        fill(&mut grid);

        assert_eq!(grid.alive_neighbors(0, 0), 3);
        assert_eq!(grid.alive_neighbors(4, 4), 3);
        assert_eq!(grid.alive_neighbors(2, 0), 5);
        assert_eq!(grid.alive_neighbors(0, 2), 5);
        assert_eq!(grid.alive_neighbors(2, 2), 8);
    }

    #[test]
    fn test_neighbors_on_tiny_grids() {
        let mut grid = Grid::new(2, 2).unwrap();
        fill(&mut grid);
        assert_eq!(grid.alive_neighbors(0, 0), 3);

        let mut single = Grid::new(1, 1).unwrap();
        fill(&mut single);
        assert_eq!(single.alive_neighbors(0, 0), 0);
    }

    #[test]
    fn test_neighbors_do_not_wrap() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(3, 3, CellState::Alive).unwrap();
        assert_eq!(grid.alive_neighbors(0, 0), 0);
        assert_eq!(grid.alive_neighbors(2, 2), 1);
    }

    #[test]
    fn test_from_cells_any_order() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.set(2, 1, CellState::Alive).unwrap();

        let mut reversed: Vec<Cell> = grid.cells().copied().collect();
        reversed.reverse();
        let rebuilt = Grid::from_cells(3, 2, reversed).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn test_from_cells_missing_cell() {
        let grid = Grid::new(3, 2).unwrap();
        let partial: Vec<Cell> = grid.cells().skip(1).copied().collect();
        assert_eq!(
            Grid::from_cells(3, 2, partial),
            Err(GridError::MissingCell { x: 0, y: 0 })
        );
    }

    #[test]
    fn test_from_cells_duplicate_cell() {
        let grid = Grid::new(2, 1).unwrap();
        let first = *grid.cells().next().unwrap();
        assert_eq!(
            Grid::from_cells(2, 1, vec![first, first]),
            Err(GridError::DuplicateCell { x: 0, y: 0 })
        );
    }

    #[test]
    fn test_gpu_cells_layout() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.set(1, 1, CellState::Alive).unwrap();
        let gpu = grid.to_gpu_cells();
        assert_eq!(gpu.len(), 6);
        assert_eq!(gpu[4].state, 1);
        assert_eq!(gpu.iter().filter(|c| c.state == 1).count(), 1);
    }
}
