use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GridError;
use crate::render::Renderer;
use crate::simulation::cell::{CellState, Position};
use crate::simulation::grid::Grid;

/// Conway's rule: next state from the current state and its alive-neighbor count
pub fn next_state(current: CellState, alive_neighbors: usize) -> CellState {
    match alive_neighbors {
        0 | 1 => CellState::Dead,
        2 => current,
        3 => CellState::Alive,
        _ => CellState::Dead,
    }
}

/// Owns the live grid and is its only mutator.
///
/// Every mutating call ends with `renderer.render_cells(grid)`.
pub struct Engine<R: Renderer> {
    grid: Grid,
    renderer: R,
    rng: StdRng,
    generation: u64,
}

impl<R: Renderer> Engine<R> {
    /// Create an engine with an all-dead grid and an entropy-seeded RNG
    pub fn new(width: usize, height: usize, renderer: R) -> Result<Self, GridError> {
        Self::with_rng(width, height, renderer, StdRng::from_entropy())
    }

    /// Create an engine whose randomization is reproducible
    pub fn with_seed(
        width: usize,
        height: usize,
        renderer: R,
        seed: u64,
    ) -> Result<Self, GridError> {
        Self::with_rng(width, height, renderer, StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise
    pub fn from_seed(
        width: usize,
        height: usize,
        renderer: R,
        seed: Option<u64>,
    ) -> Result<Self, GridError> {
        match seed {
            Some(seed) => Self::with_seed(width, height, renderer, seed),
            None => Self::new(width, height, renderer),
        }
    }

    fn with_rng(
        width: usize,
        height: usize,
        mut renderer: R,
        rng: StdRng,
    ) -> Result<Self, GridError> {
        let grid = Grid::new(width, height)?;
        renderer.setup(&grid);

        Ok(Self {
            grid,
            renderer,
            rng,
            generation: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Generations advanced since the last reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn render(&mut self) {
        self.renderer.render_cells(&self.grid);
    }

    /// Set every cell alive or dead with equal probability
    pub fn randomize(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.state = if self.rng.gen_bool(0.5) {
                CellState::Alive
            } else {
                CellState::Dead
            };
        }

        log::info!(
            "Randomized grid: {} of {} cells alive",
            self.grid.alive_count(),
            self.grid.width() * self.grid.height()
        );
        self.render();
    }

    /// Replace the grid with a fresh all-dead one of the same size
    pub fn reset(&mut self) {
        self.grid = self.grid.empty_like();
        self.generation = 0;

        log::info!("Grid reset");
        self.render();
    }

    /// Flip the cell at `position`
    pub fn toggle_cell(&mut self, position: Position) -> Result<CellState, GridError> {
        let state = self.grid.get(position.x, position.y)?.toggled();
        self.grid.set(position.x, position.y, state)?;

        log::debug!("Toggled ({}, {}) to {:?}", position.x, position.y, state);
        self.render();
        Ok(state)
    }

    /// Advance one generation. Returns how many cells changed.
    ///
    /// Neighbor counts all come from the current generation; changes are
    /// applied only after the whole grid has been scanned.
    pub fn step(&mut self) -> usize {
        let changes: Vec<(Position, CellState)> = self
            .grid
            .cells()
            .filter_map(|cell| {
                let position = cell.position();
                let neighbors = self.grid.alive_neighbors(position.x, position.y);
                let next = next_state(cell.state, neighbors);
                (next != cell.state).then_some((position, next))
            })
            .collect();

        self.grid.apply_changes(&changes);
        self.generation += 1;

        log::debug!(
            "Generation {}: {} cells changed, {} alive",
            self.generation,
            changes.len(),
            self.grid.alive_count()
        );
        self.render();
        changes.len()
    }

    /// Independent copy of the live grid, for saving
    pub fn export_snapshot(&self) -> Grid {
        self.grid.clone()
    }

    /// Replace the live grid wholesale.
    ///
    /// The snapshot must have the engine's dimensions; on mismatch the live
    /// grid is left untouched.
    pub fn import_snapshot(&mut self, grid: Grid) -> Result<(), GridError> {
        if grid.dimensions() != self.grid.dimensions() {
            return Err(GridError::DimensionMismatch {
                expected: self.grid.dimensions(),
                found: grid.dimensions(),
            });
        }

        self.grid = grid;
        log::info!("Imported snapshot with {} alive cells", self.grid.alive_count());
        self.render();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every grid it is handed
    #[derive(Default)]
    struct SpyRenderer {
        setups: Vec<Grid>,
        renders: Vec<Grid>,
    }

    impl Renderer for SpyRenderer {
        fn setup(&mut self, grid: &Grid) {
            self.setups.push(grid.clone());
        }

        fn render_cells(&mut self, grid: &Grid) {
            self.renders.push(grid.clone());
        }
    }

    fn engine(width: usize, height: usize) -> Engine<SpyRenderer> {
        Engine::with_seed(width, height, SpyRenderer::default(), 42).unwrap()
    }

    fn set_alive(engine: &mut Engine<SpyRenderer>, cells: &[(usize, usize)]) {
        for &(x, y) in cells {
            engine.toggle_cell(Position::new(x, y)).unwrap();
        }
    }

    fn alive_cells(grid: &Grid) -> Vec<(usize, usize)> {
        grid.cells()
            .filter(|c| c.is_alive())
            .map(|c| (c.position().x, c.position().y))
            .collect()
    }

    #[test]
    fn test_rule_table() {
        for current in [CellState::Alive, CellState::Dead] {
            assert_eq!(next_state(current, 0), CellState::Dead);
            assert_eq!(next_state(current, 1), CellState::Dead);
            assert_eq!(next_state(current, 2), current);
            assert_eq!(next_state(current, 3), CellState::Alive);
            for n in 4..=8 {
                assert_eq!(next_state(current, n), CellState::Dead);
            }
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let result = Engine::new(0, 10, SpyRenderer::default());
        assert!(matches!(
            result,
            Err(GridError::InvalidDimension { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_setup_called_once_with_dead_grid() {
        let engine = engine(6, 4);
        assert_eq!(engine.renderer().setups.len(), 1);
        assert_eq!(engine.renderer().setups[0].dimensions(), (6, 4));
        assert_eq!(engine.renderer().setups[0].alive_count(), 0);
        assert!(engine.renderer().renders.is_empty());
    }

    #[test]
    fn test_every_mutation_renders() {
        let mut engine = engine(5, 5);
        engine.randomize();
        engine.step();
        engine.toggle_cell(Position::new(1, 1)).unwrap();
        let snapshot = engine.export_snapshot();
        engine.import_snapshot(snapshot).unwrap();
        engine.reset();

        assert_eq!(engine.renderer().renders.len(), 5);
        assert_eq!(engine.renderer().renders.last().unwrap(), engine.grid());
    }

    #[test]
    fn test_empty_grid_stays_empty() {
        let mut engine = engine(10, 10);
        assert_eq!(engine.step(), 0);
        assert_eq!(engine.grid().alive_count(), 0);
    }

    #[test]
    fn test_isolated_cell_dies() {
        let mut engine = engine(5, 5);
        set_alive(&mut engine, &[(2, 2)]);
        engine.step();
        assert_eq!(engine.grid().alive_count(), 0);
    }

    #[test]
    fn test_block_is_still_life() {
        let mut engine = engine(6, 6);
        let block = [(2, 2), (3, 2), (2, 3), (3, 3)];
        set_alive(&mut engine, &block);
        let before = engine.export_snapshot();

        assert_eq!(engine.step(), 0);
        assert_eq!(engine.grid(), &before);
    }

    #[test]
    fn test_blinker_period_two() {
        let mut engine = engine(5, 5);
        set_alive(&mut engine, &[(2, 1), (2, 2), (2, 3)]);
        let vertical = engine.export_snapshot();

        engine.step();
        assert_eq!(alive_cells(engine.grid()), vec![(1, 2), (2, 2), (3, 2)]);

        engine.step();
        assert_eq!(engine.grid(), &vertical);
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn test_blinker_at_edge_uses_clipping() {
        // (1, 0) sits on the top edge
        let mut engine = engine(5, 5);
        set_alive(&mut engine, &[(1, 0), (1, 1), (1, 2)]);

        engine.step();
        assert_eq!(alive_cells(engine.grid()), vec![(0, 1), (1, 1), (2, 1)]);

        engine.step();
        assert_eq!(alive_cells(engine.grid()), vec![(1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_glider_moves_diagonally() {
        let mut engine = engine(8, 8);
        set_alive(&mut engine, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);

        for _ in 0..4 {
            engine.step();
        }
        assert_eq!(
            alive_cells(engine.grid()),
            vec![(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn test_toggle_is_own_inverse() {
        let mut engine = engine(4, 4);
        engine.randomize();
        let before = engine.export_snapshot();

        engine.toggle_cell(Position::new(3, 1)).unwrap();
        assert_ne!(engine.grid(), &before);
        engine.toggle_cell(Position::new(3, 1)).unwrap();
        assert_eq!(engine.grid(), &before);
    }

    #[test]
    fn test_toggle_out_of_range() {
        let mut engine = engine(4, 4);
        let result = engine.toggle_cell(Position::new(4, 0));
        assert_eq!(
            result,
            Err(GridError::OutOfRange { x: 4, y: 0, width: 4, height: 4 })
        );
        assert!(engine.renderer().renders.is_empty());
    }

    #[test]
    fn test_reset_clears_grid_and_generation() {
        let mut engine = engine(6, 3);
        engine.randomize();
        engine.step();
        engine.reset();

        assert_eq!(engine.grid().dimensions(), (6, 3));
        assert_eq!(engine.grid().alive_count(), 0);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut engine = engine(9, 7);
        engine.randomize();
        let snapshot = engine.export_snapshot();

        engine.import_snapshot(snapshot.clone()).unwrap();
        assert_eq!(engine.grid(), &snapshot);
    }

    #[test]
    fn test_export_is_independent_of_live_grid() {
        let mut engine = engine(4, 4);
        let snapshot = engine.export_snapshot();
        engine.toggle_cell(Position::new(0, 0)).unwrap();
        assert_eq!(snapshot.alive_count(), 0);
    }

    #[test]
    fn test_import_rejects_mismatched_dimensions() {
        let mut engine = engine(4, 4);
        engine.randomize();
        let before = engine.export_snapshot();

        let result = engine.import_snapshot(Grid::new(5, 4).unwrap());
        assert_eq!(
            result,
            Err(GridError::DimensionMismatch {
                expected: (4, 4),
                found: (5, 4),
            })
        );
        assert_eq!(engine.grid(), &before);
    }

    #[test]
    fn test_randomize_keeps_dimensions() {
        let mut engine = engine(13, 11);
        engine.randomize();
        assert_eq!(engine.grid().dimensions(), (13, 11));
        assert_eq!(engine.grid().cells().count(), 13 * 11);
    }

    #[test]
    fn test_randomize_roughly_half_alive() {
        let mut engine = engine(50, 50);
        let mut alive = 0;
        let runs = 20;
        for _ in 0..runs {
            engine.randomize();
            alive += engine.grid().alive_count();
        }

        let ratio = alive as f64 / (runs * 50 * 50) as f64;
        assert!((ratio - 0.5).abs() < 0.02, "alive ratio {}", ratio);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = engine(20, 20);
        let mut b = engine(20, 20);
        a.randomize();
        b.randomize();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_from_seed_matches_with_seed() {
        let mut seeded = Engine::from_seed(20, 20, SpyRenderer::default(), Some(42)).unwrap();
        let mut reference = engine(20, 20);
        seeded.randomize();
        reference.randomize();
        assert_eq!(seeded.grid(), reference.grid());

        let unseeded = Engine::from_seed(3, 2, SpyRenderer::default(), None).unwrap();
        assert_eq!(unseeded.grid().dimensions(), (3, 2));
    }

    #[test]
    fn test_renderer_by_reference() {
        let mut spy = SpyRenderer::default();
        {
            let mut engine = Engine::with_seed(3, 3, &mut spy, 1).unwrap();
            engine.step();
        }
        assert_eq!(spy.setups.len(), 1);
        assert_eq!(spy.renders.len(), 1);
    }
}
