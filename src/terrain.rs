//! Grid of ecological cell states shared by every agent.
//!
//! Cell coordinates are `(x, y)` with `x` the column and `y` the row, both
//! zero based. Every accessor taking a cell index is bounds checked and
//! returns [`TerrainError::OutOfBounds`] instead of panicking or wrapping.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::Position;

/// Keeps clamped positions strictly inside the last row/column.
const CLAMP_MARGIN: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Empty,
    Fertile,
    Obstacle,
    Food,
}

impl CellState {
    pub const ALL: [CellState; 4] = [
        CellState::Empty,
        CellState::Fertile,
        CellState::Obstacle,
        CellState::Food,
    ];

    /// Cyclic successor: Empty -> Fertile -> Obstacle -> Food -> Empty.
    pub fn next(self) -> Self {
        match self {
            CellState::Empty => CellState::Fertile,
            CellState::Fertile => CellState::Obstacle,
            CellState::Obstacle => CellState::Food,
            CellState::Food => CellState::Empty,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// What happens to an agent that steps past the edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Position is clamped back inside the grid.
    #[default]
    Clamp,
    /// Grid is a torus.
    Wrap,
    /// Agents roam freely; off-grid agents do not touch the terrain.
    Unbounded,
}

/// Pixel dimensions of whatever surface displays the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Cell under a pixel, or `None` when the pixel is outside the grid.
    pub fn cell_at(&self, px: i32, py: i32, rows: usize, cols: usize) -> Option<(usize, usize)> {
        if px < 0 || py < 0 || self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let cell_width = self.width / cols as f32;
        let cell_height = self.height / rows as f32;
        let col = (px as f32 / cell_width).floor() as usize;
        let row = (py as f32 / cell_height).floor() as usize;
        (col < cols && row < rows).then_some((col, row))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("terrain must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("cell ({x}, {y}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        cols: usize,
        rows: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Terrain {
    rows: usize,
    cols: usize,
    grid: Vec<CellState>,
    boundary: BoundaryPolicy,
    regrowth_chance: f64,
}

impl Terrain {
    pub fn new(rows: usize, cols: usize) -> Result<Self, TerrainError> {
        if rows == 0 || cols == 0 {
            return Err(TerrainError::EmptyGrid { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            grid: vec![CellState::Empty; rows * cols],
            boundary: BoundaryPolicy::default(),
            regrowth_chance: 0.0,
        })
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Probability per tick that a fertile cell grows food again.
    pub fn with_regrowth(mut self, chance: f64) -> Self {
        self.regrowth_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    pub fn init_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in self.grid.iter_mut() {
            *cell = CellState::random(rng);
        }
    }

    pub fn state(&self, x: usize, y: usize) -> Result<CellState, TerrainError> {
        let index = self.index(x, y)?;
        Ok(self.grid[index])
    }

    pub fn set_state(&mut self, x: usize, y: usize, state: CellState) -> Result<(), TerrainError> {
        let index = self.index(x, y)?;
        self.grid[index] = state;
        Ok(())
    }

    /// Advances the cell under a pixel to its next state.
    ///
    /// Pixels outside the grid are ignored and yield `None`.
    pub fn toggle_state(&mut self, px: i32, py: i32, viewport: &Viewport) -> Option<CellState> {
        let (x, y) = viewport.cell_at(px, py, self.rows, self.cols)?;
        self.toggle_cell(x, y).ok()
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<CellState, TerrainError> {
        let index = self.index(x, y)?;
        let next = self.grid[index].next();
        self.grid[index] = next;
        Ok(next)
    }

    /// True when the cell holds food. Predators hunt on food cells, so this
    /// is a terrain check, not a lookup of prey agents.
    pub fn has_prey_at(&self, x: usize, y: usize) -> Result<bool, TerrainError> {
        Ok(self.state(x, y)? == CellState::Food)
    }

    /// Food -> Fertile; any other state is left alone.
    pub fn remove_prey(&mut self, x: usize, y: usize) -> Result<(), TerrainError> {
        let index = self.index(x, y)?;
        if self.grid[index] == CellState::Food {
            self.grid[index] = CellState::Fertile;
        }
        Ok(())
    }

    /// Per-tick terrain dynamics. Without regrowth this does nothing.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.regrowth_chance <= 0.0 {
            return 0;
        }
        let mut regrown = 0;
        for cell in self.grid.iter_mut() {
            if *cell == CellState::Fertile && rng.gen_bool(self.regrowth_chance) {
                *cell = CellState::Food;
                regrown += 1;
            }
        }
        regrown
    }

    /// Cell under a terrain-space position, `None` when it lies off the grid.
    pub fn cell_under(&self, position: Position) -> Option<(usize, usize)> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let (x, y) = (position.x as usize, position.y as usize);
        (x < self.cols && y < self.rows).then_some((x, y))
    }

    /// Applies the boundary policy to a freshly moved position.
    pub fn confine(&self, position: Position) -> Position {
        let width = self.cols as f32;
        let height = self.rows as f32;
        match self.boundary {
            BoundaryPolicy::Clamp => Position::new(
                position.x.clamp(0.0, inner_limit(width)),
                position.y.clamp(0.0, inner_limit(height)),
            ),
            BoundaryPolicy::Wrap => Position::new(wrap(position.x, width), wrap(position.y, height)),
            BoundaryPolicy::Unbounded => position,
        }
    }

    pub fn count(&self, state: CellState) -> usize {
        self.grid.iter().filter(|cell| **cell == state).count()
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[CellState] {
        &self.grid
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, TerrainError> {
        if x >= self.cols || y >= self.rows {
            return Err(TerrainError::OutOfBounds {
                x,
                y,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(y * self.cols + x)
    }
}

/// Largest clamped coordinate that still truncates to the last cell.
fn inner_limit(extent: f32) -> f32 {
    // on wide grids `extent - CLAMP_MARGIN` rounds back up to `extent`
    let below = f32::from_bits(extent.to_bits() - 1);
    (extent - CLAMP_MARGIN).min(below)
}

fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn new_terrain_is_empty() {
        let terrain = Terrain::new(3, 4).unwrap();
        assert_eq!(terrain.rows(), 3);
        assert_eq!(terrain.cols(), 4);
        assert_eq!(terrain.count(CellState::Empty), 12);
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(
            Terrain::new(0, 5).unwrap_err(),
            TerrainError::EmptyGrid { rows: 0, cols: 5 }
        );
    }

    #[test]
    fn x_is_column_and_y_is_row() {
        let mut terrain = Terrain::new(2, 5).unwrap();
        terrain.set_state(4, 1, CellState::Obstacle).unwrap();
        assert_eq!(terrain.cells()[5 + 4], CellState::Obstacle);
        assert!(terrain.state(1, 4).is_err());
    }

    #[test]
    fn random_init_covers_every_state() {
        let mut terrain = Terrain::new(20, 20).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        terrain.init_random(&mut rng);
        for state in CellState::ALL {
            assert!(terrain.count(state) > 0, "{state:?} never drawn");
        }
    }

    #[test]
    fn viewport_maps_pixels_to_cells() {
        let viewport = Viewport::new(500.0, 250.0);
        assert_eq!(viewport.cell_at(0, 0, 5, 10), Some((0, 0)));
        assert_eq!(viewport.cell_at(499, 249, 5, 10), Some((9, 4)));
        assert_eq!(viewport.cell_at(125, 60, 5, 10), Some((2, 1)));
        assert_eq!(viewport.cell_at(500, 10, 5, 10), None);
        assert_eq!(viewport.cell_at(-1, 10, 5, 10), None);
    }

    #[test]
    fn clamp_keeps_positions_inside() {
        let terrain = Terrain::new(4, 4).unwrap();
        let inside = terrain.confine(Position::new(-2.0, 9.0));
        assert_eq!(terrain.cell_under(inside), Some((0, 3)));
    }

    #[test]
    fn clamp_holds_on_wide_grids() {
        let terrain = Terrain::new(1, 40_000).unwrap();
        let edge = terrain.confine(Position::new(50_000.0, 0.5));
        assert!(edge.x < 40_000.0, "clamped to {}", edge.x);
        assert_eq!(terrain.cell_under(edge), Some((39_999, 0)));

        let tall = Terrain::new(70_000, 1).unwrap();
        let bottom = tall.confine(Position::new(0.5, 1.0e9));
        assert_eq!(tall.cell_under(bottom), Some((0, 69_999)));
    }

    #[test]
    fn wrap_folds_positions_onto_torus() {
        let terrain = Terrain::new(4, 4).unwrap().with_boundary(BoundaryPolicy::Wrap);
        let wrapped = terrain.confine(Position::new(-0.5, 4.25));
        assert!((wrapped.x - 3.5).abs() < 1e-6);
        assert!((wrapped.y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn unbounded_positions_have_no_cell() {
        let terrain = Terrain::new(4, 4)
            .unwrap()
            .with_boundary(BoundaryPolicy::Unbounded);
        let outside = terrain.confine(Position::new(-0.5, 2.0));
        assert_eq!(outside, Position::new(-0.5, 2.0));
        assert_eq!(terrain.cell_under(outside), None);
        assert_eq!(terrain.cell_under(Position::new(4.0, 0.0)), None);
    }

    #[test]
    fn regrowth_turns_fertile_into_food() {
        let mut terrain = Terrain::new(3, 3).unwrap().with_regrowth(1.0);
        terrain.set_state(1, 1, CellState::Fertile).unwrap();
        terrain.set_state(0, 0, CellState::Obstacle).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(terrain.update(&mut rng), 1);
        assert_eq!(terrain.state(1, 1).unwrap(), CellState::Food);
        assert_eq!(terrain.state(0, 0).unwrap(), CellState::Obstacle);
    }
}
