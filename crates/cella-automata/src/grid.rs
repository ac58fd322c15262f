//! Padded 2D cell storage.

use crate::{AutomatonError, Cell};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 3x3 window of cell values, `window[row][col]`, centred on `window[1][1]`.
pub type Neighbourhood = [[Cell; 3]; 3];

/// One edge of the border ring around a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Edge {
    /// Row above the interior, `width + 2` cells including both corners.
    Up,
    /// Row below the interior, `width + 2` cells including both corners.
    Down,
    /// Column left of the interior, `height + 2` cells including both corners.
    Left,
    /// Column right of the interior, `height + 2` cells including both corners.
    Right,
}

impl Edge {
    /// All four edges.
    pub const ALL: [Edge; 4] = [Edge::Up, Edge::Down, Edge::Left, Edge::Right];
}

/// A `width x height` grid of cells surrounded by a one-cell border ring.
///
/// Storage is one contiguous `(height + 2) x (width + 2)` buffer. Interior
/// cell `(x, y)` lives at padded position `(x + 1, y + 1)`, so every interior
/// cell has a full 3x3 neighbourhood without bounds checks. What the border
/// holds (dead cells, wraparound copies, anything else) is up to the caller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridRepr"))]
pub struct Grid {
    width: usize,
    height: usize,
    buffer: Vec<Cell>,
}

/// Unchecked wire form of [`Grid`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct GridRepr {
    width: usize,
    height: usize,
    buffer: Vec<Cell>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridRepr> for Grid {
    type Error = AutomatonError;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        let mut grid = Grid::new(repr.width, repr.height)?;
        if repr.buffer.len() != grid.buffer.len() {
            return Err(AutomatonError::BufferLengthMismatch {
                expected: grid.buffer.len(),
                got: repr.buffer.len(),
            });
        }
        grid.buffer = repr.buffer;
        Ok(grid)
    }
}

impl Grid {
    /// Creates a grid with every cell, border included, set to 0.
    pub fn new(width: usize, height: usize) -> Result<Self, AutomatonError> {
        if width == 0 || height == 0 {
            return Err(AutomatonError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            buffer: vec![0; (width + 2) * (height + 2)],
        })
    }

    /// Returns the width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Buffer index of padded position `(px, py)`.
    #[inline]
    fn padded(&self, px: usize, py: usize) -> usize {
        py * (self.width + 2) + px
    }

    #[inline]
    fn check_bounds(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) out of bounds for {}x{} grid",
            self.width,
            self.height
        );
    }

    /// Gets the state of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.check_bounds(x, y);
        self.buffer[self.padded(x + 1, y + 1)]
    }

    /// Sets the state of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, state: Cell) {
        self.check_bounds(x, y);
        let i = self.padded(x + 1, y + 1);
        self.buffer[i] = state;
    }

    /// Sets every interior cell to `state`. The border is untouched.
    pub fn fill(&mut self, state: Cell) {
        for y in 0..self.height {
            self.row_mut(y).fill(state);
        }
    }

    /// Returns interior row `y`.
    pub fn row(&self, y: usize) -> &[Cell] {
        self.check_bounds(0, y);
        let start = self.padded(1, y + 1);
        &self.buffer[start..start + self.width]
    }

    fn row_mut(&mut self, y: usize) -> &mut [Cell] {
        self.check_bounds(0, y);
        let start = self.padded(1, y + 1);
        let width = self.width;
        &mut self.buffer[start..start + width]
    }

    /// Iterates over interior cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| self.row(y).iter().copied())
    }

    /// Number of cells on `edge`, corners included.
    pub fn border_len(&self, edge: Edge) -> usize {
        match edge {
            Edge::Up | Edge::Down => self.width + 2,
            Edge::Left | Edge::Right => self.height + 2,
        }
    }

    /// Buffer index of the `i`th cell of `edge`.
    fn border_index(&self, edge: Edge, i: usize) -> usize {
        match edge {
            Edge::Up => self.padded(i, 0),
            Edge::Down => self.padded(i, self.height + 1),
            Edge::Left => self.padded(0, i),
            Edge::Right => self.padded(self.width + 1, i),
        }
    }

    /// Writes one edge of the border ring, corners included.
    ///
    /// Corners are shared by two edges; the last write wins. A sequence
    /// shorter than [`Grid::border_len`] writes only its prefix, a longer one
    /// is truncated.
    pub fn set_border(&mut self, edge: Edge, values: &[Cell]) {
        let n = values.len().min(self.border_len(edge));
        for (i, &v) in values[..n].iter().enumerate() {
            let idx = self.border_index(edge, i);
            self.buffer[idx] = v;
        }
    }

    /// Reads one edge of the border ring, corners included.
    pub fn border(&self, edge: Edge) -> Vec<Cell> {
        (0..self.border_len(edge))
            .map(|i| self.buffer[self.border_index(edge, i)])
            .collect()
    }

    /// Sets the whole border ring to `state` (a fixed boundary).
    pub fn set_constant_borders(&mut self, state: Cell) {
        for edge in Edge::ALL {
            for i in 0..self.border_len(edge) {
                let idx = self.border_index(edge, i);
                self.buffer[idx] = state;
            }
        }
    }

    /// Fills the border ring as if the grid were wrapped onto a torus.
    ///
    /// Each edge receives the interior row or column of the opposite edge and
    /// each corner receives the diagonally opposite interior cell. This reads
    /// the current interior, so it must be rerun whenever the interior changes.
    pub fn set_toroidal_borders(&mut self) {
        let (w, h) = (self.width as isize, self.height as isize);
        let wrap = |p: usize, n: isize| (p as isize - 1).rem_euclid(n) as usize;
        for edge in Edge::ALL {
            for i in 0..self.border_len(edge) {
                let (px, py) = match edge {
                    Edge::Up => (i, 0),
                    Edge::Down => (i, self.height + 1),
                    Edge::Left => (0, i),
                    Edge::Right => (self.width + 1, i),
                };
                let src = self.padded(wrap(px, w) + 1, wrap(py, h) + 1);
                let dst = self.padded(px, py);
                self.buffer[dst] = self.buffer[src];
            }
        }
    }

    /// Returns the 3x3 window centred on `(x, y)`, border cells included.
    ///
    /// `window[r][c]` is padded position `(x + c, y + r)`, i.e. interior
    /// position `(x - 1 + c, y - 1 + r)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    pub fn neighbourhood(&self, x: usize, y: usize) -> Neighbourhood {
        self.check_bounds(x, y);
        let mut window = [[0; 3]; 3];
        for (r, row) in window.iter_mut().enumerate() {
            let start = self.padded(x, y + r);
            row.copy_from_slice(&self.buffer[start..start + 3]);
        }
        window
    }
}

/// Grids are equal when their dimensions and interior cells match; border
/// contents are ignored.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && (0..self.height).all(|y| self.row(y) == other.row(y))
    }
}

impl Eq for Grid {}
