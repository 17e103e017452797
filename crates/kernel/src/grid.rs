/// Fixed-size boolean cell grid.
///
/// Cells live in one contiguous buffer indexed `row * width + col`. The size is
/// set at construction and never changes; every cell is always defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.width && row < self.height,
            "cell ({col}, {row}) outside {}x{} grid",
            self.width,
            self.height
        );
        row * self.width + col
    }

    /// Whether the cell at `(col, row)` is alive. Panics when out of range.
    pub fn get(&self, col: usize, row: usize) -> bool {
        self.cells[self.index(col, row)]
    }

    /// Set the cell at `(col, row)`. Panics when out of range.
    pub fn set(&mut self, col: usize, row: usize, alive: bool) {
        let i = self.index(col, row);
        self.cells[i] = alive;
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[bool] {
        assert!(row < self.height, "row {row} outside grid of height {}", self.height);
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    /// Live cells in the Moore neighborhood of `(col, row)`.
    ///
    /// The neighborhood is clamped at the grid edge: cells beyond it are
    /// simply absent, never wrapped to the opposite side.
    pub fn live_neighbors(&self, col: usize, row: usize) -> u8 {
        let col_lo = col.saturating_sub(1);
        let col_hi = (col + 1).min(self.width - 1);
        let row_lo = row.saturating_sub(1);
        let row_hi = (row + 1).min(self.height - 1);

        let mut count = 0;
        for r in row_lo..=row_hi {
            let line = &self.cells[r * self.width..(r + 1) * self.width];
            for (c, &alive) in line.iter().enumerate().take(col_hi + 1).skip(col_lo) {
                if alive && (c, r) != (col, row) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Read-only window onto a square sub-range.
    pub fn view(&self, col0: usize, row0: usize, size: usize) -> TileView<'_> {
        assert!(
            col0 + size <= self.width && row0 + size <= self.height,
            "view at ({col0}, {row0}) of size {size} exceeds {}x{} grid",
            self.width,
            self.height
        );
        TileView {
            grid: self,
            col0,
            row0,
            size,
        }
    }
}

/// A borrowed square window of a [`Grid`].
///
/// Renderers consume these; the window is stable until the owning tile steps.
#[derive(Debug, Clone, Copy)]
pub struct TileView<'a> {
    grid: &'a Grid,
    col0: usize,
    row0: usize,
    size: usize,
}

impl<'a> TileView<'a> {
    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, col: usize, row: usize) -> bool {
        assert!(
            col < self.size && row < self.size,
            "cell ({col}, {row}) outside {0}x{0} view",
            self.size
        );
        self.grid.get(self.col0 + col, self.row0 + row)
    }

    pub fn row(&self, row: usize) -> &'a [bool] {
        assert!(row < self.size, "row {row} outside view of size {}", self.size);
        &self.grid.row(self.row0 + row)[self.col0..self.col0 + self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [bool]> + 'a {
        let view = *self;
        (0..view.size).map(move |r| view.row(r))
    }

    pub fn population(&self) -> usize {
        self.rows().flatten().filter(|&&c| c).count()
    }

    /// Copy the window into an owned grid.
    pub fn to_grid(&self) -> Grid {
        let mut out = Grid::new(self.size, self.size);
        for (r, line) in self.rows().enumerate() {
            for (c, &alive) in line.iter().enumerate() {
                out.set(c, r, alive);
            }
        }
        out
    }
}

impl PartialEq for TileView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.rows().eq(other.rows())
    }
}

impl Eq for TileView<'_> {}
