//! Grid storage: the contract the write engine consumes, plus a reference
//! implementation.
//!
//! [`GridStore`] is the seam between the screen-write engine and whatever owns
//! the cells. All coordinates are viewport-relative (`x` in `[0, cols)`, `y`
//! in `[0, rows)`) except the `*_absolute` accessors, which address history
//! and viewport as one sequence. Out-of-bounds coordinates are clamped or
//! ignored, never rejected.
//!
//! [`Grid`] stores lines as a single `Vec`: history lines `[0, history_size)`
//! followed by exactly `rows` viewport lines. A line's stored cell count may
//! be shorter than the viewport width; columns beyond it read as default
//! blanks. History growth is bounded by a line limit with oldest-first
//! eviction (smarter compaction is a host concern).

use crate::cell::Cell;

/// Storage contract consumed by the write engine.
pub trait GridStore {
    /// Viewport width in columns.
    fn cols(&self) -> u16;

    /// Viewport height in rows.
    fn rows(&self) -> u16;

    /// Whether scrolled-off lines are retained as history.
    fn history_enabled(&self) -> bool;

    /// Number of history lines currently retained.
    fn history_size(&self) -> u32;

    /// Read the cell at `(x, y)` without expanding storage.
    ///
    /// Returns a default blank for coordinates out of bounds or beyond the
    /// line's stored cells.
    fn peek_cell(&self, x: u16, y: u16) -> Cell;

    /// Mutable access to the cell at `(x, y)`, expanding the line's stored
    /// cells as needed. `None` if out of bounds.
    fn get_cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell>;

    /// Store `cell` at `(x, y)`. Ignored if out of bounds.
    fn set_cell(&mut self, x: u16, y: u16, cell: Cell);

    /// Move `n` cells within row `y` from `src_x` to `dst_x`.
    ///
    /// Source positions not covered by the destination are wiped to default
    /// blanks.
    fn move_cells(&mut self, dst_x: u16, src_x: u16, y: u16, n: u16);

    /// Clear an `nx` by `ny` run of cells starting at `(x, y)` to default
    /// blanks.
    fn clear(&mut self, x: u16, y: u16, nx: u16, ny: u16);

    /// Insert `n` blank cells at `(x, y)`, shifting the remainder of the row
    /// right; cells pushed past the right margin are lost.
    fn insert_cells(&mut self, x: u16, y: u16, n: u16);

    /// Delete `n` cells at `(x, y)`, shifting the remainder of the row left;
    /// blanks appear at the right margin.
    fn delete_cells(&mut self, x: u16, y: u16, n: u16);

    /// Insert `n` blank lines at row `y`; lines pushed past the viewport
    /// bottom are lost.
    fn insert_lines(&mut self, y: u16, n: u16);

    /// Delete `n` lines at row `y`; blank lines appear at the viewport bottom.
    fn delete_lines(&mut self, y: u16, n: u16);

    /// Insert `n` blank lines at row `y`, discarding lines pushed past
    /// `rlower` (inclusive region bottom). Never touches history.
    fn insert_lines_region(&mut self, rlower: u16, y: u16, n: u16);

    /// Delete `n` lines at row `y`, filling vacated rows at `rlower` with
    /// blanks. Never touches history.
    fn delete_lines_region(&mut self, rlower: u16, y: u16, n: u16);

    /// Scroll the `[rupper, rlower]` region up one row.
    ///
    /// The departing top-of-region line is promoted to history only when
    /// `rupper == 0` and history is enabled; otherwise it is discarded.
    fn scroll_region_up(&mut self, rupper: u16, rlower: u16);

    /// Scroll the `[rupper, rlower]` region down one row, discarding the line
    /// at `rlower`.
    fn scroll_region_down(&mut self, rupper: u16, rlower: u16);

    /// Retire the whole viewport into history and replace it with blank
    /// lines. Falls back to a plain clear when history is disabled.
    fn clear_into_history(&mut self);

    /// Discard all history lines, keeping the viewport.
    fn drop_history(&mut self);

    /// Whether row `y` was soft-wrapped into the row below it.
    fn line_wrapped(&self, y: u16) -> bool;

    /// Set or clear row `y`'s soft-wrap flag.
    fn set_line_wrapped(&mut self, y: u16, wrapped: bool);

    /// Read a cell by absolute line index (history first, then viewport).
    fn peek_absolute(&self, x: u16, line: u32) -> Cell;

    /// Stored cell count of an absolute line (0 if out of bounds).
    fn absolute_line_len(&self, line: u32) -> u16;
}

/// One stored grid row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLine {
    /// Stored cells; may be shorter than the viewport width.
    pub cells: Vec<Cell>,
    /// Set when this line was terminated by an implicit wrap, meaning the next
    /// row continues the same logical line.
    pub wrapped: bool,
}

/// Reference [`GridStore`]: history plus viewport in one line vector.
#[derive(Debug, Clone)]
pub struct Grid {
    lines: Vec<GridLine>,
    cols: u16,
    rows: u16,
    hsize: u32,
    hlimit: u32,
    history: bool,
}

impl Grid {
    /// Create a grid with no history retention.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            lines: (0..rows).map(|_| GridLine::default()).collect(),
            cols,
            rows,
            hsize: 0,
            hlimit: 0,
            history: false,
        }
    }

    /// Create a grid that retains up to `limit` history lines.
    #[must_use]
    pub fn with_history(cols: u16, rows: u16, limit: u32) -> Self {
        Self {
            hlimit: limit,
            history: true,
            ..Self::new(cols, rows)
        }
    }

    /// The stored line at absolute index (history first, then viewport).
    #[must_use]
    pub fn absolute_line(&self, line: u32) -> Option<&GridLine> {
        self.lines.get(line as usize)
    }

    fn view_index(&self, y: u16) -> usize {
        self.hsize as usize + y as usize
    }

    fn blank_line() -> GridLine {
        GridLine::default()
    }

    fn trim_history(&mut self) {
        if self.hsize > self.hlimit {
            let excess = (self.hsize - self.hlimit) as usize;
            self.lines.drain(..excess);
            self.hsize = self.hlimit;
        }
    }
}

impl GridStore for Grid {
    fn cols(&self) -> u16 {
        self.cols
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn history_enabled(&self) -> bool {
        self.history
    }

    fn history_size(&self) -> u32 {
        self.hsize
    }

    fn peek_cell(&self, x: u16, y: u16) -> Cell {
        if x >= self.cols || y >= self.rows {
            return Cell::default();
        }
        let line = &self.lines[self.view_index(y)];
        line.cells.get(x as usize).copied().unwrap_or_default()
    }

    fn get_cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        let index = self.view_index(y);
        let line = &mut self.lines[index];
        if line.cells.len() <= x as usize {
            line.cells.resize(x as usize + 1, Cell::default());
        }
        Some(&mut line.cells[x as usize])
    }

    fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_cell_mut(x, y) {
            *slot = cell;
        }
    }

    fn move_cells(&mut self, dst_x: u16, src_x: u16, y: u16, n: u16) {
        if y >= self.rows || n == 0 {
            return;
        }
        let n = n
            .min(self.cols.saturating_sub(src_x))
            .min(self.cols.saturating_sub(dst_x)) as usize;
        if n == 0 {
            return;
        }
        let (src, dst) = (src_x as usize, dst_x as usize);
        let index = self.view_index(y);
        let line = &mut self.lines[index];
        let needed = src.max(dst) + n;
        if line.cells.len() < needed {
            line.cells.resize(needed, Cell::default());
        }
        line.cells.copy_within(src..src + n, dst);
        // Wipe source positions not covered by the destination.
        for x in src..src + n {
            if x < dst || x >= dst + n {
                line.cells[x] = Cell::default();
            }
        }
    }

    fn clear(&mut self, x: u16, y: u16, nx: u16, ny: u16) {
        if x >= self.cols {
            return;
        }
        let nx = nx.min(self.cols - x) as usize;
        let x = x as usize;
        let end = y.saturating_add(ny).min(self.rows);
        for yy in y..end {
            let index = self.view_index(yy);
            let line = &mut self.lines[index];
            if x + nx >= line.cells.len() {
                line.cells.truncate(x);
            } else {
                for cell in &mut line.cells[x..x + nx] {
                    *cell = Cell::default();
                }
            }
        }
    }

    fn insert_cells(&mut self, x: u16, y: u16, n: u16) {
        if x >= self.cols || y >= self.rows || n == 0 {
            return;
        }
        let n = n.min(self.cols - x);
        let index = self.view_index(y);
        let line = &mut self.lines[index];
        if line.cells.len() <= x as usize {
            return;
        }
        for _ in 0..n {
            line.cells.insert(x as usize, Cell::default());
        }
        line.cells.truncate(self.cols as usize);
    }

    fn delete_cells(&mut self, x: u16, y: u16, n: u16) {
        if x >= self.cols || y >= self.rows || n == 0 {
            return;
        }
        let index = self.view_index(y);
        let line = &mut self.lines[index];
        if line.cells.len() <= x as usize {
            return;
        }
        let end = (x as usize + n as usize).min(line.cells.len());
        line.cells.drain(x as usize..end);
    }

    fn insert_lines(&mut self, y: u16, n: u16) {
        if y >= self.rows {
            return;
        }
        let n = n.min(self.rows - y);
        for _ in 0..n {
            let bottom = self.view_index(self.rows - 1);
            self.lines.remove(bottom);
            let at = self.view_index(y);
            self.lines.insert(at, Self::blank_line());
        }
    }

    fn delete_lines(&mut self, y: u16, n: u16) {
        if y >= self.rows {
            return;
        }
        let n = n.min(self.rows - y);
        for _ in 0..n {
            let at = self.view_index(y);
            self.lines.remove(at);
            self.lines.push(Self::blank_line());
        }
    }

    fn insert_lines_region(&mut self, rlower: u16, y: u16, n: u16) {
        if y >= self.rows || rlower >= self.rows || y > rlower {
            return;
        }
        let n = n.min(rlower + 1 - y);
        for _ in 0..n {
            let bottom = self.view_index(rlower);
            self.lines.remove(bottom);
            let at = self.view_index(y);
            self.lines.insert(at, Self::blank_line());
        }
    }

    fn delete_lines_region(&mut self, rlower: u16, y: u16, n: u16) {
        if y >= self.rows || rlower >= self.rows || y > rlower {
            return;
        }
        let n = n.min(rlower + 1 - y);
        for _ in 0..n {
            let at = self.view_index(y);
            self.lines.remove(at);
            let bottom = self.view_index(rlower);
            self.lines.insert(bottom, Self::blank_line());
        }
    }

    fn scroll_region_up(&mut self, rupper: u16, rlower: u16) {
        if rupper >= rlower || rlower >= self.rows {
            return;
        }
        if self.history && rupper == 0 {
            // Promote the departing top line instead of discarding it.
            self.hsize += 1;
            let at = self.view_index(rlower);
            self.lines.insert(at, Self::blank_line());
            self.trim_history();
        } else {
            let top = self.view_index(rupper);
            self.lines.remove(top);
            let bottom = self.view_index(rlower);
            self.lines.insert(bottom, Self::blank_line());
        }
    }

    fn scroll_region_down(&mut self, rupper: u16, rlower: u16) {
        if rupper >= rlower || rlower >= self.rows {
            return;
        }
        let bottom = self.view_index(rlower);
        self.lines.remove(bottom);
        let top = self.view_index(rupper);
        self.lines.insert(top, Self::blank_line());
    }

    fn clear_into_history(&mut self) {
        if !self.history {
            self.clear(0, 0, self.cols, self.rows);
            return;
        }
        self.hsize += u32::from(self.rows);
        for _ in 0..self.rows {
            self.lines.push(Self::blank_line());
        }
        self.trim_history();
    }

    fn drop_history(&mut self) {
        self.lines.drain(..self.hsize as usize);
        self.hsize = 0;
    }

    fn line_wrapped(&self, y: u16) -> bool {
        if y >= self.rows {
            return false;
        }
        self.lines[self.view_index(y)].wrapped
    }

    fn set_line_wrapped(&mut self, y: u16, wrapped: bool) {
        if y >= self.rows {
            return;
        }
        let index = self.view_index(y);
        self.lines[index].wrapped = wrapped;
    }

    fn peek_absolute(&self, x: u16, line: u32) -> Cell {
        self.lines
            .get(line as usize)
            .and_then(|l| l.cells.get(x as usize))
            .copied()
            .unwrap_or_default()
    }

    fn absolute_line_len(&self, line: u32) -> u16 {
        self.lines
            .get(line as usize)
            .map_or(0, |l| l.cells.len() as u16)
    }
}
