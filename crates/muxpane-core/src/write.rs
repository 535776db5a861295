//! The screen-write engine: every mutating operation on a pane's grid.
//!
//! A [`ScreenWriter`] binds one [`Screen`] and one grid store for a sequence
//! of operations. Mutating operations update both and return the redraw
//! instruction(s) the terminal driver needs, in emission order; the caller is
//! responsible for forwarding them before the next mutating call.
//!
//! Geometry problems are policy, not errors: out-of-range coordinates clamp,
//! and writes that cannot fit are dropped silently (see the individual
//! operations).

use memchr::memchr;
use tracing::trace;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellContent, Utf8Cluster};
use crate::grid::GridStore;
use crate::redraw::{PaneId, Redraw, RedrawKind, Redraws};
use crate::screen::{Modes, Screen};
use crate::style::{Attrs, Style, parse_style};

/// Pre-operation cursor and region coordinates, captured once per operation.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    cx: u16,
    cy: u16,
    rupper: u16,
    rlower: u16,
}

/// Write context: exclusive access to one screen and its grid store.
#[derive(Debug)]
pub struct ScreenWriter<'a, G: GridStore> {
    screen: &'a mut Screen,
    grid: &'a mut G,
    pane: Option<PaneId>,
}

impl<'a, G: GridStore> ScreenWriter<'a, G> {
    /// Bind a screen and grid store for a sequence of operations.
    pub fn new(screen: &'a mut Screen, grid: &'a mut G) -> Self {
        debug_assert_eq!(screen.sx(), grid.cols());
        debug_assert_eq!(screen.sy(), grid.rows());
        Self {
            screen,
            grid,
            pane: None,
        }
    }

    /// Like [`new`](Self::new), tagging emitted instructions with the
    /// originating pane.
    pub fn with_pane(screen: &'a mut Screen, grid: &'a mut G, pane: PaneId) -> Self {
        Self {
            pane: Some(pane),
            ..Self::new(screen, grid)
        }
    }

    /// The bound screen.
    #[must_use]
    pub fn screen(&self) -> &Screen {
        self.screen
    }

    /// The bound grid store.
    #[must_use]
    pub fn grid(&self) -> &G {
        self.grid
    }

    fn snap(&self) -> Snapshot {
        Snapshot {
            cx: self.screen.cx,
            cy: self.screen.cy,
            rupper: self.screen.rupper,
            rlower: self.screen.rlower,
        }
    }

    fn redraw_at(&self, snap: Snapshot, kind: RedrawKind) -> Redraw {
        Redraw {
            pane: self.pane,
            cx: snap.cx,
            cy: snap.cy,
            rupper: snap.rupper,
            rlower: snap.rlower,
            kind,
        }
    }

    // ── Cell writer ─────────────────────────────────────────────────

    /// Place one display unit at the cursor.
    ///
    /// Handles autowrap, insert-mode shifting, wide-character padding, and
    /// combining-mark merges. Returns the emitted instructions in order; a
    /// write that cannot fit (and cannot wrap) returns none and changes
    /// nothing.
    pub fn put_cell(&mut self, cell: &Cell) -> Redraws {
        let mut out = Redraws::new();

        // Padding cells are never written directly; they exist only as the
        // shadow of a wide head cell.
        if cell.is_padding() {
            return out;
        }
        let width = cell.width();
        let (sx, sy) = (self.screen.sx, self.screen.sy);
        let wrap = self.screen.modes.contains(Modes::WRAP);

        // Zero width: combine onto the previous cell.
        if width == 0 {
            let CellContent::Cluster(cluster) = cell.content else {
                return out;
            };
            assert!(!cluster.is_empty(), "combining write with empty cluster");
            if !self.combine(&cluster) {
                // Nothing to attach to at column 0: leave the grid alone and
                // pass the bytes straight through to the driver. Stored state
                // and live display may diverge by this one glyph.
                let snap = self.snap();
                out.push(self.redraw_at(snap, RedrawKind::RawCluster(cluster)));
            }
            return out;
        }

        // A character wider than the viewport can never be drawn.
        if width > sx {
            trace!(width, sx, "cell wider than viewport, dropped");
            return out;
        }
        // Without autowrap, a cell that does not fit in what remains of the
        // row is dropped outright; the cursor never passes the sentinel.
        if !wrap && self.screen.cx + width > sx {
            trace!(cx = self.screen.cx, width, "no room without wrap, dropped");
            return out;
        }

        let snap = self.snap();

        // Insert mode shifts the rest of the row right before the write.
        let mut inserted = false;
        if self.screen.modes.contains(Modes::INSERT) && self.screen.cx + width <= sx {
            let n = sx - self.screen.cx - width;
            self.grid
                .move_cells(self.screen.cx + width, self.screen.cx, self.screen.cy, n);
            inserted = true;
        }

        // Wrap onto the next row when the cell does not fit on this one.
        if wrap && self.screen.cx + width > sx {
            out.push(self.line_feed(true));
            self.screen.cx = 0;
        }

        // Re-validate the fit after wrapping; drop silently if still invalid.
        if (wrap && self.screen.cx + width > sx) || self.screen.cy >= sy {
            return out;
        }

        let (cx, cy) = (self.screen.cx, self.screen.cy);

        // Clear padding remnants this write would orphan.
        self.overwrite(width);

        // A wide cell shadows the following columns with padding.
        for x in cx + 1..cx + width {
            if let Some(slot) = self.grid.get_cell_mut(x, cy) {
                slot.content = CellContent::Padding;
            }
        }

        self.grid.set_cell(cx, cy, *cell);
        self.screen.cx += width;

        if inserted {
            out.push(self.redraw_at(snap, RedrawKind::InsertCharacters(width)));
        }

        // Selection is a redraw overlay: the instruction carries the
        // selection style, the grid keeps the written one.
        let drawn = match self.screen.selection {
            Some(sel) if sel.contains(cx, cy) => Cell {
                content: cell.content,
                style: sel.style,
            },
            _ => *cell,
        };
        out.push(self.redraw_at(snap, RedrawKind::Cell(drawn)));
        out
    }

    /// Place one ASCII byte at the cursor.
    pub fn put_char(&mut self, style: &Style, byte: u8) -> Redraws {
        self.put_cell(&Cell::ascii(byte, *style))
    }

    /// Merge a zero-width cluster onto the cell left of the cursor.
    ///
    /// Fails only at column 0. Promotes a plain cell to a cluster in place;
    /// an append that would overflow the cluster buffer degrades to `_`
    /// filler (still reported as success — the cursor does not move either
    /// way).
    fn combine(&mut self, cluster: &Utf8Cluster) -> bool {
        if self.screen.cx == 0 {
            return false;
        }
        let (x, y) = (self.screen.cx - 1, self.screen.cy);
        let Some(prev) = self.grid.get_cell_mut(x, y) else {
            return false;
        };
        if !matches!(prev.content, CellContent::Cluster(_)) {
            let byte = match prev.content {
                CellContent::Ascii(b) => b,
                _ => b' ',
            };
            prev.content = CellContent::Cluster(Utf8Cluster::from_ascii(byte));
        }
        let CellContent::Cluster(existing) = &mut prev.content else {
            return false;
        };
        if !existing.append(cluster.as_bytes()) {
            trace!("combining buffer overflow, cell degraded to filler");
            if existing.width() == 1 {
                prev.content = CellContent::Ascii(b'_');
            } else {
                existing.fill_with_underscores();
            }
        }
        true
    }

    /// Clear padding cells that writing `width` columns at the cursor would
    /// orphan: a run the new head lands in (clear back through its owner) and
    /// a run the new tail cuts into (clear forward).
    fn overwrite(&mut self, width: u16) {
        let (cx, cy) = (self.screen.cx, self.screen.cy);
        let sx = self.screen.sx;

        if self.grid.peek_cell(cx, cy).is_padding() {
            let mut x = cx;
            while x > 0 {
                if !self.grid.peek_cell(x, cy).is_padding() {
                    break;
                }
                self.grid.set_cell(x, cy, Cell::default());
                x -= 1;
            }
            // The wide head that owned the run.
            self.grid.set_cell(x, cy, Cell::default());
        }

        let mut x = cx + width;
        while x < sx {
            if !self.grid.peek_cell(x, cy).is_padding() {
                break;
            }
            self.grid.set_cell(x, cy, Cell::default());
            x += 1;
        }
    }

    // ── Cursor motion ───────────────────────────────────────────────

    /// Move the cursor up, stopping at the scroll region top (or row 0 when
    /// already above the region). A count of 0 means 1.
    pub fn cursor_up(&mut self, n: u16) {
        let n = n.max(1);
        let s = &mut self.screen;
        let room = if s.cy < s.rupper {
            s.cy
        } else {
            s.cy - s.rupper
        };
        s.cy -= n.min(room);
    }

    /// Move the cursor down, stopping at the scroll region bottom (or the
    /// viewport bottom when already below the region). A count of 0 means 1.
    pub fn cursor_down(&mut self, n: u16) {
        let n = n.max(1);
        let s = &mut self.screen;
        let room = if s.cy > s.rlower {
            s.sy - 1 - s.cy
        } else {
            s.rlower - s.cy
        };
        s.cy += n.min(room);
    }

    /// Move the cursor right, stopping at the last column. A count of 0
    /// means 1.
    pub fn cursor_right(&mut self, n: u16) {
        let n = n.max(1);
        let s = &mut self.screen;
        let room = (s.sx.saturating_sub(1)).saturating_sub(s.cx);
        s.cx += n.min(room);
    }

    /// Move the cursor left, stopping at column 0. A count of 0 means 1.
    pub fn cursor_left(&mut self, n: u16) {
        let n = n.max(1);
        let s = &mut self.screen;
        s.cx -= n.min(s.cx);
    }

    /// Move the cursor to `(x, y)`, clamped to the viewport.
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        let s = &mut self.screen;
        s.cx = x.min(s.sx.saturating_sub(1));
        s.cy = y.min(s.sy.saturating_sub(1));
    }

    /// Cursor to column 0.
    pub fn carriage_return(&mut self) {
        self.screen.cx = 0;
    }

    /// Cursor left one column; at column 0 of a soft-wrapped continuation,
    /// move to the last column of the previous row instead.
    pub fn backspace(&mut self) {
        let s = &mut self.screen;
        if s.cx == 0 {
            if s.cy > 0 && self.grid.line_wrapped(s.cy - 1) {
                s.cy -= 1;
                s.cx = s.sx - 1;
            }
        } else {
            s.cx -= 1;
        }
    }

    // ── Scrolling ───────────────────────────────────────────────────

    /// Line feed: advance one row, scrolling the region when the cursor is at
    /// its bottom. `wrapped` records (on the departed line) whether this was
    /// an implicit soft wrap.
    pub fn line_feed(&mut self, wrapped: bool) -> Redraw {
        let snap = self.snap();
        self.grid.set_line_wrapped(self.screen.cy, wrapped);
        if self.screen.cy == self.screen.rlower {
            self.grid
                .scroll_region_up(self.screen.rupper, self.screen.rlower);
        } else if self.screen.cy < self.screen.sy - 1 {
            self.screen.cy += 1;
        }
        self.redraw_at(snap, RedrawKind::LineFeed { wrapped })
    }

    /// Reverse index: move up one row, scrolling the region down when the
    /// cursor is at its top.
    pub fn reverse_index(&mut self) -> Redraw {
        let snap = self.snap();
        if self.screen.cy == self.screen.rupper {
            self.grid
                .scroll_region_down(self.screen.rupper, self.screen.rlower);
        } else if self.screen.cy > 0 {
            self.screen.cy -= 1;
        }
        self.redraw_at(snap, RedrawKind::ReverseIndex)
    }

    /// Set the scroll region. Bounds are clamped to the viewport; a region of
    /// fewer than two rows is ignored. The cursor moves home.
    pub fn set_scroll_region(&mut self, rupper: u16, rlower: u16) {
        let s = &mut self.screen;
        let rupper = rupper.min(s.sy.saturating_sub(1));
        let rlower = rlower.min(s.sy.saturating_sub(1));
        if rupper >= rlower {
            return;
        }
        s.cx = 0;
        s.cy = 0;
        s.rupper = rupper;
        s.rlower = rlower;
    }

    // ── Character insert/delete/clear ───────────────────────────────

    /// Insert blank cells at the cursor, shifting the rest of the row right.
    /// A count of 0 means 1; clamped to the columns remaining.
    pub fn insert_characters(&mut self, n: u16) -> Option<Redraw> {
        let n = n.max(1).min(self.screen.sx.saturating_sub(self.screen.cx));
        if n == 0 {
            return None;
        }
        let snap = self.snap();
        self.grid.insert_cells(self.screen.cx, self.screen.cy, n);
        Some(self.redraw_at(snap, RedrawKind::InsertCharacters(n)))
    }

    /// Delete cells at the cursor, shifting the rest of the row left.
    pub fn delete_characters(&mut self, n: u16) -> Option<Redraw> {
        let n = n.max(1).min(self.screen.sx.saturating_sub(self.screen.cx));
        if n == 0 {
            return None;
        }
        let snap = self.snap();
        self.grid.delete_cells(self.screen.cx, self.screen.cy, n);
        Some(self.redraw_at(snap, RedrawKind::DeleteCharacters(n)))
    }

    /// Blank cells at the cursor without shifting.
    pub fn clear_characters(&mut self, n: u16) -> Option<Redraw> {
        let n = n.max(1).min(self.screen.sx.saturating_sub(self.screen.cx));
        if n == 0 {
            return None;
        }
        let snap = self.snap();
        self.grid.clear(self.screen.cx, self.screen.cy, n, 1);
        Some(self.redraw_at(snap, RedrawKind::ClearCharacters(n)))
    }

    // ── Line insert/delete ──────────────────────────────────────────

    /// Insert blank lines at the cursor row.
    ///
    /// Inside the scroll region the shift is region-bounded: lines pushed
    /// past the region bottom are discarded, never promoted to history.
    /// Outside the region it is a plain viewport shift.
    pub fn insert_lines(&mut self, n: u16) -> Option<Redraw> {
        let n = n.max(1);
        let s = &self.screen;
        if s.cy < s.rupper || s.cy > s.rlower {
            let n = n.min(s.sy - s.cy);
            if n == 0 {
                return None;
            }
            let snap = self.snap();
            self.grid.insert_lines(self.screen.cy, n);
            return Some(self.redraw_at(snap, RedrawKind::InsertLines(n)));
        }
        let n = n.min(s.rlower + 1 - s.cy);
        if n == 0 {
            return None;
        }
        let snap = self.snap();
        self.grid
            .insert_lines_region(self.screen.rlower, self.screen.cy, n);
        Some(self.redraw_at(snap, RedrawKind::InsertLines(n)))
    }

    /// Delete lines at the cursor row; the region-bounded counterpart of
    /// [`insert_lines`](Self::insert_lines).
    pub fn delete_lines(&mut self, n: u16) -> Option<Redraw> {
        let n = n.max(1);
        let s = &self.screen;
        if s.cy < s.rupper || s.cy > s.rlower {
            let n = n.min(s.sy - s.cy);
            if n == 0 {
                return None;
            }
            let snap = self.snap();
            self.grid.delete_lines(self.screen.cy, n);
            return Some(self.redraw_at(snap, RedrawKind::DeleteLines(n)));
        }
        let n = n.min(s.rlower + 1 - s.cy);
        if n == 0 {
            return None;
        }
        let snap = self.snap();
        self.grid
            .delete_lines_region(self.screen.rlower, self.screen.cy, n);
        Some(self.redraw_at(snap, RedrawKind::DeleteLines(n)))
    }

    // ── Clears ──────────────────────────────────────────────────────

    /// Blank the cursor row.
    pub fn clear_line(&mut self) -> Redraw {
        let snap = self.snap();
        self.grid.clear(0, self.screen.cy, self.screen.sx, 1);
        self.redraw_at(snap, RedrawKind::ClearLine)
    }

    /// Blank from the cursor to the end of its row. With a wrap pending
    /// (`cx == sx`) there is nothing to the right; only the instruction is
    /// emitted.
    pub fn clear_end_of_line(&mut self) -> Redraw {
        let snap = self.snap();
        let (sx, cx, cy) = (self.screen.sx, self.screen.cx, self.screen.cy);
        if cx < sx {
            self.grid.clear(cx, cy, sx - cx, 1);
        }
        self.redraw_at(snap, RedrawKind::ClearEndOfLine)
    }

    /// Blank from the start of the row through the cursor (the whole row with
    /// a wrap pending).
    pub fn clear_start_of_line(&mut self) -> Redraw {
        let snap = self.snap();
        let (sx, cx, cy) = (self.screen.sx, self.screen.cx, self.screen.cy);
        if cx >= sx {
            self.grid.clear(0, cy, sx, 1);
        } else {
            self.grid.clear(0, cy, cx + 1, 1);
        }
        self.redraw_at(snap, RedrawKind::ClearStartOfLine)
    }

    /// Blank from the cursor to the end of the screen.
    ///
    /// When the cursor is at the origin and history is enabled this is a
    /// whole-screen clear, so the viewport is promoted to history instead of
    /// being blanked in place.
    pub fn clear_end_of_screen(&mut self) -> Redraw {
        let snap = self.snap();
        let (sx, sy, cx, cy) = (self.screen.sx, self.screen.sy, self.screen.cx, self.screen.cy);
        if cx == 0 && cy == 0 && self.grid.history_enabled() {
            self.grid.clear_into_history();
        } else {
            if cx < sx {
                self.grid.clear(cx, cy, sx - cx, 1);
            }
            if cy + 1 < sy {
                self.grid.clear(0, cy + 1, sx, sy - (cy + 1));
            }
        }
        self.redraw_at(snap, RedrawKind::ClearEndOfScreen)
    }

    /// Blank from the start of the screen through the cursor.
    pub fn clear_start_of_screen(&mut self) -> Redraw {
        let snap = self.snap();
        let (sx, cx, cy) = (self.screen.sx, self.screen.cx, self.screen.cy);
        if cy > 0 {
            self.grid.clear(0, 0, sx, cy);
        }
        if cx >= sx {
            self.grid.clear(0, cy, sx, 1);
        } else {
            self.grid.clear(0, cy, cx + 1, 1);
        }
        self.redraw_at(snap, RedrawKind::ClearStartOfScreen)
    }

    /// Blank the whole screen, promoting the viewport to history when history
    /// is enabled.
    pub fn clear_screen(&mut self) -> Redraw {
        let snap = self.snap();
        if self.grid.history_enabled() {
            self.grid.clear_into_history();
        } else {
            self.grid.clear(0, 0, self.screen.sx, self.screen.sy);
        }
        self.redraw_at(snap, RedrawKind::ClearScreen)
    }

    /// Discard all history lines. Affects no visible cell, so no instruction
    /// is emitted.
    pub fn clear_history(&mut self) {
        self.grid.drop_history();
    }

    // ── Modes ───────────────────────────────────────────────────────

    /// Show or hide the cursor.
    pub fn cursor_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::CURSOR, on);
    }

    /// Enable or disable insert mode.
    pub fn insert_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::INSERT, on);
    }

    /// Enable or disable autowrap.
    pub fn wrap_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::WRAP, on);
    }

    /// Enable or disable application cursor keys.
    pub fn kcursor_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::KCURSOR, on);
    }

    /// Enable or disable the application keypad.
    pub fn kkeypad_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::KKEYPAD, on);
    }

    /// Enable or disable bracketed paste.
    pub fn bracket_paste_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::BRACKETPASTE, on);
    }

    /// Switch mouse reporting to exactly the submodes given.
    pub fn mouse_mode_on(&mut self, mode: Modes) {
        self.screen.modes -= Modes::all_mouse();
        self.screen.modes |= mode & Modes::all_mouse();
    }

    /// Turn all mouse reporting off.
    pub fn mouse_mode_off(&mut self) {
        self.screen.modes -= Modes::all_mouse();
    }

    /// Enable or disable UTF-8 mouse coordinate encoding.
    pub fn utf8_mouse_mode(&mut self, on: bool) {
        self.screen.modes.set(Modes::MOUSE_UTF8, on);
    }

    // ── Whole-screen operations ─────────────────────────────────────

    /// VT100 alignment test: fill the viewport with `E`, home the cursor, and
    /// reset the scroll region.
    pub fn alignment_test(&mut self) -> Redraw {
        let snap = self.snap();
        for y in 0..self.screen.sy {
            for x in 0..self.screen.sx {
                self.grid.set_cell(x, y, Cell::ascii(b'E', Style::default()));
            }
        }
        self.screen.cx = 0;
        self.screen.cy = 0;
        self.screen.rupper = 0;
        self.screen.rlower = self.screen.sy.saturating_sub(1);
        self.redraw_at(snap, RedrawKind::AlignmentTest)
    }

    /// Reset the screen: default tabs, full-height scroll region,
    /// insert/keypad/mouse modes off, screen cleared, cursor home.
    pub fn reset(&mut self) -> Redraws {
        self.screen.reset_tabs();
        self.set_scroll_region(0, self.screen.sy.saturating_sub(1));
        self.insert_mode(false);
        self.kcursor_mode(false);
        self.kkeypad_mode(false);
        self.mouse_mode_off();
        let mut out = Redraws::new();
        out.push(self.clear_screen());
        self.cursor_move(0, 0);
        out
    }

    // ── Pass-through instructions ───────────────────────────────────

    /// Hand a selection payload to the driver. No grid mutation.
    pub fn send_selection(&mut self, data: &[u8]) -> Redraw {
        let snap = self.snap();
        self.redraw_at(snap, RedrawKind::SetSelection(data.to_vec()))
    }

    /// Hand raw bytes to the driver. No grid mutation.
    pub fn put_raw(&mut self, data: &[u8]) -> Redraw {
        let snap = self.snap();
        self.redraw_at(snap, RedrawKind::Raw(data.to_vec()))
    }

    // ── String writers ──────────────────────────────────────────────

    /// Write a plain string at the cursor.
    ///
    /// With `utf8` set, non-ASCII scalars become clusters measured by their
    /// display width; otherwise every byte is written as a single-column
    /// cell. `max_width` bounds the display width consumed: truncation that
    /// would split a wide character pads with spaces instead. The byte 0x01
    /// toggles the alternate-charset attribute rather than being drawn.
    pub fn put_text(
        &mut self,
        style: &Style,
        utf8: bool,
        max_width: Option<usize>,
        text: &str,
    ) -> Redraws {
        let mut out = Redraws::new();
        let mut style = *style;
        let mut used = 0usize;
        if utf8 {
            for ch in text.chars() {
                let more = if ch.is_ascii() {
                    self.put_span_byte(&mut out, &mut style, &mut used, max_width, ch as u8)
                } else {
                    self.put_span_char(&mut out, style, style, &mut used, max_width, ch)
                };
                if !more {
                    break;
                }
            }
        } else {
            for byte in text.bytes() {
                if !self.put_span_byte(&mut out, &mut style, &mut used, max_width, byte) {
                    break;
                }
            }
        }
        out
    }

    /// Write a string with inline `#[...]` style directives.
    ///
    /// Directives apply to a working copy of `style`; the caller's style is
    /// never modified, and `default` inside a directive refers back to it.
    /// A directive with no closing `]` ends the write. Unlike
    /// [`put_text`](Self::put_text), the charset toggle byte is not
    /// interpreted here.
    pub fn put_markup(
        &mut self,
        style: &Style,
        utf8: bool,
        max_width: Option<usize>,
        text: &str,
    ) -> Redraws {
        let mut out = Redraws::new();
        let base = *style;
        let mut current = *style;
        let mut used = 0usize;
        let bytes = text.as_bytes();
        let mut i = 0usize;
        while i < bytes.len() {
            if bytes[i] == b'#' && bytes.get(i + 1) == Some(&b'[') {
                let Some(offset) = memchr(b']', &bytes[i + 2..]) else {
                    break;
                };
                parse_style(&base, &mut current, &text[i + 2..i + 2 + offset]);
                i += 2 + offset + 1;
                continue;
            }
            if !utf8 {
                if let Some(max) = max_width
                    && used + 1 > max
                {
                    break;
                }
                used += 1;
                out.extend(self.put_char(&current, bytes[i]));
                i += 1;
                continue;
            }
            let Some(ch) = text[i..].chars().next() else {
                break;
            };
            if ch.is_ascii() {
                if let Some(max) = max_width
                    && used + 1 > max
                {
                    break;
                }
                used += 1;
                out.extend(self.put_char(&current, ch as u8));
                i += 1;
            } else {
                if !self.put_span_char(&mut out, current, base, &mut used, max_width, ch) {
                    break;
                }
                i += ch.len_utf8();
            }
        }
        out
    }

    /// One byte of a text stream: bounded by the width limit, with 0x01
    /// toggling the charset attribute instead of drawing.
    fn put_span_byte(
        &mut self,
        out: &mut Redraws,
        style: &mut Style,
        used: &mut usize,
        max_width: Option<usize>,
        byte: u8,
    ) -> bool {
        if let Some(max) = max_width
            && *used + 1 > max
        {
            return false;
        }
        if byte == 0x01 {
            style.attrs.toggle(Attrs::CHARSET);
            return true;
        }
        *used += 1;
        out.extend(self.put_char(style, byte));
        true
    }

    /// One non-ASCII scalar of a text stream. When the scalar's width would
    /// pass the limit, the remaining columns are filled with spaces in
    /// `pad_style` and the walk stops.
    fn put_span_char(
        &mut self,
        out: &mut Redraws,
        style: Style,
        pad_style: Style,
        used: &mut usize,
        max_width: Option<usize>,
        ch: char,
    ) -> bool {
        let cluster = Utf8Cluster::from_char(ch);
        let width = usize::from(cluster.width());
        if let Some(max) = max_width
            && *used + width > max
        {
            while *used < max {
                out.extend(self.put_char(&pad_style, b' '));
                *used += 1;
            }
            return false;
        }
        *used += width;
        out.extend(self.put_cell(&Cell::cluster(cluster, style)));
        true
    }

    // ── Cross-screen copy ───────────────────────────────────────────

    /// Re-inject a rectangle of another grid through the cell writer.
    ///
    /// `py`/`ny` address absolute source lines (history included). Rows past
    /// the source's populated extent clear the destination row; a span that
    /// reaches the source's right margin past its stored cells clears to end
    /// of line rather than writing blanks over existing content.
    pub fn copy<S: GridStore>(
        &mut self,
        src: &S,
        px: u16,
        py: u32,
        nx: u16,
        ny: u32,
    ) -> Redraws {
        let mut out = Redraws::new();
        let cx = self.screen.cx;
        let mut cy = self.screen.cy;
        let total = src.history_size() + u32::from(src.rows());
        for line in py..py.saturating_add(ny) {
            if line < total {
                let len = src.absolute_line_len(line);
                let right = px.saturating_add(nx);
                let to_margin = right == src.cols() && right > len;
                let (ax, bx) = (px.min(len), if to_margin { len } else { right });
                for x in ax..bx {
                    let cell = src.peek_absolute(x, line);
                    out.extend(self.put_cell(&cell));
                }
                if to_margin {
                    out.push(self.clear_end_of_line());
                }
            } else {
                out.push(self.clear_line());
            }
            cy = cy.saturating_add(1);
            self.cursor_move(cx, cy);
        }
        out
    }
}

/// Display width of a plain string, measured exactly as
/// [`ScreenWriter::put_text`] would consume it.
#[must_use]
pub fn text_width(utf8: bool, text: &str) -> usize {
    if utf8 {
        text.chars()
            .map(|ch| {
                if ch.is_ascii() {
                    1
                } else {
                    ch.width().unwrap_or(1)
                }
            })
            .sum()
    } else {
        text.len()
    }
}

/// Display width of a string after stripping `#[...]` style directives; an
/// unterminated directive swallows the rest of the string.
#[must_use]
pub fn markup_width(utf8: bool, text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut stripped = String::with_capacity(text.len());
    let mut run = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'#' && bytes.get(i + 1) == Some(&b'[') {
            stripped.push_str(&text[run..i]);
            match memchr(b']', &bytes[i + 2..]) {
                Some(offset) => i += 2 + offset + 1,
                None => i = bytes.len(),
            }
            run = i;
        } else {
            i += 1;
        }
    }
    stripped.push_str(&text[run..]);
    text_width(utf8, &stripped)
}
