//! Screen state: cursor, scroll region, modes, tab stops, selection.
//!
//! One `Screen` per virtual terminal. It carries no cell storage of its own —
//! the grid store is borrowed alongside it by [`ScreenWriter`](crate::write::ScreenWriter)
//! for the duration of each operation.

use bitflags::bitflags;

use crate::style::Style;

/// Interval of the default tab stops.
const TAB_INTERVAL: u16 = 8;

bitflags! {
    /// Terminal mode bitset.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modes: u16 {
        /// Cursor is visible.
        const CURSOR         = 0x001;
        /// Insert mode: writes shift existing cells right.
        const INSERT         = 0x002;
        /// Cursor keys send application sequences.
        const KCURSOR        = 0x004;
        /// Keypad sends application sequences.
        const KKEYPAD        = 0x008;
        /// Autowrap: writes past the right margin continue on the next line.
        const WRAP           = 0x010;
        /// Mouse press/release reporting.
        const MOUSE_STANDARD = 0x020;
        /// Mouse button-drag reporting.
        const MOUSE_BUTTON   = 0x040;
        /// Mouse any-motion reporting.
        const MOUSE_ANY      = 0x080;
        /// Mouse coordinates are UTF-8 encoded.
        const MOUSE_UTF8     = 0x100;
        /// Bracketed paste.
        const BRACKETPASTE   = 0x200;
    }
}

impl Modes {
    /// The mouse reporting submodes (not including the UTF-8 encoding flag).
    #[must_use]
    pub fn all_mouse() -> Self {
        Self::MOUSE_STANDARD | Self::MOUSE_BUTTON | Self::MOUSE_ANY
    }
}

/// A selection overlay: a cell range plus the style to draw it in.
///
/// Selections never touch stored cells; they only substitute the style in
/// redraw instructions for writes that land inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start_x: u16,
    pub start_y: u16,
    pub end_x: u16,
    pub end_y: u16,
    pub style: Style,
}

impl Selection {
    /// Whether `(x, y)` lies inside the (possibly backward) selection range.
    #[must_use]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        let (start, end) = if (self.start_y, self.start_x) <= (self.end_y, self.end_x) {
            ((self.start_y, self.start_x), (self.end_y, self.end_x))
        } else {
            ((self.end_y, self.end_x), (self.start_y, self.start_x))
        };
        if y < start.0 || y > end.0 {
            return false;
        }
        if start.0 == end.0 {
            return x >= start.1 && x <= end.1;
        }
        if y == start.0 {
            return x >= start.1;
        }
        if y == end.0 {
            return x <= end.1;
        }
        true
    }
}

/// Cursor, region, and mode state for one virtual terminal.
///
/// Invariants (maintained by [`ScreenWriter`](crate::write::ScreenWriter)):
///
/// - `cx` is in `[0, sx]`; `cx == sx` is the pending-wrap sentinel ("the last
///   write filled the final column"), not a drawable column.
/// - `cy` is in `[0, sy - 1]`.
/// - `rupper < rlower`, both in `[0, sy - 1]`.
#[derive(Debug, Clone)]
pub struct Screen {
    /// Viewport width in columns.
    pub(crate) sx: u16,
    /// Viewport height in rows.
    pub(crate) sy: u16,
    /// Cursor column.
    pub(crate) cx: u16,
    /// Cursor row.
    pub(crate) cy: u16,
    /// Scroll region top row.
    pub(crate) rupper: u16,
    /// Scroll region bottom row (inclusive).
    pub(crate) rlower: u16,
    pub(crate) modes: Modes,
    /// Tab stop per column.
    pub(crate) tabs: Vec<bool>,
    pub(crate) selection: Option<Selection>,
}

impl Screen {
    /// Create a screen for an `sx` by `sy` viewport.
    ///
    /// Starts with the cursor home, the scroll region covering the full
    /// height, cursor visible, and autowrap on.
    #[must_use]
    pub fn new(sx: u16, sy: u16) -> Self {
        let mut screen = Self {
            sx,
            sy,
            cx: 0,
            cy: 0,
            rupper: 0,
            rlower: sy.saturating_sub(1),
            modes: Modes::CURSOR | Modes::WRAP,
            tabs: Vec::new(),
            selection: None,
        };
        screen.reset_tabs();
        screen
    }

    /// Viewport width in columns.
    #[must_use]
    pub fn sx(&self) -> u16 {
        self.sx
    }

    /// Viewport height in rows.
    #[must_use]
    pub fn sy(&self) -> u16 {
        self.sy
    }

    /// Cursor column; equals [`sx`](Self::sx) when a wrap is pending.
    #[must_use]
    pub fn cx(&self) -> u16 {
        self.cx
    }

    /// Cursor row.
    #[must_use]
    pub fn cy(&self) -> u16 {
        self.cy
    }

    /// Scroll region top row.
    #[must_use]
    pub fn rupper(&self) -> u16 {
        self.rupper
    }

    /// Scroll region bottom row (inclusive).
    #[must_use]
    pub fn rlower(&self) -> u16 {
        self.rlower
    }

    /// Current mode bitset.
    #[must_use]
    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// Restore the default tab stops (every eighth column).
    pub fn reset_tabs(&mut self) {
        self.tabs = (0..self.sx)
            .map(|x| x > 0 && x % TAB_INTERVAL == 0)
            .collect();
    }

    /// Whether column `x` has a tab stop.
    #[must_use]
    pub fn is_tab_stop(&self, x: u16) -> bool {
        self.tabs.get(x as usize).copied().unwrap_or(false)
    }

    /// Install a selection overlay.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    /// Remove the selection overlay.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The active selection overlay, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }
}
