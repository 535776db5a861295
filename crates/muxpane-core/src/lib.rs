#![forbid(unsafe_code)]

//! Host-agnostic pane screen engine.
//!
//! `muxpane-core` is the screen-state mutation core of a terminal-multiplexer
//! pane: it applies discrete editing operations (put character, cursor
//! motion, line/character insert and delete, scrolls, clears, mode changes,
//! inline styles) to a character grid, and returns the redraw instructions a
//! terminal driver needs to keep a live display in sync — all without any
//! host I/O.
//!
//! # Primary responsibilities
//!
//! - **Cell**: one ASCII byte or a bounded UTF-8 cluster plus its style; wide
//!   characters occupy a head cell and an explicit padding cell.
//! - **Style**: fg/bg indexes, attribute bitmask, and the
//!   `fg=red,bg=colour240,bold` inline style mini-language.
//! - **Screen**: cursor (with the pending-wrap sentinel), scroll region,
//!   modes, tab stops, selection overlay.
//! - **GridStore / Grid**: the storage contract the engine consumes, and a
//!   reference history + viewport implementation.
//! - **ScreenWriter**: every mutating operation — the cell writer with wrap,
//!   insert-mode, combining-mark, and wide-character handling; the region
//!   editor; the formatted string writers.
//! - **Redraw**: the one-shot instruction value handed to the terminal
//!   driver.
//!
//! # Design principles
//!
//! - **No I/O**: pure data + logic; the host owns bytes in and bytes out.
//! - **Deterministic**: identical operation sequences produce identical grid
//!   state and identical instruction streams.
//! - **Policy over errors**: impossible geometry clamps or drops silently;
//!   there is no error channel to thread through a terminal state machine.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod cell;
pub mod grid;
pub mod redraw;
pub mod screen;
pub mod style;
pub mod write;

pub use cell::{CLUSTER_CAPACITY, Cell, CellContent, Utf8Cluster};
pub use grid::{Grid, GridLine, GridStore};
pub use redraw::{PaneId, Redraw, RedrawKind, Redraws};
pub use screen::{Modes, Screen, Selection};
pub use style::{Attrs, COLOUR_DEFAULT, Style, StyleFlags, attribute_from_name, colour_from_name, parse_style};
pub use write::{ScreenWriter, markup_width, text_width};
