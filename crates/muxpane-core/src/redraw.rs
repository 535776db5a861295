//! Redraw instructions: what a mutating operation asks the terminal driver to
//! do.
//!
//! Every grid-mutating operation returns the instruction(s) it produced
//! instead of pushing them into a shared out-parameter; the caller forwards
//! them, in order, to whatever turns them into escape sequences. An
//! instruction is a snapshot of the pre-operation cursor and scroll region
//! plus an operation-specific payload, and is meant to be consumed exactly
//! once.

use smallvec::SmallVec;

use crate::cell::{Cell, Utf8Cluster};

/// Identifier of the pane a write context originated from.
pub type PaneId = u32;

/// Operation payload of a redraw instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawKind {
    /// Draw one cell at the snapshot cursor.
    Cell(Cell),
    /// Forward a UTF-8 cluster verbatim (combining mark that could not attach
    /// to a stored cell).
    RawCluster(Utf8Cluster),
    /// Shift cells right from the snapshot cursor before the following draw.
    InsertCharacters(u16),
    /// Delete cells at the snapshot cursor, shifting the remainder left.
    DeleteCharacters(u16),
    /// Blank cells at the snapshot cursor without shifting.
    ClearCharacters(u16),
    /// Insert blank lines at the snapshot cursor row.
    InsertLines(u16),
    /// Delete lines at the snapshot cursor row.
    DeleteLines(u16),
    /// Blank the snapshot cursor row.
    ClearLine,
    /// Blank from the snapshot cursor to the end of its row.
    ClearEndOfLine,
    /// Blank from the start of the row through the snapshot cursor.
    ClearStartOfLine,
    /// Blank from the snapshot cursor to the end of the screen.
    ClearEndOfScreen,
    /// Blank from the start of the screen through the snapshot cursor.
    ClearStartOfScreen,
    /// Blank the whole screen.
    ClearScreen,
    /// Advance one row, scrolling the region if the cursor was at its bottom.
    /// `wrapped` records whether this was an implicit (soft-wrap) line feed.
    LineFeed { wrapped: bool },
    /// Move up one row, scrolling the region down if the cursor was at its
    /// top.
    ReverseIndex,
    /// Fill the screen with the alignment-test pattern.
    AlignmentTest,
    /// Pass a selection payload through to the driver.
    SetSelection(Vec<u8>),
    /// Pass raw bytes through to the driver.
    Raw(Vec<u8>),
}

/// One redraw instruction: pre-operation snapshot plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redraw {
    /// Originating pane, when the write context carries one.
    pub pane: Option<PaneId>,
    /// Cursor column before the operation.
    pub cx: u16,
    /// Cursor row before the operation.
    pub cy: u16,
    /// Scroll region top before the operation.
    pub rupper: u16,
    /// Scroll region bottom before the operation.
    pub rlower: u16,
    pub kind: RedrawKind,
}

/// Instructions produced by a single operation, in emission order.
///
/// Inline capacity of two covers the common worst case (insert-shift followed
/// by a cell draw); a wrapping write spills to three.
pub type Redraws = SmallVec<[Redraw; 2]>;
