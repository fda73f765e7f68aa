//! Mapping from crossterm mouse events to pointer input.
//!
//! Terminals report mouse positions in cells. Gesture thresholds are in
//! pixels, so cell coordinates are scaled by a configurable cell size and
//! placed at the cell centre.
//!
//! Terminals have no click event of their own. A press and release within
//! the tap tolerance flips the card through the release, so
//! [`PointerInput::Click`] is never produced here.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use super::card::PointerInput;
use super::interpreter::Point;

pub const DEFAULT_CELL_WIDTH_PX: f64 = 8.0;
pub const DEFAULT_CELL_HEIGHT_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width_px: DEFAULT_CELL_WIDTH_PX,
            height_px: DEFAULT_CELL_HEIGHT_PX,
        }
    }
}

impl CellSize {
    pub fn to_point(&self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * self.width_px,
            (f64::from(row) + 0.5) * self.height_px,
        )
    }
}

/// Translate a left-button mouse event. Other buttons and plain moves map
/// to nothing.
///
/// `card` is where the card was last drawn, in cells. When known, a press
/// outside it is ignored and a drag that crosses its edge becomes
/// [`PointerInput::Leave`], which finishes the gesture there.
pub fn pointer_input(
    event: &MouseEvent,
    cell: CellSize,
    card: Option<Rect>,
) -> Option<PointerInput> {
    let point = cell.to_point(event.column, event.row);
    let inside = card.is_none_or(|r| r.contains(Position::new(event.column, event.row)));
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => Some(PointerInput::Down(point)),
        MouseEventKind::Drag(MouseButton::Left) if inside => Some(PointerInput::Move(point)),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerInput::Leave(point)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerInput::Up(point)),
        _ => None,
    }
}
