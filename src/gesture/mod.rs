//! Swipe-card gestures: pointer interpretation, card state and the terminal
//! mouse adapter.

mod card;
mod interpreter;
mod terminal;

pub use card::{CardEvent, PointerInput, SwipeCard};
pub use interpreter::{
    DragFeedback, GestureConfig, GestureInterpreter, GestureOutcome, Point, Rating,
    SwipeDirection, DEFAULT_SWIPE_COOLDOWN, DEFAULT_SWIPE_THRESHOLD_PX, DEFAULT_TAP_TOLERANCE_PX,
};
pub use terminal::{pointer_input, CellSize, DEFAULT_CELL_HEIGHT_PX, DEFAULT_CELL_WIDTH_PX};
