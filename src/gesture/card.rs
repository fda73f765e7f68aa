//! Swipe card: one movie, a front and back face, and a gesture interpreter.

use tokio::time::Instant;

use super::interpreter::{
    DragFeedback, GestureConfig, GestureInterpreter, GestureOutcome, Point, Rating,
    SwipeDirection,
};
use crate::catalog::MovieId;

/// Raw pointer input delivered to a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up(Point),
    Leave(Point),
    /// Trailing click some hosts deliver after a release.
    Click,
}

/// What a card reports to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    Rated {
        movie_id: MovieId,
        rating: Rating,
        direction: SwipeDirection,
    },
    Flipped {
        is_flipped: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SwipeCard {
    interpreter: GestureInterpreter,
    movie_id: Option<MovieId>,
    is_flipped: bool,
    swipe_direction: Option<SwipeDirection>,
    animating_until: Option<Instant>,
    drag: Option<DragFeedback>,
    /// The release already flipped; swallow the trailing click.
    tap_consumed: bool,
}

impl Default for SwipeCard {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl SwipeCard {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            interpreter: GestureInterpreter::new(config),
            movie_id: None,
            is_flipped: false,
            swipe_direction: None,
            animating_until: None,
            drag: None,
            tap_consumed: false,
        }
    }

    pub fn movie_id(&self) -> Option<MovieId> {
        self.movie_id
    }

    /// Show a different movie. A new movie always starts on the front face.
    pub fn set_movie(&mut self, id: Option<MovieId>) {
        if self.movie_id != id {
            self.movie_id = id;
            self.is_flipped = false;
            self.drag = None;
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn flip(&mut self) -> bool {
        self.is_flipped = !self.is_flipped;
        self.is_flipped
    }

    /// True while the exit animation of the last swipe is running.
    pub fn is_animating(&self) -> bool {
        self.animating_until.is_some_and(|until| Instant::now() < until)
    }

    /// Direction of the swipe being animated, if any.
    pub fn swipe_direction(&self) -> Option<SwipeDirection> {
        if self.is_animating() {
            self.swipe_direction
        } else {
            None
        }
    }

    /// Live drag state while the pointer is held.
    pub fn drag(&self) -> Option<&DragFeedback> {
        self.drag.as_ref()
    }

    /// Hint for the current drag direction, once the card has moved.
    pub fn drag_hint(&self) -> Option<&'static str> {
        self.drag
            .as_ref()
            .filter(|d| d.distance > 0.0)
            .map(DragFeedback::hint)
    }

    pub fn handle(&mut self, input: PointerInput) -> Option<CardEvent> {
        let outcome = match input {
            PointerInput::Down(p) => {
                self.tap_consumed = false;
                self.drag = None;
                self.interpreter.pointer_down(p.x, p.y);
                None
            }
            PointerInput::Move(p) => {
                self.drag = self.interpreter.pointer_move(p.x, p.y);
                None
            }
            PointerInput::Up(p) => {
                self.drag = None;
                self.interpreter.pointer_up(p.x, p.y)
            }
            PointerInput::Leave(p) => {
                self.drag = None;
                self.interpreter.pointer_leave(p.x, p.y)
            }
            PointerInput::Click => {
                if std::mem::take(&mut self.tap_consumed) {
                    None
                } else {
                    self.interpreter.click()
                }
            }
        };

        match outcome? {
            GestureOutcome::Tap => {
                if !matches!(input, PointerInput::Click) {
                    self.tap_consumed = true;
                }
                Some(CardEvent::Flipped {
                    is_flipped: self.flip(),
                })
            }
            // A completed pointer gesture always rates, even mid-animation
            GestureOutcome::Swipe(direction) => self.rate(direction),
        }
    }

    /// Rate without a pointer gesture (keyboard). Ignored while the previous
    /// swipe is still animating, so a held key does not rate every card.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<CardEvent> {
        if self.is_animating() {
            return None;
        }
        self.rate(direction)
    }

    fn rate(&mut self, direction: SwipeDirection) -> Option<CardEvent> {
        let movie_id = self.movie_id?;
        self.swipe_direction = Some(direction);
        self.animating_until = Some(Instant::now() + self.interpreter.config().swipe_cooldown);
        Some(CardEvent::Rated {
            movie_id,
            rating: direction.rating(),
            direction,
        })
    }
}
