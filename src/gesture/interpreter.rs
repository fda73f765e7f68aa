//! Pointer gesture interpreter.
//!
//! Turns a down → move* → up sequence into at most one outcome: a directional
//! swipe (a rating) or a tap (flip the card). Movement that is too long to be a
//! tap but too short to be a swipe produces nothing, so a slow drag is never
//! mistaken for a flip.

use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Minimum dominant-axis travel, in pixels, for a gesture to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 100.0;

/// Maximum total travel, in pixels, for a gesture to count as a tap.
pub const DEFAULT_TAP_TOLERANCE_PX: f64 = 5.0;

/// How long taps are suppressed after a swipe completes.
pub const DEFAULT_SWIPE_COOLDOWN: Duration = Duration::from_millis(300);

// ============================================================================
// Configuration
// ============================================================================

/// Tunable thresholds for swipe/tap disambiguation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub swipe_threshold_px: f64,
    pub tap_tolerance_px: f64,
    pub swipe_cooldown: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            tap_tolerance_px: DEFAULT_TAP_TOLERANCE_PX,
            swipe_cooldown: DEFAULT_SWIPE_COOLDOWN,
        }
    }
}

// ============================================================================
// Outcome Types
// ============================================================================

/// A position in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// The four swipe directions a card can leave in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction of the dominant axis of `(dx, dy)`.
    ///
    /// Screen coordinates: y grows downwards. Ties go to the vertical axis.
    pub fn from_delta(dx: f64, dy: f64) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if dy < 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// The rating a swipe in this direction records.
    pub fn rating(self) -> Rating {
        match self {
            Self::Right => Rating::NotSeenLiked,
            Self::Left => Rating::NotSeenDisliked,
            Self::Up => Rating::SeenLiked,
            Self::Down => Rating::SeenDisliked,
        }
    }

    /// Hint shown while the card is being dragged this way.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Right => "⭐ Want to watch",
            Self::Left => "❌ Skip",
            Self::Up => "❤️ Loved it!",
            Self::Down => "👎 Not for me",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A user's verdict on a movie.
///
/// Serialized in kebab-case (`seen-liked`, `not-seen-disliked`, ...) so stored
/// preference logs stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    SeenLiked,
    SeenDisliked,
    NotSeenLiked,
    NotSeenDisliked,
}

impl Rating {
    pub const ALL: [Rating; 4] = [
        Rating::SeenLiked,
        Rating::SeenDisliked,
        Rating::NotSeenLiked,
        Rating::NotSeenDisliked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SeenLiked => "seen-liked",
            Self::SeenDisliked => "seen-disliked",
            Self::NotSeenLiked => "not-seen-liked",
            Self::NotSeenDisliked => "not-seen-disliked",
        }
    }

    /// Parse the kebab-case name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Dashboard badge text.
    pub fn badge(self) -> &'static str {
        match self {
            Self::SeenLiked => "Seen & Liked",
            Self::SeenDisliked => "Not Liked",
            Self::NotSeenLiked => "Want to Watch",
            Self::NotSeenDisliked => "Skipped",
        }
    }

    pub fn is_seen(self) -> bool {
        matches!(self, Self::SeenLiked | Self::SeenDisliked)
    }

    pub fn is_liked(self) -> bool {
        matches!(self, Self::SeenLiked | Self::NotSeenLiked)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed gesture meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Swipe(SwipeDirection),
    Tap,
}

/// Live drag state for visual feedback. Never decides an outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub delta: Point,
    pub distance: f64,
    pub direction: SwipeDirection,
}

impl DragFeedback {
    pub fn hint(&self) -> &'static str {
        self.direction.hint()
    }
}

// ============================================================================
// Interpreter
// ============================================================================

/// Classifies one pointer interaction at a time.
///
/// The session (start/end/delta) is overwritten by every `pointer_down`.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    start: Point,
    end: Point,
    current_delta: Point,
    is_dragging: bool,
    /// Taps are suppressed until this instant after a swipe.
    swipe_until: Option<Instant>,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            start: Point::default(),
            end: Point::default(),
            current_delta: Point::default(),
            is_dragging: false,
            swipe_until: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Live offset from the pointer-down position (zero when idle).
    pub fn current_delta(&self) -> Point {
        self.current_delta
    }

    /// True while the post-swipe cooldown is running.
    pub fn was_swipe(&self) -> bool {
        self.swipe_until.is_some_and(|until| Instant::now() < until)
    }

    /// Distance between the last gesture's start and end.
    pub fn last_movement(&self) -> f64 {
        Point::new(self.end.x - self.start.x, self.end.y - self.start.y).magnitude()
    }

    /// Pointer or touch pressed. Starts a new session.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let point = Point::new(x, y);
        if !point.is_finite() {
            tracing::debug!(x, y, "Ignoring pointer down with non-finite coordinates");
            return;
        }
        self.start = point;
        self.end = point;
        self.current_delta = Point::default();
        self.is_dragging = true;
    }

    /// Pointer moved while pressed. Updates the live delta only.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<DragFeedback> {
        if !self.is_dragging {
            return None;
        }
        let point = Point::new(x, y);
        if !point.is_finite() {
            return None;
        }
        self.current_delta = Point::new(point.x - self.start.x, point.y - self.start.y);
        Some(DragFeedback {
            delta: self.current_delta,
            distance: self.current_delta.magnitude(),
            direction: SwipeDirection::from_delta(self.current_delta.x, self.current_delta.y),
        })
    }

    /// Pointer released. Finalizes the session and emits at most one outcome.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<GestureOutcome> {
        if !self.is_dragging {
            return None;
        }
        let point = Point::new(x, y);
        // Keep the last known position if the release coordinates are garbage
        self.end = if point.is_finite() {
            point
        } else {
            Point::new(
                self.start.x + self.current_delta.x,
                self.start.y + self.current_delta.y,
            )
        };
        self.is_dragging = false;
        self.current_delta = Point::default();
        self.classify()
    }

    /// Pointer left the card. Finalizes like `pointer_up` if still pressed.
    pub fn pointer_leave(&mut self, x: f64, y: f64) -> Option<GestureOutcome> {
        if !self.is_dragging {
            return None;
        }
        self.pointer_up(x, y)
    }

    /// A click event trailing the last interaction.
    ///
    /// Flips only when no swipe cooldown is running and the last interaction
    /// stayed within the tap tolerance.
    pub fn click(&self) -> Option<GestureOutcome> {
        if !self.was_swipe() && self.last_movement() < self.config.tap_tolerance_px {
            Some(GestureOutcome::Tap)
        } else {
            tracing::trace!(movement = self.last_movement(), "Ignoring click after movement");
            None
        }
    }

    fn classify(&mut self) -> Option<GestureOutcome> {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;

        if dx.abs().max(dy.abs()) > self.config.swipe_threshold_px {
            let direction = SwipeDirection::from_delta(dx, dy);
            self.swipe_until = Some(Instant::now() + self.config.swipe_cooldown);
            tracing::debug!(dx, dy, direction = direction.name(), "Swipe detected");
            return Some(GestureOutcome::Swipe(direction));
        }

        let magnitude = dx.hypot(dy);
        if magnitude < self.config.tap_tolerance_px && !self.was_swipe() {
            Some(GestureOutcome::Tap)
        } else {
            tracing::trace!(magnitude, "Movement neither swipe nor tap");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
