//! Keyboard and mouse input handling.
//!
//! Keys are dispatched by overlay, search mode and then the current view.
//! Mouse events only matter on the swipe view, where they drive the card's
//! gesture interpreter.

use crate::app::{App, AppEvent, FriendRow, View, MIN_RATING_STEP};
use crate::gesture::{pointer_input, CardEvent, Rating, SwipeDirection};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use tokio::sync::mpsc;

use super::helpers::{
    spawn_friend_action, spawn_friends_refresh, spawn_load_more, spawn_reset,
    spawn_retry_initial, spawn_trailer_lookup, FriendAction,
};
use super::Action;

/// Longest search term accepted from the keyboard.
const MAX_SEARCH_LENGTH: usize = 100;

/// Highest minimum-rating filter value.
const MAX_MIN_RATING: f32 = 10.0;

/// Main key dispatch.
pub(super) async fn handle_input(
    app: &mut App,
    key: KeyEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let KeyEvent {
        code, modifiers, ..
    } = key;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return Ok(Action::Continue);
    }

    if app.search_mode {
        handle_search_input(app, code);
        return Ok(Action::Continue);
    }

    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('?') => {
            app.show_help = true;
            return Ok(Action::Continue);
        }
        KeyCode::Tab => {
            switch_view(app, app.view.next(), event_tx);
            return Ok(Action::Continue);
        }
        KeyCode::BackTab => {
            switch_view(app, app.view.prev(), event_tx);
            return Ok(Action::Continue);
        }
        _ => {}
    }

    match app.view {
        View::Swipe => handle_swipe_input(app, code, event_tx).await?,
        View::Browse => handle_browse_input(app, code, event_tx),
        View::Dashboard => handle_dashboard_input(app, code).await?,
        View::Friends => handle_friends_input(app, code, event_tx).await?,
    }
    Ok(Action::Continue)
}

fn switch_view(app: &mut App, view: View, event_tx: &mpsc::Sender<AppEvent>) {
    app.view = view;
    app.clamp_selections();
    if view == View::Friends && app.friends.friends().is_empty() && !app.friends_loading {
        spawn_friends_refresh(app, event_tx);
    }
}

// ============================================================================
// Swipe View
// ============================================================================

async fn handle_swipe_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    let direction = match code {
        KeyCode::Left | KeyCode::Char('h') => Some(SwipeDirection::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(SwipeDirection::Right),
        KeyCode::Up | KeyCode::Char('k') => Some(SwipeDirection::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(SwipeDirection::Down),
        _ => None,
    };
    if let Some(direction) = direction {
        if let Some(event) = app.card.swipe(direction) {
            apply_card_event(app, event, event_tx).await?;
        }
        return Ok(());
    }

    match code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            if app.current_movie().is_some() {
                app.card.flip();
            }
        }
        KeyCode::Char('n') => {
            if app.advance_deck() {
                spawn_load_more(app, event_tx);
            }
        }
        KeyCode::Char('t') => {
            if let Some(id) = app.current_movie().map(|m| m.id) {
                spawn_trailer_lookup(app, id, event_tx);
            }
        }
        KeyCode::Char('r') => spawn_reset(app, event_tx),
        KeyCode::Char('R') => {
            if app.catalog.is_using_fallback() {
                spawn_retry_initial(app, event_tx);
            } else {
                app.set_status("Catalog is online");
            }
        }
        _ => {}
    }
    Ok(())
}

/// Feed a mouse event to the swipe card.
pub(super) async fn handle_mouse(
    app: &mut App,
    mouse: MouseEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.view != View::Swipe || app.show_help {
        return Ok(Action::Continue);
    }
    let Some(input) = pointer_input(&mouse, app.cell_size, app.card_area) else {
        return Ok(Action::Continue);
    };
    if let Some(event) = app.card.handle(input) {
        apply_card_event(app, event, event_tx).await?;
    }
    Ok(Action::Continue)
}

async fn apply_card_event(
    app: &mut App,
    event: CardEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    if app.apply_card_event(event).await? {
        spawn_load_more(app, event_tx);
    }
    Ok(())
}

// ============================================================================
// Browse View
// ============================================================================

fn handle_browse_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.nav_down();
            // Infinite scroll: reaching the last row asks for the next page
            if app.browse_at_bottom() {
                spawn_load_more(app, event_tx);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Enter => {
            if let Some(id) = app.selected_movie().map(|m| m.id) {
                app.show_in_deck(id);
            }
        }
        KeyCode::Char('/') => app.search_mode = true,
        KeyCode::Char('[') => app.move_genre_cursor(false),
        KeyCode::Char(']') => app.move_genre_cursor(true),
        KeyCode::Char('g') => app.toggle_genre_at_cursor(),
        KeyCode::Char('+') => {
            app.filter.min_rating = step_rating(app.filter.min_rating, MIN_RATING_STEP);
            app.clamp_selections();
        }
        KeyCode::Char('-') => {
            app.filter.min_rating = step_rating(app.filter.min_rating, -MIN_RATING_STEP);
            app.clamp_selections();
        }
        KeyCode::Char('c') => {
            app.filter = Default::default();
            app.browse_selected = 0;
        }
        KeyCode::Char('m') => spawn_load_more(app, event_tx),
        _ => {}
    }
}

fn step_rating(current: f32, step: f32) -> f32 {
    (current + step).clamp(0.0, MAX_MIN_RATING)
}

// ============================================================================
// Dashboard View
// ============================================================================

async fn handle_dashboard_input(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.nav_down(),
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Char('/') => app.search_mode = true,
        KeyCode::Char(c @ '1'..='4') => {
            let index = usize::from(c as u8 - b'1');
            app.dashboard_filter.toggle_status(Rating::ALL[index]);
            app.dashboard_selected = 0;
        }
        KeyCode::Char('+') => {
            app.dashboard_filter.min_rating =
                step_rating(app.dashboard_filter.min_rating, MIN_RATING_STEP);
            app.clamp_selections();
        }
        KeyCode::Char('-') => {
            app.dashboard_filter.min_rating =
                step_rating(app.dashboard_filter.min_rating, -MIN_RATING_STEP);
            app.clamp_selections();
        }
        KeyCode::Char('c') => {
            app.dashboard_filter.clear();
            app.dashboard_selected = 0;
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if let Some(title) = app.remove_selected_entry().await? {
                app.set_status(format!("Removed {title}"));
            }
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Friends View
// ============================================================================

async fn handle_friends_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.nav_down(),
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Char('r') => spawn_friends_refresh(app, event_tx),
        KeyCode::Char('a') => match app.selected_friend_row() {
            Some(FriendRow::Request(id)) => {
                spawn_friend_action(app, FriendAction::Accept(id), event_tx)
            }
            Some(FriendRow::Friend(_)) => app.set_status("Select a request to accept"),
            None => {}
        },
        KeyCode::Char('x') | KeyCode::Delete => match app.selected_friend_row() {
            Some(FriendRow::Request(id)) => {
                spawn_friend_action(app, FriendAction::Reject(id), event_tx)
            }
            Some(FriendRow::Friend(id)) => {
                spawn_friend_action(app, FriendAction::Remove(id), event_tx)
            }
            None => {}
        },
        KeyCode::Char('L') => {
            if app.sign_out().await? {
                app.set_status("Signed out, showing guest ratings");
            } else {
                app.set_status("Not signed in");
            }
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Search Mode
// ============================================================================

/// Typing edits the search term of the current list; Esc clears it.
fn handle_search_input(app: &mut App, code: KeyCode) {
    let term = match app.view {
        View::Dashboard => &mut app.dashboard_filter.search,
        _ => &mut app.filter.search_term,
    };
    match code {
        KeyCode::Esc => {
            term.clear();
            app.search_mode = false;
        }
        KeyCode::Enter => app.search_mode = false,
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if term.chars().count() < MAX_SEARCH_LENGTH {
                term.push(c);
            }
        }
        _ => {}
    }
    app.browse_selected = 0;
    app.dashboard_selected = 0;
}
