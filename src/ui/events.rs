//! Background task event processing.

use crate::app::{App, AppEvent};
use crate::catalog::{CatalogEvent, FetchInitialOutcome, LoadMoreOutcome};
use crate::util::open_in_browser;
use tokio::sync::mpsc;

use super::helpers::spawn_load_more;

/// Apply the result of a background task to the app.
pub(super) async fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match event {
        AppEvent::Catalog(event) => handle_catalog_event(app, event),

        AppEvent::InitialLoad(outcome) => {
            app.refresh_movies();
            match outcome {
                FetchInitialOutcome::Loaded(count) => {
                    tracing::debug!(count, "Initial catalog load finished");
                    app.set_status(format!("Loaded {count} movies"));
                }
                FetchInitialOutcome::Fallback => {
                    let reason = app
                        .catalog
                        .last_error()
                        .unwrap_or_else(|| "catalog unavailable".to_string());
                    app.set_status(format!("Offline list shown ({reason}), [R] to retry"));
                }
                FetchInitialOutcome::AlreadyStarted => {}
            }
        }

        AppEvent::LoadMore(outcome) => match outcome {
            LoadMoreOutcome::Loaded(added) => {
                tracing::debug!(added, page = app.catalog.current_page(), "Loaded more movies");
                app.refresh_movies();
                if app.wants_more_movies() {
                    spawn_load_more(app, event_tx);
                }
            }
            LoadMoreOutcome::Failed => {
                if let Some(error) = app.catalog.take_error() {
                    app.set_status(format!("Could not load more movies: {error}"));
                }
                app.recover_deck();
                app.refresh_movies();
            }
            LoadMoreOutcome::AtLastPage => {
                app.recover_deck();
                app.refresh_movies();
            }
            LoadMoreOutcome::Busy | LoadMoreOutcome::NotReady | LoadMoreOutcome::Superseded => {}
        },

        AppEvent::FriendsLoaded(state) => {
            app.friends_loading = false;
            if let Some(error) = state.error() {
                app.set_status(error.to_string());
            }
            app.friends = *state;
            app.clamp_selections();
        }

        AppEvent::FriendActionDone(result) => match result {
            Ok(message) => app.set_status(message),
            Err(error) => app.set_status(error),
        },

        AppEvent::TrailerResolved { id, result } => {
            // Ignore lookups for a card the user already swiped away
            if app.current_movie().map(|m| m.id) != Some(id) {
                tracing::debug!(movie_id = %id, "Dropping stale trailer lookup");
                return;
            }
            match result {
                Ok(Some(url)) => match open_in_browser(&url) {
                    Ok(()) => app.set_status("Opening trailer..."),
                    Err(e) => app.set_status(e.to_string()),
                },
                Ok(None) => app.set_status("No trailer available"),
                Err(error) => app.set_status(format!("Trailer lookup failed: {error}")),
            }
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.friends_loading = false;
            app.set_status(format!("Internal error in {task}"));
        }
    }
}

fn handle_catalog_event(app: &mut App, event: CatalogEvent) {
    match event {
        CatalogEvent::PageLoaded { page, added } => {
            tracing::trace!(page, added, "Catalog page event");
            app.refresh_movies();
        }
        CatalogEvent::RuntimeResolved { id, minutes } => {
            if let Some(movie) = app.movies.iter_mut().find(|m| m.id == id) {
                movie.duration_minutes = minutes;
                app.needs_redraw = true;
            }
        }
        CatalogEvent::Reset => {
            app.deck_index = 0;
            app.refresh_movies();
            app.set_status("Back to the first page");
        }
        // The matching InitialLoad or LoadMore outcome sets the status line
        CatalogEvent::FetchFailed { page, error } => {
            tracing::debug!(page, error = %error, "Catalog fetch failed");
        }
    }
}
