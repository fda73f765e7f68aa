//! Background task spawning for the UI.
//!
//! Every task runs inside the app's `JoinSet`, reports back over the
//! `AppEvent` channel and turns a panic into `AppEvent::TaskPanicked`.

use crate::app::{App, AppEvent};
use crate::catalog::MovieId;
use crate::social::{FriendsState, UserSummary};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Returns `Err(panic_message)` if the future panics.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `work` on the app's task set and forward the events it yields.
fn spawn_task<F>(app: &mut App, task: &'static str, tx: &mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = Vec<AppEvent>> + Send + 'static,
{
    // Reap finished tasks so the set does not grow without bound
    while app.tasks.try_join_next().is_some() {}

    let tx = tx.clone();
    app.tasks.spawn(async move {
        let events = match catch_task_panic(work).await {
            Ok(events) => events,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                vec![AppEvent::TaskPanicked { task, error }]
            }
        };
        for event in events {
            if let Err(e) = tx.send(event).await {
                tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
                break;
            }
        }
    });
}

// ============================================================================
// Catalog
// ============================================================================

pub(super) fn spawn_initial_load(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let catalog = Arc::clone(&app.catalog);
    spawn_task(app, "initial_load", tx, async move {
        vec![AppEvent::InitialLoad(catalog.fetch_initial().await)]
    });
}

/// Retry page 1 after the fallback list was shown.
pub(super) fn spawn_retry_initial(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let catalog = Arc::clone(&app.catalog);
    app.set_status("Retrying catalog...");
    spawn_task(app, "retry_initial", tx, async move {
        vec![AppEvent::InitialLoad(catalog.retry_initial().await)]
    });
}

/// Request the next page unless one is already in flight.
pub(super) fn spawn_load_more(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.catalog.is_loading_more() || !app.catalog.has_more() {
        return;
    }
    let catalog = Arc::clone(&app.catalog);
    spawn_task(app, "load_more", tx, async move {
        vec![AppEvent::LoadMore(catalog.load_more().await)]
    });
}

pub(super) fn spawn_reset(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let catalog = Arc::clone(&app.catalog);
    spawn_task(app, "reset", tx, async move {
        catalog.reset_to_first_page().await;
        Vec::new()
    });
}

pub(super) fn spawn_trailer_lookup(app: &mut App, id: MovieId, tx: &mpsc::Sender<AppEvent>) {
    let tmdb = app.tmdb.clone();
    app.set_status("Looking up trailer...");
    spawn_task(app, "trailer", tx, async move {
        let result = tmdb.trailer_url(id).await.map_err(|e| e.user_message());
        vec![AppEvent::TrailerResolved { id, result }]
    });
}

// ============================================================================
// Friends
// ============================================================================

/// A write against the friends backend, started from the friends view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FriendAction {
    Accept(String),
    Reject(String),
    Remove(String),
}

pub(super) fn spawn_friends_refresh(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if !app.auth.is_authenticated() {
        app.set_status("Sign in with `reelswipe login` to see friends");
        return;
    }
    let client = app.social.clone();
    app.friends_loading = true;
    spawn_task(app, "friends_refresh", tx, async move {
        let mut state = FriendsState::new();
        state.refresh(&client).await;
        vec![AppEvent::FriendsLoaded(Box::new(state))]
    });
}

/// Run a friend action against a copy of the current state and send the
/// copy back. A failed action leaves the copy unchanged apart from its error.
pub(super) fn spawn_friend_action(
    app: &mut App,
    action: FriendAction,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.social.clone();
    let mut state = app.friends.clone();
    spawn_task(app, "friend_action", tx, async move {
        let result = match &action {
            FriendAction::Accept(id) => state
                .accept_request(&client, id)
                .await
                .map(|c| format!("You are now friends with {}", display_name(&c.friend))),
            FriendAction::Reject(id) => state
                .reject_request(&client, id)
                .await
                .map(|()| "Friend request rejected".to_string()),
            FriendAction::Remove(id) => state
                .remove_friend(&client, id)
                .await
                .map(|()| "Friend removed".to_string()),
        };
        let result = result.map_err(|e| e.user_message());
        vec![
            AppEvent::FriendsLoaded(Box::new(state)),
            AppEvent::FriendActionDone(result),
        ]
    });
}

/// Display name, or the username when none is set.
pub(super) fn display_name(user: &UserSummary) -> &str {
    if user.display_name.trim().is_empty() {
        &user.username
    } else {
        &user.display_name
    }
}
