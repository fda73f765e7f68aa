use crate::auth::AuthState;
use crate::catalog::{
    unique_genres, CatalogCache, CatalogEvent, CatalogFilter, FetchInitialOutcome,
    LoadMoreOutcome, Movie, MovieId,
};
use crate::config::Config;
use crate::dashboard::{self, DashboardEntry, DashboardFilter};
use crate::gesture::{CardEvent, CellSize, SwipeCard};
use crate::preferences::Preferences;
use crate::remote;
use crate::session::UserSession;
use crate::social::{FriendsState, SocialClient};
use crate::storage::Storage;
use crate::tmdb::TmdbClient;
use anyhow::{Context, Result};
use ratatui::layout::Rect;
use secrecy::SecretString;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// How long a status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Start loading the next page once this few cards remain in the deck.
pub const PREFETCH_REMAINING: usize = 3;

/// Step for the minimum-rating filter keys.
pub const MIN_RATING_STEP: f32 = 0.5;

// ============================================================================
// View and Event Types
// ============================================================================

/// Top-level screens, cycled with Tab / Shift-Tab in [`View::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One card at a time; swipe or arrow keys to rate
    Swipe,
    /// Filterable catalog list
    Browse,
    /// Rated movies
    Dashboard,
    /// Friends and incoming requests (requires sign-in)
    Friends,
}

impl View {
    pub const ALL: [View; 4] = [View::Swipe, View::Browse, View::Dashboard, View::Friends];

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            View::Swipe => "Swipe",
            View::Browse => "Browse",
            View::Dashboard => "My Movies",
            View::Friends => "Friends",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Results of background work, delivered to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Forwarded from the catalog's change channel.
    Catalog(CatalogEvent),
    InitialLoad(FetchInitialOutcome),
    LoadMore(LoadMoreOutcome),
    /// A refreshed copy of the friends lists, swapped in whole.
    FriendsLoaded(Box<FriendsState>),
    /// A friend request or removal finished; the text goes to the status line.
    FriendActionDone(Result<String, String>),
    /// `Ok(None)` means the movie has no trailer.
    TrailerResolved {
        id: MovieId,
        result: Result<Option<String>, String>,
    },
    /// A spawned task panicked. The UI reports it and keeps running.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// App
// ============================================================================

/// Central application state.
///
/// Owns the backend clients, the signed-in identity, the swipe deck and the
/// per-view selections. The UI loop mutates it in response to input and
/// [`AppEvent`]s; rendering only reads it.
///
/// # Deck and catalog
///
/// `movies` is a snapshot of the catalog's master list. `deck_index` may sit
/// one past its end while the deck waits for the next page to arrive;
/// [`App::current_movie`] is `None` in that state and the swipe view shows
/// a loading card.
pub struct App {
    pub storage: Storage,
    pub catalog: Arc<CatalogCache>,
    pub tmdb: TmdbClient,
    pub social: SocialClient,

    // Identity
    pub auth: AuthState,
    pub session: UserSession,
    pub preferences: Preferences,
    pub friends: FriendsState,

    // Swipe deck
    /// Snapshot of the catalog, refreshed on every catalog event
    pub movies: Vec<Movie>,
    pub deck_index: usize,
    pub card: SwipeCard,
    pub cell_size: CellSize,
    /// Animation state at the last tick
    pub card_animating: bool,
    /// Cells the card occupied in the last frame
    pub card_area: Option<Rect>,

    // UI state
    pub view: View,
    pub show_help: bool,
    pub browse_selected: usize,
    pub filter: CatalogFilter,
    /// Index into the genre list for the toggle key
    pub genre_cursor: usize,
    /// Typing edits the search term of the current list view
    pub search_mode: bool,
    pub dashboard_filter: DashboardFilter,
    pub dashboard_selected: usize,
    pub friends_selected: usize,
    pub friends_loading: bool,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    /// Background work spawned by the UI, aborted when the app drops
    pub tasks: JoinSet<()>,
}

impl App {
    /// Build the app from configuration and restore the persisted identity.
    ///
    /// Catalog change notifications are forwarded to `event_tx` as
    /// [`AppEvent::Catalog`]. Nothing is fetched yet; the UI loop starts
    /// the initial catalog load.
    ///
    /// A missing TMDB key is not an error. The catalog fetch will fail and
    /// the built-in list is shown instead.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP client cannot be built
    /// - A configured base URL does not parse
    /// - The stored sign-in, session or preference log cannot be read or
    ///   written
    pub async fn init(
        config: &Config,
        storage: Storage,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self> {
        let http = remote::build_client().context("Failed to build HTTP client")?;

        let api_key = config.tmdb_api_key().unwrap_or_else(|| {
            tracing::warn!("No TMDB API key configured, the built-in list will be shown");
            SecretString::from(String::new())
        });
        let tmdb = TmdbClient::new(http.clone(), &config.tmdb_base_url, api_key)
            .context("Invalid tmdb_base_url")?;
        let mut social =
            SocialClient::new(http, &config.backend_url).context("Invalid backend_url")?;

        let auth = AuthState::restore(&storage)
            .await
            .context("Failed to restore sign-in")?;
        let mut session = UserSession::load_or_create(&storage)
            .await
            .context("Failed to load session")?;
        auth.sync_session(&storage, &mut session)
            .await
            .context("Failed to update session")?;
        social.set_token(auth.token().cloned());
        let preferences = Preferences::load(storage.clone(), session.identifier())
            .await
            .context("Failed to load preferences")?;

        let (catalog_tx, mut catalog_rx) = mpsc::channel::<CatalogEvent>(64);
        let catalog = Arc::new(
            CatalogCache::new(
                Arc::new(tmdb.clone()),
                storage.clone(),
                config.catalog_config(),
            )
            .with_events(catalog_tx),
        );
        let mut tasks = JoinSet::new();
        tasks.spawn(async move {
            while let Some(event) = catalog_rx.recv().await {
                if event_tx.send(AppEvent::Catalog(event)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            storage,
            catalog,
            tmdb,
            social,
            auth,
            session,
            preferences,
            friends: FriendsState::new(),
            movies: Vec::new(),
            deck_index: 0,
            card: SwipeCard::new(config.gesture_config()),
            cell_size: config.cell_size(),
            card_animating: false,
            card_area: None,
            view: View::Swipe,
            show_help: false,
            browse_selected: 0,
            filter: CatalogFilter::default(),
            genre_cursor: 0,
            search_mode: false,
            dashboard_filter: DashboardFilter::default(),
            dashboard_selected: 0,
            friends_selected: 0,
            friends_loading: false,
            status_message: None,
            needs_redraw: true,
            tasks,
        })
    }

    // ========================================================================
    // Catalog and Deck
    // ========================================================================

    /// Re-read the catalog into the local snapshot and clamp selections.
    pub fn refresh_movies(&mut self) {
        self.movies = self.catalog.items();
        if self.deck_index > self.movies.len() {
            self.deck_index = 0;
        }
        self.clamp_selections();
        self.sync_card();
        self.needs_redraw = true;
    }

    /// The movie on the swipe card, if the deck is not waiting on a page.
    pub fn current_movie(&self) -> Option<&Movie> {
        self.movies.get(self.deck_index)
    }

    fn sync_card(&mut self) {
        let id = self.current_movie().map(|m| m.id);
        self.card.set_movie(id);
    }

    /// Move to the next card. At the end of the deck this waits on the next
    /// page when there is one and wraps to the first card otherwise.
    ///
    /// Returns true when more movies should be requested.
    pub fn advance_deck(&mut self) -> bool {
        let len = self.movies.len();
        if self.deck_index >= len {
            // Already waiting past the last card; stay put unless no page is coming
            if !self.catalog.has_more() {
                self.deck_index = 0;
            }
        } else if self.deck_index + 1 < len || self.catalog.has_more() {
            self.deck_index += 1;
        } else {
            self.deck_index = 0;
        }
        self.sync_card();
        self.wants_more_movies()
    }

    /// The page a waiting deck asked for will not arrive. Step back to the
    /// last card so the next advance asks again, or wrap when the catalog
    /// has no more pages.
    pub fn recover_deck(&mut self) {
        if self.deck_index < self.movies.len() {
            return;
        }
        self.deck_index = if self.catalog.has_more() {
            self.movies.len().saturating_sub(1)
        } else {
            0
        };
        self.sync_card();
        self.needs_redraw = true;
    }

    /// Few cards left ahead and the catalog has another page.
    pub fn wants_more_movies(&self) -> bool {
        let remaining = self.movies.len().saturating_sub(self.deck_index + 1);
        remaining < PREFETCH_REMAINING
            && self.catalog.has_more()
            && !self.catalog.is_loading_more()
    }

    /// Apply a card event. Ratings are recorded before the deck moves on.
    ///
    /// A rating for a movie that has left both the snapshot and the catalog
    /// is logged and skipped; the deck still advances.
    ///
    /// # Returns
    ///
    /// `true` when more movies should be requested.
    ///
    /// # Errors
    ///
    /// Fails when the rating cannot be written to storage. The deck does not
    /// move in that case, so the same card can be rated again.
    pub async fn apply_card_event(&mut self, event: CardEvent) -> Result<bool> {
        match event {
            CardEvent::Flipped { .. } => {
                self.needs_redraw = true;
                Ok(false)
            }
            CardEvent::Rated {
                movie_id,
                rating,
                direction,
            } => {
                let movie = self
                    .movies
                    .iter()
                    .find(|m| m.id == movie_id)
                    .cloned()
                    .or_else(|| self.catalog.get_by_id(movie_id));
                let Some(movie) = movie else {
                    tracing::warn!(movie_id = %movie_id, "Rated movie is no longer in the catalog");
                    return Ok(self.advance_deck());
                };
                self.preferences
                    .add(&movie, rating)
                    .await
                    .context("Failed to save rating")?;
                self.set_status(format!("{} {}", direction.hint(), movie.title));
                Ok(self.advance_deck())
            }
        }
    }

    /// Jump the swipe deck to a movie (from the browse list).
    pub fn show_in_deck(&mut self, id: MovieId) {
        if let Some(index) = self.movies.iter().position(|m| m.id == id) {
            self.deck_index = index;
            self.sync_card();
            self.view = View::Swipe;
        }
    }

    // ========================================================================
    // Browse
    // ========================================================================

    pub fn visible_movies(&self) -> Vec<&Movie> {
        self.filter.apply(&self.movies)
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.visible_movies().get(self.browse_selected).copied()
    }

    pub fn genres(&self) -> Vec<String> {
        unique_genres(&self.movies)
    }

    /// Toggle the genre under the cursor in the browse filter.
    pub fn toggle_genre_at_cursor(&mut self) {
        let genres = self.genres();
        if let Some(genre) = genres.get(self.genre_cursor) {
            self.filter.toggle_genre(genre);
            self.browse_selected = 0;
        }
    }

    pub fn move_genre_cursor(&mut self, forward: bool) {
        let count = self.genres().len();
        if count == 0 {
            return;
        }
        self.genre_cursor = if forward {
            (self.genre_cursor + 1) % count
        } else {
            (self.genre_cursor + count - 1) % count
        };
    }

    /// True when the browse selection sits on the last visible row.
    pub fn browse_at_bottom(&self) -> bool {
        let len = self.visible_movies().len();
        len == 0 || self.browse_selected + 1 >= len
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    pub fn dashboard_entries(&self) -> Vec<DashboardEntry> {
        dashboard::build_entries(self.preferences.log(), |p| {
            self.movies.iter().find(|m| m.id == p.movie_id).cloned()
        })
    }

    /// Sign out and switch the ratings back to the anonymous session's log.
    ///
    /// # Returns
    ///
    /// `false` when nobody was signed in.
    ///
    /// # Errors
    ///
    /// Fails when the stored sign-in or the guest log cannot be read or
    /// written.
    pub async fn sign_out(&mut self) -> Result<bool> {
        if !self.auth.is_authenticated() {
            return Ok(false);
        }
        self.auth
            .logout(&self.storage, &mut self.social, &mut self.session)
            .await
            .context("Failed to sign out")?;
        self.preferences
            .switch_to(self.session.identifier())
            .await
            .context("Failed to load guest ratings")?;
        self.friends.clear();
        self.friends_selected = 0;
        self.dashboard_selected = 0;
        Ok(true)
    }

    /// Remove the selected dashboard entry from the preference log.
    ///
    /// # Returns
    ///
    /// The removed movie's title, or `None` when nothing is selected or the
    /// entry was already gone.
    ///
    /// # Errors
    ///
    /// Fails when the updated log cannot be saved.
    pub async fn remove_selected_entry(&mut self) -> Result<Option<String>> {
        let entries = self.dashboard_entries();
        let visible = self.dashboard_filter.apply(&entries);
        let Some(entry) = visible.get(self.dashboard_selected) else {
            return Ok(None);
        };
        let title = entry.title().to_string();
        let removed = self
            .preferences
            .remove(entry.preference.movie_id, entry.preference.timestamp)
            .await
            .context("Failed to remove rating")?;
        self.clamp_selections();
        Ok(removed.then_some(title))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn list_len(&self) -> usize {
        match self.view {
            View::Swipe => 0,
            View::Browse => self.visible_movies().len(),
            View::Dashboard => {
                let entries = self.dashboard_entries();
                self.dashboard_filter.apply(&entries).len()
            }
            View::Friends => self.friends.friends().len() + self.pending_received_count(),
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Swipe => None,
            View::Browse => Some(&mut self.browse_selected),
            View::Dashboard => Some(&mut self.dashboard_selected),
            View::Friends => Some(&mut self.friends_selected),
        }
    }

    pub fn nav_down(&mut self) {
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            if *selected + 1 < len {
                *selected += 1;
            }
        }
    }

    pub fn nav_up(&mut self) {
        if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Keep every list selection inside its (possibly filtered) list.
    pub fn clamp_selections(&mut self) {
        let browse = self.visible_movies().len();
        self.browse_selected = self.browse_selected.min(browse.saturating_sub(1));
        let entries = self.dashboard_entries();
        let dashboard = self.dashboard_filter.apply(&entries).len();
        self.dashboard_selected = self.dashboard_selected.min(dashboard.saturating_sub(1));
        let friends = self.friends.friends().len() + self.pending_received_count();
        self.friends_selected = self.friends_selected.min(friends.saturating_sub(1));
    }

    // ========================================================================
    // Friends
    // ========================================================================

    /// Signed-in user's id. `None` for guests.
    pub fn current_user_id(&self) -> Option<&str> {
        self.auth.user().map(|u| u.id.as_str())
    }

    fn pending_received_count(&self) -> usize {
        self.current_user_id()
            .map_or(0, |me| self.friends.received_requests(me).count())
    }

    /// Friends rows list received requests first, then friends.
    pub fn selected_friend_row(&self) -> Option<FriendRow> {
        let me = self.current_user_id()?;
        let requests: Vec<_> = self.friends.received_requests(me).collect();
        if let Some(request) = requests.get(self.friends_selected) {
            return Some(FriendRow::Request(request.id.clone()));
        }
        self.friends
            .friends()
            .get(self.friends_selected - requests.len())
            .map(|c| FriendRow::Friend(c.friend.id.clone()))
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it has expired. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// What the selected row on the friends view refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendRow {
    Request(String),
    Friend(String),
}

impl Drop for App {
    fn drop(&mut self) {
        self.tasks.abort_all();
        self.catalog.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Rating, SwipeDirection};
    use tokio::time::{self, Duration};
    use wiremock::MockServer;

    /// App whose catalog backend answers 404, so page 1 falls back to the
    /// built-in list.
    async fn test_app(server: &MockServer) -> (App, mpsc::Receiver<AppEvent>) {
        let config = Config {
            tmdb_base_url: server.uri(),
            backend_url: server.uri(),
            tmdb_api_key: Some("test".to_string()),
            ..Default::default()
        };
        let (tx, rx) = mpsc::channel(32);
        let mut app = App::init(&config, Storage::in_memory(), tx).await.unwrap();
        app.catalog.fetch_initial().await;
        app.refresh_movies();
        (app, rx)
    }

    #[tokio::test]
    async fn test_fallback_deck() {
        let server = MockServer::start().await;
        let (app, mut rx) = test_app(&server).await;
        assert_eq!(app.movies.len(), 4);
        assert_eq!(app.card.movie_id(), Some(app.movies[0].id));
        assert!(!app.wants_more_movies());
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Catalog(CatalogEvent::FetchFailed { page: 1, .. }))
        ));
    }

    #[tokio::test]
    async fn test_rating_records_and_advances() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        let first = app.movies[0].clone();

        let event = app.card.swipe(SwipeDirection::Right).unwrap();
        app.apply_card_event(event).await.unwrap();

        assert_eq!(app.deck_index, 1);
        assert_eq!(app.card.movie_id(), Some(app.movies[1].id));
        assert_eq!(
            app.preferences.log().latest_rating(first.id),
            Some(Rating::NotSeenLiked)
        );
        assert!(app.status_message.is_some());
        assert_eq!(app.dashboard_entries().len(), 1);
    }

    #[tokio::test]
    async fn test_deck_wraps_without_more_pages() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        app.deck_index = 3;
        app.advance_deck();
        assert_eq!(app.deck_index, 0);
    }

    #[tokio::test]
    async fn test_failed_page_does_not_skip_a_movie() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, ResponseTemplate};

        let server = MockServer::start().await;
        let page = |n: u32, first: u64| {
            format!(
                r#"{{"page":{n},"results":[{{"id":{first},"title":"Movie {first}"}},{{"id":{},"title":"Movie {}"}}],"total_pages":5}}"#,
                first + 1,
                first + 1
            )
        };
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(1, 1)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(2, 3)))
            .mount(&server)
            .await;

        let config = Config {
            tmdb_base_url: server.uri(),
            backend_url: server.uri(),
            tmdb_api_key: Some("test".to_string()),
            page_size: 2,
            item_cap: 10,
            ..Default::default()
        };
        let (tx, _rx) = mpsc::channel(32);
        let mut app = App::init(&config, Storage::in_memory(), tx).await.unwrap();
        app.catalog.fetch_initial().await;
        app.refresh_movies();

        app.advance_deck();
        app.advance_deck();
        assert_eq!(app.deck_index, 2);
        assert!(app.current_movie().is_none());
        // Advancing while waiting does not move further
        app.advance_deck();
        assert_eq!(app.deck_index, 2);

        assert_eq!(app.catalog.load_more().await, LoadMoreOutcome::Failed);
        app.recover_deck();
        app.refresh_movies();
        assert_eq!(app.current_movie().map(|m| m.id.get()), Some(2));

        assert!(app.advance_deck());
        assert_eq!(app.catalog.load_more().await, LoadMoreOutcome::Loaded(2));
        app.refresh_movies();
        assert_eq!(app.current_movie().map(|m| m.id.get()), Some(3));
        assert_eq!(app.card.movie_id(), Some(MovieId::new(3)));
    }

    #[tokio::test]
    async fn test_sign_out_switches_to_guest_ratings() {
        let server = MockServer::start().await;
        let storage = Storage::in_memory();
        let user: crate::social::User = serde_json::from_str(
            r#"{"id":"u1","email":"ana@example.com","name":"Ana","provider":"email"}"#,
        )
        .unwrap();
        storage
            .set_auth_token(&SecretString::from("jwt-1"))
            .await
            .unwrap();
        storage.set_auth_user(&user).await.unwrap();

        let config = Config {
            tmdb_base_url: server.uri(),
            backend_url: server.uri(),
            tmdb_api_key: Some("test".to_string()),
            ..Default::default()
        };
        let (tx, _rx) = mpsc::channel(32);
        let mut app = App::init(&config, storage.clone(), tx).await.unwrap();
        app.catalog.fetch_initial().await;
        app.refresh_movies();
        assert_eq!(app.preferences.identifier(), "u1");

        let movie = app.movies[0].clone();
        app.preferences.add(&movie, Rating::SeenLiked).await.unwrap();

        assert!(app.sign_out().await.unwrap());
        assert!(!app.auth.is_authenticated());
        assert_eq!(app.preferences.identifier(), app.session.session_id);
        assert!(app.preferences.log().is_empty());
        assert!(!app.sign_out().await.unwrap());

        let kept = storage.preference_log("u1").await.unwrap().unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_dashboard_entry() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        let movie = app.movies[2].clone();
        app.preferences.add(&movie, Rating::SeenLiked).await.unwrap();

        app.view = View::Dashboard;
        let removed = app.remove_selected_entry().await.unwrap();
        assert_eq!(removed.as_deref(), Some(movie.title.as_str()));
        assert!(app.preferences.log().is_empty());
    }

    #[tokio::test]
    async fn test_browse_filter_and_show_in_deck() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        app.view = View::Browse;
        app.filter.search_term = "superman".to_string();
        let id = app.selected_movie().unwrap().id;

        app.show_in_deck(id);
        assert_eq!(app.view, View::Swipe);
        assert_eq!(app.current_movie().map(|m| m.id), Some(id));
    }

    #[tokio::test]
    async fn test_nav_clamps() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        app.view = View::Browse;
        for _ in 0..10 {
            app.nav_down();
        }
        assert_eq!(app.browse_selected, 3);
        assert!(app.browse_at_bottom());
        app.nav_up();
        assert_eq!(app.browse_selected, 2);
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Swipe;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Swipe);
        assert_eq!(View::Swipe.prev(), View::Friends);
    }

    #[tokio::test]
    async fn test_status_expires() {
        let server = MockServer::start().await;
        let (mut app, _rx) = test_app(&server).await;
        time::pause();
        app.set_status("hello");
        assert!(!app.clear_expired_status());
        time::advance(Duration::from_secs(4)).await;
        assert!(app.clear_expired_status());
    }
}
