//! Paginated catalog cache with runtime enrichment.
//!
//! The cache owns the master list: every page loaded so far, deduplicated by
//! id. Runtimes come from the persistent duration cache when known; otherwise
//! one background detail fetch per movie fills them in. Those enrichment tasks
//! patch the master list by id, so they stay correct no matter how many pages
//! were appended or reset in the meantime.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`. Enrichment tasks are tracked in a `JoinSet` and aborted on
//! [`CatalogCache::shutdown`] or drop.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::fallback::fallback_movies;
use super::source::CatalogSource;
use super::types::{Movie, MovieId};
use crate::storage::{DurationCache, Storage};

/// Items per remote page (TMDB's fixed page size).
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on the master list length.
pub const DEFAULT_ITEM_CAP: usize = 200;

// ============================================================================
// Configuration and Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub page_size: usize,
    pub item_cap: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            item_cap: DEFAULT_ITEM_CAP,
        }
    }
}

impl CatalogConfig {
    /// `ceil(item_cap / page_size)`, at least 1.
    pub fn max_pages(&self) -> u32 {
        let page_size = self.page_size.max(1);
        let pages = self.item_cap.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchInitialOutcome {
    /// Page 1 loaded with this many items.
    Loaded(usize),
    /// The remote failed; the built-in list is shown instead.
    Fallback,
    /// Another call already started or finished the initial fetch.
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// The next page was appended; this many new items.
    Loaded(usize),
    AtLastPage,
    /// A page fetch is already in flight.
    Busy,
    /// `fetch_initial` has not completed.
    NotReady,
    /// The fetch failed and the page counter was rolled back.
    Failed,
    /// A reset happened while the page was in flight; the page was dropped.
    Superseded,
}

/// Change notifications for observers of the master list.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    PageLoaded { page: u32, added: usize },
    RuntimeResolved { id: MovieId, minutes: u32 },
    Reset,
    FetchFailed { page: u32, error: String },
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug)]
struct CatalogState {
    init: InitState,
    items: Vec<Movie>,
    current_page: u32,
    /// Page count the remote last reported
    remote_total_pages: Option<u32>,
    is_loading_more: bool,
    using_fallback: bool,
    last_error: Option<String>,
    /// Bumped by every reset so in-flight pages can detect they are stale
    generation: u64,
    enriching: HashSet<MovieId>,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            init: InitState::Uninitialized,
            items: Vec::new(),
            current_page: 0,
            remote_total_pages: None,
            is_loading_more: false,
            using_fallback: false,
            last_error: None,
            generation: 0,
            enriching: HashSet::new(),
        }
    }

    fn max_pages(&self, config: &CatalogConfig) -> u32 {
        if self.using_fallback {
            return 1;
        }
        let remote = self.remote_total_pages.unwrap_or(u32::MAX).max(1);
        config.max_pages().min(remote)
    }

    /// Append items whose ids are not already present. Returns the number
    /// appended and the ids that still need a runtime.
    fn append(&mut self, items: Vec<Movie>) -> (usize, Vec<MovieId>) {
        let mut seen: HashSet<MovieId> = self.items.iter().map(|m| m.id).collect();
        let mut added = 0;
        let mut missing = Vec::new();
        for item in items {
            if !seen.insert(item.id) {
                tracing::debug!(movie_id = %item.id, "Skipping duplicate catalog item");
                continue;
            }
            if !item.has_duration() && self.enriching.insert(item.id) {
                missing.push(item.id);
            }
            self.items.push(item);
            added += 1;
        }
        (added, missing)
    }

    /// Set the runtime on every item with this id. Returns whether any matched.
    fn patch_duration(&mut self, id: MovieId, minutes: u32) -> bool {
        let mut patched = false;
        for item in self.items.iter_mut().filter(|m| m.id == id) {
            item.duration_minutes = minutes;
            patched = true;
        }
        patched
    }
}

fn lock(state: &Mutex<CatalogState>) -> MutexGuard<'_, CatalogState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_durations(items: &mut [Movie], durations: &DurationCache) {
    for item in items.iter_mut().filter(|m| !m.has_duration()) {
        if let Some(minutes) = durations.get(&item.id.get()) {
            item.duration_minutes = *minutes;
        }
    }
}

async fn emit(events: &Option<mpsc::Sender<CatalogEvent>>, event: CatalogEvent) {
    if let Some(tx) = events {
        // Receiver gone means nobody is watching
        let _ = tx.send(event).await;
    }
}

// ============================================================================
// Catalog Cache
// ============================================================================

/// The master movie list, shared by the swipe deck and the browse view.
///
/// All methods take `&self`; concurrent callers coordinate through the
/// internal state flags (`is_loading_more`, the reset generation) rather
/// than through exclusive borrows.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    storage: Storage,
    config: CatalogConfig,
    state: Arc<Mutex<CatalogState>>,
    tasks: Mutex<JoinSet<()>>,
    events: Option<mpsc::Sender<CatalogEvent>>,
}

impl CatalogCache {
    /// Create an empty cache. Nothing is fetched until
    /// [`fetch_initial`](Self::fetch_initial).
    pub fn new(source: Arc<dyn CatalogSource>, storage: Storage, config: CatalogConfig) -> Self {
        Self {
            source,
            storage,
            config,
            state: Arc::new(Mutex::new(CatalogState::new())),
            tasks: Mutex::new(JoinSet::new()),
            events: None,
        }
    }

    /// Publish change notifications on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<CatalogEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load page 1 and start enrichment for movies without a known runtime.
    ///
    /// Only the first call fetches. A concurrent or later call sees the
    /// state already past `Uninitialized` and returns immediately.
    ///
    /// # Returns
    ///
    /// - [`FetchInitialOutcome::Loaded`] with the item count on success
    /// - [`FetchInitialOutcome::Fallback`] if the remote failed; the built-in
    ///   list is installed and `last_error` carries the user-facing message
    /// - [`FetchInitialOutcome::AlreadyStarted`] on every call after the first
    ///
    /// Remote failures never escape as errors; the cache is always usable
    /// once this returns.
    pub async fn fetch_initial(&self) -> FetchInitialOutcome {
        {
            let mut state = lock(&self.state);
            if state.init != InitState::Uninitialized {
                return FetchInitialOutcome::AlreadyStarted;
            }
            state.init = InitState::Loading;
        }

        match self.source.fetch_page(1).await {
            Ok(page) => {
                let mut items = page.items;
                apply_durations(&mut items, &self.known_durations().await);

                let (added, missing) = {
                    let mut state = lock(&self.state);
                    state.items.clear();
                    state.current_page = 1;
                    state.remote_total_pages = Some(page.total_pages);
                    state.using_fallback = false;
                    state.last_error = None;
                    let appended = state.append(items);
                    state.init = InitState::Ready;
                    appended
                };

                tracing::info!(items = added, enrich = missing.len(), "Loaded first catalog page");
                self.spawn_enrichment(missing);
                emit(&self.events, CatalogEvent::PageLoaded { page: 1, added }).await;
                FetchInitialOutcome::Loaded(added)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed, showing built-in list");
                {
                    let mut state = lock(&self.state);
                    state.items = fallback_movies();
                    state.current_page = 1;
                    state.using_fallback = true;
                    state.last_error = Some(e.user_message());
                    state.init = InitState::Ready;
                }
                emit(
                    &self.events,
                    CatalogEvent::FetchFailed {
                        page: 1,
                        error: e.user_message(),
                    },
                )
                .await;
                FetchInitialOutcome::Fallback
            }
        }
    }

    /// Forget a fallback list and try page 1 again.
    ///
    /// Returns `AlreadyStarted` without fetching unless the cache is ready
    /// and showing the built-in list. Bumps the reset generation so a page
    /// appended to the fallback list cannot land afterwards.
    pub async fn retry_initial(&self) -> FetchInitialOutcome {
        {
            let mut state = lock(&self.state);
            if !state.using_fallback || state.init != InitState::Ready {
                return FetchInitialOutcome::AlreadyStarted;
            }
            state.init = InitState::Uninitialized;
            state.generation += 1;
        }
        self.fetch_initial().await
    }

    /// Fetch the next page and append the movies not already present.
    ///
    /// The page counter advances before the fetch and rolls back on
    /// failure, so a retry asks for the same page again.
    ///
    /// # Returns
    ///
    /// - [`LoadMoreOutcome::Loaded`] with the number of new items, which can
    ///   be zero when the whole page was duplicates
    /// - [`LoadMoreOutcome::NotReady`] before `fetch_initial` completes
    /// - [`LoadMoreOutcome::Busy`] while another page is in flight
    /// - [`LoadMoreOutcome::AtLastPage`] once the page cap or the remote's
    ///   page count is reached
    /// - [`LoadMoreOutcome::Failed`] on a remote error; the message is left
    ///   for [`take_error`](Self::take_error)
    /// - [`LoadMoreOutcome::Superseded`] if
    ///   [`reset_to_first_page`](Self::reset_to_first_page) ran while the
    ///   page was in flight; the page is discarded
    pub async fn load_more(&self) -> LoadMoreOutcome {
        let (page, generation) = {
            let mut state = lock(&self.state);
            if state.init != InitState::Ready {
                return LoadMoreOutcome::NotReady;
            }
            if state.is_loading_more {
                return LoadMoreOutcome::Busy;
            }
            if state.current_page >= state.max_pages(&self.config) {
                return LoadMoreOutcome::AtLastPage;
            }
            state.is_loading_more = true;
            state.current_page += 1;
            (state.current_page, state.generation)
        };

        tracing::debug!(page, "Loading more catalog items");
        match self.source.fetch_page(page).await {
            Ok(fetched) => {
                let mut items = fetched.items;
                apply_durations(&mut items, &self.known_durations().await);

                let (added, missing) = {
                    let mut state = lock(&self.state);
                    state.is_loading_more = false;
                    if state.generation != generation {
                        tracing::debug!(page, "Dropping page fetched before a reset");
                        return LoadMoreOutcome::Superseded;
                    }
                    state.remote_total_pages = Some(fetched.total_pages);
                    state.last_error = None;
                    state.append(items)
                };

                tracing::debug!(page, added, enrich = missing.len(), "Appended catalog page");
                self.spawn_enrichment(missing);
                emit(&self.events, CatalogEvent::PageLoaded { page, added }).await;
                LoadMoreOutcome::Loaded(added)
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Failed to load catalog page");
                {
                    let mut state = lock(&self.state);
                    state.is_loading_more = false;
                    if state.generation != generation {
                        return LoadMoreOutcome::Superseded;
                    }
                    state.current_page = state.current_page.saturating_sub(1).max(1);
                    state.last_error = Some(e.user_message());
                }
                emit(
                    &self.events,
                    CatalogEvent::FetchFailed {
                        page,
                        error: e.user_message(),
                    },
                )
                .await;
                LoadMoreOutcome::Failed
            }
        }
    }

    /// Truncate the master list to the first page. Idempotent.
    ///
    /// Enrichment tasks keep running; they patch by id and skip movies that
    /// are gone. Their runtimes still reach the duration cache, so a page
    /// fetched again later comes back with durations filled in.
    pub async fn reset_to_first_page(&self) {
        {
            let mut state = lock(&self.state);
            if state.init != InitState::Ready {
                return;
            }
            state.items.truncate(self.config.page_size);
            if !state.using_fallback {
                state.current_page = 1;
            }
            state.generation += 1;
        }
        emit(&self.events, CatalogEvent::Reset).await;
    }

    async fn known_durations(&self) -> DurationCache {
        match self.storage.movie_durations().await {
            Ok(durations) => durations,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read duration cache");
                DurationCache::default()
            }
        }
    }

    // ========================================================================
    // Enrichment
    // ========================================================================

    fn spawn_enrichment(&self, ids: Vec<MovieId>) {
        if ids.is_empty() {
            return;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        // Reap finished tasks so the set does not grow without bound
        while tasks.try_join_next().is_some() {}

        for id in ids {
            let source = Arc::clone(&self.source);
            let storage = self.storage.clone();
            let state = Arc::clone(&self.state);
            let events = self.events.clone();
            tasks.spawn(async move {
                enrich(source, storage, state, events, id).await;
            });
        }
    }

    /// Wait for every enrichment task spawned so far (and any they spawn).
    pub async fn settle(&self) {
        loop {
            let mut set = {
                let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *tasks)
            };
            if set.is_empty() {
                return;
            }
            while let Some(result) = set.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        tracing::error!(error = %e, "Enrichment task panicked");
                    }
                }
            }
        }
    }

    /// Abort all outstanding enrichment tasks.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            tracing::debug!(tasks = tasks.len(), "Aborting enrichment tasks");
        }
        tasks.abort_all();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Snapshot of the master list.
    pub fn items(&self) -> Vec<Movie> {
        lock(&self.state).items.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).items.is_empty()
    }

    pub fn get_by_id(&self, id: MovieId) -> Option<Movie> {
        lock(&self.state).items.iter().find(|m| m.id == id).cloned()
    }

    pub fn init_state(&self) -> InitState {
        lock(&self.state).init
    }

    pub fn current_page(&self) -> u32 {
        lock(&self.state).current_page
    }

    pub fn max_pages(&self) -> u32 {
        lock(&self.state).max_pages(&self.config)
    }

    pub fn is_loading_more(&self) -> bool {
        lock(&self.state).is_loading_more
    }

    pub fn has_more(&self) -> bool {
        let state = lock(&self.state);
        state.init == InitState::Ready && state.current_page < state.max_pages(&self.config)
    }

    pub fn is_using_fallback(&self) -> bool {
        lock(&self.state).using_fallback
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.state).last_error.clone()
    }

    /// Take the transient error flag, clearing it.
    pub fn take_error(&self) -> Option<String> {
        lock(&self.state).last_error.take()
    }
}

impl Drop for CatalogCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fetch one runtime, persist it, and patch the master list by id.
async fn enrich(
    source: Arc<dyn CatalogSource>,
    storage: Storage,
    state: Arc<Mutex<CatalogState>>,
    events: Option<mpsc::Sender<CatalogEvent>>,
    id: MovieId,
) {
    let result = source.fetch_runtime(id).await;
    lock(&state).enriching.remove(&id);

    let minutes = match result {
        Ok(Some(minutes)) => minutes,
        Ok(None) => {
            tracing::debug!(movie_id = %id, "Catalog has no runtime for movie");
            return;
        }
        Err(e) => {
            tracing::warn!(movie_id = %id, error = %e, "Runtime enrichment failed");
            return;
        }
    };

    if let Err(e) = storage.record_duration(id, minutes).await {
        tracing::warn!(movie_id = %id, error = %e, "Failed to persist runtime");
    }

    let patched = lock(&state).patch_duration(id, minutes);
    if patched {
        tracing::trace!(movie_id = %id, minutes, "Runtime resolved");
        emit(&events, CatalogEvent::RuntimeResolved { id, minutes }).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
