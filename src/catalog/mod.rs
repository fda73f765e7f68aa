//! Movie catalog: paginated cache, remote source seam, fallback list and filters.

mod cache;
mod fallback;
mod filter;
mod source;
mod types;

pub use cache::{
    CatalogCache, CatalogConfig, CatalogEvent, FetchInitialOutcome, InitState, LoadMoreOutcome,
    DEFAULT_ITEM_CAP, DEFAULT_PAGE_SIZE,
};
pub use fallback::fallback_movies;
pub use filter::{unique_genres, CatalogFilter};
pub use source::{CatalogPage, CatalogSource};
pub use types::{Movie, MovieId};
