use async_trait::async_trait;

use super::types::{Movie, MovieId};
use crate::remote::RemoteError;

/// One page of the remote catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<Movie>,
}

/// Where catalog pages and runtimes come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch a 1-based page of the popular list.
    async fn fetch_page(&self, page: u32) -> Result<CatalogPage, RemoteError>;

    /// Runtime in minutes. `None` when the catalog does not know it.
    async fn fetch_runtime(&self, id: MovieId) -> Result<Option<u32>, RemoteError>;
}
