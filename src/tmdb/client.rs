use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::types::{TmdbCredits, TmdbMovieDetails, TmdbPage, TmdbVideos};
use crate::catalog::{CatalogPage, CatalogSource, Movie, MovieId};
use crate::remote::{self, RemoteError};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB v3 client authenticated with an `api_key` query parameter.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base", &self.base.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl TmdbClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
    ) -> Result<Self, RemoteError> {
        let base = remote::validate_base_url(base_url)?;
        Ok(Self {
            http,
            base,
            api_key,
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, RemoteError> {
        let mut url = remote::endpoint(&self.base, segments)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", self.api_key.expose_secret());
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = self.url(segments, query)?;
        // Path only: the query carries the API key
        tracing::debug!(path = %url.path(), "TMDB request");
        remote::send_json(self.http.get(url)).await
    }

    pub async fn popular(&self, page: u32) -> Result<TmdbPage, RemoteError> {
        self.get(&["movie", "popular"], &[("page", page.to_string())])
            .await
    }

    pub async fn details(&self, id: MovieId) -> Result<TmdbMovieDetails, RemoteError> {
        self.get(&["movie", &id.to_string()], &[]).await
    }

    pub async fn credits(&self, id: MovieId) -> Result<TmdbCredits, RemoteError> {
        self.get(&["movie", &id.to_string(), "credits"], &[]).await
    }

    pub async fn videos(&self, id: MovieId) -> Result<TmdbVideos, RemoteError> {
        self.get(&["movie", &id.to_string(), "videos"], &[]).await
    }

    /// First YouTube trailer for the movie, if any.
    pub async fn trailer_url(&self, id: MovieId) -> Result<Option<String>, RemoteError> {
        let videos = self.videos(id).await?;
        Ok(videos.results.iter().find_map(|v| v.trailer_url()))
    }

    /// Details joined with credits. A credits failure only drops director/cast.
    pub async fn movie(&self, id: MovieId) -> Result<Movie, RemoteError> {
        let (details, credits) = tokio::join!(self.details(id), self.credits(id));
        let credits = match credits {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "Failed to fetch credits");
                None
            }
        };
        Ok(details?.into_movie(credits))
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn fetch_page(&self, page: u32) -> Result<CatalogPage, RemoteError> {
        let response = self.popular(page).await?;
        tracing::debug!(
            page = response.page,
            results = response.results.len(),
            total_pages = response.total_pages,
            "Fetched popular movies"
        );
        Ok(CatalogPage {
            page: response.page,
            total_pages: response.total_pages,
            items: response
                .results
                .into_iter()
                .map(|m| m.into_movie())
                .collect(),
        })
    }

    async fn fetch_runtime(&self, id: MovieId) -> Result<Option<u32>, RemoteError> {
        Ok(self.details(id).await?.runtime.filter(|r| *r > 0))
    }
}
