//! Wire types for the TMDB v3 API.

use chrono::NaiveDate;
use serde::Deserialize;

use super::genres::genre_names;
use crate::catalog::{Movie, MovieId};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Number of cast members kept on a movie.
const CAST_LIMIT: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl TmdbMovie {
    /// Map to a catalog item with an unknown runtime.
    pub fn into_movie(self) -> Movie {
        Movie {
            id: MovieId::new(self.id),
            title: self.title,
            description: self.overview,
            poster_url: poster_url(self.poster_path.as_deref()),
            release_date: parse_release_date(self.release_date.as_deref()),
            genres: genre_names(&self.genre_ids),
            rating: self.vote_average,
            duration_minutes: 0,
            director: None,
            cast: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    /// Null for unreleased titles.
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

impl TmdbMovieDetails {
    pub fn into_movie(self, credits: Option<TmdbCredits>) -> Movie {
        let (director, cast) = credits
            .map(|c| (c.director(), c.top_cast(CAST_LIMIT)))
            .unwrap_or_default();
        Movie {
            id: MovieId::new(self.id),
            title: self.title,
            description: self.overview,
            poster_url: poster_url(self.poster_path.as_deref()),
            release_date: parse_release_date(self.release_date.as_deref()),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            rating: self.vote_average,
            duration_minutes: self.runtime.unwrap_or(0),
            director,
            cast,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

impl TmdbCredits {
    pub fn director(&self) -> Option<String> {
        self.crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.clone())
    }

    pub fn top_cast(&self, limit: usize) -> Vec<String> {
        let mut cast: Vec<&TmdbCastMember> = self.cast.iter().collect();
        cast.sort_by_key(|c| c.order);
        cast.into_iter().take(limit).map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

impl TmdbVideo {
    /// Watch URL for YouTube trailers; other videos have none.
    pub fn trailer_url(&self) -> Option<String> {
        (self.site == "YouTube" && self.kind == "Trailer")
            .then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE_URL}{p}"))
}

fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
