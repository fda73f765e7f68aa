//! Client for The Movie Database (TMDB) v3 API.

mod client;
mod genres;
mod types;

pub use client::{TmdbClient, DEFAULT_TMDB_BASE_URL};
pub use genres::{genre_name, genre_names};
pub use types::{
    TmdbCredits, TmdbMovie, TmdbMovieDetails, TmdbPage, TmdbVideo, TmdbVideos, POSTER_BASE_URL,
};
