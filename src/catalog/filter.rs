//! Client-side catalog filtering.

use super::types::Movie;

/// Filter over the master list. The default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Case-insensitive title substring. Empty matches all.
    pub search_term: String,
    /// Every selected genre must be present on the movie.
    pub genres: Vec<String>,
    /// Minimum rating; 0 disables the check.
    pub min_rating: f32,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.genres.is_empty() && self.min_rating <= 0.0
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        let term = self.search_term.trim().to_lowercase();
        let matches_term = term.is_empty() || movie.title.to_lowercase().contains(&term);
        let matches_genres = self.genres.iter().all(|g| movie.has_genre(g));
        let matches_rating = self.min_rating <= 0.0 || movie.rating >= self.min_rating;
        matches_term && matches_genres && matches_rating
    }

    pub fn apply<'a>(&self, movies: &'a [Movie]) -> Vec<&'a Movie> {
        movies.iter().filter(|m| self.matches(m)).collect()
    }

    /// Add the genre if absent, remove it if present.
    pub fn toggle_genre(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }
}

/// Every genre in the list, in first-seen order.
pub fn unique_genres(movies: &[Movie]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    movies
        .iter()
        .flat_map(|m| m.genres.iter())
        .filter(|g| seen.insert(g.as_str()))
        .cloned()
        .collect()
}
