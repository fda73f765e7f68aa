//! Rated-movie dashboard: preference entries joined with catalog details.

use std::collections::BTreeSet;

use crate::catalog::Movie;
use crate::gesture::Rating;
use crate::preferences::{MoviePreference, PreferenceLog};

/// One rated movie. `movie` is `None` when the catalog no longer holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEntry {
    pub preference: MoviePreference,
    pub movie: Option<Movie>,
}

impl DashboardEntry {
    pub fn title(&self) -> &str {
        &self.preference.title
    }

    pub fn badge(&self) -> &'static str {
        self.preference.rating.badge()
    }

    pub fn genres(&self) -> &[String] {
        self.movie.as_ref().map_or(&[], |m| m.genres.as_slice())
    }

    /// Catalog rating, 0 when details are missing.
    pub fn vote_average(&self) -> f32 {
        self.movie.as_ref().map_or(0.0, |m| m.rating)
    }

    fn mentions(&self, term: &str) -> bool {
        if self.preference.title.to_lowercase().contains(term) {
            return true;
        }
        let Some(movie) = &self.movie else {
            return false;
        };
        movie
            .director
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(term))
            || movie.cast.iter().any(|a| a.to_lowercase().contains(term))
    }
}

/// Join every entry of the log with `lookup`, newest first.
pub fn build_entries<F>(log: &PreferenceLog, lookup: F) -> Vec<DashboardEntry>
where
    F: Fn(&MoviePreference) -> Option<Movie>,
{
    let mut entries: Vec<DashboardEntry> = log
        .preferences
        .iter()
        .map(|p| DashboardEntry {
            preference: p.clone(),
            movie: lookup(p),
        })
        .collect();
    entries.sort_by(|a, b| b.preference.timestamp.cmp(&a.preference.timestamp));
    entries
}

/// Genres across all entries, sorted.
pub fn available_genres(entries: &[DashboardEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.genres().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    /// Matches title, director or any cast member, case-insensitively.
    pub search: String,
    /// All must be present.
    pub genres: Vec<String>,
    /// 0 disables.
    pub min_rating: f32,
    /// Any may match. Empty matches all.
    pub statuses: Vec<Rating>,
}

impl DashboardFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, entry: &DashboardEntry) -> bool {
        let term = self.search.trim().to_lowercase();
        (term.is_empty() || entry.mentions(&term))
            && self.genres.iter().all(|g| entry.genres().contains(g))
            && (self.min_rating <= 0.0 || entry.vote_average() >= self.min_rating)
            && (self.statuses.is_empty() || self.statuses.contains(&entry.preference.rating))
    }

    pub fn apply<'a>(&self, entries: &'a [DashboardEntry]) -> Vec<&'a DashboardEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn toggle_status(&mut self, rating: Rating) {
        if let Some(pos) = self.statuses.iter().position(|r| *r == rating) {
            self.statuses.remove(pos);
        } else {
            self.statuses.push(rating);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Entry count per rating, in [`Rating::ALL`] order.
pub fn rating_counts(entries: &[DashboardEntry]) -> Vec<(Rating, usize)> {
    Rating::ALL
        .iter()
        .map(|r| (*r, entries.iter().filter(|e| e.preference.rating == *r).count()))
        .collect()
}
