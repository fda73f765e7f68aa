use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable catalog identity, assigned by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(u64);

impl MovieId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MovieId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A catalog item.
///
/// `duration_minutes == 0` means the runtime is not known yet; enrichment
/// fills it in place once the detail fetch succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
    /// Average vote, 0 to 10.
    pub rating: f32,
    pub duration_minutes: u32,
    pub director: Option<String>,
    pub cast: Vec<String>,
}

impl Movie {
    pub fn has_duration(&self) -> bool {
        self.duration_minutes > 0
    }

    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }

    /// "115 min", or "? min" while the runtime is unknown.
    pub fn duration_label(&self) -> String {
        if self.has_duration() {
            format!("{} min", self.duration_minutes)
        } else {
            "? min".to_string()
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}
