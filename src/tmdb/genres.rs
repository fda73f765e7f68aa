//! TMDB's fixed movie genre table.

const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(gid, _)| *gid == id)
        .map(|(_, name)| *name)
}

/// Map ids to names, dropping ids the table does not know.
pub fn genre_names(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| {
            let name = genre_name(*id);
            if name.is_none() {
                tracing::debug!(genre_id = id, "Unknown TMDB genre id");
            }
            name
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(genre_name(878), Some("Science Fiction"));
        assert_eq!(genre_name(10751), Some("Family"));
    }

    #[test]
    fn test_unknown_ids_dropped() {
        assert_eq!(genre_names(&[28, 1, 18]), vec!["Action", "Drama"]);
    }
}
