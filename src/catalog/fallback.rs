//! Built-in movie list shown when the remote catalog is unreachable.

use chrono::NaiveDate;

use super::types::{Movie, MovieId};

#[allow(clippy::too_many_arguments)]
fn movie(
    id: u64,
    title: &str,
    poster: &str,
    description: &str,
    release: (i32, u32, u32),
    genres: &[&str],
    duration_minutes: u32,
    rating: f32,
) -> Movie {
    Movie {
        id: MovieId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        poster_url: Some(format!("assets/posters/{poster}")),
        release_date: NaiveDate::from_ymd_opt(release.0, release.1, release.2),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        rating,
        duration_minutes,
        director: None,
        cast: Vec::new(),
    }
}

/// The fixed fallback catalog. Durations are known, so nothing is enriched.
pub fn fallback_movies() -> Vec<Movie> {
    vec![
        movie(
            1,
            "Los 4 Fantásticos: Primeros pasos",
            "los_4_fantasticos.png",
            "Marvel's First Family defends Earth from the planet-devouring Galactus \
             and his herald, the Silver Surfer, in a retro-futuristic 1960s world.",
            (2025, 8, 24),
            &["Action", "Adventure", "Science Fiction"],
            115,
            6.8,
        ),
        movie(
            2,
            "Jujutsu Kaisen: Hidden Inventory",
            "jujutsu_kaisen_hidden_inventory.jpg",
            "Before they were enemies, Satoru Gojo and Suguru Geto were classmates \
             tasked with protecting Riko Amanai, the Star Plasma Vessel.",
            (2025, 8, 30),
            &["Action", "Animation"],
            110,
            7.5,
        ),
        movie(
            3,
            "Superman",
            "superman_2025.jpg",
            "Superman faces new enemies and unknown dangers threatening humanity, \
             and his own inner conflict.",
            (2025, 8, 11),
            &["Action", "Adventure", "Fantasy"],
            129,
            6.0,
        ),
        movie(
            4,
            "Pulp Fiction",
            "pulp_fiction.jpg",
            "The lives of two mob hitmen, a boxer, a gangster and his wife, and a \
             pair of diner bandits intertwine in four tales of violence and redemption.",
            (2025, 8, 11),
            &["Crime", "Drama"],
            154,
            8.9,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_complete() {
        let movies = fallback_movies();
        assert_eq!(movies.len(), 4);
        assert!(movies.iter().all(Movie::has_duration));
        assert!(movies.iter().all(|m| m.release_date.is_some()));

        let ids: Vec<u64> = movies.iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
