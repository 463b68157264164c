// src/app/movie.rs
//! Canonical movie record and the upstream shapes it is built from.
//!
//! The backend mixes two naming schemes: local favorites come back in
//! camelCase (`posterPath`, `voteAverage`, `movieId`) while catalog pages
//! pass through the external snake_case fields (`poster_path`,
//! `vote_average`). Both map onto [`Movie`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::app::types::SortOrder;

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub tmdb_id: i64,
    /// Backend movie id for `DELETE /favorites/{id}`: `movieId`, else `id`.
    pub movie_ref: i64,
    pub title: String,
    pub poster_path: String,
    pub overview: String,
    pub vote_average: f64,
    pub release_date: Option<String>,
    pub is_favorite: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// One element as it arrives on the wire; every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawMovie {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "movieId")]
    pub movie_id: Option<i64>,
    #[serde(default, rename = "tmdbId")]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "posterPath")]
    pub poster_path_camel: Option<String>,
    #[serde(default, rename = "poster_path")]
    pub poster_path_snake: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "voteAverage", deserialize_with = "lenient_rating")]
    pub vote_average_camel: Option<f64>,
    #[serde(default, rename = "vote_average", deserialize_with = "lenient_rating")]
    pub vote_average_snake: Option<f64>,
    #[serde(default, rename = "releaseDate")]
    pub release_date_camel: Option<String>,
    #[serde(default, rename = "release_date")]
    pub release_date_snake: Option<String>,
    #[serde(default, rename = "isFavorite")]
    pub is_favorite: Option<bool>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

/// Ratings show up as numbers or as numeric strings ("8.3").
fn lenient_rating<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl RawMovie {
    /// Id used when matching against the favorites set.
    pub fn favorite_ref(&self) -> Option<i64> {
        self.movie_id.or(self.id)
    }

    /// Build the canonical record. Elements without any id are dropped.
    pub fn canonicalize(self) -> Option<Movie> {
        let Some(id) = self.id.or(self.movie_id) else {
            debug!("dropping movie without id: {:?}", self.title);
            return None;
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Movie {
            id,
            tmdb_id: self.tmdb_id.or(self.id).unwrap_or(id),
            movie_ref: self.movie_id.unwrap_or(id),
            title: self.title.unwrap_or_default(),
            poster_path: non_empty(self.poster_path_camel)
                .or(non_empty(self.poster_path_snake))
                .unwrap_or_default(),
            overview: non_empty(self.overview)
                .or(non_empty(self.description))
                .unwrap_or_default(),
            vote_average: self
                .vote_average_camel
                .or(self.vote_average_snake)
                .unwrap_or(0.0),
            release_date: non_empty(self.release_date_camel).or(non_empty(self.release_date_snake)),
            is_favorite: self.is_favorite.unwrap_or(false),
            created_at,
        })
    }
}

/// Response envelope: `{ results, page, totalPages }` or a bare array.
/// Elements stay untyped until `into_parts` so one bad row can't sink a page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawListing {
    Paged {
        #[serde(default)]
        results: Vec<Value>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, rename = "totalPages", alias = "total_pages")]
        total_pages: Option<u32>,
    },
    Bare(Vec<Value>),
}

fn decode_elements(items: Vec<Value>) -> Vec<RawMovie> {
    items
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<RawMovie>(v) {
            Ok(m) => Some(m),
            Err(e) => {
                debug!("skipping malformed movie element: {e}");
                None
            }
        })
        .collect()
}

impl RawListing {
    /// Split into (elements, page, total_pages).
    pub fn into_parts(self) -> (Vec<RawMovie>, Option<u32>, Option<u32>) {
        match self {
            Self::Paged {
                results,
                page,
                total_pages,
            } => (decode_elements(results), page, total_pages),
            Self::Bare(items) => (decode_elements(items), None, None),
        }
    }
}

impl Movie {
    pub fn release_year(&self) -> Option<i32> {
        let raw = self.release_date.as_deref()?.trim();
        if let Ok(d) = NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d") {
            return Some(d.year());
        }
        raw.get(..4).and_then(|y| y.parse::<i32>().ok())
    }

    /// "Title (YYYY)" or just the title when the date is unknown.
    pub fn title_line(&self) -> String {
        match self.release_year() {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    pub fn overview_or_placeholder(&self) -> &str {
        if self.overview.trim().is_empty() {
            "Descrição não disponível."
        } else {
            &self.overview
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || self.title.to_lowercase().contains(&q)
    }
}

/// Keep titles containing `query` (case-insensitive).
pub fn filter_by_title(movies: Vec<Movie>, query: &str) -> Vec<Movie> {
    movies.into_iter().filter(|m| m.matches_query(query)).collect()
}

/// Favorites ordering: newest `created_at` first, or best rated first.
pub fn sort_movies(movies: &mut [Movie], order: SortOrder) {
    match order {
        SortOrder::Recent => movies.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Rated => movies.sort_by(|a, b| {
            b.vote_average
                .partial_cmp(&a.vote_average)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Movie {
        serde_json::from_str::<RawMovie>(json)
            .expect("valid json")
            .canonicalize()
            .expect("has id")
    }

    #[test]
    fn camel_and_snake_shapes_canonicalize_identically() {
        let camel = parse(
            r#"{"id": 27205, "title": "Inception", "posterPath": "/inc.jpg",
                "overview": "Dreams.", "voteAverage": 8.4, "releaseDate": "2010-07-15"}"#,
        );
        let snake = parse(
            r#"{"id": 27205, "title": "Inception", "poster_path": "/inc.jpg",
                "overview": "Dreams.", "vote_average": 8.4, "release_date": "2010-07-15"}"#,
        );
        assert_eq!(camel, snake);
        assert_eq!(camel.tmdb_id, 27205);
        assert_eq!(camel.movie_ref, 27205);
        assert_eq!(camel.release_year(), Some(2010));
    }

    #[test]
    fn missing_fields_default() {
        let m = parse(r#"{"movieId": 7}"#);
        assert_eq!(m.id, 7);
        assert_eq!(m.vote_average, 0.0);
        assert_eq!(m.release_date, None);
        assert_eq!(m.created_at, None);
        assert!(m.poster_path.is_empty());
        assert_eq!(m.overview_or_placeholder(), "Descrição não disponível.");
        assert_eq!(m.rating_label(), "0.0");
    }

    #[test]
    fn favorite_record_keeps_backend_movie_id() {
        let m = parse(r#"{"id": 4, "movieId": 550, "tmdbId": 550, "title": "Fight Club"}"#);
        assert_eq!((m.id, m.movie_ref, m.tmdb_id), (4, 550, 550));
    }

    #[test]
    fn description_backs_up_overview() {
        let m = parse(r#"{"id": 1, "title": "X", "description": "From favorites"}"#);
        assert_eq!(m.overview, "From favorites");
    }

    #[test]
    fn element_without_id_is_dropped() {
        let raw: RawMovie = serde_json::from_str(r#"{"title": "Ghost"}"#).unwrap();
        assert!(raw.canonicalize().is_none());
    }

    #[test]
    fn envelope_and_bare_array_both_parse() {
        let paged: RawListing = serde_json::from_str(
            r#"{"results": [{"id": 1}, {"id": 2}], "page": 2, "totalPages": 9}"#,
        )
        .unwrap();
        let (items, page, total) = paged.into_parts();
        assert_eq!((items.len(), page, total), (2, Some(2), Some(9)));

        let snake_total: RawListing =
            serde_json::from_str(r#"{"results": [], "total_pages": 3}"#).unwrap();
        assert_eq!(snake_total.into_parts().2, Some(3));

        let bare: RawListing = serde_json::from_str(r#"[{"id": 5, "movieId": 550}]"#).unwrap();
        let (items, page, total) = bare.into_parts();
        assert_eq!((items.len(), page, total), (1, None, None));
        assert_eq!(items[0].favorite_ref(), Some(550));
    }

    #[test]
    fn string_ratings_are_accepted() {
        let m = parse(r#"{"id": 1, "voteAverage": "8.3"}"#);
        assert_eq!(m.vote_average, 8.3);
        let m = parse(r#"{"id": 2, "vote_average": " 7 "}"#);
        assert_eq!(m.vote_average, 7.0);
        let m = parse(r#"{"id": 3, "voteAverage": "n/a", "vote_average": 6.5}"#);
        assert_eq!(m.vote_average, 6.5);
    }

    #[test]
    fn malformed_element_is_skipped_not_the_page() {
        let listing: RawListing = serde_json::from_str(
            r#"[{"id": 1, "title": "Ok"},
                {"id": 2, "voteAverage": "8.3"},
                {"id": "three", "title": ["bad"]}]"#,
        )
        .unwrap();
        let (items, _, _) = listing.into_parts();
        let ids: Vec<i64> = items
            .into_iter()
            .filter_map(RawMovie::canonicalize)
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);

        let paged: RawListing = serde_json::from_str(
            r#"{"results": [{"id": 4}, {"id": 5, "isFavorite": "yes"}], "page": 1}"#,
        )
        .unwrap();
        assert_eq!(paged.into_parts().0.len(), 1);
    }

    #[test]
    fn title_line_omits_unknown_year() {
        let m = parse(r#"{"id": 1, "title": "Alien", "release_date": "1979-05-25"}"#);
        assert_eq!(m.title_line(), "Alien (1979)");
        let m = parse(r#"{"id": 2, "title": "Untitled"}"#);
        assert_eq!(m.title_line(), "Untitled");
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let movies = vec![
            parse(r#"{"id": 1, "title": "The Batman"}"#),
            parse(r#"{"id": 2, "title": "Batman Begins"}"#),
            parse(r#"{"id": 3, "title": "Superman"}"#),
        ];
        let ids: Vec<i64> = filter_by_title(movies, "BATMAN").iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn sorts_by_recent_and_rating() {
        let mut movies = vec![
            parse(r#"{"id": 1, "voteAverage": 6.1, "createdAt": "2024-01-01T10:00:00Z"}"#),
            parse(r#"{"id": 2, "voteAverage": 8.9, "createdAt": "2024-03-01T10:00:00Z"}"#),
            parse(r#"{"id": 3, "voteAverage": 7.0}"#),
        ];
        sort_movies(&mut movies, SortOrder::Recent);
        assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 1, 3]);

        sort_movies(&mut movies, SortOrder::Rated);
        assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
