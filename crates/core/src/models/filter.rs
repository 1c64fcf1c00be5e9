use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::movie::Movie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Title,
    Year,
    #[default]
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Search, genre, sort and rating-floor settings for the movie list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_query: String,
    pub selected_genre: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub min_rating: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            selected_genre: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            min_rating: 0.0,
        }
    }
}

impl FilterState {
    fn matches_with(&self, movie: &Movie, lowercase_query: &str) -> bool {
        if !lowercase_query.is_empty() && !movie.title.to_lowercase().contains(lowercase_query) {
            return false;
        }
        if let Some(ref genre) = self.selected_genre
            && movie.genre != *genre
        {
            return false;
        }
        movie.rating >= self.min_rating
    }

    /// Produce the displayed list: filter, then stable sort.
    ///
    /// Direction is applied inside the comparator, so equal keys keep their
    /// input order for both ascending and descending.
    pub fn apply(&self, movies: &[Movie]) -> Vec<Movie> {
        let query = self.search_query.to_lowercase();
        let mut visible: Vec<Movie> = movies
            .iter()
            .filter(|movie| self.matches_with(movie, &query))
            .cloned()
            .collect();

        visible.sort_by(|a, b| {
            let ordering = compare_by(self.sort_by, a, b);
            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        visible
    }
}

fn compare_by(sort_by: SortBy, a: &Movie, b: &Movie) -> Ordering {
    match sort_by {
        SortBy::Title => lowercase_chars(&a.title).cmp(lowercase_chars(&b.title)),
        SortBy::Year => a.year.cmp(&b.year),
        SortBy::Rating => a.rating.total_cmp(&b.rating),
    }
}

fn lowercase_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Distinct genres in first-seen order.
pub fn available_genres(movies: &[Movie]) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for movie in movies {
        if !genres.iter().any(|g| *g == movie.genre) {
            genres.push(movie.genre.clone());
        }
    }
    genres
}
