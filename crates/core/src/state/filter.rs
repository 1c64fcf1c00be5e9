use crate::models::{FilterState, Movie, SortBy, SortOrder};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
    }

    pub fn set_selected_genre(&mut self, genre: Option<String>) {
        self.state.selected_genre = genre;
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.state.sort_by = sort_by;
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.state.sort_order = sort_order;
    }

    pub fn toggle_sort_order(&mut self) {
        self.state.sort_order = self.state.sort_order.toggled();
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.state.min_rating = min_rating;
    }

    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    pub fn is_default(&self) -> bool {
        self.state == FilterState::default()
    }

    /// The displayed list for the current settings.
    pub fn apply(&self, movies: &[Movie]) -> Vec<Movie> {
        self.state.apply(movies)
    }
}
