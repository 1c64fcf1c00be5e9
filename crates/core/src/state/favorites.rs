use crate::models::{Movie, MovieId};

/// Favorited movie ids, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesStore {
    movie_ids: Vec<MovieId>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: MovieId) {
        if !self.is_favorite(&id) {
            self.movie_ids.push(id);
        }
    }

    pub fn remove(&mut self, id: &MovieId) {
        self.movie_ids.retain(|favorite| favorite != id);
    }

    /// Flip membership and return whether `id` is now a favorite.
    pub fn toggle(&mut self, id: MovieId) -> bool {
        if self.is_favorite(&id) {
            self.remove(&id);
            false
        } else {
            self.add(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.movie_ids.clear();
    }

    pub fn is_favorite(&self, id: &MovieId) -> bool {
        self.movie_ids.contains(id)
    }

    pub fn all(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    /// Favorited records from `movies`, keeping the list's order.
    pub fn favorite_movies(&self, movies: &[Movie]) -> Vec<Movie> {
        movies
            .iter()
            .filter(|movie| self.is_favorite(&movie.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixtures;

    fn id(raw: &str) -> MovieId {
        MovieId::new(raw)
    }

    #[test]
    fn test_add_then_is_favorite() {
        let mut favorites = FavoritesStore::new();
        assert!(!favorites.is_favorite(&id("1")));

        favorites.add(id("1"));
        assert!(favorites.is_favorite(&id("1")));

        favorites.remove(&id("1"));
        assert!(!favorites.is_favorite(&id("1")));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut once = FavoritesStore::new();
        once.add(id("7"));

        let mut twice = FavoritesStore::new();
        twice.add(id("7"));
        twice.add(id("7"));

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut favorites = FavoritesStore::new();
        favorites.add(id("1"));
        favorites.remove(&id("2"));
        assert_eq!(favorites.all(), &[id("1")]);
    }

    #[test]
    fn test_clear_and_order() {
        let mut favorites = FavoritesStore::new();
        favorites.add(id("3"));
        favorites.add(id("1"));
        favorites.add(id("2"));
        assert_eq!(favorites.all(), &[id("3"), id("1"), id("2")]);

        favorites.clear();
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut favorites = FavoritesStore::new();
        assert!(favorites.toggle(id("1")));
        assert!(!favorites.toggle(id("1")));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_favorite_movies() {
        let mut favorites = FavoritesStore::new();
        favorites.add(id("3"));
        favorites.add(id("1"));
        favorites.add(id("unknown"));

        let picked = favorites.favorite_movies(&fixtures::catalog());
        let titles: Vec<&str> = picked.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Inception"]);
    }
}
