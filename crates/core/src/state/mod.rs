//! Client-side state: the server cache behind [`MovieClient`] plus the local
//! favorites, filter and theme stores.

pub mod favorites;
pub mod filter;
pub mod theme;

pub use favorites::FavoritesStore;
pub use filter::FilterStore;
pub use theme::ThemeStore;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{Movie, MovieId};
use crate::services::{DeleteOutcome, MovieClient};

/// All client state, built once at start-up and passed by reference to
/// whatever needs it.
pub struct AppStore {
    pub movies: MovieClient,
    pub favorites: FavoritesStore,
    pub filter: FilterStore,
    pub theme: ThemeStore,
}

impl AppStore {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_client(MovieClient::new(config)?))
    }

    pub fn with_client(movies: MovieClient) -> Self {
        Self {
            movies,
            favorites: FavoritesStore::new(),
            filter: FilterStore::new(),
            theme: ThemeStore::new(),
        }
    }

    /// The movie list as currently filtered and sorted.
    pub async fn visible_movies(&self) -> Result<Vec<Movie>> {
        let movies = self.movies.list_movies().await?;
        Ok(self.filter.apply(&movies))
    }

    pub async fn favorite_movies(&self) -> Result<Vec<Movie>> {
        let movies = self.movies.list_movies().await?;
        Ok(self.favorites.favorite_movies(&movies))
    }

    /// Delete remotely; a deleted movie is no longer a favorite.
    pub async fn delete_movie(&mut self, id: &MovieId) -> Result<DeleteOutcome> {
        let outcome = self.movies.delete_movie(id).await?;
        self.favorites.remove(id);
        Ok(outcome)
    }
}
