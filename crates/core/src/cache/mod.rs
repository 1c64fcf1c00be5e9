//! Server-response cache for movie queries.
//!
//! Reads go through [`QueryCache`], which coalesces concurrent fetches of the
//! same key. Writes never patch cached data; they invalidate the keys listed
//! by [`Mutation::invalidates`] and the next read goes back to the store.

pub mod coalesce;
pub mod query;

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{Movie, MovieId};

pub use coalesce::RequestCoalescer;
pub use query::QueryCache;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full `GET /movies` collection
    MovieList,
    /// A single `GET /movies/{id}` record
    Movie(MovieId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::MovieList => f.write_str("movies"),
            CacheKey::Movie(id) => write!(f, "movies/{}", id),
        }
    }
}

/// A successful write against the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update(MovieId),
    Delete(MovieId),
}

impl Mutation {
    /// Keys made stale by this mutation.
    pub fn invalidates(&self) -> Vec<CacheKey> {
        match self {
            Mutation::Create => vec![CacheKey::MovieList],
            Mutation::Update(id) | Mutation::Delete(id) => {
                vec![CacheKey::Movie(id.clone()), CacheKey::MovieList]
            }
        }
    }
}

/// Collection and per-id caches plus the invalidation feed.
#[derive(Clone)]
pub struct MovieCache {
    lists: QueryCache<(), Arc<Vec<Movie>>>,
    movies: QueryCache<MovieId, Arc<Movie>>,
    events: broadcast::Sender<CacheKey>,
}

impl Default for MovieCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            lists: QueryCache::new(),
            movies: QueryCache::new(),
            events,
        }
    }

    pub(crate) fn lists(&self) -> &QueryCache<(), Arc<Vec<Movie>>> {
        &self.lists
    }

    pub(crate) fn movies(&self) -> &QueryCache<MovieId, Arc<Movie>> {
        &self.movies
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheKey> {
        self.events.subscribe()
    }

    pub fn invalidate(&self, key: &CacheKey) {
        match key {
            CacheKey::MovieList => self.lists.invalidate(&()),
            CacheKey::Movie(id) => self.movies.invalidate(id),
        }
        debug!(%key, "invalidated");
    }

    /// Apply every invalidation for `mutation`, then notify subscribers.
    pub fn apply(&self, mutation: &Mutation) {
        let keys = mutation.invalidates();
        for key in &keys {
            self.invalidate(key);
        }
        for key in keys {
            // no subscribers is fine
            let _ = self.events.send(key);
        }
    }
}
