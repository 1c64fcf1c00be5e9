use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, MovieCache, Mutation, RequestCoalescer};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{CreateMovie, Movie, MovieId, UpdateMovie};

/// Body of a successful `DELETE /movies/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// Client for the remote movie store.
///
/// Cheap to clone; clones share one cache, so a mutation issued through any
/// clone invalidates what the others read.
#[derive(Clone)]
pub struct MovieClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    cache: MovieCache,
    deletes: RequestCoalescer<MovieId, DeleteOutcome>,
}

impl MovieClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            cache: MovieCache::new(),
            deletes: RequestCoalescer::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn list_movies(&self) -> Result<Arc<Vec<Movie>>> {
        let request = self.http.get(self.config.movies_url());
        self.cache
            .lists()
            .get_or_fetch((), move || async move {
                let movies: Vec<Movie> = send_json(request).await?;
                debug!(count = movies.len(), "fetched movie list");
                Ok(Arc::new(movies))
            })
            .await
    }

    pub async fn get_movie(&self, id: &MovieId) -> Result<Arc<Movie>> {
        let request = self.http.get(self.config.movie_url(id.as_str()));
        self.cache
            .movies()
            .get_or_fetch(id.clone(), move || async move {
                let movie: Movie = send_json(request).await?;
                Ok(Arc::new(movie))
            })
            .await
    }

    /// Invalidate the list and fetch it again.
    pub async fn refetch_movies(&self) -> Result<Arc<Vec<Movie>>> {
        self.cache.invalidate(&CacheKey::MovieList);
        self.list_movies().await
    }

    /// Last fetched list, if still valid. Never touches the network.
    pub fn cached_movies(&self) -> Option<Arc<Vec<Movie>>> {
        self.cache.lists().peek(&())
    }

    pub fn cached_movie(&self, id: &MovieId) -> Option<Arc<Movie>> {
        self.cache.movies().peek(id)
    }

    pub async fn create_movie(&self, input: CreateMovie) -> Result<Movie> {
        let input = input.validate()?;
        let request = self.http.post(self.config.movies_url()).json(&input);
        let cache = self.cache.clone();
        spawn_write(async move {
            let movie: Movie = send_json(request).await?;
            cache.apply(&Mutation::Create);
            info!(id = %movie.id, title = %movie.title, "created movie");
            Ok(movie)
        })
        .await
    }

    pub async fn update_movie(&self, id: &MovieId, input: UpdateMovie) -> Result<Movie> {
        let input = input.validate()?;
        let request = self
            .http
            .patch(self.config.movie_url(id.as_str()))
            .json(&input);
        let cache = self.cache.clone();
        let id = id.clone();
        spawn_write(async move {
            let movie: Movie = send_json(request).await?;
            cache.apply(&Mutation::Update(id.clone()));
            info!(id = %id, "updated movie");
            Ok(movie)
        })
        .await
    }

    /// Concurrent deletes of the same id share one request.
    pub async fn delete_movie(&self, id: &MovieId) -> Result<DeleteOutcome> {
        let request = self.http.delete(self.config.movie_url(id.as_str()));
        let cache = self.cache.clone();
        let deleted = id.clone();
        self.deletes
            .run(id.clone(), move || {
                async move {
                    let outcome = send_delete(request).await?;
                    cache.apply(&Mutation::Delete(deleted.clone()));
                    info!(id = %deleted, success = outcome.success, "deleted movie");
                    Ok(outcome)
                }
                .boxed()
            })
            .await
    }

    /// Every cache invalidation, in the order applied.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheKey> {
        self.cache.subscribe()
    }

    /// A subscribed consumer of the movie list.
    pub fn watch_movies(&self) -> MovieListWatch {
        MovieListWatch {
            client: self.clone(),
            events: self.subscribe(),
        }
    }
}

/// Refetches the movie list whenever it is invalidated.
pub struct MovieListWatch {
    client: MovieClient,
    events: broadcast::Receiver<CacheKey>,
}

impl MovieListWatch {
    pub async fn current(&self) -> Result<Arc<Vec<Movie>>> {
        self.client.list_movies().await
    }

    /// Wait for the next list invalidation, then return the refetched list.
    pub async fn changed(&mut self) -> Result<Arc<Vec<Movie>>> {
        loop {
            match self.events.recv().await {
                Ok(CacheKey::MovieList) => break,
                Ok(CacheKey::Movie(_)) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "movie list watch lagged, refetching");
                    break;
                }
                Err(RecvError::Closed) => {
                    return Err(Error::Unknown("movie cache was dropped".to_string()));
                }
            }
        }
        self.client.list_movies().await
    }
}

/// Run a write on its own task so the store's answer is applied to the cache
/// even if the caller stops waiting.
async fn spawn_write<T, F>(write: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(write)
        .await
        .map_err(|e| Error::Unknown(format!("Movie store write task failed: {}", e)))?
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        warn!("Movie store request failed: {}", e);
        Error::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = Error::from_status(status, &body);
        warn!(status = status.as_u16(), "Movie store error: {}", err);
        return Err(err);
    }
    Ok(response)
}

async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    send(request).await?.json::<T>().await.map_err(|e| {
        warn!("Invalid movie store response: {}", e);
        Error::from(e)
    })
}

/// Stores differ on what a delete returns; an empty body counts as success.
async fn send_delete(request: reqwest::RequestBuilder) -> Result<DeleteOutcome> {
    let body = send(request).await?.bytes().await.map_err(Error::from)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeleteOutcome { success: true });
    }
    serde_json::from_slice(&body)
        .map_err(|e| Error::Unknown(format!("Invalid delete response: {}", e)))
}
