//! Test helpers: an in-memory remote movie store served over HTTP, plus
//! fixtures

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::config::ClientConfig;
use crate::models::{CreateMovie, Movie, MovieId, UpdateMovie};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct StoreState {
    movies: Mutex<Vec<Movie>>,
    hits: Mutex<HashMap<Route, usize>>,
    read_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    reply_delay: Mutex<Duration>,
    forced_status: Mutex<Option<StatusCode>>,
}

impl StoreState {
    fn hit(&self, route: Route) {
        *self.hits.lock().unwrap().entry(route).or_insert(0) += 1;
    }

    fn forced_failure(&self) -> Option<Response> {
        let status = (*self.forced_status.lock().unwrap())?;
        Some((status, Json(json!({ "error": "forced failure" }))).into_response())
    }

    async fn pause_read(&self) {
        let delay = *self.read_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
    }

    async fn pause_write(&self) {
        let delay = *self.write_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
    }

    async fn pause_reply(&self) {
        let delay = *self.reply_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
    }
}

type Shared = Arc<StoreState>;

/// Remote movie store double listening on an ephemeral localhost port.
///
/// Reads snapshot the collection before sleeping for the read delay, so a
/// delayed read returns data as of when the request arrived.
pub struct FakeMovieStore {
    state: Shared,
    addr: SocketAddr,
}

impl FakeMovieStore {
    pub async fn spawn(seed: Vec<Movie>) -> Self {
        let state: Shared = Arc::new(StoreState::default());
        *state.movies.lock().unwrap() = seed;

        let app = Router::new()
            .route("/movies", get(list).post(create))
            .route("/movies/{id}", get(show).patch(update).delete(remove))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake movie store");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { state, addr }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}/", self.addr))
    }

    pub fn hits(&self, route: Route) -> usize {
        self.state.hits.lock().unwrap().get(&route).copied().unwrap_or(0)
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.state.read_delay.lock().unwrap() = delay;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.state.write_delay.lock().unwrap() = delay;
    }

    /// Commit writes immediately but hold back their response for `delay`.
    pub fn set_reply_delay(&self, delay: Duration) {
        *self.state.reply_delay.lock().unwrap() = delay;
    }

    /// Answer every subsequent request with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.forced_status.lock().unwrap() = Some(status);
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.state.movies.lock().unwrap().clone()
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Movie not found" }))).into_response()
}

async fn list(State(state): State<Shared>) -> Response {
    state.hit(Route::List);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    let snapshot = state.movies.lock().unwrap().clone();
    state.pause_read().await;
    Json(snapshot).into_response()
}

async fn show(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    state.hit(Route::Get);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    let found = state
        .movies
        .lock()
        .unwrap()
        .iter()
        .find(|m| m.id.as_str() == id)
        .cloned();
    state.pause_read().await;
    match found {
        Some(movie) => Json(movie).into_response(),
        None => not_found(),
    }
}

async fn create(State(state): State<Shared>, Json(input): Json<CreateMovie>) -> Response {
    state.hit(Route::Create);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    state.pause_write().await;
    let movie = Movie {
        id: MovieId::new(uuid::Uuid::new_v4().to_string()),
        title: input.title,
        year: input.year,
        genre: input.genre,
        rating: input.rating,
        duration: input.duration,
        description: input.description,
        poster: input.poster,
    };
    state.movies.lock().unwrap().push(movie.clone());
    state.pause_reply().await;
    (StatusCode::CREATED, Json(movie)).into_response()
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateMovie>,
) -> Response {
    state.hit(Route::Update);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    state.pause_write().await;
    let updated = apply_patch(&state, &id, patch);
    state.pause_reply().await;
    match updated {
        Some(movie) => Json(movie).into_response(),
        None => not_found(),
    }
}

fn apply_patch(state: &StoreState, id: &str, patch: UpdateMovie) -> Option<Movie> {
    let mut movies = state.movies.lock().unwrap();
    let movie = movies.iter_mut().find(|m| m.id.as_str() == id)?;
    if let Some(title) = patch.title {
        movie.title = title;
    }
    if let Some(year) = patch.year {
        movie.year = year;
    }
    if let Some(genre) = patch.genre {
        movie.genre = genre;
    }
    if let Some(rating) = patch.rating {
        movie.rating = rating;
    }
    if let Some(duration) = patch.duration {
        movie.duration = duration;
    }
    if let Some(description) = patch.description {
        movie.description = description;
    }
    if let Some(poster) = patch.poster {
        movie.poster = Some(poster).filter(|p| !p.is_empty());
    }
    Some(movie.clone())
}

async fn remove(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    state.hit(Route::Delete);
    if let Some(failure) = state.forced_failure() {
        return failure;
    }
    state.pause_write().await;
    let mut movies = state.movies.lock().unwrap();
    let before = movies.len();
    movies.retain(|m| m.id.as_str() != id);
    if movies.len() == before {
        return not_found();
    }
    Json(json!({ "success": true })).into_response()
}

/// Test fixtures for common test data
pub mod fixtures {
    use crate::models::{CreateMovie, Movie, MovieId};

    pub fn movie(id: &str, title: &str, genre: &str, year: i32, rating: f64) -> Movie {
        Movie {
            id: MovieId::new(id),
            title: title.to_string(),
            year,
            genre: genre.to_string(),
            rating,
            duration: 120,
            description: format!("About {}", title),
            poster: None,
        }
    }

    pub fn catalog() -> Vec<Movie> {
        vec![
            movie("1", "The Matrix", "Sci-Fi", 1999, 8.7),
            movie("2", "Matrix Reloaded", "Sci-Fi", 2003, 7.2),
            movie("3", "Inception", "Sci-Fi", 2010, 8.8),
        ]
    }

    pub fn new_movie(title: &str) -> CreateMovie {
        CreateMovie {
            title: title.to_string(),
            year: 1995,
            genre: "Crime".to_string(),
            rating: 8.3,
            duration: 170,
            description: "A group of professional bank robbers.".to_string(),
            poster: Some("https://example.com/heat.jpg".to_string()),
        }
    }
}
