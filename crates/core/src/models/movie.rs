use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub const MIN_YEAR: i32 = 1800;
pub const MAX_RATING: f64 = 10.0;

/// Identifier assigned by the remote store.
///
/// Opaque to the client. Stores that hand out numeric ids are accepted and the
/// number is kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MovieId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => MovieId(text),
            RawId::Integer(n) => MovieId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub rating: f64,
    /// Running time in minutes
    pub duration: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub rating: f64,
    pub duration: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl CreateMovie {
    /// Check every field, then normalize a blank poster to `None`.
    pub fn validate(mut self) -> Result<Self> {
        validate_text("title", &self.title)?;
        validate_year(self.year)?;
        validate_text("genre", &self.genre)?;
        validate_rating(self.rating)?;
        validate_duration(self.duration)?;
        validate_text("description", &self.description)?;
        self.poster = normalize_poster(self.poster);
        Ok(self)
    }
}

/// Pre-fills an edit form from an existing record.
impl From<&Movie> for CreateMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            genre: movie.genre.clone(),
            rating: movie.rating,
            duration: movie.duration,
            description: movie.description.clone(),
            poster: movie.poster.clone(),
        }
    }
}

/// Partial update. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMovie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl UpdateMovie {
    pub fn is_empty(&self) -> bool {
        self == &UpdateMovie::default()
    }

    /// Check only the fields being changed.
    ///
    /// A blank poster is sent as an empty string so the store clears it.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(ref title) = self.title {
            validate_text("title", title)?;
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(ref genre) = self.genre {
            validate_text("genre", genre)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let Some(duration) = self.duration {
            validate_duration(duration)?;
        }
        if let Some(ref description) = self.description {
            validate_text("description", description)?;
        }
        if let Some(poster) = self.poster.take() {
            self.poster = Some(normalize_poster(Some(poster)).unwrap_or_default());
        }
        Ok(self)
    }
}

impl From<CreateMovie> for UpdateMovie {
    fn from(input: CreateMovie) -> Self {
        Self {
            title: Some(input.title),
            year: Some(input.year),
            genre: Some(input.genre),
            rating: Some(input.rating),
            duration: Some(input.duration),
            description: Some(input.description),
            poster: Some(input.poster.unwrap_or_default()),
        }
    }
}

/// Latest production year accepted by validation.
pub fn max_year() -> i32 {
    Utc::now().year() + 5
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_year(year: i32) -> Result<()> {
    let max = max_year();
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(Error::Validation(format!(
            "year must be between {} and {}",
            MIN_YEAR, max
        )));
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<()> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(Error::Validation(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    Ok(())
}

fn validate_duration(duration: u32) -> Result<()> {
    if duration < 1 {
        return Err(Error::Validation(
            "duration must be at least 1 minute".to_string(),
        ));
    }
    Ok(())
}

fn normalize_poster(poster: Option<String>) -> Option<String> {
    poster
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}
