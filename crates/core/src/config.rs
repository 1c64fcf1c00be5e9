use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:5174/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<ClientConfig>()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `{base}/movies`
    pub fn movies_url(&self) -> String {
        format!("{}/movies", self.api_base_url.trim_end_matches('/'))
    }

    /// `{base}/movies/{id}` with the id percent-encoded
    pub fn movie_url(&self, id: &str) -> String {
        format!("{}/{}", self.movies_url(), urlencoding::encode(id))
    }
}
