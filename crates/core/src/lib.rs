pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use services::MovieClient;
pub use state::AppStore;
