pub mod movies;

pub use movies::{DeleteOutcome, MovieClient, MovieListWatch};
