pub mod filter;
pub mod movie;
pub mod theme;

pub use filter::*;
pub use movie::*;
pub use theme::*;
