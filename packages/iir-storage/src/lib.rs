pub mod db;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::{Error, is_unavailable};

pub type Result<T, E = Error> = std::result::Result<T, E>;
