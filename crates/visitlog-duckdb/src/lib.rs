pub mod backend;
pub mod schema;
pub mod visits;

pub use backend::DuckDbBackend;
