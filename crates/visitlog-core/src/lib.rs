pub mod admin;
pub mod config;
pub mod error;
pub mod store;
pub mod user_agent;
pub mod visit;
