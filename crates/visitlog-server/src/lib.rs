pub mod app;
pub mod config;
pub mod error;
pub mod geo;
pub mod routes;
pub mod state;
