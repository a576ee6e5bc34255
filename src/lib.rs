pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod models;
pub mod query;
pub mod routes;
pub mod transaction_number;
pub mod validation;

pub use app::{app_router, build_state, AppState};
