//! Roster Server - Axum HTTP boundary for the student store.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
