// Filmorate - film catalogue with likes and friendships over REST

// HTTP routes and handlers
pub mod api;
pub mod app_state;
pub mod config;

// Storage traits and backends
pub mod infrastructure;

pub mod mapper;
pub mod models;
pub mod services;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use api::create_router;
pub use app_state::AppState;
pub use config::Config;
pub use error::{AppError, AppResult};
