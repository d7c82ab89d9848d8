//! AIMS diagnosis service: configuration and HTTP API

pub mod api;
pub mod config;
pub mod error;

pub use api::{create_router, AppState};
pub use config::ServerConfig;
pub use error::{AppError, AppResult};
