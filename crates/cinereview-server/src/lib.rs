//! CineReview HTTP API
//!
//! Movies and reviews over JSON, with every review scored by the sentiment
//! analyzer before it is stored.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{AppConfig, Overrides};
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
