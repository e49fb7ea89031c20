//! CineReview Store
//!
//! SQLite persistence for movies and their scored reviews.
//!
//! A review's sentiment is computed once, before it is inserted, and stored
//! verbatim. Movie aggregates (`review_count`, `average_score`) are derived
//! on every read and never stored.

pub mod db;
pub mod models;
mod movies;
mod reviews;

pub use db::{DatabaseConfig, Store, MEMORY_DATABASE};
pub use models::{Movie, NewMovie, NewReview, Page, Review, SortOrder};
