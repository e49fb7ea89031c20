//! CineReview command-line client
//!
//! Talks to the CineReview server over HTTP and renders movies, reviews and
//! star ratings in the terminal.

pub mod api;
pub mod cli;
pub mod display;
pub mod seed;

pub use api::{ApiClient, ClientError, Movie, MovieDraft, Page, Review, ReviewDraft};
pub use cli::{Cli, Commands};
