use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cinereview")]
#[command(author, version, about = "Browse and add CineReview movies and reviews")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Server base URL
    #[arg(
        short,
        long,
        env = "CINEREVIEW_URL",
        default_value = "http://127.0.0.1:8000",
        global = true
    )]
    pub server: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List movies with their average rating
    List,

    /// Show a movie and its reviews
    Show {
        /// Movie ID
        id: i64,

        /// Review order by creation time
        #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
        order: String,

        /// Page of reviews to show, starting at 1
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Reviews per page
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
        per_page: u32,
    },

    /// Register a movie
    AddMovie {
        #[arg(short, long)]
        title: String,

        /// Release date (YYYY-MM-DD)
        #[arg(short, long)]
        release_date: Option<NaiveDate>,

        #[arg(short, long)]
        director: Option<String>,

        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short, long)]
        poster_url: Option<String>,
    },

    /// Write a review; the server scores its sentiment
    AddReview {
        #[arg(short, long)]
        movie_id: i64,

        #[arg(short, long)]
        author: String,

        /// Review text
        #[arg(short, long)]
        content: String,
    },

    /// Show the most recent reviews across all movies
    Recent {
        #[arg(short, long, default_value = "10")]
        limit: i64,

        #[arg(short, long, default_value = "0")]
        offset: i64,
    },

    /// Delete a movie and all of its reviews
    DeleteMovie {
        /// Movie ID
        id: i64,
    },

    /// Delete a review
    DeleteReview {
        /// Review ID
        id: i64,
    },

    /// Create demo movies with random Korean reviews
    Seed {
        /// Reviews written for each new movie
        #[arg(short, long, default_value = "10")]
        reviews_per_movie: usize,
    },
}
