//! Movie and review records

use chrono::{DateTime, NaiveDate, Utc};
use cinereview_core::{round_to, Error, Result, SentimentLabel, SentimentResult};
use serde::{Deserialize, Serialize};

/// Longest accepted movie title, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest accepted author name, in characters
pub const MAX_AUTHOR_CHARS: usize = 80;

/// Longest accepted review text, in characters
pub const MAX_CONTENT_CHARS: usize = 5000;

/// A movie with its derived review aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Number of reviews of this movie
    pub review_count: i64,

    /// Mean star score of the reviews, `None` without reviews
    pub average_score: Option<f64>,
}

impl Movie {
    pub(crate) fn with_rounded_average(mut self) -> Self {
        self.average_score = self.average_score.map(|avg| round_to(avg, 2));
        self
    }
}

/// Input for creating a movie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl NewMovie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Check field limits
    pub fn validate(&self) -> Result<()> {
        check_text("title", &self.title, MAX_TITLE_CHARS)
    }
}

/// A stored review with its frozen sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub movie_id: i64,
    pub author: String,
    pub content: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_confidence: f64,
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// The sentiment stored with the review
    pub fn sentiment(&self) -> SentimentResult {
        SentimentResult::new(
            self.sentiment_label,
            self.sentiment_confidence,
            self.sentiment_score,
        )
    }
}

/// Row shape of the `reviews` table
#[derive(sqlx::FromRow)]
pub(crate) struct ReviewRow {
    id: i64,
    movie_id: i64,
    author: String,
    content: String,
    sentiment_label: String,
    sentiment_confidence: f64,
    sentiment_score: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = Error;

    fn try_from(row: ReviewRow) -> Result<Self> {
        let sentiment_label = row.sentiment_label.parse().map_err(|_| {
            Error::storage(format!(
                "review {} has unknown sentiment label '{}'",
                row.id, row.sentiment_label
            ))
        })?;

        Ok(Self {
            id: row.id,
            movie_id: row.movie_id,
            author: row.author,
            content: row.content,
            sentiment_label,
            sentiment_confidence: row.sentiment_confidence,
            sentiment_score: row.sentiment_score,
            created_at: row.created_at,
        })
    }
}

/// Input for creating a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub movie_id: i64,
    pub author: String,
    pub content: String,
}

impl NewReview {
    pub fn new(movie_id: i64, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            movie_id,
            author: author.into(),
            content: content.into(),
        }
    }

    /// Check field limits
    pub fn validate(&self) -> Result<()> {
        check_text("author", &self.author, MAX_AUTHOR_CHARS)?;
        check_text("content", &self.content, MAX_CONTENT_CHARS)
    }
}

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }

    let chars = value.chars().count();
    if chars > max_chars {
        return Err(Error::validation(format!(
            "{field} must be at most {max_chars} characters (got {chars})"
        )));
    }

    Ok(())
}

/// One page of results with the total number available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Ordering of a movie's reviews by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
