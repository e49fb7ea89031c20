//! Typed HTTP client for the CineReview API

use chrono::{DateTime, NaiveDate, Utc};
use cinereview_core::{SentimentLabel, SentimentResult};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default request timeout; review creation waits on sentiment scoring
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// A movie as returned by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub review_count: i64,
    pub average_score: Option<f64>,
}

/// A review as returned by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
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
    pub fn sentiment(&self) -> SentimentResult {
        SentimentResult::new(
            self.sentiment_label,
            self.sentiment_confidence,
            self.sentiment_score,
        )
    }
}

/// One page of results with the overall count
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Fields for a new movie
#[derive(Debug, Clone, Default, Serialize)]
pub struct MovieDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Fields for a new review
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    pub movie_id: i64,
    pub author: String,
    pub content: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// CineReview API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        let response = self.http.get(self.url("/movies")).send().await?;
        decode(response).await
    }

    pub async fn get_movie(&self, id: i64) -> Result<Movie> {
        let response = self.http.get(self.url(&format!("/movies/{id}"))).send().await?;
        decode(response).await
    }

    pub async fn create_movie(&self, movie: &MovieDraft) -> Result<Movie> {
        debug!(title = %movie.title, "Creating movie");
        let response = self.http.post(self.url("/movies")).json(movie).send().await?;
        decode(response).await
    }

    pub async fn delete_movie(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/movies/{id}")))
            .send()
            .await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }

    /// Reviews of one movie; `order` is `asc` or `desc`
    pub async fn movie_reviews(&self, id: i64, order: &str) -> Result<Vec<Review>> {
        let response = self
            .http
            .get(self.url(&format!("/movies/{id}/reviews")))
            .query(&[("order", order)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create_review(&self, review: &ReviewDraft) -> Result<Review> {
        debug!(movie_id = review.movie_id, author = %review.author, "Creating review");
        let response = self
            .http
            .post(self.url("/reviews"))
            .json(review)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn recent_reviews(&self, limit: i64, offset: i64) -> Result<Page<Review>> {
        let response = self
            .http
            .get(self.url("/reviews"))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/reviews/{id}")))
            .send()
            .await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
