//! Review queries

use chrono::Utc;
use cinereview_core::{Error, Result, SentimentResult};
use tracing::debug;

use crate::db::Store;
use crate::models::{NewReview, Page, Review, ReviewRow, SortOrder};

const REVIEW_COLUMNS: &str = r#"
    SELECT id, movie_id, author, content, sentiment_label, sentiment_confidence,
           sentiment_score, created_at
    FROM reviews
"#;

impl Store {
    /// Insert a review with the sentiment computed for it
    pub async fn create_review(
        &self,
        review: NewReview,
        sentiment: SentimentResult,
    ) -> Result<Review> {
        if !self.movie_exists(review.movie_id).await? {
            return Err(Error::not_found("movie", review.movie_id));
        }

        let created_at = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO reviews (movie_id, author, content, sentiment_label,
                                 sentiment_confidence, sentiment_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(review.movie_id)
        .bind(&review.author)
        .bind(&review.content)
        .bind(sentiment.label.as_str())
        .bind(sentiment.confidence)
        .bind(sentiment.score)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, movie_id = review.movie_id, label = %sentiment.label, "Review stored");

        Ok(Review {
            id,
            movie_id: review.movie_id,
            author: review.author,
            content: review.content,
            sentiment_label: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            sentiment_score: sentiment.score,
            created_at,
        })
    }

    /// One review by id
    pub async fn get_review(&self, id: i64) -> Result<Review> {
        let sql = format!("{REVIEW_COLUMNS} WHERE id = ?");
        sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("review", id))?
            .try_into()
    }

    /// Newest reviews across all movies
    pub async fn recent_reviews(&self, limit: i64, offset: i64) -> Result<Page<Review>> {
        let sql = format!("{REVIEW_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(limit.max(0))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items: into_reviews(rows)?,
            total,
        })
    }

    /// All reviews of one movie
    pub async fn reviews_for_movie(
        &self,
        movie_id: i64,
        order: SortOrder,
    ) -> Result<Vec<Review>> {
        if !self.movie_exists(movie_id).await? {
            return Err(Error::not_found("movie", movie_id));
        }

        let direction = order.as_sql();
        let sql = format!(
            "{REVIEW_COLUMNS} WHERE movie_id = ? ORDER BY created_at {direction}, id {direction}"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await?;

        into_reviews(rows)
    }

    /// Delete one review
    pub async fn delete_review(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(Error::not_found("review", id));
        }

        debug!(id, "Review deleted");
        Ok(())
    }
}

fn into_reviews(rows: Vec<ReviewRow>) -> Result<Vec<Review>> {
    rows.into_iter().map(Review::try_from).collect()
}
