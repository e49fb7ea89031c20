//! Movie queries

use chrono::Utc;
use cinereview_core::{Error, Result};
use tracing::debug;

use crate::db::Store;
use crate::models::{Movie, NewMovie};

const MOVIE_COLUMNS: &str = r#"
    SELECT m.id, m.title, m.release_date, m.director, m.genre, m.poster_url, m.created_at,
           COUNT(r.id) AS review_count,
           AVG(r.sentiment_score) AS average_score
    FROM movies m
    LEFT JOIN reviews r ON r.movie_id = m.id
"#;

impl Store {
    /// Insert a movie and return it with empty aggregates
    pub async fn create_movie(&self, movie: NewMovie) -> Result<Movie> {
        let created_at = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO movies (title, release_date, director, genre, poster_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&movie.title)
        .bind(movie.release_date)
        .bind(&movie.director)
        .bind(&movie.genre)
        .bind(&movie.poster_url)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, title = %movie.title, "Movie created");

        Ok(Movie {
            id,
            title: movie.title,
            release_date: movie.release_date,
            director: movie.director,
            genre: movie.genre,
            poster_url: movie.poster_url,
            created_at,
            review_count: 0,
            average_score: None,
        })
    }

    /// All movies ordered by id
    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        let sql = format!("{MOVIE_COLUMNS} GROUP BY m.id ORDER BY m.id");
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(movies.into_iter().map(Movie::with_rounded_average).collect())
    }

    /// One movie by id
    pub async fn get_movie(&self, id: i64) -> Result<Movie> {
        let sql = format!("{MOVIE_COLUMNS} WHERE m.id = ? GROUP BY m.id");
        sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::with_rounded_average)
            .ok_or_else(|| Error::not_found("movie", id))
    }

    /// Whether a movie exists
    pub async fn movie_exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM movies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Delete a movie and, through the foreign key, all of its reviews
    pub async fn delete_movie(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(Error::not_found("movie", id));
        }

        debug!(id, "Movie deleted");
        Ok(())
    }
}
