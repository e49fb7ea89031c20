//! Terminal rendering of movies and reviews

use crate::api::{Movie, Page, Review};
use cinereview_core::{render_stars, round_to};
use std::fmt::Write;

/// Titles longer than this are shortened in listings
pub const TITLE_WIDTH: usize = 20;

/// Shorten `title` to at most `width` characters, ending in `...` when cut
pub fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let kept: String = title.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Star rendering of an average score, e.g. `★★★★☆ (4.25)`
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(score) => format!("{} ({})", render_stars(score), round_to(score, 2)),
        None => "no reviews yet".to_string(),
    }
}

/// One line per movie
pub fn movie_line(movie: &Movie) -> String {
    format!(
        "{:>4}  {:<width$}  {}  [{} reviews]",
        movie.id,
        truncate_title(&movie.title, TITLE_WIDTH),
        format_average(movie.average_score),
        movie.review_count,
        width = TITLE_WIDTH,
    )
}

pub fn movie_details(movie: &Movie) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", movie.title, movie.id);
    let _ = writeln!(out, "  Released: {}", optional(movie.release_date.map(|d| d.to_string())));
    let _ = writeln!(out, "  Director: {}", optional(movie.director.clone()));
    let _ = writeln!(out, "  Genre:    {}", optional(movie.genre.clone()));
    if let Some(poster) = &movie.poster_url {
        let _ = writeln!(out, "  Poster:   {poster}");
    }
    let _ = write!(out, "  Rating:   {}", format_average(movie.average_score));
    out
}

/// One line per review: author, text, sentiment and score
pub fn review_line(review: &Review) -> String {
    format!(
        "#{:<4} {}: {}  [{} {:.2}]  {} {:.2}",
        review.id,
        review.author,
        review.content,
        review.sentiment_label,
        review.sentiment_confidence,
        render_stars(review.sentiment_score),
        review.sentiment_score,
    )
}

pub fn review_page(page: &Page<Review>, offset: i64) -> String {
    if page.items.is_empty() {
        return "No reviews.".to_string();
    }

    let mut out = String::new();
    for review in &page.items {
        let _ = writeln!(out, "movie {:>4}  {}", review.movie_id, review_line(review));
    }
    let last = offset + page.items.len() as i64;
    let _ = write!(out, "Showing {}-{} of {}", offset + 1, last, page.total);
    out
}

/// One page of a movie's reviews with a `Page x / y` footer.
///
/// `page` counts from 1; a page past the end shows the last one.
pub fn paged_reviews(reviews: &[Review], page: usize, per_page: usize) -> String {
    if reviews.is_empty() {
        return "No reviews.".to_string();
    }

    let per_page = per_page.max(1);
    let pages = reviews.len().div_ceil(per_page);
    let page = page.clamp(1, pages);
    let start = (page - 1) * per_page;

    let mut out = String::new();
    for review in reviews.iter().skip(start).take(per_page) {
        let _ = writeln!(out, "{}", review_line(review));
    }
    let _ = write!(out, "Page {page} / {pages} ({} reviews)", reviews.len());
    out
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cinereview_core::SentimentLabel;

    fn movie(title: &str, average_score: Option<f64>) -> Movie {
        Movie {
            id: 3,
            title: title.to_string(),
            release_date: None,
            director: Some("봉준호".to_string()),
            genre: None,
            poster_url: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            review_count: 2,
            average_score,
        }
    }

    #[test]
    fn test_truncate_title_counts_characters() {
        assert_eq!(truncate_title("Oldboy", 20), "Oldboy");

        let long = "극장판 짱구는 못말려: 초화려! 작열하는 떡잎마을 댄서즈";
        let short = truncate_title(long, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.ends_with("..."));
        assert!(short.starts_with("극장판 짱구는"));
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(Some(4.254)), "★★★★☆ (4.25)");
        assert_eq!(format_average(Some(4.9)), "★★★★★ (4.9)");
        assert_eq!(format_average(None), "no reviews yet");
    }

    #[test]
    fn test_movie_details_marks_missing_fields() {
        let details = movie_details(&movie("Mother", Some(1.5)));
        assert!(details.starts_with("Mother (#3)"));
        assert!(details.contains("Director: 봉준호"));
        assert!(details.contains("Genre:    -"));
        assert!(details.contains("★☆☆☆☆ (1.5)"));
    }

    fn review(id: i64, content: &str) -> Review {
        Review {
            id,
            movie_id: 3,
            author: "kim".to_string(),
            content: content.to_string(),
            sentiment_label: SentimentLabel::Positive,
            sentiment_confidence: 0.8,
            sentiment_score: 4.5,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_review_line() {
        let line = review_line(&review(7, "최고의 명작"));
        assert!(line.contains("kim: 최고의 명작"));
        assert!(line.contains("[positive 0.80]"));
        assert!(line.ends_with("★★★★☆ 4.50"));
    }

    #[test]
    fn test_empty_review_page() {
        let page = Page {
            items: Vec::new(),
            total: 0,
        };
        assert_eq!(review_page(&page, 0), "No reviews.");
    }

    #[test]
    fn test_paged_reviews_splits_into_pages() {
        let reviews: Vec<_> = (1..=23).map(|i| review(i, &format!("review {i}"))).collect();

        let first = paged_reviews(&reviews, 1, 10);
        assert_eq!(first.lines().count(), 11);
        assert!(first.lines().next().unwrap().starts_with("#1 "));
        assert!(first.ends_with("Page 1 / 3 (23 reviews)"));

        let last = paged_reviews(&reviews, 3, 10);
        assert_eq!(last.lines().count(), 4);
        assert!(last.contains("review 21"));
        assert!(last.contains("review 23"));
        assert!(!last.contains("review 20"));
        assert!(last.ends_with("Page 3 / 3 (23 reviews)"));
    }

    #[test]
    fn test_paged_reviews_clamps_out_of_range_pages() {
        let reviews: Vec<_> = (1..=5).map(|i| review(i, &format!("review {i}"))).collect();

        assert!(paged_reviews(&reviews, 9, 2).ends_with("Page 3 / 3 (5 reviews)"));
        assert!(paged_reviews(&reviews, 0, 2).ends_with("Page 1 / 3 (5 reviews)"));
        assert!(paged_reviews(&reviews, 1, 0).ends_with("Page 1 / 5 (5 reviews)"));
        assert_eq!(paged_reviews(&[], 1, 10), "No reviews.");
    }
}
