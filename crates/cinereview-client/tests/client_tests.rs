//! Client against a live server on a local port

use cinereview_classifiers::{SentimentAnalyzer, SentimentConfig};
use cinereview_client::seed::{self, SEED_MOVIES};
use cinereview_client::{ApiClient, MovieDraft, ReviewDraft};
use cinereview_core::SentimentLabel;
use cinereview_server::{create_router, AppState};
use cinereview_store::Store;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Serve the API on an ephemeral port with the keyword model
async fn spawn_server() -> ApiClient {
    let store = Store::in_memory().await.unwrap();
    let analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default()).unwrap();
    let app = create_router(AppState::new(store, analyzer), &["*".to_string()]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn test_movie_and_review_lifecycle() {
    let client = spawn_server().await;

    let movie = client
        .create_movie(&MovieDraft {
            title: "살인의 추억".to_string(),
            director: Some("봉준호".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(movie.review_count, 0);

    let review = client
        .create_review(&ReviewDraft {
            movie_id: movie.id,
            author: "kim".to_string(),
            content: "최고의 명작".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(review.sentiment_label, SentimentLabel::Positive);
    assert!(review.sentiment_score > 2.5);

    let fetched = client.get_movie(movie.id).await.unwrap();
    assert_eq!(fetched.review_count, 1);
    assert_eq!(fetched.average_score, Some(review.sentiment_score));

    let reviews = client.movie_reviews(movie.id, "asc").await.unwrap();
    assert_eq!(reviews, vec![review.clone()]);

    client.delete_review(review.id).await.unwrap();
    let page = client.recent_reviews(10, 0).await.unwrap();
    assert_eq!(page.total, 0);

    client.delete_movie(movie.id).await.unwrap();
    assert!(client.get_movie(movie.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_server_errors_surface_message() {
    let client = spawn_server().await;

    let err = client
        .create_review(&ReviewDraft {
            movie_id: 12,
            author: "kim".to_string(),
            content: "좋아요".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API error 404: movie 12 not found");
}

#[tokio::test]
async fn test_seed_is_idempotent_by_title() {
    let client = spawn_server().await;
    let mut rng = StdRng::seed_from_u64(42);

    let first = seed::seed(&client, 3, &mut rng).await.unwrap();
    assert_eq!(first.movies_added, SEED_MOVIES.len());
    assert_eq!(first.reviews_added, SEED_MOVIES.len() * 3);
    assert_eq!(first.movies_skipped, 0);

    let second = seed::seed(&client, 3, &mut rng).await.unwrap();
    assert_eq!(second.movies_added, 0);
    assert_eq!(second.movies_skipped, SEED_MOVIES.len());

    let movies = client.list_movies().await.unwrap();
    assert_eq!(movies.len(), SEED_MOVIES.len());
    assert!(movies.iter().all(|m| m.review_count == 3));
    assert!(movies.iter().all(|m| m.average_score.is_some()));
}
