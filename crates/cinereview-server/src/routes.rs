//! HTTP routes and handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use cinereview_store::{Movie, NewMovie, NewReview, Page, Review, SortOrder};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Page size when `limit` is not given
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page size served; larger requests are clamped
pub const MAX_PAGE_LIMIT: i64 = 100;

type ApiResult<T> = Result<T, AppError>;

/// Build the application router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", get(get_movie).delete(delete_movie))
        .route("/movies/:id/reviews", get(movie_reviews))
        .route("/reviews", get(recent_reviews).post(create_review))
        .route("/reviews/:id", get(get_review).delete(delete_review))
        .fallback(fallback)
        .layer(middleware::from_fn(count_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn count_requests(request: Request, next: Next) -> Response {
    metrics::counter!("cinereview_requests_total").increment(1);
    next.run(request).await
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "policy_version": state.analyzer.policy_version(),
        "model": state.analyzer.model_description(),
        "model_loaded": state.analyzer.model_loaded(),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.store.list_movies().await?))
}

async fn create_movie(
    State(state): State<AppState>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Movie>)> {
    let Json(movie) = payload?;
    movie.validate()?;

    let movie = state.store.create_movie(movie).await?;
    info!(id = movie.id, title = %movie.title, "Movie added");
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn get_movie(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Movie>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_movie(id).await?))
}

async fn delete_movie(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    state.store.delete_movie(id).await?;
    info!(id, "Movie deleted with its reviews");
    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Deserialize)]
struct OrderParams {
    #[serde(default)]
    order: SortOrder,
}

async fn movie_reviews(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    params: Result<Query<OrderParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Review>>> {
    let Path(id) = id?;
    let Query(params) = params?;
    Ok(Json(state.store.reviews_for_movie(id, params.order).await?))
}

async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let Json(review) = payload?;
    review.validate()?;

    if !state.store.movie_exists(review.movie_id).await? {
        return Err(cinereview_core::Error::not_found("movie", review.movie_id).into());
    }

    let analysis = state.analyzer.analyze(&review.content).await;
    let review = state.store.create_review(review, analysis.result).await?;

    info!(
        id = review.id,
        movie_id = review.movie_id,
        label = %review.sentiment_label,
        score = review.sentiment_score,
        fallback = analysis.is_fallback(),
        "Review added"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PageParams {
    fn resolve(&self) -> ApiResult<(i64, i64)> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0);

        if limit < 1 {
            return Err(AppError::InvalidRequest(
                "limit must be at least 1".to_string(),
            ));
        }
        if offset < 0 {
            return Err(AppError::InvalidRequest(
                "offset must not be negative".to_string(),
            ));
        }

        Ok((limit.min(MAX_PAGE_LIMIT), offset))
    }
}

async fn recent_reviews(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<Review>>> {
    let Query(params) = params?;
    let (limit, offset) = params.resolve()?;
    Ok(Json(state.store.recent_reviews(limit, offset).await?))
}

async fn get_review(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Review>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_review(id).await?))
}

async fn delete_review(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    state.store.delete_review(id).await?;
    info!(id, "Review deleted");
    Ok(Json(json!({ "message": "review deleted" })))
}

async fn fallback() -> AppError {
    AppError::NotFound("route not found".to_string())
}
