//! Review routes under /v1/reviews

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use types::Review;

use super::{parse_id, require_id};
use crate::auth::authorize;
use crate::error::ServerResult;
use crate::state::AppState;

/// GET /v1/reviews
pub async fn find_all(State(state): State<AppState>) -> ServerResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.find_all_reviews().await?))
}

/// GET /v1/reviews/unpublished
pub async fn find_all_unpublished(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.find_all_unpublished_reviews().await?))
}

/// GET /v1/reviews/review/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Value>> {
    let id = parse_id(&id)?;
    let review = state.reviews.get_review_by_id(id).await?;

    Ok(Json(json!({
        "status": StatusCode::OK.as_u16(),
        "review": review,
    })))
}

/// POST /v1/reviews
pub async fn post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Review>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    authorize(state.api_token(), &headers)?;
    let Json(mut review) = body?;

    let id = state.reviews.store_review(&mut review).await?;
    log::info!("Created review {} ({})", id, review.title);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": StatusCode::CREATED.as_u16(),
            "message": "Review created successfully!",
            "id": id,
        })),
    ))
}

/// PATCH /v1/reviews
pub async fn patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Review>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    authorize(state.api_token(), &headers)?;
    let Json(review) = body?;
    require_id(review.id)?;

    state.reviews.update_review(&review).await?;

    Ok(Json(json!({
        "status": StatusCode::OK.as_u16(),
        "message": "Review updated successfully!",
    })))
}

/// DELETE /v1/reviews/review/{id}
pub async fn delete_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Json<Value>> {
    authorize(state.api_token(), &headers)?;
    let id = parse_id(&id)?;

    state.reviews.delete_review_by_id(id).await?;

    Ok(Json(json!({ "status": StatusCode::OK.as_u16() })))
}
