//! Game routes under /v1/games

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use types::Game;

use super::{parse_id, require_id};
use crate::auth::authorize;
use crate::error::ServerResult;
use crate::state::AppState;

/// GET /v1/games - every game
pub async fn find_all(State(state): State<AppState>) -> ServerResult<Json<Vec<Game>>> {
    Ok(Json(state.games.find_all_games().await?))
}

/// GET /v1/games/game/{id} - `game` is null when nothing matches
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Value>> {
    let id = parse_id(&id)?;
    let game = state.games.find_game_by_id(id).await?;

    Ok(Json(json!({
        "status": StatusCode::OK.as_u16(),
        "game": game,
    })))
}

/// GET /v1/games/categories/{category}
pub async fn get_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ServerResult<Json<Vec<Game>>> {
    Ok(Json(state.games.find_games_by_category(&category).await?))
}

/// GET /v1/games/categories
pub async fn find_all_categories(State(state): State<AppState>) -> ServerResult<Json<Vec<String>>> {
    Ok(Json(state.games.find_all_categories().await?))
}

/// POST /v1/games
pub async fn post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Game>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    authorize(state.api_token(), &headers)?;
    let Json(mut game) = body?;

    let id = state.games.store_game(&mut game).await?;
    log::info!("Created game {} ({})", id, game.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": StatusCode::CREATED.as_u16(),
            "message": "Game created successfully!",
            "id": id,
        })),
    ))
}

/// PATCH /v1/games - replaces the game with the body's id
pub async fn patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Game>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    authorize(state.api_token(), &headers)?;
    let Json(game) = body?;
    require_id(game.id)?;

    state.games.update_game(&game).await?;

    Ok(Json(json!({
        "status": StatusCode::OK.as_u16(),
        "message": "Game updated successfully!",
    })))
}

/// DELETE /v1/games/game/{id}
pub async fn delete_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Json<Value>> {
    authorize(state.api_token(), &headers)?;
    let id = parse_id(&id)?;

    state.games.delete_game_by_id(id).await?;

    Ok(Json(json!({ "status": StatusCode::OK.as_u16() })))
}
