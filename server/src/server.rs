//! Router setup and process lifecycle.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use database::retry::RetryFuture;
use database::{retry_with_backoff, DatabaseError, Pool};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::routes::{self, games, reviews};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        // Games
        .route(
            "/v1/games",
            get(games::find_all).post(games::post).patch(games::patch),
        )
        .route(
            "/v1/games/game/{id}",
            get(games::get_by_id).delete(games::delete_by_id),
        )
        .route("/v1/games/categories", get(games::find_all_categories))
        .route(
            "/v1/games/categories/{category}",
            get(games::get_by_category),
        )
        // Reviews
        .route(
            "/v1/reviews",
            get(reviews::find_all)
                .post(reviews::post)
                .patch(reviews::patch),
        )
        .route("/v1/reviews/unpublished", get(reviews::find_all_unpublished))
        .route(
            "/v1/reviews/review/{id}",
            get(reviews::get_by_id).delete(reviews::delete_by_id),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Reaching the store is retried here, at startup, and nowhere else. Giving
/// up is fatal for the process.
pub async fn connect_pool(config: &ServerConfig) -> Result<Pool, DatabaseError> {
    let database = config.database_config();
    retry_with_backoff(
        "Connecting to document store",
        || -> RetryFuture<Pool, DatabaseError> {
            let database = database.clone();
            Box::pin(async move { database.create_pool().await })
        },
        config.connect_retries,
        Duration::from_millis(500),
    )
    .await
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let pool = Arc::new(connect_pool(&config).await?);
    if config.api_token.is_none() {
        log::warn!("No API token configured; mutating endpoints will refuse every request");
    }

    let state = AppState::new(pool.clone(), &config.database, config.api_token.clone());
    let app = create_router(state);

    let listener = TcpListener::bind(config.address()).await?;
    log::info!(
        "Starting rank-server on http://{} (database: {})",
        config.address(),
        config.database
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    log::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::warn!("Received Ctrl+C, shutting down..."),
        _ = terminate => log::warn!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use database::DatabaseConfig;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TOKEN: &str = "secret";

    async fn test_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path()).with_pool_size(4);
        let pool = Arc::new(Pool::connect(&config).await.unwrap());
        let state = AppState::new(pool, "rank", Some(TOKEN.to_string()));
        (dir, create_router(state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_game(app: &Router, name: &str, category: &str) -> String {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/v1/games",
                json!({"name": name, "category": category}),
                Some(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_dir, app) = test_app().await;
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["pool"]["pooled"], true);
        assert_eq!(body["pool"]["max_size"], 4);
    }

    #[tokio::test]
    async fn test_games_crud() {
        let (_dir, app) = test_app().await;

        let id = create_game(&app, "Game 1", "Action").await;
        assert!(types::is_valid_id(&id));

        let response = app.clone().oneshot(get("/v1/games")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let games = json_body(response).await;
        assert_eq!(games.as_array().unwrap().len(), 1);
        assert_eq!(games[0]["name"], "Game 1");

        let response = app
            .clone()
            .oneshot(send_json(
                "PATCH",
                "/v1/games",
                json!({"id": id, "name": "Different name", "category": "Action"}),
                Some(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get(&format!("/v1/games/game/{id}")))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], 200);
        assert_eq!(body["game"]["name"], "Different name");

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/games/game/{id}"))
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get(&format!("/v1/games/game/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["game"].is_null());
    }

    #[tokio::test]
    async fn test_categories() {
        let (_dir, app) = test_app().await;
        create_game(&app, "One", "A").await;
        create_game(&app, "Two", "A").await;
        create_game(&app, "Three", "B").await;

        let response = app
            .clone()
            .oneshot(get("/v1/games/categories"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!(["A", "B"]));

        let response = app.oneshot(get("/v1/games/categories/A")).await.unwrap();
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(get("/v1/games/game/not-a-valid-id"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Invalid ID");
    }

    #[tokio::test]
    async fn test_mutations_require_token() {
        let (_dir, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(send_json("POST", "/v1/games", json!({"name": "x"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/v1/reviews",
                json!({"title": "x"}),
                Some("wrong"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.oneshot(get("/v1/games")).await.unwrap();
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (_dir, app) = test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/v1/games")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Failed to parse json");
    }

    #[tokio::test]
    async fn test_patch_without_id_is_rejected() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(send_json(
                "PATCH",
                "/v1/reviews",
                json!({"title": "no id"}),
                Some(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reviews_start_unpublished() {
        let (_dir, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/v1/reviews",
                json!({"title": "Title 1", "body": "Great"}),
                Some(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get("/v1/reviews/unpublished"))
            .await
            .unwrap();
        let unpublished = json_body(response).await;
        assert_eq!(unpublished.as_array().unwrap().len(), 1);
        assert_eq!(unpublished[0]["is_published"], false);

        let response = app
            .oneshot(get(&format!("/v1/reviews/review/{id}")))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["review"]["title"], "Title 1");
    }
}
