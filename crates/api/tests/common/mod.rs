#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use clima_api::config::ServerConfig;
use clima_api::router::build_app_router;
use clima_api::state::AppState;
use clima_core::thresholds::ThresholdConfig;
use clima_core::types::DbId;
use clima_db::models::sensor::CreateSensor;
use clima_db::repositories::SensorRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and a short stream wait.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        thresholds: ThresholdConfig::default(),
        stream_block_ms: 100,
        stream_poll_ms: 20,
        feed_retry_secs: 1,
    }
}

/// Build the full application router with every middleware layer, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert a sensor and return its id.
pub async fn seed_sensor(pool: &PgPool, country: &str, city: &str, status: &str) -> DbId {
    SensorRepo::create(
        pool,
        &CreateSensor {
            name: format!("{city}-sensor"),
            country: country.to_string(),
            city: city.to_string(),
            region: None,
            status: Some(status.to_string()),
            latitude: 0.0,
            longitude: 0.0,
        },
    )
    .await
    .unwrap()
    .id
}
