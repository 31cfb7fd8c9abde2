//! HTTP tests for alert listing, status transitions and the alert stream.

mod common;

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use clima_core::types::DbId;
use common::{body_json, get, patch, patch_json, post_json, seed_sensor};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

/// Raise a `sensorFailure` alert through the health-check endpoint.
async fn raise_failure_alert(pool: &PgPool) -> DbId {
    let sensor_id = seed_sensor(pool, "Chile", "Santiago", "failed").await;
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/sensors/{sensor_id}/health-check"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_then_resolve(pool: PgPool) {
    let id = raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = patch(app, &format!("/api/v1/alerts/{id}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "acknowledged");

    let app = common::build_test_app(pool.clone());
    let response = patch(app, &format!("/api/v1/alerts/{id}/resolve")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "resolved");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/alerts/{id}")).await).await;
    assert_eq!(json["data"]["status"], "resolved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolved_alert_cannot_be_reopened(pool: PgPool) {
    let id = raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = patch(app, &format!("/api/v1/alerts/{id}/resolve")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/alerts/{id}/status"),
        json!({ "status": "active" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let app = common::build_test_app(pool);
    let response = patch(app, &format!("/api/v1/alerts/{id}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_alert_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/alerts/987654").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = patch(app, "/api/v1/alerts/987654/acknowledge").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status(pool: PgPool) {
    let first = raise_failure_alert(&pool).await;
    let second = raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool.clone());
    patch(app, &format!("/api/v1/alerts/{first}/acknowledge")).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts/active").await).await;
    let active: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(active, vec![second]);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts?status=acknowledged").await).await;
    let acknowledged = json["data"].as_array().unwrap();
    assert_eq!(acknowledged.len(), 1);
    assert_eq!(acknowledged[0]["id"], first);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/alerts").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stream_read_returns_entries_after_the_cursor(pool: PgPool) {
    let first = raise_failure_alert(&pool).await;
    let second = raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alerts/stream?after=0").await).await;
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["alert"]["id"], first);
    assert_eq!(entries[1]["alert"]["id"], second);
    assert_eq!(entries[0]["alert"]["kind"], "sensorFailure");
    assert!(entries[0]["alert"]["sensorID"].is_i64());

    let cursor = json["data"]["cursor"].as_str().unwrap().to_string();
    assert_eq!(entries[1]["entryId"], cursor);

    let app = common::build_test_app(pool);
    let started = Instant::now();
    let json = body_json(get(app, &format!("/api/v1/alerts/stream?after={cursor}")).await).await;
    assert!(json["data"]["entries"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["cursor"], cursor);
    assert!(started.elapsed() >= Duration::from_millis(90));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stream_read_from_latest_skips_history(pool: PgPool) {
    raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/alerts/stream?after=$").await).await;
    assert!(json["data"]["entries"].as_array().unwrap().is_empty());
    assert_ne!(json["data"]["cursor"], "0");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_stream_cursor_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts/stream?after=abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn live_feed_sends_alerts_as_server_sent_events(pool: PgPool) {
    let id = raise_failure_alert(&pool).await;

    let app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/api/v1/alerts/stream/live")
        .header("last-event-id", "0")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("feed should deliver the stored alert")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();

    assert!(text.contains("event: alert"), "got: {text}");
    assert!(text.contains(&format!("\"id\":{id}")), "got: {text}");
}
