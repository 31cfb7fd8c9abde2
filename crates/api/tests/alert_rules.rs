//! HTTP tests for alert-rule management.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch, post_json, put_json};
use serde_json::{json, Value};
use sqlx::PgPool;

fn city_rule(name: &str, priority: i16) -> Value {
    json!({
        "name": name,
        "temp_min": -5.0,
        "temp_max": 35.0,
        "scope": "city",
        "country": "Uruguay",
        "city": "Montevideo",
        "priority": priority,
    })
}

async fn create(pool: &PgPool, body: Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/alert-rules", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_defaults_to_active(pool: PgPool) {
    let id = create(&pool, city_rule("Frost and heat", 3)).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/alert-rules/{id}")).await).await;
    assert_eq!(json["data"]["name"], "Frost and heat");
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["scope"], "city");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_rules_are_rejected(pool: PgPool) {
    let cases = [
        json!({ "name": "No bounds", "scope": "country", "country": "Uruguay", "priority": 1 }),
        json!({ "name": "Inverted", "temp_min": 30.0, "temp_max": 10.0, "scope": "country", "country": "Uruguay", "priority": 1 }),
        json!({ "name": "No city", "temp_max": 30.0, "scope": "city", "country": "Uruguay", "priority": 1 }),
        json!({ "name": "Too urgent", "temp_max": 30.0, "scope": "country", "country": "Uruguay", "priority": 9 }),
    ];

    for body in cases {
        let app = common::build_test_app(pool.clone());
        let response = post_json(app, "/api/v1/alert-rules", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "accepted: {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivate_and_summarize(pool: PgPool) {
    let first = create(&pool, city_rule("Montevideo heat", 2)).await;
    create(&pool, city_rule("Montevideo frost", 4)).await;
    create(
        &pool,
        json!({
            "name": "National humidity",
            "humidity_max": 90.0,
            "scope": "country",
            "country": "Uruguay",
            "priority": 1,
        }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = patch(app, &format!("/api/v1/alert-rules/{first}/deactivate")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "inactive");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alert-rules/summary").await).await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["active"], 2);
    assert_eq!(json["data"]["inactive"], 1);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/alert-rules?status=inactive").await).await;
    let inactive = json["data"].as_array().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0]["id"], first);

    let app = common::build_test_app(pool);
    let response = patch(app, &format!("/api/v1/alert-rules/{first}/activate")).await;
    assert_eq!(body_json(response).await["data"]["status"], "active");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_status_filter_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alert-rules?status=paused").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_the_rule(pool: PgPool) {
    let id = create(&pool, city_rule("Temporary", 1)).await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/alert-rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/alert-rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/alert-rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_changes_only_the_given_fields(pool: PgPool) {
    let id = create(&pool, city_rule("Montevideo heat", 2)).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/alert-rules/{id}"),
        json!({ "temp_max": 38.5, "priority": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["temp_max"], 38.5);
    assert_eq!(json["data"]["priority"], 4);
    assert_eq!(json["data"]["temp_min"], -5.0);
    assert_eq!(json["data"]["name"], "Montevideo heat");
    assert_eq!(json["data"]["city"], "Montevideo");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/alert-rules/{id}")).await).await;
    assert_eq!(json["data"]["temp_max"], 38.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_that_breaks_the_rule_is_rejected(pool: PgPool) {
    let id = create(&pool, city_rule("Montevideo heat", 2)).await;

    // The stored maximum is 35; a minimum above it inverts the range.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/alert-rules/{id}"),
        json!({ "temp_min": 40.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/alert-rules/{id}")).await).await;
    assert_eq!(json["data"]["temp_min"], -5.0);

    let app = common::build_test_app(pool);
    let response = put_json(app, "/api/v1/alert-rules/777777", json!({ "priority": 1 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_listing_skips_inactive_rules(pool: PgPool) {
    let low = create(&pool, city_rule("Low", 1)).await;
    let high = create(&pool, city_rule("High", 5)).await;
    let paused = create(&pool, city_rule("Paused", 3)).await;

    let app = common::build_test_app(pool.clone());
    patch(app, &format!("/api/v1/alert-rules/{paused}/deactivate")).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alert-rules/active").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![high, low]);
}
