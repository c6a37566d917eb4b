//! HTTP surface: bearer middleware, envelope codes, status mapping

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use cargodesk::api;
use cargodesk::auth::{Role, create_token};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn create_payload() -> Value {
    json!({
        "to_address": "Moscow, Tverskaya 1",
        "preferred_date": "2026-09-01",
        "price": "15000",
        "payment_type": "наличные"
    })
}

fn post(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn router(app: &common::TestApp) -> Router {
    api::create_router(app.state.clone())
}

#[tokio::test]
async fn health_is_public() {
    let app = common::setup().await;
    let response = router(&app)
        .await
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_and_invalid_tokens_are_rejected() {
    let app = common::setup().await;

    let response = router(&app)
        .await
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");

    let response = router(&app)
        .await
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn order_lifecycle_over_http() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;
    let client_token =
        create_token(&client.user_id, Role::Client, &app.state.jwt_secret).expect("token");
    let driver_token =
        create_token(&driver.user_id, Role::Driver, &app.state.jwt_secret).expect("token");

    // Client creates.
    let response = router(&app)
        .await
        .oneshot(post("/api/orders", &client_token, create_payload()))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["status"], "NEW");
    assert_eq!(body["data"]["payment_kind"], "cash");
    let order_id = body["data"]["id"].as_str().expect("order id").to_string();

    // Wrong role on take: Forbidden.
    let response = router(&app)
        .await
        .oneshot(post(
            &format!("/api/orders/{order_id}/take"),
            &client_token,
            json!({}),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E2001");

    // Completing an unassigned order: wrong time, not wrong person.
    let response = router(&app)
        .await
        .oneshot(post(
            &format!("/api/orders/{order_id}/complete"),
            &client_token,
            json!({}),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0005");

    // Driver takes and finishes; client confirms.
    let response = router(&app)
        .await
        .oneshot(post(
            &format!("/api/orders/{order_id}/take"),
            &driver_token,
            json!({}),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "TAKEN");
    assert_eq!(body["data"]["agreed_price"], "15000");

    let response = router(&app)
        .await
        .oneshot(post(
            &format!("/api/orders/{order_id}/start"),
            &driver_token,
            json!({}),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&app)
        .await
        .oneshot(post(
            &format!("/api/orders/{order_id}/complete"),
            &client_token,
            json!({ "comment": "all good" }),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "COMPLETED");

    // Driver sees the earning.
    let response = router(&app)
        .await
        .oneshot(
            Request::builder()
                .uri("/api/earnings")
                .header(header::AUTHORIZATION, format!("Bearer {driver_token}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_amount"], "15000");
    assert_eq!(body["data"]["orders"].as_array().expect("orders").len(), 1);
}

#[tokio::test]
async fn validation_errors_map_to_bad_request() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let token = create_token(&client.user_id, Role::Client, &app.state.jwt_secret).expect("token");

    let response = router(&app)
        .await
        .oneshot(post(
            "/api/orders",
            &token,
            json!({
                "to_address": "",
                "preferred_date": "2026-09-01"
            }),
        ))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0002");
}
