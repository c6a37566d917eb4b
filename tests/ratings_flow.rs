//! Ratings: completed orders only, one per party per order

mod common;

use std::str::FromStr;

use rust_decimal::Decimal;

use cargodesk::error::AppError;
use cargodesk::models::CreateRatingRequest;
use cargodesk::orders::service;

fn rating(score: i64) -> CreateRatingRequest {
    CreateRatingRequest {
        score,
        comment: Some("ok".into()),
    }
}

#[tokio::test]
async fn both_parties_rate_a_completed_order_once() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    let order = service::create(&app.state, &client, common::order_request(Some("1000")))
        .await
        .expect("create order");
    service::take(&app.state, &driver, &order.order.id)
        .await
        .expect("take");

    // Not finished yet.
    let err = service::rate(&app.state, &client, &order.order.id, rating(5))
        .await
        .expect_err("rating before completion must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    service::start(&app.state, &driver, &order.order.id)
        .await
        .expect("start");
    service::complete(&app.state, &client, &order.order.id, None)
        .await
        .expect("complete");

    service::rate(&app.state, &client, &order.order.id, rating(5))
        .await
        .expect("client rates");
    service::rate(&app.state, &driver, &order.order.id, rating(4))
        .await
        .expect("driver rates");

    // Each party rates once.
    let err = service::rate(&app.state, &client, &order.order.id, rating(1))
        .await
        .expect_err("second client rating must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    // Outsiders cannot rate at all.
    let outsider = common::client_identity(&app.state, "outsider").await;
    let err = service::rate(&app.state, &outsider, &order.order.id, rating(3))
        .await
        .expect_err("outsider rating must fail");
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn driver_summary_averages_client_ratings_only() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    for score in [5, 4] {
        let order = service::create(&app.state, &client, common::order_request(Some("1000")))
            .await
            .expect("create order");
        service::take(&app.state, &driver, &order.order.id)
            .await
            .expect("take");
        service::start(&app.state, &driver, &order.order.id)
            .await
            .expect("start");
        service::complete(&app.state, &client, &order.order.id, None)
            .await
            .expect("complete");
        service::rate(&app.state, &client, &order.order.id, rating(score))
            .await
            .expect("client rates");
        // The driver's own rating of the client must not count.
        service::rate(&app.state, &driver, &order.order.id, rating(1))
            .await
            .expect("driver rates");
    }

    let driver_id = driver.driver_id.clone().expect("driver profile");
    let summary = service::ratings_for_driver(&app.state, &driver_id)
        .await
        .expect("summary");
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, Some(Decimal::from_str("4.50").unwrap()));

    let err = service::ratings_for_driver(&app.state, "nope")
        .await
        .expect_err("missing driver");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn scores_outside_the_scale_are_rejected() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    let order = service::create(&app.state, &client, common::order_request(Some("1000")))
        .await
        .expect("create order");
    service::take(&app.state, &driver, &order.order.id)
        .await
        .expect("take");
    service::start(&app.state, &driver, &order.order.id)
        .await
        .expect("start");
    service::complete(&app.state, &client, &order.order.id, None)
        .await
        .expect("complete");

    for score in [0, 6] {
        let err = service::rate(&app.state, &client, &order.order.id, rating(score))
            .await
            .expect_err("out-of-scale score must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
