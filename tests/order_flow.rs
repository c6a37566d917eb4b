//! End-to-end lifecycle: create, take, progress, complete

mod common;

use std::str::FromStr;

use chrono::Datelike;
use rust_decimal::Decimal;

use cargodesk::db;
use cargodesk::error::AppError;
use cargodesk::models::{UpdateOrderRequest, UpdateStatusRequest};
use cargodesk::orders::lifecycle::OrderStatus;
use cargodesk::orders::service;

#[tokio::test]
async fn full_lifecycle_from_new_to_completed() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "user-client").await;
    let driver = common::driver_identity(&app.state, "user-driver").await;

    // Create: NEW, numbered, price set but not yet agreed.
    let created = service::create(&app.state, &client, common::order_request(Some("15000")))
        .await
        .expect("create order");
    let year = chrono::Utc::now().year();
    assert_eq!(created.order.status, OrderStatus::New);
    assert_eq!(created.order.order_number, format!("ORD-{year}-00001"));
    assert!(created.order.agreed_price.is_none());
    assert!(created.order.driver_id.is_none());

    // Open pool contains it.
    let pool = service::list_available(&app.state, &driver, &Default::default())
        .await
        .expect("list available");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].order.id, created.order.id);

    // Take: driver assigned, price snapshotted.
    let taken = service::take(&app.state, &driver, &created.order.id)
        .await
        .expect("take order");
    assert_eq!(taken.order.status, OrderStatus::Taken);
    assert_eq!(taken.order.driver_id, driver.driver_id);
    assert_eq!(
        taken.order.agreed_price,
        Some(Decimal::from_str("15000").unwrap())
    );

    // Taken orders left the pool.
    let pool = service::list_available(&app.state, &driver, &Default::default())
        .await
        .expect("list available");
    assert!(pool.is_empty());

    // Post-assignment edits are rejected as a state problem.
    let patch = UpdateOrderRequest {
        price: Some(Decimal::from_str("1").unwrap()),
        ..Default::default()
    };
    let err = service::update(&app.state, &client, &created.order.id, patch)
        .await
        .expect_err("edit after take must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    // Driver works the order.
    service::start(&app.state, &driver, &created.order.id)
        .await
        .expect("start");
    service::update_status(
        &app.state,
        &driver,
        &created.order.id,
        UpdateStatusRequest {
            status: OrderStatus::InTransit,
            comment: Some("On the road".into()),
        },
    )
    .await
    .expect("report progress");

    // Client confirms completion.
    let completed = service::complete(&app.state, &client, &created.order.id, None)
        .await
        .expect("complete");
    assert_eq!(completed.order.status, OrderStatus::Completed);

    // Exactly one earning, for the agreed amount.
    let earning = db::earnings::find_by_order(&app.state.pool, &created.order.id)
        .await
        .expect("query earning")
        .expect("earning exists");
    assert_eq!(earning.amount, Decimal::from_str("15000").unwrap());
    assert_eq!(earning.driver_id, driver.driver_id.clone().unwrap());

    // Completing again is rejected; the terminal state is final.
    let err = service::complete(&app.state, &client, &created.order.id, None)
        .await
        .expect_err("double completion must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    // History recorded every step in commit order.
    let view = service::get(&app.state, &client, &created.order.id)
        .await
        .expect("get with history");
    let history = view.status_history.expect("history present");
    let statuses: Vec<OrderStatus> = history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::New,
            OrderStatus::Taken,
            OrderStatus::InProgress,
            OrderStatus::InTransit,
            OrderStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn order_numbers_are_sequential_per_year() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "user-client").await;
    let year = chrono::Utc::now().year();

    for expected in 1..=3 {
        let view = service::create(&app.state, &client, common::order_request(Some("100")))
            .await
            .expect("create order");
        assert_eq!(
            view.order.order_number,
            format!("ORD-{year}-{expected:05}")
        );
    }
}

#[tokio::test]
async fn edit_before_assignment_changes_fields() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "user-client").await;

    let created = service::create(&app.state, &client, common::order_request(Some("5000")))
        .await
        .expect("create order");

    let patch = UpdateOrderRequest {
        to_address: Some("Kazan, Bauman St 5".into()),
        price: Some(Decimal::from_str("6500").unwrap()),
        ..Default::default()
    };
    let updated = service::update(&app.state, &client, &created.order.id, patch)
        .await
        .expect("edit NEW order");
    assert_eq!(updated.order.to_address, "Kazan, Bauman St 5");
    assert_eq!(
        updated.order.price,
        Some(Decimal::from_str("6500").unwrap())
    );
    // Editing never touches the agreed price.
    assert!(updated.order.agreed_price.is_none());

    let err = service::update(
        &app.state,
        &client,
        &created.order.id,
        UpdateOrderRequest::default(),
    )
    .await
    .expect_err("empty patch must fail");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn new_orders_are_takeable_but_not_publishable() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "user-client").await;
    let driver = common::driver_identity(&app.state, "user-driver").await;

    let created = service::create(&app.state, &client, common::order_request(Some("3000")))
        .await
        .expect("create order");

    // NEW orders cannot be unpublished and are not publishable either.
    let err = service::publish(&app.state, &client, &created.order.id)
        .await
        .expect_err("publish from NEW must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    // NEW is already takeable though.
    service::take(&app.state, &driver, &created.order.id)
        .await
        .expect("take NEW order");
}

#[tokio::test]
async fn cancel_releases_the_driver() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "user-client").await;
    let driver = common::driver_identity(&app.state, "user-driver").await;

    let created = service::create(&app.state, &client, common::order_request(Some("3000")))
        .await
        .expect("create order");
    service::take(&app.state, &driver, &created.order.id)
        .await
        .expect("take");

    let cancelled = service::cancel(&app.state, &client, &created.order.id, Some("changed plans"))
        .await
        .expect("cancel taken order");
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert!(cancelled.order.driver_id.is_none());

    // Released driver can take again.
    let next = service::create(&app.state, &client, common::order_request(Some("4000")))
        .await
        .expect("create second order");
    service::take(&app.state, &driver, &next.order.id)
        .await
        .expect("take after release");

    // In-progress orders cannot be cancelled by the client.
    service::start(&app.state, &driver, &next.order.id)
        .await
        .expect("start");
    let err = service::cancel(&app.state, &client, &next.order.id, None)
        .await
        .expect_err("cancel in progress must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));
}
