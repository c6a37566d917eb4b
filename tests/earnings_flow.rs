//! Derived earnings ledger: exactly one row per completed order, exact sums

mod common;

use std::str::FromStr;

use rust_decimal::Decimal;

use cargodesk::db;
use cargodesk::earnings;
use cargodesk::error::AppError;
use cargodesk::models::{EarningStatus, UpdateStatusRequest};
use cargodesk::orders::lifecycle::OrderStatus;
use cargodesk::orders::service;

async fn completed_order(
    app: &common::TestApp,
    client: &cargodesk::auth::Identity,
    driver: &cargodesk::auth::Identity,
    price: &str,
) -> String {
    let order = service::create(&app.state, client, common::order_request(Some(price)))
        .await
        .expect("create order");
    service::take(&app.state, driver, &order.order.id)
        .await
        .expect("take");
    service::start(&app.state, driver, &order.order.id)
        .await
        .expect("start");
    service::complete(&app.state, client, &order.order.id, None)
        .await
        .expect("complete");
    order.order.id
}

#[tokio::test]
async fn report_and_balance_follow_completions_and_payouts() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    let first = completed_order(&app, &client, &driver, "1500.50").await;
    let second = completed_order(&app, &client, &driver, "2000").await;

    let report = earnings::report(&app.state, &driver, &Default::default())
        .await
        .expect("report");
    assert_eq!(report.orders.len(), 2);
    assert_eq!(report.total_amount, Decimal::from_str("3500.50").unwrap());
    assert_eq!(report.currency, "RUB");

    let balance = earnings::balance(&app.state, &driver)
        .await
        .expect("balance");
    assert_eq!(
        balance.total_confirmed,
        Decimal::from_str("3500.50").unwrap()
    );
    assert_eq!(balance.total_paid, Decimal::ZERO);
    assert_eq!(
        balance.balance_to_pay,
        Decimal::from_str("3500.50").unwrap()
    );

    // Pay out the first earning.
    let earning = db::earnings::find_by_order(&app.state.pool, &first)
        .await
        .expect("query")
        .expect("exists");
    let paid = earnings::mark_paid(&app.state, &driver, &earning.id)
        .await
        .expect("mark paid");
    assert_eq!(paid.status, EarningStatus::Paid);

    // Paid rows leave the report; the balance nets them out.
    let report = earnings::report(&app.state, &driver, &Default::default())
        .await
        .expect("report");
    assert_eq!(report.orders.len(), 1);
    assert_eq!(report.orders[0].id, second);

    let balance = earnings::balance(&app.state, &driver)
        .await
        .expect("balance");
    assert_eq!(balance.total_paid, Decimal::from_str("1500.50").unwrap());
    assert_eq!(balance.balance_to_pay, Decimal::from_str("2000").unwrap());

    // A payout is recorded once.
    let err = earnings::mark_paid(&app.state, &driver, &earning.id)
        .await
        .expect_err("second payout must fail");
    assert!(matches!(err, AppError::PreconditionFailed(_)));

    let err = earnings::mark_paid(&app.state, &driver, "nope")
        .await
        .expect_err("missing earning");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn driver_completion_path_creates_the_same_single_earning() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    let order = service::create(&app.state, &client, common::order_request(Some("800")))
        .await
        .expect("create order");
    service::take(&app.state, &driver, &order.order.id)
        .await
        .expect("take");
    service::start(&app.state, &driver, &order.order.id)
        .await
        .expect("start");

    // Driver finishes through the progress endpoint.
    let done = service::update_status(
        &app.state,
        &driver,
        &order.order.id,
        UpdateStatusRequest {
            status: OrderStatus::Completed,
            comment: Some("Delivered and signed".into()),
        },
    )
    .await
    .expect("driver completion");
    assert_eq!(done.order.status, OrderStatus::Completed);

    let earning = db::earnings::find_by_order(&app.state.pool, &order.order.id)
        .await
        .expect("query")
        .expect("earning exists");
    assert_eq!(earning.amount, Decimal::from_str("800").unwrap());
    assert_eq!(earning.status, EarningStatus::Confirmed);
}

#[tokio::test]
async fn completion_without_an_amount_rolls_back() {
    let app = common::setup().await;
    let client = common::client_identity(&app.state, "client").await;
    let driver = common::driver_identity(&app.state, "driver").await;

    // No price: nothing to snapshot at take, nothing to bill at completion.
    let order = service::create(&app.state, &client, common::order_request(None))
        .await
        .expect("create order");
    service::take(&app.state, &driver, &order.order.id)
        .await
        .expect("take");
    service::start(&app.state, &driver, &order.order.id)
        .await
        .expect("start");

    let err = service::complete(&app.state, &client, &order.order.id, None)
        .await
        .expect_err("completion must fail");
    assert!(matches!(err, AppError::InvariantViolation(_)));

    // The whole transaction rolled back: status unchanged, no earning row.
    let view = service::get(&app.state, &client, &order.order.id)
        .await
        .expect("read back");
    assert_eq!(view.order.status, OrderStatus::InProgress);
    let earning = db::earnings::find_by_order(&app.state.pool, &order.order.id)
        .await
        .expect("query");
    assert!(earning.is_none());

    let balance = earnings::balance(&app.state, &driver)
        .await
        .expect("balance");
    assert_eq!(balance.total_confirmed, Decimal::ZERO);
}
