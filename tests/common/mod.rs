//! Shared test fixture: temp-file SQLite database plus seeded identities

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use cargodesk::auth::{Identity, Role};
use cargodesk::db;
use cargodesk::models::CreateOrderRequest;
use cargodesk::notify::Notifier;
use cargodesk::state::AppState;

pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

pub async fn setup() -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("test.db");
    let pool = db::connect(path.to_str().expect("utf8 path"))
        .await
        .expect("open test database");

    let state = AppState {
        pool,
        jwt_secret: "test-secret".into(),
        currency: "RUB".into(),
        notifier: Notifier::new(),
    };

    TestApp { state, _dir: dir }
}

/// Seed a client profile and return the resolved identity
pub async fn client_identity(state: &AppState, user_id: &str) -> Identity {
    let profile = db::profiles::create_client(&state.pool, user_id, Some("Acme LLC"))
        .await
        .expect("seed client");
    Identity {
        user_id: user_id.to_string(),
        role: Role::Client,
        client_id: Some(profile.id),
        driver_id: None,
    }
}

/// Seed a driver profile and return the resolved identity
pub async fn driver_identity(state: &AppState, user_id: &str) -> Identity {
    let profile = db::profiles::create_driver(&state.pool, user_id, Some("GAZel"))
        .await
        .expect("seed driver");
    Identity {
        user_id: user_id.to_string(),
        role: Role::Driver,
        client_id: None,
        driver_id: Some(profile.id),
    }
}

/// A valid create payload; price is optional to exercise the amount invariant
pub fn order_request(price: Option<&str>) -> CreateOrderRequest {
    CreateOrderRequest {
        from_warehouse_id: Some("wh-1".into()),
        to_address: "Moscow, Tverskaya 1".into(),
        to_latitude: Some(55.757),
        to_longitude: Some(37.615),
        preferred_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
        preferred_time_from: Some("09:00".into()),
        preferred_time_to: Some("13:00".into()),
        cargo_type: Some("pallets".into()),
        cargo_volume: Some("2 m3".into()),
        cargo_weight: Some(350.0),
        cargo_places: Some(4),
        pickup_required: false,
        special_conditions: None,
        contact_name: Some("Ivan".into()),
        contact_phone: Some("+79990001122".into()),
        response_deadline: None,
        price: price.map(|p| Decimal::from_str(p).expect("valid decimal")),
        payment_type: Some("безналичный расчет".into()),
    }
}
