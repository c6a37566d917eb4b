//! cargodesk — order lifecycle engine for a logistics marketplace
//!
//! Clients post delivery orders, drivers take them from a shared pool, and a
//! derived earnings ledger records what each driver is owed. Concurrency
//! safety comes from conditional UPDATEs, not locks: any number of instances
//! can race on the same database and exactly one writer wins each transition.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod earnings;
pub mod error;
pub mod models;
pub mod notify;
pub mod orders;
pub mod state;
