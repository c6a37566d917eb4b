//! Order lifecycle engine
//!
//! `lifecycle` holds the transition table, `guard` the role/ownership
//! predicates, `service` the operations themselves. Concurrency control lives
//! in the db layer: every transition is one conditional UPDATE.

pub mod guard;
pub mod lifecycle;
pub mod payment;
pub mod service;
