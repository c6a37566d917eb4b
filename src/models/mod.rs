//! Domain models and request/response payloads

pub mod earning;
pub mod order;
pub mod profile;
pub mod rating;

pub use earning::{BalanceReport, DriverEarning, EarningOrder, EarningStatus, EarningsReport};
pub use order::{
    AvailableQuery, CreateOrderRequest, Order, OrderView, StatusHistoryEntry, UpdateOrderRequest,
    UpdateStatusRequest,
};
pub use profile::{ClientProfile, DriverProfile};
pub use rating::{CreateRatingRequest, Rating, RatingSummary};
