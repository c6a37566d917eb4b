//! Bearer authentication and caller identity

mod identity;

pub use identity::{Claims, Identity, Role, auth_middleware, create_token};
