//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod access;
pub mod orders;
pub mod webhooks;

pub use access::{grant_offer_access, module_access, revoke_offer_access};
pub use orders::{create_order, get_order, list_school_orders};
pub use webhooks::payment_webhook;
