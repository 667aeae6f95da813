//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod access_service;
pub mod callback_service;
pub mod gateway_registry;
pub mod order_service;
pub mod pricing;

pub use access_service::AccessService;
pub use callback_service::CallbackService;
pub use gateway_registry::GatewayRegistry;
pub use order_service::{CheckoutUrls, CreateOrder, OrderService};
