//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod notifier;
pub mod payment_gateway;
pub mod repositories;

pub use notifier::Notifier;
pub use payment_gateway::{
    FondyCallback, GatewayCallback, GatewayKind, GatewayPayload, PaymentGateway,
    PaymentLinkRequest, PaymentOutcome,
};
pub use repositories::{
    ModuleRepository, OfferRepository, OrderRepository, PromocodeRepository, StudentRepository,
};
