//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod fondy;
pub mod mailer;
pub mod postgres;

pub use fondy::{FondyConfig, FondyGateway};
pub use mailer::{HttpMailer, LogNotifier, Mailer};
pub use postgres::{
    PostgresModuleRepository, PostgresOfferRepository, PostgresOrderRepository,
    PostgresPromocodeRepository, PostgresStudentRepository,
};
