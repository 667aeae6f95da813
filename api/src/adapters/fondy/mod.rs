//! Fondy payment gateway adapter

mod client;
pub mod signature;

pub use client::{FondyConfig, FondyGateway};
