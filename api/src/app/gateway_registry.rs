//! Payment gateway registry
//!
//! Explicit mapping from `GatewayKind` to the adapter that handles it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ports::{GatewayKind, PaymentGateway};
use crate::error::GatewayError;

#[derive(Default, Clone)]
pub struct GatewayRegistry {
    gateways: HashMap<GatewayKind, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateways.insert(gateway.kind(), gateway);
        self
    }

    pub fn get(&self, kind: GatewayKind) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        self.gateways
            .get(&kind)
            .cloned()
            .ok_or_else(|| GatewayError::UnsupportedGateway(kind.to_string()))
    }
}
