//! Payment callback processor
//!
//! Handles gateway webhook deliveries. Gateways deliver at least once, so every
//! delivery may duplicate an earlier one; processing is idempotent by
//! construction instead of by deduplication bookkeeping:
//!
//! 1. transport fingerprint check (nothing else runs on failure)
//! 2. payload shape check
//! 3. signature check
//! 4. gateway status → canonical order status
//! 5. atomic append-transaction-and-set-status on the ledger
//! 6. non-paid outcomes stop here
//! 7. set-union entitlement grant (failures propagate, the gateway retries)
//! 8. best-effort confirmation mail on a detached task, dispatched by whichever
//!    delivery first claims the order's confirmation marker after a successful grant

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::app::access_service::AccessService;
use crate::app::gateway_registry::GatewayRegistry;
use crate::domain::entities::{Order, OrderId, OrderStatus, Transaction};
use crate::domain::ports::{
    GatewayKind, ModuleRepository, Notifier, OfferRepository, OrderRepository, StudentRepository,
};
use crate::error::{AppError, GatewayError};

/// What a delivery did
#[derive(Debug)]
pub struct CallbackResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub access_granted: bool,
    /// Handle of the spawned confirmation mail, if one was dispatched
    pub notification: Option<JoinHandle<()>>,
}

pub struct CallbackService<OR, SR, FR, MR, N>
where
    OR: OrderRepository,
    SR: StudentRepository,
    FR: OfferRepository,
    MR: ModuleRepository,
    N: Notifier + 'static,
{
    orders: Arc<OR>,
    access: Arc<AccessService<SR, FR, MR>>,
    gateways: Arc<GatewayRegistry>,
    notifier: Arc<N>,
}

impl<OR, SR, FR, MR, N> CallbackService<OR, SR, FR, MR, N>
where
    OR: OrderRepository,
    SR: StudentRepository,
    FR: OfferRepository,
    MR: ModuleRepository,
    N: Notifier + 'static,
{
    pub fn new(
        orders: Arc<OR>,
        access: Arc<AccessService<SR, FR, MR>>,
        gateways: Arc<GatewayRegistry>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            orders,
            access,
            gateways,
            notifier,
        }
    }

    /// Process one webhook delivery.
    ///
    /// `client_identity` is the transport fingerprint the caller declared.
    pub async fn process(
        &self,
        kind: GatewayKind,
        client_identity: Option<&str>,
        body: &[u8],
    ) -> Result<CallbackResult, AppError> {
        let gateway = self.gateways.get(kind)?;

        if let Err(e) = gateway.authenticate(client_identity) {
            tracing::warn!(
                gateway = %kind,
                client_identity = ?client_identity,
                "Callback transport fingerprint rejected"
            );
            return Err(e.into());
        }

        let callback = gateway.parse_callback(body).map_err(|e| {
            tracing::warn!(gateway = %kind, error = %e, "Malformed callback payload");
            e
        })?;

        if callback.kind() != kind {
            return Err(GatewayError::InvalidInput(format!(
                "{} payload delivered to {} endpoint",
                callback.kind(),
                kind
            ))
            .into());
        }

        if let Err(e) = gateway.validate_callback(&callback) {
            tracing::warn!(
                gateway = %kind,
                order_id = %callback.order_id,
                "Callback signature mismatch"
            );
            return Err(e.into());
        }

        let outcome = gateway.outcome(&callback);
        let status = outcome.order_status();

        let order = self
            .orders
            .add_transaction(
                &callback.order_id,
                &Transaction::new(status, callback.raw_payload.clone()),
            )
            .await?;

        tracing::info!(
            order_id = %order.id,
            gateway = %kind,
            outcome = ?outcome,
            status = %status,
            transactions = order.transactions.len(),
            "Callback recorded"
        );

        if status != OrderStatus::Paid {
            return Ok(CallbackResult {
                order_id: order.id,
                status,
                access_granted: false,
                notification: None,
            });
        }

        self.access
            .give_access_to_offer(&order.student.id, &order.offer.id)
            .await
            .map_err(|e| {
                tracing::error!(
                    order_id = %order.id,
                    student_id = %order.student.id,
                    error = %e,
                    "Access grant failed after payment"
                );
                e
            })?;

        let notification = if self.orders.claim_confirmation(&order.id).await? {
            Some(self.dispatch_confirmation(&order))
        } else {
            tracing::debug!(order_id = %order.id, "Confirmation already dispatched");
            None
        };

        Ok(CallbackResult {
            order_id: order.id,
            status,
            access_granted: true,
            notification,
        })
    }

    fn dispatch_confirmation(&self, order: &Order) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let order_id = order.id;
        let to = order.student.email.clone();
        let (subject, body) = purchase_confirmation(order);

        tokio::spawn(async move {
            match notifier.send(&to, &subject, &body).await {
                Ok(()) => tracing::debug!(order_id = %order_id, "Purchase confirmation sent"),
                Err(e) => tracing::warn!(
                    order_id = %order_id,
                    error = %e,
                    "Failed to send purchase confirmation"
                ),
            }
        })
    }
}

/// Render minor units as a two-decimal amount
fn format_amount(amount: u64, currency: &str) -> String {
    format!("{}.{:02} {}", amount / 100, amount % 100, currency)
}

/// Subject and plain-text body of the purchase confirmation
pub fn purchase_confirmation(order: &Order) -> (String, String) {
    let subject = format!("Purchase confirmed: {}", order.offer.name);
    let body = format!(
        "Hi {},\n\n\
         Your payment of {} for \"{}\" was received and your access is now active.\n\n\
         Order: {}\n",
        order.student.name,
        format_amount(order.amount, &order.currency),
        order.offer.name,
        order.id,
    );
    (subject, body)
}
