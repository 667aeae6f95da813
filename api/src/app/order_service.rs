//! Order service
//!
//! Turns a purchase intent into a priced order and, for checkout, a gateway
//! payment link. Read-side order queries also go through here.

use std::sync::Arc;

use chrono::Utc;

use crate::app::gateway_registry::GatewayRegistry;
use crate::app::pricing::evaluate_price;
use crate::domain::entities::{
    NewOrder, OfferId, OfferSnapshot, Order, OrderFilter, OrderId, OrderPage, PromoSnapshot,
    PromocodeId, SchoolId, StudentId, StudentSnapshot,
};
use crate::domain::ports::{
    GatewayKind, OfferRepository, OrderRepository, PaymentLinkRequest, PromocodeRepository,
    StudentRepository,
};
use crate::error::{AppError, DomainError};

/// A student's intent to buy an offer
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub school_id: SchoolId,
    pub student_id: StudentId,
    pub offer_id: OfferId,
    pub promocode_id: Option<PromocodeId>,
}

/// URLs handed to the gateway at checkout
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Webhook base; the gateway kind is appended as the last path segment
    pub callback_base: String,
    pub redirect_url: String,
}

impl CheckoutUrls {
    pub fn callback_url(&self, kind: GatewayKind) -> String {
        format!("{}/webhooks/{}", self.callback_base.trim_end_matches('/'), kind)
    }
}

/// Service for creating and querying orders
pub struct OrderService<OR, FR, PR, SR>
where
    OR: OrderRepository,
    FR: OfferRepository,
    PR: PromocodeRepository,
    SR: StudentRepository,
{
    orders: Arc<OR>,
    offers: Arc<FR>,
    promocodes: Arc<PR>,
    students: Arc<SR>,
    gateways: Arc<GatewayRegistry>,
    urls: CheckoutUrls,
}

impl<OR, FR, PR, SR> OrderService<OR, FR, PR, SR>
where
    OR: OrderRepository,
    FR: OfferRepository,
    PR: PromocodeRepository,
    SR: StudentRepository,
{
    pub fn new(
        orders: Arc<OR>,
        offers: Arc<FR>,
        promocodes: Arc<PR>,
        students: Arc<SR>,
        gateways: Arc<GatewayRegistry>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            orders,
            offers,
            promocodes,
            students,
            gateways,
            urls,
        }
    }

    /// Price and persist a new order.
    ///
    /// Nothing is persisted when any lookup or the pricing rules reject the request.
    pub async fn create_order(&self, request: &CreateOrder) -> Result<Order, AppError> {
        let student = self
            .students
            .find_by_id(&request.student_id)
            .await?
            .filter(|s| s.school_id == request.school_id)
            .ok_or_else(|| AppError::NotFound(format!("Student {}", request.student_id)))?;

        let offer = self
            .offers
            .find_by_id(&request.offer_id)
            .await?
            .filter(|o| o.belongs_to(&request.school_id))
            .ok_or_else(|| AppError::OfferNotFound(request.offer_id.to_string()))?;

        let promocode = match &request.promocode_id {
            Some(id) => {
                let promo = self
                    .promocodes
                    .find_by_id(id)
                    .await?
                    .filter(|p| p.school_id == request.school_id)
                    .ok_or_else(|| AppError::PromoNotFound(id.to_string()))?;

                if !promo.applies_to(&offer.id) {
                    return Err(AppError::Domain(DomainError::Validation(format!(
                        "Promocode '{}' does not apply to this offer",
                        promo.code
                    ))));
                }
                Some(promo)
            }
            None => None,
        };

        let amount = evaluate_price(offer.price, promocode.as_ref(), Utc::now())?;

        let new_order = NewOrder {
            school_id: request.school_id,
            student: StudentSnapshot::from(&student),
            offer: OfferSnapshot::from(&offer),
            promo: promocode.as_ref().map(PromoSnapshot::from),
            amount,
            currency: offer.currency.clone(),
        };

        let order = self.orders.create(&new_order).await?;

        tracing::info!(
            order_id = %order.id,
            school_id = %order.school_id,
            offer_id = %order.offer.id,
            amount = order.amount,
            currency = %order.currency,
            promo = ?order.promo.as_ref().map(|p| &p.code),
            "Order created"
        );

        Ok(order)
    }

    /// Create an order and obtain a hosted checkout link for it.
    ///
    /// If the gateway refuses, the order stays `created` and the gateway's own
    /// message is returned.
    pub async fn checkout(
        &self,
        request: &CreateOrder,
        kind: GatewayKind,
    ) -> Result<(Order, String), AppError> {
        let gateway = self.gateways.get(kind)?;
        let order = self.create_order(request).await?;

        let link_request = PaymentLinkRequest {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency.clone(),
            description: format!("{} ({})", order.offer.name, order.student.email),
            callback_url: self.urls.callback_url(kind),
            redirect_url: self.urls.redirect_url.clone(),
        };

        let checkout_url = gateway
            .generate_payment_link(&link_request)
            .await
            .map_err(|e| {
                tracing::warn!(order_id = %order.id, gateway = %kind, error = %e, "Checkout link failed");
                e
            })?;

        Ok((order, checkout_url))
    }

    pub async fn get_by_id(&self, id: &OrderId) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))
    }

    pub async fn list_by_school(
        &self,
        school_id: &SchoolId,
        filter: OrderFilter,
    ) -> Result<OrderPage, AppError> {
        Ok(self
            .orders
            .find_by_school(school_id, &filter.normalized())
            .await?)
    }
}
