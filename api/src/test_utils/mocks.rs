//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    Entitlement, Module, NewOrder, Offer, OfferId, Order, OrderFilter, OrderId, OrderPage,
    OrderStatus, PackageId, Promocode, PromocodeId, SchoolId, Student, StudentId, Transaction,
};
use crate::domain::ports::{
    FondyCallback, GatewayCallback, GatewayKind, GatewayPayload, ModuleRepository, Notifier,
    OfferRepository, OrderRepository, PaymentGateway, PaymentLinkRequest, PaymentOutcome,
    PromocodeRepository, StudentRepository,
};
use crate::error::{DomainError, GatewayError, NotificationError};

// ============================================================================
// In-Memory Order Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    confirmed: Arc<RwLock<HashSet<OrderId>>>,
    add_transaction_calls: AtomicUsize,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    pub fn add_transaction_calls(&self) -> usize {
        self.add_transaction_calls.load(Ordering::SeqCst)
    }

    pub fn is_confirmed(&self, id: &OrderId) -> bool {
        self.confirmed.read().unwrap().contains(id)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, new_order: &NewOrder) -> Result<Order, DomainError> {
        let order = Order {
            id: OrderId::new(),
            school_id: new_order.school_id,
            student: new_order.student.clone(),
            offer: new_order.offer.clone(),
            promo: new_order.promo.clone(),
            amount: new_order.amount,
            currency: new_order.currency.clone(),
            status: OrderStatus::Created,
            created_at: Utc::now(),
            transactions: vec![],
        };

        self.orders
            .write()
            .unwrap()
            .insert(order.id, order.clone());
        Ok(order)
    }

    async fn add_transaction(
        &self,
        id: &OrderId,
        transaction: &Transaction,
    ) -> Result<Order, DomainError> {
        self.add_transaction_calls.fetch_add(1, Ordering::SeqCst);

        // Single write lock: append and status change are one step
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))?;

        order.transactions.push(transaction.clone());
        order.status = transaction.status;
        Ok(order.clone())
    }

    async fn claim_confirmation(&self, id: &OrderId) -> Result<bool, DomainError> {
        if !self.orders.read().unwrap().contains_key(id) {
            return Err(DomainError::NotFound(format!("Order {} not found", id)));
        }
        Ok(self.confirmed.write().unwrap().insert(*id))
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_school(
        &self,
        school_id: &SchoolId,
        filter: &OrderFilter,
    ) -> Result<OrderPage, DomainError> {
        let orders = self.orders.read().unwrap();
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.school_id == *school_id && filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(OrderPage {
            items,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }
}

// ============================================================================
// In-Memory Offer / Module / Promocode Directories
// ============================================================================

#[derive(Default)]
pub struct InMemoryOfferRepository {
    offers: Arc<RwLock<HashMap<OfferId, Offer>>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offer(self, offer: Offer) -> Self {
        self.offers.write().unwrap().insert(offer.id, offer);
        self
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError> {
        Ok(self.offers.read().unwrap().get(id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryModuleRepository {
    modules: Arc<RwLock<Vec<Module>>>,
}

impl InMemoryModuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modules(self, modules: Vec<Module>) -> Self {
        self.modules.write().unwrap().extend(modules);
        self
    }
}

#[async_trait]
impl ModuleRepository for InMemoryModuleRepository {
    async fn find_by_packages(&self, packages: &[PackageId]) -> Result<Vec<Module>, DomainError> {
        Ok(self
            .modules
            .read()
            .unwrap()
            .iter()
            .filter(|m| packages.contains(&m.package_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryPromocodeRepository {
    promocodes: Arc<RwLock<HashMap<PromocodeId, Promocode>>>,
}

impl InMemoryPromocodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_promocode(self, promocode: Promocode) -> Self {
        self.promocodes
            .write()
            .unwrap()
            .insert(promocode.id, promocode);
        self
    }
}

#[async_trait]
impl PromocodeRepository for InMemoryPromocodeRepository {
    async fn find_by_id(&self, id: &PromocodeId) -> Result<Option<Promocode>, DomainError> {
        Ok(self.promocodes.read().unwrap().get(id).cloned())
    }
}

// ============================================================================
// In-Memory Student Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryStudentRepository {
    students: Arc<RwLock<HashMap<StudentId, Student>>>,
    grant_calls: AtomicUsize,
    pub should_fail_grants: Arc<RwLock<bool>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(self, student: Student) -> Self {
        self.students.write().unwrap().insert(student.id, student);
        self
    }

    /// Make every grant fail with a database error
    pub fn failing_grants(self) -> Self {
        *self.should_fail_grants.write().unwrap() = true;
        self
    }

    pub fn get(&self, id: &StudentId) -> Option<Student> {
        self.students.read().unwrap().get(id).cloned()
    }

    pub fn grant_calls(&self) -> usize {
        self.grant_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        Ok(self.get(id))
    }

    async fn grant_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError> {
        self.grant_calls.fetch_add(1, Ordering::SeqCst);

        if *self.should_fail_grants.read().unwrap() {
            return Err(DomainError::Database("Mock grant failure".to_string()));
        }

        let mut students = self.students.write().unwrap();
        let student = students
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Student {} not found", id)))?;
        student.grant(entitlement);
        Ok(())
    }

    async fn revoke_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError> {
        let mut students = self.students.write().unwrap();
        let student = students
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Student {} not found", id)))?;
        student.revoke(entitlement);
        Ok(())
    }
}

// ============================================================================
// Mock Payment Gateway
// ============================================================================

/// Client identity the mock gateway accepts
pub const MOCK_GATEWAY_IDENTITY: &str = "mock-gateway-worker";

/// A mock gateway that counts calls and returns configurable responses.
///
/// Callbacks are Fondy-shaped JSON; `"signature": "bad"` fails validation.
#[derive(Default)]
pub struct MockPaymentGateway {
    authenticate_calls: AtomicUsize,
    parse_calls: AtomicUsize,
    validate_calls: AtomicUsize,
    link_requests: Arc<RwLock<Vec<PaymentLinkRequest>>>,
    link_error: Option<String>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make checkout link generation fail with a gateway message
    pub fn with_link_error(mut self, message: &str) -> Self {
        self.link_error = Some(message.to_string());
        self
    }

    pub fn authenticate_calls(&self) -> usize {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    pub fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn link_requests(&self) -> Vec<PaymentLinkRequest> {
        self.link_requests.read().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Fondy
    }

    async fn generate_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<String, GatewayError> {
        self.link_requests.write().unwrap().push(request.clone());

        if let Some(message) = &self.link_error {
            return Err(GatewayError::Api {
                status: "failure".to_string(),
                message: message.clone(),
            });
        }
        Ok(format!("https://pay.test/checkout/{}", request.order_id))
    }

    fn authenticate(&self, client_identity: Option<&str>) -> Result<(), GatewayError> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        match client_identity {
            Some(MOCK_GATEWAY_IDENTITY) => Ok(()),
            _ => Err(GatewayError::AuthenticationFailed),
        }
    }

    fn parse_callback(&self, body: &[u8]) -> Result<GatewayCallback, GatewayError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);

        let payload: FondyCallback = serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidInput(e.to_string()))?;
        let order_id = payload
            .order_id
            .parse::<uuid::Uuid>()
            .map_err(|e| GatewayError::InvalidInput(e.to_string()))?;

        Ok(GatewayCallback {
            order_id: OrderId(order_id),
            raw_payload: String::from_utf8_lossy(body).into_owned(),
            payload: GatewayPayload::Fondy(payload),
        })
    }

    fn validate_callback(&self, callback: &GatewayCallback) -> Result<(), GatewayError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let GatewayPayload::Fondy(payload) = &callback.payload;
        if payload.signature == "bad" {
            return Err(GatewayError::TransactionInvalid);
        }
        Ok(())
    }

    fn outcome(&self, callback: &GatewayCallback) -> PaymentOutcome {
        let GatewayPayload::Fondy(payload) = &callback.payload;
        match (
            payload.order_status.as_str(),
            payload.response_status.as_str(),
        ) {
            ("approved", "success") => PaymentOutcome::Approved,
            (_, "failure") => PaymentOutcome::Declined,
            _ => PaymentOutcome::Pending,
        }
    }
}

/// Build a mock callback body
pub fn mock_callback_body(
    order_id: &OrderId,
    order_status: &str,
    response_status: &str,
    signature: &str,
) -> Vec<u8> {
    serde_json::json!({
        "order_id": order_id.to_string(),
        "order_status": order_status,
        "response_status": response_status,
        "signature": signature,
        "masked_card": "444455XXXXXX1111",
        "fee": 0,
    })
    .to_string()
    .into_bytes()
}

// ============================================================================
// Mock Notifier
// ============================================================================

/// A sent message: (to, subject, body)
pub type SentMessage = (String, String, String);

#[derive(Default)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    attempts: AtomicUsize,
    should_fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(NotificationError::Rejected {
                status: 503,
                message: "Mock failure".to_string(),
            });
        }

        self.sent
            .write()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
