//! Full integration tests for the SchoolPay API
//!
//! The purchase flow end to end, wired from real services over in-memory
//! repositories:
//! 1. Create an order (priced, optionally with a promocode)
//! 2. Obtain a checkout link from the gateway
//! 3. Gateway delivers callbacks (possibly duplicated, possibly forged)
//! 4. Paid orders unlock the offer's modules for the student
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{routing::post, Json, Router};
    use chrono::Duration;

    use crate::adapters::fondy::signature::callback_signature;
    use crate::adapters::{FondyConfig, FondyGateway};
    use crate::app::{
        AccessService, CallbackService, CheckoutUrls, CreateOrder, GatewayRegistry, OrderService,
    };
    use crate::domain::entities::{OrderFilter, OrderStatus, PromocodeId, Student};
    use crate::domain::ports::{FondyCallback, GatewayKind, PaymentGateway};
    use crate::error::{AppError, GatewayError};
    use crate::test_utils::{
        mock_callback_body, test_catalog, test_promocode, test_student, InMemoryModuleRepository,
        InMemoryOfferRepository, InMemoryOrderRepository, InMemoryPromocodeRepository,
        InMemoryStudentRepository, MockNotifier, MockPaymentGateway, TestCatalog,
        MOCK_GATEWAY_IDENTITY,
    };

    struct World<G: PaymentGateway + 'static> {
        catalog: TestCatalog,
        student: Student,
        orders: Arc<InMemoryOrderRepository>,
        students: Arc<InMemoryStudentRepository>,
        promo_id: Option<PromocodeId>,
        gateway: Arc<G>,
        notifier: Arc<MockNotifier>,
        order_service: OrderService<
            InMemoryOrderRepository,
            InMemoryOfferRepository,
            InMemoryPromocodeRepository,
            InMemoryStudentRepository,
        >,
        callback_service: CallbackService<
            InMemoryOrderRepository,
            InMemoryStudentRepository,
            InMemoryOfferRepository,
            InMemoryModuleRepository,
            MockNotifier,
        >,
        access_service: Arc<
            AccessService<
                InMemoryStudentRepository,
                InMemoryOfferRepository,
                InMemoryModuleRepository,
            >,
        >,
    }

    fn world<G: PaymentGateway + 'static>(gateway: G, promo: Option<(u8, Duration)>) -> World<G> {
        let catalog = test_catalog();
        let student = test_student(catalog.offer.school_id);

        let orders = Arc::new(InMemoryOrderRepository::new());
        let students = Arc::new(InMemoryStudentRepository::new().with_student(student.clone()));
        let offers = Arc::new(InMemoryOfferRepository::new().with_offer(catalog.offer.clone()));
        let mut all_modules = catalog.modules.clone();
        all_modules.push(catalog.unrelated_module.clone());
        let modules = Arc::new(InMemoryModuleRepository::new().with_modules(all_modules));

        let mut promocodes = InMemoryPromocodeRepository::new();
        let mut promo_id = None;
        if let Some((discount, expires_in)) = promo {
            let promocode = test_promocode(&catalog.offer, discount, expires_in);
            promo_id = Some(promocode.id);
            promocodes = promocodes.with_promocode(promocode);
        }
        let promocodes = Arc::new(promocodes);

        let gateway = Arc::new(gateway);
        let gateways = Arc::new(GatewayRegistry::new().with_gateway(gateway.clone()));
        let notifier = Arc::new(MockNotifier::new());

        let access_service = Arc::new(AccessService::new(
            students.clone(),
            offers.clone(),
            modules.clone(),
        ));
        let order_service = OrderService::new(
            orders.clone(),
            offers.clone(),
            promocodes.clone(),
            students.clone(),
            gateways.clone(),
            CheckoutUrls {
                callback_base: "https://api.school.test".to_string(),
                redirect_url: "https://school.test/thanks".to_string(),
            },
        );
        let callback_service = CallbackService::new(
            orders.clone(),
            access_service.clone(),
            gateways,
            notifier.clone(),
        );

        World {
            catalog,
            student,
            orders,
            students,
            promo_id,
            gateway,
            notifier,
            order_service,
            callback_service,
            access_service,
        }
    }

    impl<G: PaymentGateway + 'static> World<G> {
        fn purchase(&self, with_promo: bool) -> CreateOrder {
            CreateOrder {
                school_id: self.catalog.offer.school_id,
                student_id: self.student.id,
                offer_id: self.catalog.offer.id,
                promocode_id: self.promo_id.filter(|_| with_promo),
            }
        }
    }

    /// Full purchase: checkout, approved callback, module unlocked, one mail
    #[tokio::test]
    async fn purchase_unlocks_modules() {
        let w = world(MockPaymentGateway::new(), Some((25, Duration::days(1))));

        let (order, url) = w
            .order_service
            .checkout(&w.purchase(true), GatewayKind::Fondy)
            .await
            .unwrap();
        assert_eq!(order.amount, 5175);
        assert_eq!(url, format!("https://pay.test/checkout/{}", order.id));

        let link = &w.gateway.link_requests()[0];
        assert_eq!(link.callback_url, "https://api.school.test/webhooks/fondy");
        assert_eq!(link.description, "Rust Bootcamp (ada@example.com)");

        let module = &w.catalog.modules[0];
        assert!(!w
            .access_service
            .is_module_available(&w.student.id, &module.id)
            .await
            .unwrap());

        let mut result = w
            .callback_service
            .process(
                GatewayKind::Fondy,
                Some(MOCK_GATEWAY_IDENTITY),
                &mock_callback_body(&order.id, "approved", "success", "ok"),
            )
            .await
            .unwrap();
        if let Some(handle) = result.notification.take() {
            handle.await.unwrap();
        }

        assert_eq!(result.status, OrderStatus::Paid);
        for module in &w.catalog.modules {
            assert!(w
                .access_service
                .is_module_available(&w.student.id, &module.id)
                .await
                .unwrap());
        }
        assert!(!w
            .access_service
            .is_module_available(&w.student.id, &w.catalog.unrelated_module.id)
            .await
            .unwrap());
        assert_eq!(w.notifier.sent().len(), 1);

        let page = w
            .order_service
            .list_by_school(
                &w.catalog.offer.school_id,
                OrderFilter {
                    status: Some(OrderStatus::Paid),
                    ..OrderFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, order.id);
    }

    /// Forged fingerprint never reaches signature check, ledger, or grants
    #[tokio::test]
    async fn forged_fingerprint_has_no_effect() {
        let w = world(MockPaymentGateway::new(), None);
        let order = w
            .order_service
            .create_order(&w.purchase(false))
            .await
            .unwrap();

        let err = w
            .callback_service
            .process(
                GatewayKind::Fondy,
                Some("python-requests/2.31"),
                &mock_callback_body(&order.id, "approved", "success", "ok"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Gateway(GatewayError::AuthenticationFailed)
        ));
        assert_eq!(w.gateway.validate_calls(), 0);
        assert_eq!(w.orders.add_transaction_calls(), 0);
        assert_eq!(w.students.grant_calls(), 0);
        assert_eq!(
            w.orders.get(&order.id).unwrap().status,
            OrderStatus::Created
        );
    }

    /// A redelivered approval is recorded but changes nothing else
    #[tokio::test]
    async fn duplicate_approval_is_idempotent() {
        let w = world(MockPaymentGateway::new(), None);
        let order = w
            .order_service
            .create_order(&w.purchase(false))
            .await
            .unwrap();
        let body = mock_callback_body(&order.id, "approved", "success", "ok");

        for _ in 0..2 {
            let mut result = w
                .callback_service
                .process(GatewayKind::Fondy, Some(MOCK_GATEWAY_IDENTITY), &body)
                .await
                .unwrap();
            if let Some(handle) = result.notification.take() {
                handle.await.unwrap();
            }
        }

        let stored = w.orders.get(&order.id).unwrap();
        assert_eq!(stored.transactions.len(), 2);
        assert_eq!(stored.status, OrderStatus::Paid);

        let student = w.students.get(&w.student.id).unwrap();
        assert_eq!(student.available_modules.len(), w.catalog.modules.len());
        assert_eq!(w.notifier.attempts(), 1);
    }

    /// Decline after nothing; later approval still unlocks
    #[tokio::test]
    async fn decline_then_approval() {
        let w = world(MockPaymentGateway::new(), None);
        let order = w
            .order_service
            .create_order(&w.purchase(false))
            .await
            .unwrap();

        let declined = w
            .callback_service
            .process(
                GatewayKind::Fondy,
                Some(MOCK_GATEWAY_IDENTITY),
                &mock_callback_body(&order.id, "declined", "failure", "ok"),
            )
            .await
            .unwrap();
        assert_eq!(declined.status, OrderStatus::Failed);
        assert!(w
            .students
            .get(&w.student.id)
            .unwrap()
            .available_modules
            .is_empty());

        let approved = w
            .callback_service
            .process(
                GatewayKind::Fondy,
                Some(MOCK_GATEWAY_IDENTITY),
                &mock_callback_body(&order.id, "approved", "success", "ok"),
            )
            .await
            .unwrap();
        assert_eq!(approved.status, OrderStatus::Paid);
        assert!(approved.access_granted);

        let stored = w.orders.get(&order.id).unwrap();
        let statuses: Vec<OrderStatus> = stored.transactions.iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![OrderStatus::Failed, OrderStatus::Paid]);
    }

    /// Expired promocode rejects the purchase and persists nothing
    #[tokio::test]
    async fn expired_promocode_rejects_checkout() {
        let w = world(MockPaymentGateway::new(), Some((25, -Duration::hours(1))));

        let err = w
            .order_service
            .checkout(&w.purchase(true), GatewayKind::Fondy)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(crate::error::DomainError::PromocodeExpired(_))
        ));
        assert_eq!(w.orders.len(), 0);
        assert!(w.gateway.link_requests().is_empty());
    }

    /// Manual grant then revoke round trip through the access service
    #[tokio::test]
    async fn manual_grant_and_revoke() {
        let w = world(MockPaymentGateway::new(), None);
        let module = &w.catalog.modules[2];

        w.access_service
            .give_access_to_offer(&w.student.id, &w.catalog.offer.id)
            .await
            .unwrap();
        assert!(w
            .access_service
            .is_module_available(&w.student.id, &module.id)
            .await
            .unwrap());

        w.access_service
            .remove_access_to_offer(&w.student.id, &w.catalog.offer.id)
            .await
            .unwrap();
        assert!(!w
            .access_service
            .is_module_available(&w.student.id, &module.id)
            .await
            .unwrap());
    }

    // ------------------------------------------------------------------------
    // Fondy wire protocol end to end
    // ------------------------------------------------------------------------

    const SECRET: &str = "integration-secret";
    const MERCHANT: &str = "1396424";
    const AGENT: &str = "fondy-callback-worker/1.0";

    /// Fake Fondy checkout endpoint; records each request envelope
    async fn fake_fondy_checkout() -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let app = Router::new().route(
            "/api/checkout/url/",
            post(move |Json(body): Json<serde_json::Value>| {
                let captured = captured.clone();
                async move {
                    captured.lock().unwrap().push(body);
                    Json(serde_json::json!({
                        "response": {
                            "response_status": "success",
                            "checkout_url": "https://pay.fondy.eu/merchants/test/index.html?token=t",
                            "payment_id": 1
                        }
                    }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/api/checkout/url/", addr), seen)
    }

    fn signed_fondy_body(order_id: &str, amount: &str, order_status: &str) -> Vec<u8> {
        let mut callback = FondyCallback {
            order_id: order_id.to_string(),
            merchant_id: MERCHANT.to_string(),
            amount: amount.to_string(),
            currency: "USD".to_string(),
            order_status: order_status.to_string(),
            response_status: "success".to_string(),
            masked_card: "444455XXXXXX1111".to_string(),
            tran_type: "purchase".to_string(),
            ..FondyCallback::default()
        };
        callback.signature = callback_signature(SECRET, &callback);

        serde_json::json!({
            "order_id": callback.order_id,
            "merchant_id": 1396424,
            "amount": callback.amount,
            "currency": callback.currency,
            "order_status": callback.order_status,
            "response_status": callback.response_status,
            "masked_card": callback.masked_card,
            "tran_type": callback.tran_type,
            "signature": callback.signature,
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn fondy_signed_callback_unlocks_modules() {
        let (checkout_url, seen) = fake_fondy_checkout().await;
        let w = world(
            FondyGateway::new(FondyConfig {
                merchant_id: MERCHANT.to_string(),
                secret_key: SECRET.to_string(),
                checkout_url,
                callback_user_agent: AGENT.to_string(),
                lang: "en".to_string(),
            }),
            None,
        );

        let (order, _) = w
            .order_service
            .checkout(&w.purchase(false), GatewayKind::Fondy)
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap()[0]["request"]["amount"], "6900");

        // Tampered amount fails the signature check
        let mut forged = signed_fondy_body(&order.id.to_string(), "6900", "approved");
        let text = String::from_utf8(forged.clone()).unwrap();
        forged = text.replace("\"6900\"", "\"1\"").into_bytes();
        let err = w
            .callback_service
            .process(GatewayKind::Fondy, Some(AGENT), &forged)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gateway(GatewayError::TransactionInvalid)));
        assert!(w.orders.get(&order.id).unwrap().transactions.is_empty());

        let mut result = w
            .callback_service
            .process(
                GatewayKind::Fondy,
                Some(AGENT),
                &signed_fondy_body(&order.id.to_string(), "6900", "approved"),
            )
            .await
            .unwrap();
        if let Some(handle) = result.notification.take() {
            handle.await.unwrap();
        }

        assert_eq!(result.status, OrderStatus::Paid);
        let student = w.students.get(&w.student.id).unwrap();
        assert_eq!(student.available_modules.len(), w.catalog.modules.len());
        assert_eq!(w.notifier.attempts(), 1);
    }
}
