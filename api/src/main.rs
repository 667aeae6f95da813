//! SchoolPay API Server
//!
//! Order checkout, payment-gateway callbacks and course access for online schools.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod integration_tests;

use adapters::{
    FondyGateway, HttpMailer, LogNotifier, Mailer, PostgresModuleRepository,
    PostgresOfferRepository, PostgresOrderRepository, PostgresPromocodeRepository,
    PostgresStudentRepository,
};
use app::{AccessService, CallbackService, CheckoutUrls, GatewayRegistry, OrderService};
use auth::AdminKey;
use config::Config;

type Access =
    AccessService<PostgresStudentRepository, PostgresOfferRepository, PostgresModuleRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<
        OrderService<
            PostgresOrderRepository,
            PostgresOfferRepository,
            PostgresPromocodeRepository,
            PostgresStudentRepository,
        >,
    >,
    pub callback_service: Arc<
        CallbackService<
            PostgresOrderRepository,
            PostgresStudentRepository,
            PostgresOfferRepository,
            PostgresModuleRepository,
            Mailer,
        >,
    >,
    pub access_service: Arc<Access>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,schoolpay_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SchoolPay API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected");

    // Create adapters
    let order_repo = Arc::new(PostgresOrderRepository::new(db.clone()));
    let offer_repo = Arc::new(PostgresOfferRepository::new(db.clone()));
    let module_repo = Arc::new(PostgresModuleRepository::new(db.clone()));
    let promocode_repo = Arc::new(PostgresPromocodeRepository::new(db.clone()));
    let student_repo = Arc::new(PostgresStudentRepository::new(db.clone()));

    let gateways = Arc::new(
        GatewayRegistry::new().with_gateway(Arc::new(FondyGateway::new(config.fondy.clone()))),
    );

    let mailer = match config.mail_api() {
        Some((url, token)) => Mailer::Http(HttpMailer::new(
            url.to_string(),
            token.to_string(),
            config.mail_from.clone(),
        )),
        None => {
            tracing::warn!("MAIL_API_URL/MAIL_API_TOKEN not set, confirmations will only be logged");
            Mailer::Log(LogNotifier)
        }
    };

    let admin_key = AdminKey::new(config.admin_api_key.as_deref());
    if !admin_key.is_configured() {
        tracing::warn!("ADMIN_API_KEY not set, admin routes will reject every request");
    }

    // Create application services
    let access_service = Arc::new(AccessService::new(
        student_repo.clone(),
        offer_repo.clone(),
        module_repo.clone(),
    ));

    let order_service = Arc::new(OrderService::new(
        order_repo.clone(),
        offer_repo.clone(),
        promocode_repo.clone(),
        student_repo.clone(),
        gateways.clone(),
        CheckoutUrls {
            callback_base: config.api_base_url.clone(),
            redirect_url: config.checkout_redirect_url.clone(),
        },
    ));

    let callback_service = Arc::new(CallbackService::new(
        order_repo.clone(),
        access_service.clone(),
        gateways.clone(),
        Arc::new(mailer),
    ));

    let state = AppState {
        order_service,
        callback_service,
        access_service,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        // Public routes
        .route(
            "/schools/:school_id/orders",
            post(handlers::create_order),
        )
        .route("/orders/:id", get(handlers::get_order))
        .route("/webhooks/:gateway", post(handlers::payment_webhook))
        .route(
            "/students/:student_id/modules/:module_id/access",
            get(handlers::module_access),
        )
        // Admin routes
        .merge(
            Router::new()
                .route(
                    "/schools/:school_id/orders",
                    get(handlers::list_school_orders),
                )
                .route(
                    "/students/:student_id/offers/:offer_id/access",
                    post(handlers::grant_offer_access).delete(handlers::revoke_offer_access),
                )
                .layer(middleware::from_fn_with_state(
                    admin_key,
                    auth::require_admin,
                )),
        )
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
