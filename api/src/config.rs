use std::env;

use thiserror::Error;

use crate::adapters::FondyConfig;

/// Fingerprint the Fondy delivery workers send in `User-Agent`
pub const DEFAULT_FONDY_CALLBACK_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:45.0) Gecko/20100101 Firefox/45.0";

pub const DEFAULT_FONDY_CHECKOUT_URL: &str = "https://pay.fondy.eu/api/checkout/url/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL for the API (used to build gateway callback URLs)
    pub api_base_url: String,
    /// Where the gateway sends the buyer after checkout
    pub checkout_redirect_url: String,
    pub fondy: FondyConfig,
    /// Mail API endpoint; when unset notifications are only logged
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<String>,
    pub mail_from: String,
    /// Bearer key for admin routes
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(p) => p.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 8080,
        };

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            port,
            checkout_redirect_url: env::var("CHECKOUT_REDIRECT_URL")
                .unwrap_or_else(|_| format!("{}/payment/complete", api_base_url)),
            api_base_url,
            fondy: FondyConfig {
                merchant_id: env::var("FONDY_MERCHANT_ID")
                    .map_err(|_| ConfigError::Missing("FONDY_MERCHANT_ID"))?,
                secret_key: env::var("FONDY_SECRET_KEY")
                    .map_err(|_| ConfigError::Missing("FONDY_SECRET_KEY"))?,
                checkout_url: env::var("FONDY_CHECKOUT_URL")
                    .unwrap_or_else(|_| DEFAULT_FONDY_CHECKOUT_URL.to_string()),
                callback_user_agent: env::var("FONDY_CALLBACK_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_FONDY_CALLBACK_USER_AGENT.to_string()),
                lang: env::var("CHECKOUT_LANG").unwrap_or_else(|_| "en".to_string()),
            },
            mail_api_url: env::var("MAIL_API_URL").ok(),
            mail_api_token: env::var("MAIL_API_TOKEN").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@schoolpay.local".to_string()),
            admin_api_key: env::var("ADMIN_API_KEY").ok(),
        })
    }

    /// Mail API URL and token, when both are configured
    pub fn mail_api(&self) -> Option<(&str, &str)> {
        Some((self.mail_api_url.as_deref()?, self.mail_api_token.as_deref()?))
    }
}
