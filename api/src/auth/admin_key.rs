//! Admin API key middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// SHA-256 digest of the configured admin key, if any.
///
/// With no key configured every admin request is rejected.
#[derive(Clone, Default)]
pub struct AdminKey {
    digest: Option<[u8; 32]>,
}

impl AdminKey {
    pub fn new(key: Option<&str>) -> Self {
        Self {
            digest: key.filter(|k| !k.is_empty()).map(hash_key),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Compare digests so that timing does not depend on a common key prefix
    fn accepts(&self, presented: &str) -> bool {
        match &self.digest {
            Some(expected) => {
                let presented = hash_key(presented);
                expected
                    .iter()
                    .zip(presented.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => false,
        }
    }
}

fn hash_key(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Require the admin bearer key
pub async fn require_admin(
    State(admin_key): State<AdminKey>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let presented = extract_bearer(&request).ok_or(AppError::Unauthorized)?;

    if !admin_key.accepts(presented) {
        tracing::warn!(path = %request.uri().path(), "Admin key rejected");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
