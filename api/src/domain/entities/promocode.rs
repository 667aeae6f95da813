//! Promocode domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::offer::OfferId;
use super::SchoolId;

uuid_id!(
    /// Unique identifier for a promocode
    PromocodeId
);

/// A time-limited percentage discount applicable to specific offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promocode {
    pub id: PromocodeId,
    pub school_id: SchoolId,
    pub code: String,
    /// Discount percentage, 0 to 100
    pub discount: u8,
    pub expires_at: DateTime<Utc>,
    pub offers: Vec<OfferId>,
}

impl Promocode {
    /// A promocode is usable strictly before its expiry instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn applies_to(&self, offer_id: &OfferId) -> bool {
        self.offers.contains(offer_id)
    }
}
