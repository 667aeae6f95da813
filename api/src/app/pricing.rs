//! Pricing evaluator
//!
//! Pure computation of an order amount from an offer price and an optional
//! promocode. Amounts are minor currency units; division truncates.

use chrono::{DateTime, Utc};

use crate::domain::entities::Promocode;
use crate::error::DomainError;

/// Apply a percentage discount: `floor(price * (100 - discount) / 100)`.
///
/// Discounts above 100 are treated as 100.
pub fn apply_discount(price: u64, discount: u8) -> u64 {
    let keep = 100 - u128::from(discount.min(100));
    // u128 keeps `price * keep` from overflowing for any u64 price
    (u128::from(price) * keep / 100) as u64
}

/// Final amount for an order.
///
/// Without a promocode the price is returned unchanged. An expired promocode
/// fails with `PromocodeExpired` before any computation.
pub fn evaluate_price(
    price: u64,
    promocode: Option<&Promocode>,
    now: DateTime<Utc>,
) -> Result<u64, DomainError> {
    let Some(promo) = promocode else {
        return Ok(price);
    };

    if !promo.is_valid_at(now) {
        return Err(DomainError::PromocodeExpired(promo.code.clone()));
    }

    Ok(apply_discount(price, promo.discount))
}
