//! Fondy signature protocol (v1.0)
//!
//! Both directions sign the same way: take every non-empty field except the
//! signature itself, order by field name, join the values with `|`, prepend the
//! merchant secret and hex-encode the SHA-1 digest of the result.
//!
//! Signed fields are listed explicitly per payload so that the digest never
//! depends on struct layout.

use sha1::{Digest, Sha1};

use crate::domain::ports::FondyCallback;

/// A signed field: wire name and accessor
pub type SignedField<T> = (&'static str, fn(&T) -> &str);

/// Fields covered by a callback signature.
///
/// `signature` and `response_signature_string` are excluded.
pub const CALLBACK_FIELDS: &[SignedField<FondyCallback>] = &[
    ("actual_amount", |c| c.actual_amount.as_str()),
    ("actual_currency", |c| c.actual_currency.as_str()),
    ("additional_info", |c| c.additional_info.as_str()),
    ("amount", |c| c.amount.as_str()),
    ("approval_code", |c| c.approval_code.as_str()),
    ("card_bin", |c| c.card_bin.as_str()),
    ("card_type", |c| c.card_type.as_str()),
    ("currency", |c| c.currency.as_str()),
    ("eci", |c| c.eci.as_str()),
    ("fee", |c| c.fee.as_str()),
    ("masked_card", |c| c.masked_card.as_str()),
    ("merchant_data", |c| c.merchant_data.as_str()),
    ("merchant_id", |c| c.merchant_id.as_str()),
    ("order_id", |c| c.order_id.as_str()),
    ("order_status", |c| c.order_status.as_str()),
    ("order_time", |c| c.order_time.as_str()),
    ("parent_order_id", |c| c.parent_order_id.as_str()),
    ("payment_id", |c| c.payment_id.as_str()),
    ("payment_system", |c| c.payment_system.as_str()),
    ("product_id", |c| c.product_id.as_str()),
    ("rectoken", |c| c.rectoken.as_str()),
    ("rectoken_lifetime", |c| c.rectoken_lifetime.as_str()),
    ("response_code", |c| c.response_code.as_str()),
    ("response_description", |c| c.response_description.as_str()),
    ("response_status", |c| c.response_status.as_str()),
    ("reversal_amount", |c| c.reversal_amount.as_str()),
    ("rrn", |c| c.rrn.as_str()),
    ("sender_account", |c| c.sender_account.as_str()),
    ("sender_cell_phone", |c| c.sender_cell_phone.as_str()),
    ("sender_email", |c| c.sender_email.as_str()),
    ("settlement_amount", |c| c.settlement_amount.as_str()),
    ("settlement_currency", |c| c.settlement_currency.as_str()),
    ("settlement_date", |c| c.settlement_date.as_str()),
    ("tran_type", |c| c.tran_type.as_str()),
    ("verification_status", |c| c.verification_status.as_str()),
];

/// Collect the `(name, value)` pairs of a payload from its field list
pub fn collect<'a, T>(payload: &'a T, fields: &[SignedField<T>]) -> Vec<(&'static str, &'a str)> {
    fields
        .iter()
        .map(|(name, get)| (*name, get(payload)))
        .collect()
}

/// Compute the signature over a set of named fields
pub fn sign(secret: &str, fields: &[(&str, &str)]) -> String {
    let mut present: Vec<&(&str, &str)> = fields.iter().filter(|(_, v)| !v.is_empty()).collect();
    present.sort_by(|a, b| a.0.cmp(b.0));

    let mut signing_string = String::from(secret);
    for (_, value) in present {
        signing_string.push('|');
        signing_string.push_str(value);
    }

    hex::encode(Sha1::digest(signing_string.as_bytes()))
}

/// Signature of a callback as the provider should have computed it
pub fn callback_signature(secret: &str, callback: &FondyCallback) -> String {
    sign(secret, &collect(callback, CALLBACK_FIELDS))
}

/// Compare two hex digests without short-circuiting on the first difference
pub fn signatures_match(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b)
        .fold(0u8, |acc, (x, y)| acc | (x.to_ascii_lowercase() ^ y.to_ascii_lowercase()))
        == 0
}
