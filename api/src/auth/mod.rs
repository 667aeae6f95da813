//! Request authentication

mod admin_key;

pub use admin_key::{require_admin, AdminKey};
