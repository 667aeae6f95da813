//! SeaORM entities
//!
//! Table models for the schema in `migrations/001_init.sql`.

pub mod modules;
pub mod offers;
pub mod order_transactions;
pub mod orders;
pub mod promocodes;
pub mod student_courses;
pub mod student_modules;
pub mod students;
