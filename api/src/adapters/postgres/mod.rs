//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod catalog_repo;
pub mod order_repo;
pub mod student_repo;


pub use catalog_repo::{
    PostgresModuleRepository, PostgresOfferRepository, PostgresPromocodeRepository,
};
pub use order_repo::PostgresOrderRepository;
pub use student_repo::PostgresStudentRepository;
