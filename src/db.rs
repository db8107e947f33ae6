// src/db.rs

pub mod contracts;
pub mod product_repo;
pub mod store_repo;
pub mod user_repo;
pub mod visit_repo;

#[cfg(test)]
pub mod memory;

pub use contracts::{ProductRepository, StoreRepository, UserRepository, VisitRepository};
pub use product_repo::PgProductRepository;
pub use store_repo::PgStoreRepository;
pub use user_repo::PgUserRepository;
pub use visit_repo::PgVisitRepository;
