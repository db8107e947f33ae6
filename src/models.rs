pub mod assignment;
pub mod auth;
pub mod product;
pub mod store;
pub mod visit;
