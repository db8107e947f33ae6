pub mod assignments;
pub mod auth;
pub mod products;
pub mod stores;
pub mod users;
pub mod visits;
