pub mod auth;
pub mod evidence;
pub mod order_lines;
pub mod product_service;
pub mod qr;
pub mod route_auth;
pub mod store_service;
pub mod user_service;
pub mod visit_service;
