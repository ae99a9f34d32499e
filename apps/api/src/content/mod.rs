pub mod handlers;
pub mod models;
pub mod repository;
pub mod store;
pub mod validation;
pub mod versioning;
