//! service-core: shared infrastructure for the receptionist web services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
