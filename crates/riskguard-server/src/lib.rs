//! RiskGuard HTTP server
//!
//! REST surface over the fraud engine: scoring, transaction processing,
//! alert acknowledgement and case management.

pub mod api;
pub mod config;
pub mod error;

pub use api::create_router;
pub use config::ServerConfig;
pub use error::ServerError;
