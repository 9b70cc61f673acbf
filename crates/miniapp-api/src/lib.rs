//! miniapp HTTP service: router, handlers and startup configuration.

pub mod config;
pub mod error;
pub mod server;
