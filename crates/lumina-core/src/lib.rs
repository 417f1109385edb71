//! Shared plumbing for Lumina services.
//!
//! Config loading, health endpoints, request-id middleware, tracing setup and
//! serde helpers. Nothing in here knows about verification codes or users.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
