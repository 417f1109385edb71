//! Lumina auth service: one-time verification codes over email and SMS,
//! plus the passwordless login and registration flows built on them.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod router;
pub mod state;
pub mod usecase;
