pub mod auth;
pub mod sweep;
pub mod verification;
