pub mod cache;
pub mod clock;
pub mod db;
pub mod delivery;
pub mod mail;
pub mod sms;
pub mod store;
