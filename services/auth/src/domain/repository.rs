use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{DeliveryReport, Identifier, Purpose, User, VerificationCode};
use crate::error::{AuthServiceError, DeliveryError};

// Ports return `Send` futures: handlers and the delivery task are generic over them.

/// Repository for gallery accounts.
pub trait UserRepository: Send + Sync {
    fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<User>, AuthServiceError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<User>, AuthServiceError>> + Send;

    /// Insert a new user. Fails with `AlreadyRegistered` when the email or
    /// phone already belongs to someone.
    fn create(&self, user: &User) -> impl Future<Output = Result<(), AuthServiceError>> + Send;
}

/// Store for one-time verification codes, keyed by (identifier, purpose).
pub trait VerificationCodeStore: Send + Sync {
    /// Remove every code for the key, live or not. Returns the number removed.
    fn delete_for_key(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
    ) -> impl Future<Output = Result<u64, AuthServiceError>> + Send;

    fn insert(
        &self,
        code: &VerificationCode,
    ) -> impl Future<Output = Result<(), AuthServiceError>> + Send;

    /// Atomically delete a record matching key + code with `expires_at > now`.
    /// Returns `true` if one was deleted. Two concurrent calls for the same
    /// record never both return `true`.
    fn consume(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;

    /// Remove records with `expires_at <= now`. Returns the number removed.
    fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, AuthServiceError>> + Send;
}

/// Outbound channel that carries a code to its identifier.
pub trait CodeDelivery: Send + Sync {
    /// An unconfigured transport yields `Ok(DeliveryReport::simulated())`,
    /// not an error.
    fn send(
        &self,
        identifier: &Identifier,
        code: &str,
    ) -> impl Future<Output = Result<DeliveryReport, DeliveryError>> + Send;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
