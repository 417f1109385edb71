use chrono::{DateTime, Utc};

use crate::domain::repository::VerificationCodeStore;
use crate::domain::types::{Identifier, Purpose, VerificationCode};
use crate::error::AuthServiceError;
use crate::infra::cache::RedisVerificationCodeStore;
use crate::infra::db::DbVerificationCodeRepository;

/// Code store picked at startup by `CODE_STORE`.
#[derive(Clone)]
pub enum CodeStore {
    Postgres(DbVerificationCodeRepository),
    Redis(RedisVerificationCodeStore),
}

impl CodeStore {
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Redis(_) => "redis",
        }
    }

    /// Whether expired rows must be purged by `ExpirySweeper`. Redis keys
    /// carry their own `PEXPIREAT`.
    pub fn needs_sweeper(&self) -> bool {
        matches!(self, Self::Postgres(_))
    }
}

impl VerificationCodeStore for CodeStore {
    async fn delete_for_key(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
    ) -> Result<u64, AuthServiceError> {
        match self {
            Self::Postgres(s) => s.delete_for_key(identifier, purpose).await,
            Self::Redis(s) => s.delete_for_key(identifier, purpose).await,
        }
    }

    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        match self {
            Self::Postgres(s) => s.insert(code).await,
            Self::Redis(s) => s.insert(code).await,
        }
    }

    async fn consume(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        match self {
            Self::Postgres(s) => s.consume(identifier, purpose, code, now).await,
            Self::Redis(s) => s.consume(identifier, purpose, code, now).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        match self {
            Self::Postgres(s) => s.purge_expired(now).await,
            Self::Redis(s) => s.purge_expired(now).await,
        }
    }
}
