use std::sync::LazyLock;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands, Script};

use crate::domain::repository::VerificationCodeStore;
use crate::domain::types::{Identifier, Purpose, VerificationCode};
use crate::error::AuthServiceError;

/// Compare-and-delete: removes the hash only when both the code matches and
/// `expires_at_ms` is still ahead of the caller's clock. Runs atomically on
/// the server, so concurrent redemptions cannot both win.
const CONSUME_SCRIPT_BODY: &str = r"
local stored = redis.call('HGET', KEYS[1], 'code')
if not stored or stored ~= ARGV[1] then
    return 0
end
local expires = tonumber(redis.call('HGET', KEYS[1], 'expires_at_ms'))
if not expires or expires <= tonumber(ARGV[2]) then
    return 0
end
redis.call('DEL', KEYS[1])
return 1
";

static CONSUME_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(CONSUME_SCRIPT_BODY));

/// Redis-backed code store. One hash per (purpose, channel, identifier) with
/// a `PEXPIREAT` at the code's expiry, so Redis itself drops stale codes.
#[derive(Clone)]
pub struct RedisVerificationCodeStore {
    pub pool: Pool,
}

fn code_key(identifier: &Identifier, purpose: Purpose) -> String {
    format!(
        "verification_code:{}:{}:{}",
        purpose.as_str(),
        identifier.channel().as_str(),
        identifier.value()
    )
}

impl RedisVerificationCodeStore {
    async fn conn(&self) -> Result<deadpool_redis::Connection, AuthServiceError> {
        Ok(self.pool.get().await.context("get redis connection")?)
    }
}

impl VerificationCodeStore for RedisVerificationCodeStore {
    async fn delete_for_key(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
    ) -> Result<u64, AuthServiceError> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn
            .del(code_key(identifier, purpose))
            .await
            .context("delete verification code")?;
        Ok(removed)
    }

    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        let mut conn = self.conn().await?;
        let key = code_key(&code.identifier, code.purpose);
        let expires_at_ms = code.expires_at.timestamp_millis();
        let fields = [
            ("code", code.code.clone()),
            ("expires_at_ms", expires_at_ms.to_string()),
            ("created_at_ms", code.created_at.timestamp_millis().to_string()),
        ];
        // DEL first so no field from an older code survives the HSET.
        let (): () = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .pexpire_at(&key, expires_at_ms)
            .ignore()
            .query_async(&mut conn)
            .await
            .context("insert verification code")?;
        Ok(())
    }

    async fn consume(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        let mut conn = self.conn().await?;
        let consumed: i64 = CONSUME_SCRIPT
            .key(code_key(identifier, purpose))
            .arg(code)
            .arg(now.timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .context("consume verification code")?;
        Ok(consumed == 1)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        // Keys carry PEXPIREAT; Redis evicts them on its own.
        Ok(0)
    }
}
