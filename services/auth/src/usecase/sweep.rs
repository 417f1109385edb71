use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::repository::{Clock, VerificationCodeStore};
use crate::error::AuthServiceError;

/// Periodically deletes expired verification codes.
///
/// Redemption already ignores expired rows, so this only bounds table growth.
/// Stores with native expiry report zero removals.
pub struct ExpirySweeper<S, C>
where
    S: VerificationCodeStore,
    C: Clock,
{
    pub codes: S,
    pub clock: C,
    pub interval: Duration,
}

impl<S, C> ExpirySweeper<S, C>
where
    S: VerificationCodeStore,
    C: Clock,
{
    pub async fn sweep_once(&self) -> Result<u64, AuthServiceError> {
        self.codes.purge_expired(self.clock.now()).await
    }

    /// Run until the task is dropped. Store errors are logged and retried on
    /// the next tick.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(0) => debug!("no expired verification codes"),
                Ok(removed) => info!(removed, "purged expired verification codes"),
                Err(e) => warn!(error = ?e, "verification code sweep failed"),
            }
        }
    }
}
