use chrono::{DateTime, Utc};
use rand::RngExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::repository::{Clock, CodeDelivery, VerificationCodeStore};
use crate::domain::types::{
    Identifier, Purpose, RESEND_COOLDOWN_SECS, VerificationCode, validate_code_format,
};
use crate::error::AuthServiceError;

/// Uniform 6-digit code in `100000..=999999`.
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

// ── Issue ────────────────────────────────────────────────────────────────────

pub struct IssueCodeInput {
    pub identifier: Identifier,
    pub purpose: Purpose,
}

#[derive(Debug)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Advisory only; nothing rejects an earlier resend.
    pub cooldown_secs: u64,
    /// Background delivery. Resolves to whether a transport accepted the
    /// message; `false` when the channel is unconfigured or failed. The code
    /// is stored either way, and dropping the handle detaches the task.
    pub delivery: JoinHandle<bool>,
}

pub struct IssueCodeUseCase<S, D, C>
where
    S: VerificationCodeStore,
    D: CodeDelivery,
    C: Clock,
{
    pub codes: S,
    pub delivery: D,
    pub clock: C,
}

impl<S, D, C> IssueCodeUseCase<S, D, C>
where
    S: VerificationCodeStore,
    D: CodeDelivery + Clone + 'static,
    C: Clock,
{
    pub async fn execute(&self, input: IssueCodeInput) -> Result<IssuedCode, AuthServiceError> {
        let record = VerificationCode::issue(
            input.identifier,
            input.purpose,
            generate_code(),
            self.clock.now(),
        );

        // 1. At most one live code per (identifier, purpose)
        let replaced = self
            .codes
            .delete_for_key(&record.identifier, record.purpose)
            .await?;

        // 2. Persist before any delivery attempt
        self.codes.insert(&record).await?;

        info!(
            channel = record.identifier.channel().as_str(),
            to = %record.identifier.masked(),
            purpose = record.purpose.as_str(),
            replaced,
            "verification code issued"
        );

        // 3. Deliver off the request path; the stored code is never rolled back
        let delivery = self.delivery.clone();
        let identifier = record.identifier.clone();
        let code = record.code.clone();
        let handle = tokio::spawn(async move {
            match delivery.send(&identifier, &code).await {
                Ok(report) => {
                    info!(
                        channel = identifier.channel().as_str(),
                        to = %identifier.masked(),
                        delivered = report.delivered,
                        simulated = report.simulated,
                        "verification code delivery finished"
                    );
                    report.delivered
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        channel = identifier.channel().as_str(),
                        to = %identifier.masked(),
                        "verification code delivery failed"
                    );
                    false
                }
            }
        });

        Ok(IssuedCode {
            code: record.code,
            expires_at: record.expires_at,
            cooldown_secs: RESEND_COOLDOWN_SECS,
            delivery: handle,
        })
    }
}

// ── Validate ─────────────────────────────────────────────────────────────────

pub struct ValidateCodeInput {
    pub identifier: Identifier,
    pub purpose: Purpose,
    pub code: String,
}

pub struct ValidateCodeUseCase<S, C>
where
    S: VerificationCodeStore,
    C: Clock,
{
    pub codes: S,
    pub clock: C,
}

impl<S, C> ValidateCodeUseCase<S, C>
where
    S: VerificationCodeStore,
    C: Clock,
{
    /// Redeem a code. `Ok(true)` at most once per issued code; wrong, expired
    /// and already-used codes all give `Ok(false)`. A wrong code leaves the
    /// live record in place.
    pub async fn execute(&self, input: &ValidateCodeInput) -> Result<bool, AuthServiceError> {
        validate_code_format(&input.code)?;
        self.codes
            .consume(
                &input.identifier,
                input.purpose,
                &input.code,
                self.clock.now(),
            )
            .await
    }

    /// Like [`execute`](Self::execute) but maps a failed redemption to
    /// `InvalidCode`.
    pub async fn require(&self, input: &ValidateCodeInput) -> Result<(), AuthServiceError> {
        if self.execute(input).await? {
            Ok(())
        } else {
            Err(AuthServiceError::InvalidCode)
        }
    }
}
