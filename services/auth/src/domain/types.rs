use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AuthServiceError;

/// Verification code time-to-live in seconds.
pub const CODE_TTL_SECS: i64 = 300;

/// Advisory resend cooldown returned to clients. Not enforced server-side.
pub const RESEND_COOLDOWN_SECS: u64 = 60;

/// Verification code length in digits.
pub const CODE_LEN: usize = 6;

/// Bio given to freshly registered users.
pub const DEFAULT_BIO: &str = "New visual creator.";

/// Maximum display name length in characters.
pub const MAX_NAME_LEN: usize = 50;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{6,15}$").expect("valid phone regex"));

/// Delivery channel a code travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

/// Flow a code may be redeemed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Login,
    Register,
    Reset,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Reset => "reset",
        }
    }
}

/// Destination a verification code is bound to.
///
/// Values built through [`Identifier::email`] / [`Identifier::phone`] are
/// validated and normalized, so equal addresses compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Email(String),
    Sms(String),
}

impl Identifier {
    /// Trimmed, lower-cased email address.
    pub fn email(raw: &str) -> Result<Self, AuthServiceError> {
        let value = raw.trim().to_lowercase();
        if value.len() > 254 || !EMAIL_RE.is_match(&value) {
            return Err(AuthServiceError::InvalidIdentifier);
        }
        Ok(Self::Email(value))
    }

    /// Phone number with spaces, dashes and parentheses removed.
    pub fn phone(raw: &str) -> Result<Self, AuthServiceError> {
        let value: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        if !PHONE_RE.is_match(&value) {
            return Err(AuthServiceError::InvalidIdentifier);
        }
        Ok(Self::Sms(value))
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Email(_) => Channel::Email,
            Self::Sms(_) => Channel::Sms,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Email(v) | Self::Sms(v) => v,
        }
    }

    /// Log-safe rendering: `u***@example.com`, `+******7890`.
    pub fn masked(&self) -> String {
        match self {
            Self::Email(v) => match v.split_once('@') {
                Some((local, domain)) => {
                    let first = local.chars().next().unwrap_or('*');
                    format!("{first}***@{domain}")
                }
                None => "***".to_owned(),
            },
            Self::Sms(v) => {
                let (prefix, digits) = match v.strip_prefix('+') {
                    Some(rest) => ("+", rest),
                    None => ("", v.as_str()),
                };
                let count = digits.chars().count();
                let hidden = count - count.min(4);
                let tail: String = digits.chars().skip(hidden).collect();
                format!("{prefix}{}{tail}", "*".repeat(hidden))
            }
        }
    }
}

/// Reject anything that is not exactly [`CODE_LEN`] ASCII digits.
pub fn validate_code_format(code: &str) -> Result<(), AuthServiceError> {
    if code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AuthServiceError::InvalidCodeFormat)
    }
}

/// One-time numeric code bound to an identifier and a purpose.
/// Immutable once written; removed on redemption or after `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub id: Uuid,
    pub identifier: Identifier,
    pub purpose: Purpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn issue(
        identifier: Identifier,
        purpose: Purpose,
        code: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier,
            purpose,
            code,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
            created_at: now,
        }
    }
}

/// Gallery account as seen by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a delivery attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// A transport accepted the message.
    pub delivered: bool,
    /// No transport is configured; the code was only logged.
    pub simulated: bool,
}

impl DeliveryReport {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            simulated: false,
        }
    }

    pub fn simulated() -> Self {
        Self {
            delivered: false,
            simulated: true,
        }
    }
}
