use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lumina_core::serde::to_rfc3339_ms;

use crate::domain::repository::{CodeDelivery, UserRepository, VerificationCodeStore};
use crate::domain::types::Purpose;
use crate::error::AuthServiceError;
use crate::handlers::IdentifierFields;
use crate::state::AppState;
use crate::usecase::verification::{IssueCodeInput, ValidateCodeInput};

// ── POST /api/auth/code/send ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendCodeRequest {
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    #[serde(default)]
    pub purpose: Purpose,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub message: &'static str,
    pub cooldown_seconds: u64,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub async fn send_code<U, S, D>(
    State(state): State<AppState<U, S, D>>,
    Json(body): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, AuthServiceError>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone + 'static,
{
    let identifier = body.identifier.into_identifier()?;

    // Delivery keeps running after the response; its outcome is only logged.
    let issued = state
        .issuer()
        .execute(IssueCodeInput {
            identifier,
            purpose: body.purpose,
        })
        .await?;

    Ok(Json(SendCodeResponse {
        message: "verification code sent",
        cooldown_seconds: issued.cooldown_secs,
        expires_at: issued.expires_at,
        code: state.expose_codes.then_some(issued.code),
    }))
}

// ── POST /api/auth/code/verify ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    pub purpose: Purpose,
    pub code: String,
}

pub async fn verify_code<U, S, D>(
    State(state): State<AppState<U, S, D>>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<StatusCode, AuthServiceError>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone,
{
    let identifier = body.identifier.into_identifier()?;
    state
        .validator()
        .require(&ValidateCodeInput {
            identifier,
            purpose: body.purpose,
            code: body.code,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
