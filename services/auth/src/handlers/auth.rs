use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::domain::repository::{CodeDelivery, UserRepository, VerificationCodeStore};
use crate::error::AuthServiceError;
use crate::handlers::IdentifierFields;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    pub code: String,
}

pub async fn login<U, S, D>(
    State(state): State<AppState<U, S, D>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>, AuthServiceError>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone,
{
    let identifier = body.identifier.into_identifier()?;
    let usecase = LoginUseCase {
        users: state.user_repo(),
        validator: state.validator(),
    };
    let user = usecase
        .execute(LoginInput {
            identifier,
            code: body.code,
        })
        .await?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user.into()))
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    pub code: String,
}

pub async fn register<U, S, D>(
    State(state): State<AppState<U, S, D>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthServiceError>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone,
{
    let identifier = body.identifier.into_identifier()?;
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        validator: state.validator(),
    };
    let user = usecase
        .execute(RegisterInput {
            name: body.name,
            identifier,
            code: body.code,
        })
        .await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── POST /api/auth/logout ────────────────────────────────────────────────────

/// Sessions live on the client; nothing to revoke server-side.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}
