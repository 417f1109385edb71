use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use lumina_core::serde::to_rfc3339_ms;

use crate::domain::repository::{CodeDelivery, UserRepository, VerificationCodeStore};
use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::auth::GetUserUseCase;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub avatar: String,
    pub bio: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            avatar: user.avatar,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user<U, S, D>(
    State(state): State<AppState<U, S, D>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AuthServiceError>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone,
{
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    Ok(Json(user.into()))
}
