use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use lumina_auth_schema::{users, verification_codes};

use crate::domain::repository::{UserRepository, VerificationCodeStore};
use crate::domain::types::{Identifier, Purpose, User, VerificationCode};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<User>, AuthServiceError> {
        let column = match identifier {
            Identifier::Email(_) => users::Column::Email,
            Identifier::Sms(_) => users::Column::Phone,
        };
        let model = users::Entity::find()
            .filter(column.eq(identifier.value()))
            .one(&self.db)
            .await
            .context("find user by identifier")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            phone: Set(user.phone.clone()),
            avatar: Set(user.avatar.clone()),
            bio: Set(user.bio.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::AlreadyRegistered),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        avatar: model.avatar,
        bio: model.bio,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Verification code store ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeStore for DbVerificationCodeRepository {
    async fn delete_for_key(
        &self,
        identifier: &Identifier,
        purpose: Purpose,
    ) -> Result<u64, AuthServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::Channel.eq(identifier.channel().as_str()))
            .filter(verification_codes::Column::Identifier.eq(identifier.value()))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .exec(&self.db)
            .await
            .context("delete verification codes for key")?;
        Ok(result.rows_affected)
    }

    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        verification_codes::ActiveModel {
            id: Set(code.id),
            channel: Set(code.identifier.channel().as_str().to_owned()),
            identifier: Set(code.identifier.value().to_owned()),
            purpose: Set(code.purpose.as_str().to_owned()),
            code: Set(code.code.clone()),
            expires_at: Set(code.expires_at),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
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
        // One conditional DELETE: of two concurrent attempts only one sees the row.
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::Channel.eq(identifier.channel().as_str()))
            .filter(verification_codes::Column::Identifier.eq(identifier.value()))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(verification_codes::Column::Code.eq(code))
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume verification code")?;
        Ok(result.rows_affected > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("purge expired verification codes")?;
        Ok(result.rows_affected)
    }
}
