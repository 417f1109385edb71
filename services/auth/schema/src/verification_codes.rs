use sea_orm::entity::prelude::*;

/// One-time verification code sent by email or SMS.
/// Expires 5 minutes after issue; at most one live row per
/// (channel, identifier, purpose). Rows are deleted on redemption.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `email` or `sms`.
    pub channel: String,
    /// Normalized address the code was sent to.
    pub identifier: String,
    /// `login`, `register` or `reset`.
    pub purpose: String,
    pub code: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
