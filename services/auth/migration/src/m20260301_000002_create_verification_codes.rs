use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationCodes::Channel).string().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::Identifier)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationCodes::Purpose).string().not_null())
                    .col(ColumnDef::new(VerificationCodes::Code).string().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup key for issue (delete prior) and redeem (conditional delete).
        manager
            .create_index(
                Index::create()
                    .table(VerificationCodes::Table)
                    .col(VerificationCodes::Channel)
                    .col(VerificationCodes::Identifier)
                    .col(VerificationCodes::Purpose)
                    .name("idx_verification_codes_key")
                    .to_owned(),
            )
            .await?;

        // Expiry sweep.
        manager
            .create_index(
                Index::create()
                    .table(VerificationCodes::Table)
                    .col(VerificationCodes::ExpiresAt)
                    .name("idx_verification_codes_expires_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationCodes {
    Table,
    Id,
    Channel,
    Identifier,
    Purpose,
    Code,
    ExpiresAt,
    CreatedAt,
}
