//! Secondary indexes for FK lookups used by list/detail views.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_birthday_author_id")
                    .table(Birthday::Table)
                    .col(Birthday::AuthorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_birthday_tag_tag_id")
                    .table(BirthdayTag::Table)
                    .col(BirthdayTag::TagId)
                    .to_owned(),
            )
            .await?;
        // detail view: WHERE birthday_id = ? ORDER BY created_at
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_congratulation_birthday_created")
                    .table(Congratulation::Table)
                    .col(Congratulation::BirthdayId)
                    .col(Congratulation::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_congratulation_birthday_created").table(Congratulation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_birthday_tag_tag_id").table(BirthdayTag::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_birthday_author_id").table(Birthday::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Birthday { Table, AuthorId }

#[derive(DeriveIden)]
enum BirthdayTag { Table, TagId }

#[derive(DeriveIden)]
enum Congratulation { Table, BirthdayId, CreatedAt }
