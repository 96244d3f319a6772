//! Create `birthday` table with FK to `user` (author).
//!
//! Integer ids: list views order by id, so ids follow insertion order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Birthday::Table)
                    .if_not_exists()
                    .col(pk_auto(Birthday::Id))
                    .col(string_len(Birthday::FirstName, 20).not_null())
                    .col(string_len(Birthday::LastName, 20).not_null())
                    .col(date(Birthday::Birthday).not_null())
                    .col(string_len_null(Birthday::Image, 255))
                    .col(uuid(Birthday::AuthorId).not_null())
                    .col(timestamp_with_time_zone(Birthday::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Birthday::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_birthday_author")
                            .from(Birthday::Table, Birthday::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // "Unique person": same name and date may only be stored once
        manager
            .create_index(
                Index::create()
                    .name("idx_birthday_unique_person")
                    .table(Birthday::Table)
                    .col(Birthday::FirstName)
                    .col(Birthday::LastName)
                    .col(Birthday::Birthday)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Birthday::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Birthday {
    Table,
    Id,
    FirstName,
    LastName,
    Birthday,
    Image,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
