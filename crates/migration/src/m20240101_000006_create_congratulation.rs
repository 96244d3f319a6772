//! Create `congratulation` table.
//! Append-only comments on a birthday; both FKs cascade.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Congratulation::Table)
                    .if_not_exists()
                    .col(pk_auto(Congratulation::Id))
                    .col(text(Congratulation::Text).not_null())
                    .col(integer(Congratulation::BirthdayId).not_null())
                    .col(uuid(Congratulation::AuthorId).not_null())
                    .col(timestamp_with_time_zone(Congratulation::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_congratulation_birthday")
                            .from(Congratulation::Table, Congratulation::BirthdayId)
                            .to(Birthday::Table, Birthday::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_congratulation_author")
                            .from(Congratulation::Table, Congratulation::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Congratulation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Congratulation { Table, Id, Text, BirthdayId, AuthorId, CreatedAt }

#[derive(DeriveIden)]
enum Birthday { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
