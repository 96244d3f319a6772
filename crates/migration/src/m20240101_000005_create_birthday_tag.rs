//! Create `birthday_tag` join table (birthday <-> tag, many-to-many).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BirthdayTag::Table)
                    .if_not_exists()
                    .col(integer(BirthdayTag::BirthdayId).not_null())
                    .col(integer(BirthdayTag::TagId).not_null())
                    .primary_key(
                        Index::create()
                            .col(BirthdayTag::BirthdayId)
                            .col(BirthdayTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_birthday_tag_birthday")
                            .from(BirthdayTag::Table, BirthdayTag::BirthdayId)
                            .to(Birthday::Table, Birthday::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_birthday_tag_tag")
                            .from(BirthdayTag::Table, BirthdayTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BirthdayTag::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BirthdayTag { Table, BirthdayId, TagId }

#[derive(DeriveIden)]
enum Birthday { Table, Id }

#[derive(DeriveIden)]
enum Tag { Table, Id }
