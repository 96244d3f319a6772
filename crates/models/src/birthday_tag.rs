use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::{birthday, errors, tag};

/// Join table for the birthday <-> tag many-to-many relation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "birthday_tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub birthday_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Birthday,
    Tag,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Birthday => Entity::belongs_to(birthday::Entity)
                .from(Column::BirthdayId)
                .to(birthday::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Tag => Entity::belongs_to(tag::Entity)
                .from(Column::TagId)
                .to(tag::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<birthday::Entity> for Entity {
    fn to() -> RelationDef { Relation::Birthday.def() }
}

impl Related<tag::Entity> for Entity {
    fn to() -> RelationDef { Relation::Tag.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Replace the tag set of a birthday. Runs on any connection so callers can
/// wrap it in the same transaction as the birthday write.
pub async fn replace_tags<C: ConnectionTrait>(conn: &C, birthday_id: i32, tag_ids: &[i32]) -> Result<(), errors::ModelError> {
    Entity::delete_many()
        .filter(Column::BirthdayId.eq(birthday_id))
        .exec(conn)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows = tag_ids.iter().map(|&tag_id| ActiveModel {
        birthday_id: Set(birthday_id),
        tag_id: Set(tag_id),
    });
    Entity::insert_many(rows).exec_without_returning(conn).await?;
    Ok(())
}
