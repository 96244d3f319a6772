use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{birthday, errors, user};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "congratulation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub birthday_id: i32,
    pub author_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Birthday,
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Birthday => Entity::belongs_to(birthday::Entity)
                .from(Column::BirthdayId)
                .to(birthday::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<birthday::Entity> for Entity {
    fn to() -> RelationDef { Relation::Birthday.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Append a congratulation. `birthday_id` and `author_id` are supplied by the
/// caller from request context, never from submitted data.
pub async fn create(db: &DatabaseConnection, birthday_id: i32, author_id: Uuid, text: &str) -> Result<Model, errors::ModelError> {
    if text.trim().is_empty() { return Err(errors::ModelError::Validation("text required".into())); }
    let am = ActiveModel {
        id: sea_orm::NotSet,
        text: Set(text.to_string()),
        birthday_id: Set(birthday_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
