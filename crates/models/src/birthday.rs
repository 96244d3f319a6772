use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{birthday_tag, congratulation, errors, tag, user};

pub const NAME_MAX_LEN: usize = 20;
pub const IMAGE_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "birthday")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    /// Empty string when not given.
    pub last_name: String,
    pub birthday: Date,
    pub image: Option<String>,
    pub author_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Author,
    Congratulation,
    BirthdayTag,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Congratulation => Entity::has_many(congratulation::Entity).into(),
            Relation::BirthdayTag => Entity::has_many(birthday_tag::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl Related<congratulation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Congratulation.def() }
}

impl Related<birthday_tag::Entity> for Entity {
    fn to() -> RelationDef { Relation::BirthdayTag.def() }
}

impl Related<tag::Entity> for Entity {
    fn to() -> RelationDef { birthday_tag::Relation::Tag.def() }
    fn via() -> Option<RelationDef> { Some(birthday_tag::Relation::Birthday.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field values of a birthday as accepted from a cleaned form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BirthdayFields {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Date,
    pub image: Option<String>,
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), errors::ModelError> {
    if value.chars().count() > max {
        return Err(errors::ModelError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

pub fn validate_fields(fields: &BirthdayFields) -> Result<(), errors::ModelError> {
    if fields.first_name.trim().is_empty() {
        return Err(errors::ModelError::Validation("first_name required".into()));
    }
    check_len("first_name", &fields.first_name, NAME_MAX_LEN)?;
    check_len("last_name", &fields.last_name, NAME_MAX_LEN)?;
    if let Some(image) = &fields.image {
        check_len("image", image, IMAGE_MAX_LEN)?;
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(conn: &C, author_id: Uuid, fields: BirthdayFields) -> Result<Model, errors::ModelError> {
    validate_fields(&fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: sea_orm::NotSet,
        first_name: Set(fields.first_name),
        last_name: Set(fields.last_name),
        birthday: Set(fields.birthday),
        image: Set(fields.image),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(conn).await?)
}

/// Overwrite the editable fields; `author_id` and `created_at` never change.
pub async fn update_fields<C: ConnectionTrait>(conn: &C, existing: Model, fields: BirthdayFields) -> Result<Model, errors::ModelError> {
    validate_fields(&fields)?;
    let mut am: ActiveModel = existing.into();
    am.first_name = Set(fields.first_name);
    am.last_name = Set(fields.last_name);
    am.birthday = Set(fields.birthday);
    am.image = Set(fields.image);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(conn).await?)
}
