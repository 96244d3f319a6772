use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::{birthday, birthday_tag, errors};

pub const TAG_MAX_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tag: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { BirthdayTag }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::BirthdayTag => Entity::has_many(birthday_tag::Entity).into(),
        }
    }
}

impl Related<birthday_tag::Entity> for Entity {
    fn to() -> RelationDef { Relation::BirthdayTag.def() }
}

impl Related<birthday::Entity> for Entity {
    fn to() -> RelationDef { birthday_tag::Relation::Birthday.def() }
    fn via() -> Option<RelationDef> { Some(birthday_tag::Relation::Tag.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, tag: &str) -> Result<Model, errors::ModelError> {
    let tag = tag.trim();
    if tag.is_empty() { return Err(errors::ModelError::Validation("tag required".into())); }
    if tag.chars().count() > TAG_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("tag must be at most {TAG_MAX_LEN} characters")));
    }
    let am = ActiveModel { tag: Set(tag.to_string()), ..Default::default() };
    Ok(am.insert(db).await?)
}
