use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{birthday, congratulation};

pub const USERNAME_MAX_LEN: usize = 150;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Birthday,
    Congratulation,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Birthday => Entity::has_many(birthday::Entity).into(),
            Relation::Congratulation => Entity::has_many(congratulation::Entity).into(),
        }
    }
}

impl Related<birthday::Entity> for Entity {
    fn to() -> RelationDef { Relation::Birthday.def() }
}

impl Related<congratulation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Congratulation.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    if username.trim().is_empty() {
        return Err(errors::ModelError::Validation("username required".into()));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("username must be at most {USERNAME_MAX_LEN} characters")));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        return Err(errors::ModelError::Validation("username may contain only letters, digits and @/./+/-/_".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, username: &str, email: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    validate_email(email)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
