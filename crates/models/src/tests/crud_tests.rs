use crate::{birthday, birthday_tag, congratulation, tag, user, user_credentials};
use crate::birthday::BirthdayFields;
use super::setup_test_db;
use sea_orm::{EntityTrait, QueryFilter, QueryOrder, ColumnTrait, ModelTrait};
use anyhow::Result;
use chrono::NaiveDate;

fn fields(first: &str, last: &str, y: i32, m: u32, d: u32) -> BirthdayFields {
    BirthdayFields {
        first_name: first.into(),
        last_name: last.into(),
        birthday: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        image: None,
    }
}

/// Test user CRUD operations
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let created = user::create(&db, "alice", "alice@example.com").await?;
    assert_eq!(created.username, "alice");

    let found = user::find_by_username(&db, "alice").await?.unwrap();
    assert_eq!(found.id, created.id);

    // username is unique
    assert!(user::create(&db, "alice", "other@example.com").await.is_err());
    // validation happens before touching the db
    assert!(matches!(user::create(&db, "bad name", "x@example.com").await, Err(crate::errors::ModelError::Validation(_))));
    assert!(matches!(user::create(&db, "bob", "no-at-sign").await, Err(crate::errors::ModelError::Validation(_))));

    user::Entity::delete_by_id(created.id).exec(&db).await?;
    assert!(user::find_by_username(&db, "alice").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_credentials_upsert_replaces_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "carol", "carol@example.com").await?;

    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(first.id, second.id);

    let stored = user_credentials::find_by_user(&db, u.id).await?.unwrap();
    assert_eq!(stored.password_hash, "hash-2");
    Ok(())
}

#[tokio::test]
async fn test_credentials_errors_use_model_error() -> Result<()> {
    use sea_orm::{ActiveModelTrait, Set};

    let db = setup_test_db().await?;
    let u = user::create(&db, "carl", "carl@example.com").await?;

    let blank = user_credentials::upsert_password(&db, u.id, "  ".into(), "argon2").await;
    assert!(matches!(blank, Err(crate::errors::ModelError::Validation(_))));
    let long = "x".repeat(user_credentials::PASSWORD_HASH_MAX_LEN + 1);
    let long = user_credentials::upsert_password(&db, u.id, long, "argon2").await;
    assert!(matches!(long, Err(crate::errors::ModelError::Validation(_))));
    assert!(user_credentials::find_by_user(&db, u.id).await?.is_none());

    let stored = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    // a second row for the same user hits the unique index
    let now = chrono::Utc::now().into();
    let dup = user_credentials::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        user_id: Set(u.id),
        password_hash: Set("hash-2".into()),
        password_algorithm: Set("argon2".into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let err = dup.insert(&db).await.map_err(crate::errors::ModelError::from);
    assert!(matches!(err, Err(crate::errors::ModelError::Conflict(_))));
    assert_eq!(user_credentials::find_by_user(&db, u.id).await?.map(|c| c.id), Some(stored.id));
    Ok(())
}

/// Test birthday CRUD with tags and the unique person index
#[tokio::test]
async fn test_birthday_crud_and_tags() -> Result<()> {
    let db = setup_test_db().await?;
    let author = user::create(&db, "dave", "dave@example.com").await?;
    let friends = tag::create(&db, "friends").await?;
    let family = tag::create(&db, "family").await?;

    let b = birthday::create(&db, author.id, fields("Ivan", "Petrov", 1990, 5, 17)).await?;
    assert_eq!(b.author_id, author.id);
    assert_eq!(b.last_name, "Petrov");

    birthday_tag::replace_tags(&db, b.id, &[friends.id, family.id]).await?;
    let tags = b.find_related(tag::Entity).order_by_asc(tag::Column::Id).all(&db).await?;
    assert_eq!(tags.iter().map(|t| t.tag.as_str()).collect::<Vec<_>>(), vec!["friends", "family"]);

    birthday_tag::replace_tags(&db, b.id, &[family.id]).await?;
    let tags = b.find_related(tag::Entity).all(&db).await?;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, family.id);

    // same person twice violates the unique index
    assert!(birthday::create(&db, author.id, fields("Ivan", "Petrov", 1990, 5, 17)).await.is_err());

    let updated = birthday::update_fields(&db, b.clone(), fields("Ivan", "Sidorov", 1991, 6, 1)).await?;
    assert_eq!(updated.id, b.id);
    assert_eq!(updated.author_id, author.id);
    assert_eq!(updated.last_name, "Sidorov");

    // deleting the birthday removes its tag links but not the tags
    birthday::Entity::delete_by_id(b.id).exec(&db).await?;
    let links = birthday_tag::Entity::find().filter(birthday_tag::Column::BirthdayId.eq(b.id)).all(&db).await?;
    assert!(links.is_empty());
    assert!(tag::Entity::find_by_id(family.id).one(&db).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_birthday_field_validation() -> Result<()> {
    let db = setup_test_db().await?;
    let author = user::create(&db, "erin", "erin@example.com").await?;

    let too_long = "x".repeat(birthday::NAME_MAX_LEN + 1);
    assert!(birthday::create(&db, author.id, fields(&too_long, "", 2000, 1, 1)).await.is_err());
    assert!(birthday::create(&db, author.id, fields("  ", "", 2000, 1, 1)).await.is_err());
    // last name is optional
    let b = birthday::create(&db, author.id, fields("Anna", "", 2000, 1, 1)).await?;
    assert_eq!(b.last_name, "");
    Ok(())
}

/// Congratulations cascade with their birthday and keep insertion order
#[tokio::test]
async fn test_congratulation_crud() -> Result<()> {
    let db = setup_test_db().await?;
    let author = user::create(&db, "frank", "frank@example.com").await?;
    let guest = user::create(&db, "gina", "gina@example.com").await?;
    let b = birthday::create(&db, author.id, fields("Olga", "", 1985, 2, 28)).await?;

    let c1 = congratulation::create(&db, b.id, guest.id, "Happy birthday!").await?;
    let c2 = congratulation::create(&db, b.id, author.id, "Thanks").await?;
    assert!(congratulation::create(&db, b.id, guest.id, "   ").await.is_err());

    let rows = congratulation::Entity::find()
        .filter(congratulation::Column::BirthdayId.eq(b.id))
        .order_by_asc(congratulation::Column::CreatedAt)
        .order_by_asc(congratulation::Column::Id)
        .all(&db)
        .await?;
    assert_eq!(rows.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c1.id, c2.id]);
    assert_eq!(rows[0].author_id, guest.id);

    birthday::Entity::delete_by_id(b.id).exec(&db).await?;
    let left = congratulation::Entity::find().all(&db).await?;
    assert!(left.is_empty());
    Ok(())
}
