use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use models::birthday::BirthdayFields;
use models::{birthday, birthday_tag, congratulation, tag, user};

use crate::birthday::domain::{AuthorView, BirthdayView, CongratulationView, TagView};
use crate::birthday::repository::BirthdayRepository;
use crate::errors::ServiceError;

pub struct SeaOrmBirthdayRepository {
    pub db: DatabaseConnection,
}

fn author_view(author_id: Uuid, author: Option<user::Model>) -> AuthorView {
    match author {
        Some(u) => AuthorView { id: u.id, username: u.username },
        None => AuthorView { id: author_id, username: String::new() },
    }
}

fn birthday_view(b: birthday::Model, author: Option<user::Model>, tags: Vec<TagView>) -> BirthdayView {
    BirthdayView {
        author: author_view(b.author_id, author),
        id: b.id,
        first_name: b.first_name,
        last_name: b.last_name,
        birthday: b.birthday,
        image: b.image,
        tags,
    }
}

impl SeaOrmBirthdayRepository {
    /// Tags of all given birthdays in one query, keyed by birthday id.
    async fn tags_for(&self, birthday_ids: &[i32]) -> Result<HashMap<i32, Vec<TagView>>, ServiceError> {
        let mut out: HashMap<i32, Vec<TagView>> = HashMap::new();
        if birthday_ids.is_empty() {
            return Ok(out);
        }
        let links = birthday_tag::Entity::find()
            .filter(birthday_tag::Column::BirthdayId.is_in(birthday_ids.to_vec()))
            .order_by_asc(birthday_tag::Column::TagId)
            .find_also_related(tag::Entity)
            .all(&self.db)
            .await?;
        for (link, t) in links {
            if let Some(t) = t {
                out.entry(link.birthday_id).or_default().push(TagView { id: t.id, tag: t.tag });
            }
        }
        Ok(out)
    }

    async fn load(&self, id: i32) -> Result<Option<BirthdayView>, ServiceError> {
        let Some((b, author)) = birthday::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut tags = self.tags_for(&[b.id]).await?;
        let tags = tags.remove(&b.id).unwrap_or_default();
        Ok(Some(birthday_view(b, author, tags)))
    }
}

#[async_trait]
impl BirthdayRepository for SeaOrmBirthdayRepository {
    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(birthday::Entity::find().count(&self.db).await?)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<BirthdayView>, ServiceError> {
        let rows = birthday::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(birthday::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        let ids: Vec<i32> = rows.iter().map(|(b, _)| b.id).collect();
        let mut tags = self.tags_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|(b, author)| {
                let t = tags.remove(&b.id).unwrap_or_default();
                birthday_view(b, author, t)
            })
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<BirthdayView>, ServiceError> {
        self.load(id).await
    }

    async fn missing_tags(&self, tag_ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let found: Vec<i32> = tag::Entity::find()
            .select_only()
            .column(tag::Column::Id)
            .filter(tag::Column::Id.is_in(tag_ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(tag_ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    async fn person_exists(&self, first_name: &str, last_name: &str, date: NaiveDate, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
        let mut q = birthday::Entity::find()
            .filter(birthday::Column::FirstName.eq(first_name))
            .filter(birthday::Column::LastName.eq(last_name))
            .filter(birthday::Column::Birthday.eq(date));
        if let Some(id) = exclude_id {
            q = q.filter(birthday::Column::Id.ne(id));
        }
        Ok(q.count(&self.db).await? > 0)
    }

    async fn create(&self, author_id: Uuid, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError> {
        // 记录与标签关联在同一事务内写入
        let txn = self.db.begin().await?;
        let created = birthday::create(&txn, author_id, fields).await?;
        birthday_tag::replace_tags(&txn, created.id, tag_ids).await?;
        txn.commit().await?;
        self.load(created.id).await?.ok_or_else(|| ServiceError::not_found("birthday"))
    }

    async fn update(&self, id: i32, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = birthday::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("birthday"))?;
        birthday::update_fields(&txn, existing, fields).await?;
        birthday_tag::replace_tags(&txn, id, tag_ids).await?;
        txn.commit().await?;
        self.load(id).await?.ok_or_else(|| ServiceError::not_found("birthday"))
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = birthday::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("birthday"))?;
        existing.delete(&self.db).await?;
        Ok(())
    }

    async fn congratulations(&self, birthday_id: i32) -> Result<Vec<CongratulationView>, ServiceError> {
        let rows = congratulation::Entity::find()
            .filter(congratulation::Column::BirthdayId.eq(birthday_id))
            .order_by_asc(congratulation::Column::CreatedAt)
            .order_by_asc(congratulation::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(c, author)| CongratulationView {
                author: author_view(c.author_id, author),
                id: c.id,
                text: c.text,
                birthday_id: c.birthday_id,
                created_at: c.created_at,
            })
            .collect())
    }

    async fn add_congratulation(&self, birthday_id: i32, author_id: Uuid, text: &str) -> Result<CongratulationView, ServiceError> {
        let c = congratulation::create(&self.db, birthday_id, author_id, text).await?;
        let author = user::Entity::find_by_id(author_id).one(&self.db).await?;
        Ok(CongratulationView {
            author: author_view(author_id, author),
            id: c.id,
            text: c.text,
            birthday_id: c.birthday_id,
            created_at: c.created_at,
        })
    }
}
