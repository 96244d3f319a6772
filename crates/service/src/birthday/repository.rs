use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use models::birthday::BirthdayFields;

use super::domain::{BirthdayView, CongratulationView};
use crate::errors::ServiceError;

/// Persistence for birthdays, their tag links and congratulations.
#[async_trait]
pub trait BirthdayRepository: Send + Sync {
    async fn count(&self) -> Result<u64, ServiceError>;
    /// Ordered by id ascending.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<BirthdayView>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<BirthdayView>, ServiceError>;

    /// Ids from `tag_ids` that do not exist.
    async fn missing_tags(&self, tag_ids: &[i32]) -> Result<Vec<i32>, ServiceError>;
    async fn person_exists(&self, first_name: &str, last_name: &str, birthday: NaiveDate, exclude_id: Option<i32>) -> Result<bool, ServiceError>;

    async fn create(&self, author_id: Uuid, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError>;
    async fn update(&self, id: i32, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError>;
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;

    /// In creation order.
    async fn congratulations(&self, birthday_id: i32) -> Result<Vec<CongratulationView>, ServiceError>;
    async fn add_congratulation(&self, birthday_id: i32, author_id: Uuid, text: &str) -> Result<CongratulationView, ServiceError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use crate::birthday::domain::{AuthorView, TagView};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        users: HashMap<Uuid, AuthorView>,
        tags: BTreeMap<i32, String>,
        birthdays: BTreeMap<i32, (Uuid, BirthdayFields, Vec<i32>)>,
        congratulations: Vec<(i32, i32, Uuid, String)>, // (id, birthday_id, author_id, text)
        next_id: i32,
    }

    impl State {
        fn next_id(&mut self) -> i32 {
            self.next_id += 1;
            self.next_id
        }

        fn author(&self, id: Uuid) -> AuthorView {
            self.users
                .get(&id)
                .cloned()
                .unwrap_or_else(|| AuthorView { id, username: String::new() })
        }

        fn view(&self, id: i32) -> Option<BirthdayView> {
            let (author_id, f, tag_ids) = self.birthdays.get(&id)?;
            Some(BirthdayView {
                id,
                first_name: f.first_name.clone(),
                last_name: f.last_name.clone(),
                birthday: f.birthday,
                image: f.image.clone(),
                author: self.author(*author_id),
                tags: tag_ids
                    .iter()
                    .filter_map(|t| self.tags.get(t).map(|tag| TagView { id: *t, tag: tag.clone() }))
                    .collect(),
            })
        }
    }

    #[derive(Default)]
    pub struct MockBirthdayRepository {
        state: Mutex<State>,
    }

    impl MockBirthdayRepository {
        pub fn add_user(&self, username: &str) -> Uuid {
            let id = Uuid::new_v4();
            let mut st = self.state.lock().unwrap();
            st.users.insert(id, AuthorView { id, username: username.to_string() });
            id
        }

        pub fn add_tag(&self, tag: &str) -> i32 {
            let mut st = self.state.lock().unwrap();
            let id = st.next_id();
            st.tags.insert(id, tag.to_string());
            id
        }
    }

    #[async_trait]
    impl BirthdayRepository for MockBirthdayRepository {
        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.state.lock().unwrap().birthdays.len() as u64)
        }

        async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<BirthdayView>, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(st
                .birthdays
                .keys()
                .skip(offset as usize)
                .take(limit as usize)
                .filter_map(|id| st.view(*id))
                .collect())
        }

        async fn get(&self, id: i32) -> Result<Option<BirthdayView>, ServiceError> {
            Ok(self.state.lock().unwrap().view(id))
        }

        async fn missing_tags(&self, tag_ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(tag_ids.iter().copied().filter(|t| !st.tags.contains_key(t)).collect())
        }

        async fn person_exists(&self, first_name: &str, last_name: &str, birthday: NaiveDate, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(st.birthdays.iter().any(|(id, (_, f, _))| {
                Some(*id) != exclude_id && f.first_name == first_name && f.last_name == last_name && f.birthday == birthday
            }))
        }

        async fn create(&self, author_id: Uuid, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError> {
            models::birthday::validate_fields(&fields)?;
            let mut st = self.state.lock().unwrap();
            let id = st.next_id();
            st.birthdays.insert(id, (author_id, fields, tag_ids.to_vec()));
            st.view(id).ok_or_else(|| ServiceError::not_found("birthday"))
        }

        async fn update(&self, id: i32, fields: BirthdayFields, tag_ids: &[i32]) -> Result<BirthdayView, ServiceError> {
            models::birthday::validate_fields(&fields)?;
            let mut st = self.state.lock().unwrap();
            let entry = st.birthdays.get_mut(&id).ok_or_else(|| ServiceError::not_found("birthday"))?;
            entry.1 = fields;
            entry.2 = tag_ids.to_vec();
            st.view(id).ok_or_else(|| ServiceError::not_found("birthday"))
        }

        async fn delete(&self, id: i32) -> Result<(), ServiceError> {
            let mut st = self.state.lock().unwrap();
            st.birthdays.remove(&id).ok_or_else(|| ServiceError::not_found("birthday"))?;
            st.congratulations.retain(|c| c.1 != id);
            Ok(())
        }

        async fn congratulations(&self, birthday_id: i32) -> Result<Vec<CongratulationView>, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(st
                .congratulations
                .iter()
                .filter(|c| c.1 == birthday_id)
                .map(|(id, b, author, text)| CongratulationView {
                    id: *id,
                    text: text.clone(),
                    birthday_id: *b,
                    author: st.author(*author),
                    created_at: chrono::Utc::now().fixed_offset(),
                })
                .collect())
        }

        async fn add_congratulation(&self, birthday_id: i32, author_id: Uuid, text: &str) -> Result<CongratulationView, ServiceError> {
            let mut st = self.state.lock().unwrap();
            if !st.birthdays.contains_key(&birthday_id) {
                return Err(ServiceError::not_found("birthday"));
            }
            let id = st.next_id();
            st.congratulations.push((id, birthday_id, author_id, text.to_string()));
            Ok(CongratulationView {
                id,
                text: text.to_string(),
                birthday_id,
                author: st.author(author_id),
                created_at: chrono::Utc::now().fixed_offset(),
            })
        }
    }
}
