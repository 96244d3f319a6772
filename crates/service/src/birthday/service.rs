use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::errors::ModelError;

use super::domain::{BirthdayDetail, BirthdayFormContext, BirthdayView, CongratulationView, DeleteContext, ListContext};
use super::forms::{invalid_choice_message, BirthdayForm, CleanedBirthday, CongratulationForm};
use super::repository::BirthdayRepository;
use crate::countdown::calculate_birthday_countdown;
use crate::errors::ServiceError;
use crate::forms::{FormContext, FormErrors, NON_FIELD_ERRORS};
use crate::pagination::{Page, PageNumber, Pagination};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const UNIQUE_PERSON_MESSAGE: &str = "Birthday with this First name, Last name and Birthday already exists.";

/// Birthday business service independent of web framework.
///
/// Every method expects an authenticated requester; the HTTP layer rejects
/// anonymous requests before they get here. Update and delete additionally
/// require the requester to be the record's author.
pub struct BirthdayService<R: BirthdayRepository> {
    repo: Arc<R>,
    page_size: u64,
}

impl<R: BirthdayRepository> BirthdayService<R> {
    pub fn new(repo: Arc<R>, page_size: u64) -> Self {
        Self { repo, page_size: page_size.max(1) }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: PageNumber) -> Result<ListContext, ServiceError> {
        let pagination = Pagination::new(page, self.page_size);
        let count = self.repo.count().await?;
        let number = pagination.resolve(count)?;
        let items = self.repo.fetch_page((number - 1) * pagination.per_page, pagination.per_page).await?;
        Ok(ListContext { page_obj: Page::new(items, number, count, &pagination) })
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<BirthdayDetail, ServiceError> {
        let birthday = self.get(id).await?;
        let congratulations = self.repo.congratulations(id).await?;
        Ok(BirthdayDetail {
            birthday_countdown: calculate_birthday_countdown(birthday.birthday),
            birthday,
            form: FormContext::unbound(CongratulationForm::default()),
            congratulations,
        })
    }

    pub fn create_form(&self) -> BirthdayFormContext {
        BirthdayFormContext { form: FormContext::unbound(BirthdayForm::default()), birthday_countdown: None }
    }

    #[instrument(skip(self, form))]
    pub async fn create(&self, author_id: Uuid, form: &BirthdayForm) -> Result<BirthdayView, ServiceError> {
        let cleaned = self.clean(form, None).await?;
        let created = self
            .repo
            .create(author_id, cleaned.fields, &cleaned.tag_ids)
            .await
            .map_err(unique_violation_to_form)?;
        info!(birthday_id = created.id, author_id = %author_id, "birthday_created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn edit_form(&self, requester: Uuid, id: i32) -> Result<BirthdayFormContext, ServiceError> {
        let existing = self.ensure_author(requester, id).await?;
        Ok(BirthdayFormContext {
            form: FormContext::unbound(BirthdayForm::from_view(&existing)),
            birthday_countdown: Some(calculate_birthday_countdown(existing.birthday)),
        })
    }

    #[instrument(skip(self, form))]
    pub async fn update(&self, requester: Uuid, id: i32, form: &BirthdayForm) -> Result<BirthdayView, ServiceError> {
        self.ensure_author(requester, id).await?;
        let cleaned = self.clean(form, Some(id)).await?;
        let updated = self
            .repo
            .update(id, cleaned.fields, &cleaned.tag_ids)
            .await
            .map_err(unique_violation_to_form)?;
        info!(birthday_id = id, "birthday_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_form(&self, requester: Uuid, id: i32) -> Result<DeleteContext, ServiceError> {
        let object = self.ensure_author(requester, id).await?;
        let form = FormContext::unbound(BirthdayForm::from_view(&object));
        Ok(DeleteContext { object, form })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, requester: Uuid, id: i32) -> Result<(), ServiceError> {
        self.ensure_author(requester, id).await?;
        self.repo.delete(id).await?;
        info!(birthday_id = id, "birthday_deleted");
        Ok(())
    }

    /// Author and birthday come from the arguments only.
    #[instrument(skip(self, form))]
    pub async fn add_congratulation(&self, author_id: Uuid, birthday_id: i32, form: &CongratulationForm) -> Result<CongratulationView, ServiceError> {
        self.get(birthday_id).await?;
        let text = form.clean().map_err(ServiceError::InvalidForm)?;
        let created = self.repo.add_congratulation(birthday_id, author_id, &text).await?;
        info!(congratulation_id = created.id, birthday_id, author_id = %author_id, "congratulation_created");
        Ok(created)
    }

    /// 404 when the birthday is missing, 403 when `requester` is not its author.
    pub async fn ensure_author(&self, requester: Uuid, id: i32) -> Result<BirthdayView, ServiceError> {
        let birthday = self.get(id).await?;
        if birthday.author.id != requester {
            warn!(birthday_id = id, requester = %requester, author_id = %birthday.author.id, "author_check_failed");
            return Err(ServiceError::Forbidden(format!("birthday {id} belongs to another user")));
        }
        Ok(birthday)
    }

    async fn get(&self, id: i32) -> Result<BirthdayView, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("birthday"))
    }

    async fn clean(&self, form: &BirthdayForm, exclude_id: Option<i32>) -> Result<CleanedBirthday, ServiceError> {
        let cleaned = form.clean().map_err(ServiceError::InvalidForm)?;
        let mut errors = FormErrors::default();
        for id in self.repo.missing_tags(&cleaned.tag_ids).await? {
            errors.add("tags", invalid_choice_message(&id.to_string()));
        }
        let f = &cleaned.fields;
        if self.repo.person_exists(&f.first_name, &f.last_name, f.birthday, exclude_id).await? {
            errors.add(NON_FIELD_ERRORS, UNIQUE_PERSON_MESSAGE);
        }
        errors.into_result(cleaned).map_err(ServiceError::InvalidForm)
    }
}

/// A concurrent insert can still hit the unique index after the form check.
fn unique_violation_to_form(e: ServiceError) -> ServiceError {
    match e {
        ServiceError::Model(ModelError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add(NON_FIELD_ERRORS, UNIQUE_PERSON_MESSAGE);
            ServiceError::InvalidForm(errors)
        }
        other => other,
    }
}
