use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::forms::{BirthdayForm, CongratulationForm};
use crate::forms::FormContext;
use crate::pagination::Page;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: i32,
    pub tag: String,
}

/// A birthday with its author and tags resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub image: Option<String>,
    pub author: AuthorView,
    pub tags: Vec<TagView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CongratulationView {
    pub id: i32,
    pub text: String,
    pub birthday_id: i32,
    pub author: AuthorView,
    pub created_at: DateTime<FixedOffset>,
}

/// `GET /birthday`
#[derive(Debug, Clone, Serialize)]
pub struct ListContext {
    pub page_obj: Page<BirthdayView>,
}

/// `GET /birthday/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct BirthdayDetail {
    pub birthday: BirthdayView,
    pub birthday_countdown: i64,
    pub form: FormContext<CongratulationForm>,
    pub congratulations: Vec<CongratulationView>,
}

/// Create and edit pages. The countdown is only known for an existing record.
#[derive(Debug, Clone, Serialize)]
pub struct BirthdayFormContext {
    pub form: FormContext<BirthdayForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday_countdown: Option<i64>,
}

/// Delete confirmation page.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteContext {
    pub object: BirthdayView,
    pub form: FormContext<BirthdayForm>,
}
