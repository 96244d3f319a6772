use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use models::birthday::{BirthdayFields, IMAGE_MAX_LEN, NAME_MAX_LEN};

use super::domain::BirthdayView;
use crate::forms::{FormErrors, REQUIRED};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw birthday form as submitted. `tags` may repeat in the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedBirthday {
    pub fields: BirthdayFields,
    /// Deduplicated, in submission order.
    pub tag_ids: Vec<i32>,
}

fn max_len_message(max: usize, len: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {len}).")
}

pub fn invalid_choice_message(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

impl BirthdayForm {
    /// Initial data for editing an existing record.
    pub fn from_view(view: &BirthdayView) -> Self {
        Self {
            first_name: view.first_name.clone(),
            last_name: view.last_name.clone(),
            birthday: view.birthday.format(DATE_FORMAT).to_string(),
            tags: view.tags.iter().map(|t| t.id.to_string()).collect(),
            image: view.image.clone().unwrap_or_default(),
        }
    }

    /// Field-level cleaning. Checks that need the database (tag existence,
    /// the unique person constraint) happen in the service.
    pub fn clean(&self) -> Result<CleanedBirthday, FormErrors> {
        let mut errors = FormErrors::default();

        // 只保留第一个单词
        let first_name = self.first_name.split_whitespace().next().unwrap_or("").to_string();
        if first_name.is_empty() {
            errors.add("first_name", REQUIRED);
        } else if first_name.chars().count() > NAME_MAX_LEN {
            errors.add("first_name", max_len_message(NAME_MAX_LEN, first_name.chars().count()));
        }

        let last_name = self.last_name.trim().to_string();
        if last_name.chars().count() > NAME_MAX_LEN {
            errors.add("last_name", max_len_message(NAME_MAX_LEN, last_name.chars().count()));
        }

        let birthday = match self.birthday.trim() {
            "" => {
                errors.add("birthday", REQUIRED);
                None
            }
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("birthday", "Enter a valid date.");
                    None
                }
            },
        };

        let mut tag_ids = Vec::with_capacity(self.tags.len());
        for raw in self.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            match raw.parse::<i32>() {
                Ok(id) if !tag_ids.contains(&id) => tag_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("tags", invalid_choice_message(raw)),
            }
        }

        let image = match self.image.trim() {
            "" => None,
            path if path.chars().count() > IMAGE_MAX_LEN => {
                errors.add("image", max_len_message(IMAGE_MAX_LEN, path.chars().count()));
                None
            }
            path => Some(path.to_string()),
        };

        match birthday {
            Some(birthday) if errors.is_empty() => Ok(CleanedBirthday {
                fields: BirthdayFields { first_name, last_name, birthday, image },
                tag_ids,
            }),
            _ => Err(errors),
        }
    }
}

/// The comment form on the detail page. Only `text` is accepted; author and
/// birthday are never read from the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongratulationForm {
    #[serde(default)]
    pub text: String,
}

impl CongratulationForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let text = self.text.trim();
        let mut errors = FormErrors::default();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result(text.to_string())
    }
}
