//! Form plumbing shared by the HTML-style endpoints.
//!
//! A form is a plain `Deserialize` struct holding the raw submitted strings;
//! cleaning turns it into typed values or a [`FormErrors`] map keyed by field
//! name (`__all__` for errors not tied to a single field).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub const NON_FIELD_ERRORS: &str = "__all__";
pub const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for m in messages {
                if !first { f.write_str("; ")?; }
                write!(f, "{field}: {m}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// What a view hands to the template for a form: the submitted (or initial)
/// values plus the errors found while cleaning them.
#[derive(Debug, Clone, Serialize)]
pub struct FormContext<F> {
    pub data: F,
    pub errors: FormErrors,
}

impl<F> FormContext<F> {
    pub fn unbound(data: F) -> Self { Self { data, errors: FormErrors::default() } }

    pub fn with_errors(data: F, errors: FormErrors) -> Self { Self { data, errors } }
}
