//! Appointment request form.
//!
//! Name and phone are required; e-mail and case description are optional.
//! Accepted requests are logged and acknowledged; nothing is sent or
//! stored. Messages come from the active locale's [`FormText`].

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::knowledge::{FormText, LocaleContent};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Phone,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
        }
    }

    pub fn label(&self, form: &FormText) -> &'static str {
        match self {
            Field::Name => form.name_label,
            Field::Phone => form.phone_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("missing required fields: {}", .0.iter().map(Field::as_str).collect::<Vec<_>>().join(", "))]
    MissingRequired(Vec<Field>),
}

impl AppointmentError {
    /// Message to show the user.
    pub fn user_message(&self, content: &LocaleContent) -> &'static str {
        match self {
            AppointmentError::MissingRequired(_) => content.form.missing_required,
        }
    }
}

/// Acknowledgement for an accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub reference: Uuid,
    pub message: &'static str,
}

/// Validate `request` and acknowledge it in `content`'s language.
pub fn submit(
    request: &AppointmentRequest,
    content: &LocaleContent,
) -> Result<Receipt, AppointmentError> {
    let missing: Vec<Field> = [
        (Field::Name, &request.name),
        (Field::Phone, &request.phone),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(AppointmentError::MissingRequired(missing));
    }

    let reference = Uuid::new_v4();
    info!(
        %reference,
        name = %request.name.trim(),
        has_email = !request.email.trim().is_empty(),
        has_description = !request.description.trim().is_empty(),
        locale = %content.locale,
        "appointment request accepted"
    );

    Ok(Receipt { reference, message: content.form.success })
}
