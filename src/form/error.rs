use crate::service::ServiceError;

use super::{field::FieldRef, views::ViewId};

/// Everything that can stop a user action on the page. None of these is
/// fatal; the user corrects the input and tries again.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("{field}:{message}")]
    Validation { field: FieldRef, message: String },

    #[error("{field}: '{value}' is already in the list")]
    DuplicateEntry { field: FieldRef, value: String },

    #[error("Configuration with name '{name}' already exists. Please use another name.")]
    NameConflict { name: String },

    #[error("add at least one project to build")]
    MissingView,

    #[error("project view {} no longer exists", .0.dom_id())]
    UnknownView(ViewId),

    #[error("the page is read-only in this mode")]
    ReadOnly,

    #[error("the form has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl FormError {
    pub fn validation(field: FieldRef, message: impl Into<String>) -> Self {
        FormError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field that should receive focus, if the error points at one.
    pub fn field(&self) -> Option<&FieldRef> {
        match self {
            FormError::Validation { field, .. } | FormError::DuplicateEntry { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}
