//! User-facing notifications for failed operations.

use serde::Serialize;

use crate::api::ApiError;
use crate::app::AppError;
use crate::session::SessionError;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A transient message shown after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    /// Field-level messages to show next to the inputs.
    pub fields: Vec<(String, String)>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        let fields = error.field_errors();
        if !fields.is_empty() {
            let message = match error {
                AppError::Api(e) => e
                    .backend_message()
                    .unwrap_or("Please correct the highlighted fields")
                    .to_string(),
                _ => "Please correct the highlighted fields".to_string(),
            };
            return Self {
                severity: Severity::Warning,
                message,
                fields,
            };
        }

        if error.is_unauthorized() {
            return Self {
                severity: Severity::Warning,
                message: SESSION_EXPIRED.to_string(),
                fields,
            };
        }

        let message = match error {
            AppError::Api(e) | AppError::Session(SessionError::Api(e)) => api_message(e),
            AppError::Session(SessionError::InvalidCredentials)
            | AppError::ReadOnly(_)
            | AppError::UnknownRoute(_) => error.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        };
        Self::error(message)
    }
}

fn api_message(error: &ApiError) -> String {
    match error {
        ApiError::Forbidden(None) => "You do not have permission to do that.".to_string(),
        ApiError::NotFound(None) => "The requested record no longer exists.".to_string(),
        ApiError::Conflict(None) => {
            "This record was changed by someone else. Reload and try again.".to_string()
        }
        _ => error
            .backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use crate::validation::FormErrors;
    use std::collections::BTreeMap;

    #[test]
    fn test_backend_message_used() {
        let err = AppError::Api(ApiError::Server {
            status: 500,
            message: Some("Database is down".into()),
        });
        assert_eq!(Notification::from_error(&err).message, "Database is down");
    }

    #[test]
    fn test_fallback_message() {
        let err = AppError::Api(ApiError::Server {
            status: 502,
            message: None,
        });
        assert_eq!(Notification::from_error(&err).message, GENERIC_FAILURE);

        let err = AppError::Api(ApiError::Transport(TransportError::Unreachable("x".into())));
        let note = Notification::from_error(&err);
        assert_eq!(note.message, GENERIC_FAILURE);
        assert_eq!(note.severity, Severity::Error);
    }

    #[test]
    fn test_local_validation_fields() {
        let mut errors = FormErrors::new();
        errors.add("last_name", "is required");
        let note = Notification::from_error(&AppError::Validation(errors));
        assert_eq!(note.severity, Severity::Warning);
        assert_eq!(note.fields, vec![("last_name".to_string(), "is required".to_string())]);
    }

    #[test]
    fn test_backend_validation_fields() {
        let err = AppError::Api(ApiError::Validation {
            message: Some("The given data was invalid.".into()),
            fields: BTreeMap::from([("email".to_string(), "taken".to_string())]),
        });
        let note = Notification::from_error(&err);
        assert_eq!(note.message, "The given data was invalid.");
        assert_eq!(note.fields.len(), 1);
    }

    #[test]
    fn test_unauthorized() {
        let note = Notification::from_error(&AppError::Api(ApiError::Unauthorized));
        assert_eq!(note.message, SESSION_EXPIRED);
    }

    #[test]
    fn test_invalid_credentials() {
        let note = Notification::from_error(&AppError::Session(SessionError::InvalidCredentials));
        assert_eq!(note.message, "Invalid email or password");
    }
}
