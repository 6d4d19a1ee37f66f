//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON bodies.
use std::fmt::Display;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
    unauthorized::UnauthorizedError,
};

/// A problem with one field of a submitted form or JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The name of the field as the client sent it, e.g. "amount".
    pub field: &'static str,
    pub message: String,
}

/// Every problem found while validating one request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record a problem with `field`.
    pub fn push(&mut self, field: &'static str, message: impl Display) {
        self.0.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    /// Keep the value of `result`, or record its error against `field`.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(field, error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();

        write!(f, "{}", messages.join(", "))
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request body failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A required field was missing or blank.
    #[error("Required")]
    MissingField,

    /// A string could not be used as an amount of money.
    #[error("{0}")]
    InvalidAmount(String),

    /// An empty string was used as a category name.
    #[error("Category cannot be empty")]
    EmptyCategory,

    /// A category name was longer than the database allows.
    #[error("Category must be at most 100 characters, got {0}")]
    CategoryTooLong(usize),

    /// A budget period tag other than weekly, monthly or yearly.
    #[error("Invalid period \"{0}\", expected one of weekly, monthly or yearly")]
    InvalidPeriod(String),

    /// A chart time range other than all, month or year.
    #[error("Invalid range \"{0}\", expected one of all, month or year")]
    InvalidTimeRange(String),

    /// A transaction type other than income or expense.
    #[error("Invalid type \"{0}\", expected income or expense")]
    InvalidTransactionKind(String),

    /// A date string in a format that is not understood.
    #[error("Invalid date \"{0}\", expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate(String),

    /// The request did not say which user made it.
    #[error("no owner identity in the request")]
    MissingOwner,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The database path was empty after removing quotes and URL schemes.
    #[error("the database path is empty")]
    InvalidDatabasePath,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A request or response body could not be read while logging it.
    #[error("could not read the message body")]
    RequestBodyError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push("body", rejection.body_text());

        Error::Validation(errors)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::MissingOwner => UnauthorizedError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "Please check the form".to_owned(),
                    details: errors.to_string(),
                },
            ),
            Error::MissingOwner => (
                StatusCode::UNAUTHORIZED,
                Alert {
                    message: "Not signed in".to_owned(),
                    details: "Sign in again and retry.".to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not update budget".to_owned(),
                    details: "The budget could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Could not delete budget".to_owned(),
                    details: "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Convert the error into an HTTP response with a JSON body `{"error": "..."}`.
    ///
    /// `action` describes what the handler was doing, e.g. "fetch transactions",
    /// and is only shown for unexpected errors.
    pub fn into_json_response(self, action: &str) -> Response {
        let (status_code, message) = match self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                format!("Validation error: {errors}"),
            ),
            Error::MissingOwner => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                (StatusCode::NOT_FOUND, "Transaction not found".to_owned())
            }
            Error::UpdateMissingBudget | Error::DeleteMissingBudget => {
                (StatusCode::NOT_FOUND, "Budget not found".to_owned())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            error => {
                tracing::error!("Failed to {action}: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to {action}"),
                )
            }
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
