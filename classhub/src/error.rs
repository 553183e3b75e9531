//! Error types for backend calls and form submission.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when the backend gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// A failed backend round trip, normalized from whatever the transport reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network failure, unreachable host, or timeout.
    #[error("{0}")]
    Transport(String),

    /// The backend reported the resource as absent (404).
    #[error("{0}")]
    NotFound(String),

    /// The backend rejected the payload (400, 409, 422).
    #[error("{0}")]
    Validation(String),

    /// Anything else.
    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    /// Map a non-2xx status and optional server message to an error kind.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        match status {
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            _ => Self::Unknown(message),
        }
    }

    /// The human-readable message, without the kind.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(m) | Self::NotFound(m) | Self::Validation(m) | Self::Unknown(m) => m,
        }
    }

    /// Short kind label for logs and the CLI.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Unknown(_) => "unknown",
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("Request timed out: {err}"))
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Transport(format!("Could not reach the server: {err}"))
        } else if err.is_decode() {
            Self::Unknown(format!("Unexpected response from the server: {err}"))
        } else if let Some(status) = err.status() {
            Self::from_status(status, None)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// A form field that must be filled before submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    SessionLink,
    Teacher,
    Class,
    Students,
    StartFrom,
    Duration,
}

impl RequiredField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::SessionLink => "session link",
            Self::Teacher => "teacher",
            Self::Class => "class",
            Self::Students => "students",
            Self::StartFrom => "start time",
            Self::Duration => "duration",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why a session form could not be saved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Submit was called while the form was closed.
    #[error("The session form is not open")]
    NotOpen,

    /// Client-side required-field check failed; nothing was sent.
    #[error("Please fill in: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),

    /// The backend rejected the save.
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A type alias for `Result<T, ApiError>`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_kinds() {
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, None).is_not_found());
        assert!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, Some("bad".into()))
                .is_validation()
        );
        assert_eq!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None).kind(),
            "unknown"
        );
    }

    #[test]
    fn test_from_status_falls_back_on_blank_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some("   ".into()));
        assert_eq!(err.message(), FALLBACK_MESSAGE);

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some("title is required".into()));
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_missing_fields_message() {
        let err = FormError::MissingFields(vec![RequiredField::Title, RequiredField::Students]);
        assert_eq!(err.to_string(), "Please fill in: title, students");
    }
}
