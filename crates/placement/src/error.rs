use crate::config::ConfigError;
use crate::credentials::CredentialError;
use crate::domain::ApplicationStatus;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

const LOGIN_PATH: &str = "/login";
const INTERNAL_MESSAGE: &str = "something went wrong, please try again";

/// Failure of a placement operation, as surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("please log in to continue")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("account has been deactivated")]
    AccountDeactivated,
    #[error("you have already applied for this job")]
    AlreadyApplied,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("cannot move application from {from} to {to}")]
    IllegalTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("password hashing failed: {0}")]
    PasswordHashing(String),
    #[error("storage failure")]
    Storage(#[from] StoreError),
}

impl PlacementError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlacementError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlacementError::AlreadyExists(_)
            | PlacementError::AlreadyApplied
            | PlacementError::IllegalTransition { .. } => StatusCode::CONFLICT,
            PlacementError::Unauthenticated => StatusCode::UNAUTHORIZED,
            PlacementError::Forbidden | PlacementError::AccountDeactivated => StatusCode::FORBIDDEN,
            PlacementError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacementError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            PlacementError::PasswordHashing(_) | PlacementError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PlacementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            PlacementError::Storage(source) => {
                tracing::error!(error = %source, "placement operation failed in storage");
                json!({ "error": INTERNAL_MESSAGE })
            }
            PlacementError::PasswordHashing(reason) => {
                tracing::error!(%reason, "password hashing failed");
                json!({ "error": INTERNAL_MESSAGE })
            }
            PlacementError::Unauthenticated | PlacementError::AccountDeactivated => {
                json!({ "error": self.to_string(), "redirect": LOGIN_PATH })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CredentialError> for PlacementError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::Hashing(reason) => Self::PasswordHashing(reason),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Server(axum::Error),
    Account(PlacementError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Account(err) => write!(f, "account error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Account(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PlacementError> for AppError {
    fn from(value: PlacementError) -> Self {
        Self::Account(value)
    }
}
