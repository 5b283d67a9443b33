use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use cattle_engine::{ErrorKind, MarketplaceError, UserApiError};
use thiserror::Error;

use crate::blob_store::BlobStoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AccountDisabled => StatusCode::FORBIDDEN,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::SigningError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided. Send it as a bearer token in the Authorization header.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("This account has been disabled.")]
    AccountDisabled,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not sign the access token. {0}")]
    SigningError(String),
    #[error("Could not hash the password. {0}")]
    HashingError(String),
}

impl From<MarketplaceError> for ServerError {
    fn from(e: MarketplaceError) -> Self {
        let msg = e.to_string();
        match e.kind() {
            ErrorKind::NotFound => Self::NoRecordFound(msg),
            ErrorKind::Forbidden => Self::InsufficientPermissions(msg),
            ErrorKind::InvalidState => Self::Conflict(msg),
            ErrorKind::InvalidInput => Self::InvalidRequestBody(msg),
            ErrorKind::Backend => Self::BackendError(msg),
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            UserApiError::AccountDisabled(_) => Self::AuthenticationError(AuthError::AccountDisabled),
            UserApiError::UsernameTaken(_) => Self::Conflict(e.to_string()),
            UserApiError::RoleNotAllowed(_) => Self::InsufficientPermissions(e.to_string()),
            UserApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserApiError::InvalidInput(_) => Self::InvalidRequestBody(e.to_string()),
            UserApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<BlobStoreError> for ServerError {
    fn from(e: BlobStoreError) -> Self {
        match e {
            BlobStoreError::InvalidName(_) => Self::InvalidRequestPath(e.to_string()),
            BlobStoreError::Io(e) => Self::IOError(e),
        }
    }
}
