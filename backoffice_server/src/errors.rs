use actix_web::{
    error::ResponseError,
    http::{
        header::{ContentType, WWW_AUTHENTICATE},
        StatusCode,
    },
    HttpResponse,
};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
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
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::NoCredentials { .. } => StatusCode::UNAUTHORIZED,
                AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                AuthError::MalformedCredentials(_) => StatusCode::BAD_REQUEST,
                AuthError::CanonicalizationError(_) => StatusCode::BAD_REQUEST,
                AuthError::UnsupportedAlgorithm(_) => StatusCode::BAD_REQUEST,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        builder.insert_header(ContentType::json());
        if let Self::AuthenticationError(
            AuthError::NoCredentials { challenge } | AuthError::Unauthorized { challenge },
        ) = self
        {
            builder.insert_header((WWW_AUTHENTICATE, challenge.as_str()));
        }
        // Server-side failures are logged in full, but the client only ever sees a generic message.
        let message = if status.is_server_error() {
            error!("💥️ {self}");
            "An internal error occurred on the server.".to_string()
        } else {
            self.to_string()
        };
        builder.body(serde_json::json!({ "error": message }).to_string())
    }
}

impl From<backoffice_engine::BackOfficeApiError> for ServerError {
    fn from(e: backoffice_engine::BackOfficeApiError) -> Self {
        use backoffice_engine::BackOfficeApiError::*;
        match e {
            NotFound(s) => Self::NoRecordFound(s),
            AlreadyExists(_) | InvalidInput(_) => Self::InvalidRequestBody(e.to_string()),
            DatabaseError(s) => Self::BackendError(s),
        }
    }
}

/// The authentication and authorization failure taxonomy. Every variant is resolved into a terminal HTTP response at
/// the middleware boundary; none of them ever reach a route handler.
///
/// The `challenge` carried by the 401 variants is the pre-rendered `WWW-Authenticate` header value. It is
/// deliberately excluded from the display string so that all 401 rejections of a given kind have identical bodies.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Credentials are required to access this resource.")]
    NoCredentials { challenge: String },
    #[error("Expected exactly 3 fields in the Authorization header, but found {0}.")]
    MalformedCredentials(usize),
    #[error("The request could not be canonicalized. {0}")]
    CanonicalizationError(String),
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Unknown key id, signature mismatch and disabled accounts are deliberately indistinguishable to the caller.
    #[error("Credentials are invalid for this resource.")]
    Unauthorized { challenge: String },
    #[error("Insufficient permissions.")]
    Forbidden,
}
