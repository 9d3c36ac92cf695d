//! # Service Error Types
//!
//! Unified error type for workflow operations, plus the serializable
//! [`ApiError`] an outer HTTP layer hands to the web frontend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in QuoteMaker                             │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  ├──► ServiceError ──► ApiError        │
//! │  sqlx::Error ─────► DbError ─────┘         │            { code,        │
//! │                                            │              message }    │
//! │  role check ───────────────────────────────┘                           │
//! │                                                                         │
//! │  ErrorCode          HTTP   Typical cause                               │
//! │  ─────────────────  ────   ─────────────────────────────────────────    │
//! │  NOT_FOUND          404    unknown quote / module                      │
//! │  VALIDATION_ERROR   400    missing event name, unknown module code     │
//! │  FORBIDDEN          403    sales user calling a dev-only operation     │
//! │  CONFLICT           409    bad status move, locked quote, duplicate    │
//! │  DATABASE_ERROR     500    SQLite failure, allocation exhausted        │
//! │  INTERNAL           500    configuration, I/O                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quote_core::{CoreError, UserRole, ValidationError};
use quote_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Errors from workflow operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller's role may not perform the action.
    #[error("Forbidden: {action} is not allowed for role {role}")]
    Forbidden { action: String, role: UserRole },

    /// The caller may not see this quote.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn forbidden(action: impl Into<String>, role: UserRole) -> Self {
        ServiceError::Forbidden {
            action: action.into(),
            role,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Machine-readable category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Forbidden { .. } => ErrorCode::Forbidden,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Validation(_) => ErrorCode::ValidationError,
            ServiceError::Core(e) => core_code(e),
            ServiceError::Db(e) => db_code(e),
            ServiceError::Config(_) | ServiceError::Io(_) => ErrorCode::Internal,
        }
    }
}

fn core_code(err: &CoreError) -> ErrorCode {
    match err {
        CoreError::ModuleNotFound(_)
        | CoreError::DuplicateModule(_)
        | CoreError::InvalidPrice { .. }
        | CoreError::InvalidRate(_)
        | CoreError::AmountOverflow(_)
        | CoreError::Validation(_) => ErrorCode::ValidationError,
        CoreError::InvalidStatusTransition { .. }
        | CoreError::QuoteLocked { .. }
        | CoreError::SequenceExhausted { .. } => ErrorCode::Conflict,
        CoreError::InvalidQuoteNumber { .. } => ErrorCode::Internal,
    }
}

fn db_code(err: &DbError) -> ErrorCode {
    match err {
        DbError::NotFound { .. } => ErrorCode::NotFound,
        DbError::UniqueViolation { .. } => ErrorCode::Conflict,
        DbError::ForeignKeyViolation { .. } => ErrorCode::ValidationError,
        DbError::Core(e) => core_code(e),
        _ => ErrorCode::DatabaseError,
    }
}

/// Result type for workflow operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// Error payload for the web frontend.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "eventName is required"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Role not permitted (403)
    Forbidden,

    /// State conflict (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status an outer layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError => 400,
            ErrorCode::Forbidden => 403,
            ErrorCode::Conflict => 409,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

/// SQLite details are logged, not shown to the user.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = err.code();
        match err {
            ServiceError::Db(DbError::AllocationExhausted { attempts }) => ApiError::new(
                code,
                format!("could not allocate quote number after {} attempts", attempts),
            ),
            ServiceError::Db(ref e) if code == ErrorCode::DatabaseError => {
                tracing::error!(error = %e, "Database operation failed");
                ApiError::new(code, "Database operation failed")
            }
            ServiceError::Config(ref e) => {
                tracing::error!(error = %e, "Configuration error");
                ApiError::new(code, "Service is misconfigured")
            }
            ServiceError::Io(ref e) => {
                tracing::error!(error = %e, "I/O error");
                ApiError::new(code, "Internal error")
            }
            other => ApiError::new(code, other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            ServiceError::forbidden("change quote status", UserRole::Sales).code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            ServiceError::from(ValidationError::required("eventName")).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            ServiceError::from(CoreError::ModuleNotFound("NOPE".into())).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            ServiceError::from(DbError::not_found("Quote", "q1")).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            ServiceError::from(DbError::Core(CoreError::QuoteLocked {
                quote_number: "QT-20250101-001".into(),
                status: "approved".into(),
            }))
            .code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            ServiceError::from(CoreError::AmountOverflow("subtotal".into())).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
    }

    #[test]
    fn test_api_error_hides_sql() {
        let api: ApiError = ServiceError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into())).into();

        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert_eq!(api.message, "Database operation failed");
    }

    #[test]
    fn test_api_error_exhaustion_message() {
        let api: ApiError = ServiceError::from(DbError::AllocationExhausted { attempts: 5 }).into();

        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert_eq!(api.message, "could not allocate quote number after 5 attempts");
    }

    #[test]
    fn test_api_error_serialization() {
        let api = ApiError::new(ErrorCode::ValidationError, "eventName is required");
        let json = serde_json::to_string(&api).unwrap();

        assert_eq!(
            json,
            r#"{"code":"VALIDATION_ERROR","message":"eventName is required"}"#
        );
    }
}
