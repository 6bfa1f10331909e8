/// Shared error taxonomy for the casino service
///
/// Error codes follow the pattern <CATEGORY>_<SPECIFIC>; handlers attach
/// them to log events and the errors_total metric while the HTTP body
/// stays a plain {"message": ...} per the public contract.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error categories that map to HTTP status codes and logging severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Malformed or out-of-range input (400 Bad Request)
    Validation,

    /// Duplicate username/email (400 Bad Request per the public contract)
    Conflict,

    /// Missing session, bad credentials, unverified email (401)
    Unauthorized,

    /// Unknown resource on a direct lookup (404 Not Found)
    NotFound,

    /// Mail delivery and other collaborator failures (500, logged)
    ExternalService,

    /// Unexpected failures, datastore issues, programming errors (500)
    Internal,
}

impl ErrorCategory {
    /// Map error category to HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::Conflict => 400,
            ErrorCategory::Unauthorized => 401,
            ErrorCategory::NotFound => 404,
            ErrorCategory::ExternalService => 500,
            ErrorCategory::Internal => 500,
        }
    }

    /// Map error category to log level.
    pub fn log_level(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "warn",
            ErrorCategory::Conflict => "info",
            ErrorCategory::Unauthorized => "warn",
            ErrorCategory::NotFound => "info",
            ErrorCategory::ExternalService => "error",
            ErrorCategory::Internal => "error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Conflict => "Conflict",
            ErrorCategory::Unauthorized => "Unauthorized",
            ErrorCategory::NotFound => "NotFound",
            ErrorCategory::ExternalService => "ExternalService",
            ErrorCategory::Internal => "Internal",
        }
    }
}

/// Standard error codes used across the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    // Validation errors
    pub const VALIDATION_INVALID_INPUT: ErrorCode = ErrorCode("VALIDATION_INVALID_INPUT");
    pub const VALIDATION_MISSING_FIELD: ErrorCode = ErrorCode("VALIDATION_MISSING_FIELD");
    pub const VALIDATION_INVALID_AMOUNT: ErrorCode = ErrorCode("VALIDATION_INVALID_AMOUNT");
    pub const VALIDATION_INVALID_MULTIPLIER: ErrorCode =
        ErrorCode("VALIDATION_INVALID_MULTIPLIER");
    pub const VALIDATION_PAYOUT_MISMATCH: ErrorCode = ErrorCode("VALIDATION_PAYOUT_MISMATCH");
    pub const VALIDATION_INVALID_TOKEN: ErrorCode = ErrorCode("VALIDATION_INVALID_TOKEN");
    pub const VALIDATION_TOKEN_EXPIRED: ErrorCode = ErrorCode("VALIDATION_TOKEN_EXPIRED");

    // Conflict errors
    pub const CONFLICT_USERNAME_TAKEN: ErrorCode = ErrorCode("CONFLICT_USERNAME_TAKEN");
    pub const CONFLICT_EMAIL_TAKEN: ErrorCode = ErrorCode("CONFLICT_EMAIL_TAKEN");

    // Unauthorized errors
    pub const UNAUTHORIZED_NO_SESSION: ErrorCode = ErrorCode("UNAUTHORIZED_NO_SESSION");
    pub const UNAUTHORIZED_BAD_CREDENTIALS: ErrorCode =
        ErrorCode("UNAUTHORIZED_BAD_CREDENTIALS");
    pub const UNAUTHORIZED_UNVERIFIED_EMAIL: ErrorCode =
        ErrorCode("UNAUTHORIZED_UNVERIFIED_EMAIL");
    pub const UNAUTHORIZED_UNKNOWN_USER: ErrorCode = ErrorCode("UNAUTHORIZED_UNKNOWN_USER");

    // Resource errors
    pub const NOT_FOUND_USER: ErrorCode = ErrorCode("NOT_FOUND_USER");

    // External service errors
    pub const MAIL_DELIVERY_FAILED: ErrorCode = ErrorCode("MAIL_DELIVERY_FAILED");

    // Internal errors
    pub const INTERNAL_UNEXPECTED: ErrorCode = ErrorCode("INTERNAL_UNEXPECTED");
    pub const INTERNAL_DATABASE: ErrorCode = ErrorCode("INTERNAL_DATABASE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
