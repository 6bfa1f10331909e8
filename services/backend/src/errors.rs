use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::{ErrorCategory, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{message}")]
    Validation { code: ErrorCode, message: String },

    #[error("{message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("{message}")]
    Unauthorized { code: ErrorCode, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    ExternalService(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_INVALID_INPUT,
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_MISSING_FIELD,
            message: format!("Missing required field: {}", field),
        }
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_INVALID_AMOUNT,
            message: message.into(),
        }
    }

    pub fn invalid_multiplier(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_INVALID_MULTIPLIER,
            message: message.into(),
        }
    }

    pub fn payout_mismatch(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_PAYOUT_MISMATCH,
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_INVALID_TOKEN,
            message: message.into(),
        }
    }

    pub fn token_expired(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ErrorCode::VALIDATION_TOKEN_EXPIRED,
            message: message.into(),
        }
    }

    pub fn username_taken() -> Self {
        AppError::Conflict {
            code: ErrorCode::CONFLICT_USERNAME_TAKEN,
            message: "Username already taken".to_string(),
        }
    }

    pub fn email_taken() -> Self {
        AppError::Conflict {
            code: ErrorCode::CONFLICT_EMAIL_TAKEN,
            message: "Email already registered".to_string(),
        }
    }

    pub fn no_session() -> Self {
        AppError::Unauthorized {
            code: ErrorCode::UNAUTHORIZED_NO_SESSION,
            message: "Not authenticated".to_string(),
        }
    }

    pub fn bad_credentials() -> Self {
        AppError::Unauthorized {
            code: ErrorCode::UNAUTHORIZED_BAD_CREDENTIALS,
            message: "Invalid credentials".to_string(),
        }
    }

    pub fn unverified_email() -> Self {
        AppError::Unauthorized {
            code: ErrorCode::UNAUTHORIZED_UNVERIFIED_EMAIL,
            message: "Please verify your email first".to_string(),
        }
    }

    pub fn unknown_user() -> Self {
        AppError::Unauthorized {
            code: ErrorCode::UNAUTHORIZED_UNKNOWN_USER,
            message: "User not found".to_string(),
        }
    }

    pub fn mail(message: impl Into<String>) -> Self {
        AppError::ExternalService(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Database(_) => ErrorCategory::Internal,
            AppError::Validation { .. } => ErrorCategory::Validation,
            AppError::Conflict { .. } => ErrorCategory::Conflict,
            AppError::Unauthorized { .. } => ErrorCategory::Unauthorized,
            AppError::NotFound(_) => ErrorCategory::NotFound,
            AppError::ExternalService(_) => ErrorCategory::ExternalService,
            AppError::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::INTERNAL_DATABASE,
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unauthorized { code, .. } => code.clone(),
            AppError::NotFound(_) => ErrorCode::NOT_FOUND_USER,
            AppError::ExternalService(_) => ErrorCode::MAIL_DELIVERY_FAILED,
            AppError::Internal(_) => ErrorCode::INTERNAL_UNEXPECTED,
        }
    }

    /// Message safe to put in the response body. Internal failures get a
    /// generic line; the detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let category = self.category();
        let code = self.code();
        let message = self.public_message();
        let status = StatusCode::from_u16(category.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match category.log_level() {
            "error" => tracing::error!(
                code = code.as_str(),
                category = category.as_str(),
                error = ?self,
                "Request failed"
            ),
            "warn" => tracing::warn!(
                code = code.as_str(),
                category = category.as_str(),
                %message,
                "Request rejected"
            ),
            _ => tracing::info!(
                code = code.as_str(),
                category = category.as_str(),
                %message,
                "Request rejected"
            ),
        }

        metrics::counter!(
            "errors_total",
            "category" => category.as_str(),
            "code" => code.as_str()
        )
        .increment(1);

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
