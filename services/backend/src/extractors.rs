use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use shared::SESSION_COOKIE;

use crate::errors::AppError;
use crate::state::AppState;

/// JSON extractor that pairs serde's typed parsing with validator rules.
///
/// Deserialization failures (unknown fields, wrong types, out-of-range
/// amounts) and field-rule failures both surface as 400 responses with the
/// public {"message": ...} body instead of axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value
            .validate()
            .map_err(|errors| AppError::validation(validation_message(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let detail = rejection.body_text();
    tracing::warn!(%detail, "Request body failed to deserialize");

    if let Some(field) = detail
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
    {
        return AppError::missing_field(field);
    }
    if let Some(reason) = detail
        .split("invalid amount: ")
        .nth(1)
        .and_then(|rest| rest.split(" at line").next())
    {
        return AppError::invalid_amount(format!("Invalid amount: {}", reason));
    }
    if let Some(reason) = detail
        .split("invalid multiplier: ")
        .nth(1)
        .and_then(|rest| rest.split(" at line").next())
    {
        return AppError::invalid_multiplier(format!("Invalid multiplier: {}", reason));
    }
    AppError::validation("Invalid input")
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    for field_errors in errors.field_errors().values() {
        if let Some(message) = field_errors.iter().find_map(|e| e.message.as_ref()) {
            return message.to_string();
        }
    }
    "Invalid input".to_string()
}

/// Resolved session for an authenticated request.
pub struct AuthSession {
    pub user_id: i64,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(session_cookie)
            .ok_or_else(AppError::no_session)?;
        let session = state
            .sessions
            .get(&token)
            .ok_or_else(AppError::no_session)?;
        Ok(AuthSession {
            user_id: session.user_id,
            token,
        })
    }
}

/// Pull the session id out of a Cookie header value.
fn session_cookie(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_parsing() {
        assert_eq!(
            session_cookie("session_id=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            session_cookie("theme=dark; session_id=abc123; lang=en").as_deref(),
            Some("abc123")
        );
        assert_eq!(session_cookie("theme=dark"), None);
        assert_eq!(session_cookie(""), None);
    }
}
