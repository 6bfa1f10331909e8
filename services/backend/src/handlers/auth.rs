use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};

use shared::{RESET_TOKEN_TTL_SECS, SESSION_COOKIE};

use crate::domain::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, NewUser, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, UserResponse,
};
use crate::errors::{AppError, Result};
use crate::extractors::{AuthSession, ValidatedJson};
use crate::services::{mailer, password, tokens};
use crate::state::AppState;

/// Responses for the two anti-enumeration endpoints are identical whether
/// or not the email is registered.
const RESET_SENT_MESSAGE: &str =
    "If your email is registered, you will receive a password reset link";
const VERIFY_SENT_MESSAGE: &str =
    "If your email is registered, you will receive a verification link";

const VERIFICATION_FAILED_PAGE: &str = r#"<html>
  <head><title>Verification Failed</title></head>
  <body>
    <h1>Verification Failed</h1>
    <p>Invalid or expired verification token.</p>
    <a href="/auth">Return to login page</a>
  </body>
</html>"#;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    if state.store.user_by_username(&req.username).await?.is_some() {
        tracing::info!(username = %req.username, "Registration rejected: username taken");
        return Err(AppError::username_taken());
    }
    if state.store.user_by_email(&req.email).await?.is_some() {
        tracing::info!(username = %req.username, "Registration rejected: email taken");
        return Err(AppError::email_taken());
    }

    let password_hash = password::hash_password(&req.password)?;
    let verification_token = tokens::generate_token();

    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            verification_token: verification_token.clone(),
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");
    metrics::counter!("registrations_total").increment(1);

    let message = mailer::verification_message(
        &state.config.mail.from_address,
        &state.config.mail.app_url,
        &user.email,
        &verification_token,
    );
    if let Err(e) = state.mailer.send(message).await {
        // Degraded success: the account exists, the user is told to get help.
        tracing::error!(error = %e, user_id = user.id, "Verification mail failed");
        metrics::counter!("mail_failures_total").increment(1);
        return Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(
                "Registration successful but verification email could not be sent. Please contact support.",
            )),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Registration successful. Please check your email to verify your account.",
        )),
    ))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    match state.store.verify_email(&token).await {
        Ok(Some(user)) => {
            tracing::info!(user_id = user.id, "Email verified");
            (
                StatusCode::FOUND,
                [(header::LOCATION, "/auth?verified=true")],
            )
                .into_response()
        }
        Ok(None) => {
            tracing::warn!("Invalid verification token");
            (StatusCode::BAD_REQUEST, Html(VERIFICATION_FAILED_PAGE)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Response> {
    // Username lookup first, then email.
    let user = match state.store.user_by_username(&req.login).await? {
        Some(user) => Some(user),
        None => state.store.user_by_email(&req.login).await?,
    };
    let Some(user) = user else {
        return Err(AppError::unknown_user());
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::bad_credentials());
    }
    if !user.email_verified {
        return Err(AppError::unverified_email());
    }

    let token = state.sessions.create(user.id);
    tracing::info!(user_id = user.id, "Login successful");
    metrics::counter!("logins_total").increment(1);

    let mut response = Json(UserResponse::from(&user)).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, session_cookie(&token)?);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, session: AuthSession) -> Result<Response> {
    state.sessions.remove(&session.token);
    tracing::info!(user_id = session.user_id, "Logged out");

    let mut response = Json(MessageResponse::new("Logged out")).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_session_cookie()?);
    Ok(response)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let Some(user) = state.store.user_by_email(&req.email).await? else {
        return Ok(Json(MessageResponse::new(RESET_SENT_MESSAGE)));
    };

    let token = tokens::generate_token();
    let expiry = Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS);
    state.store.set_reset_token(user.id, &token, expiry).await?;

    let message = mailer::reset_message(
        &state.config.mail.from_address,
        &state.config.mail.app_url,
        &user.email,
        &token,
    );
    state.mailer.send(message).await.map_err(|e| {
        tracing::error!(error = %e, user_id = user.id, "Reset mail failed");
        AppError::mail("Failed to send reset link")
    })?;

    tracing::info!(user_id = user.id, "Reset token issued");
    Ok(Json(MessageResponse::new(RESET_SENT_MESSAGE)))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>> {
    let Some(user) = state.store.user_by_email(&req.email).await? else {
        return Ok(Json(MessageResponse::new(VERIFY_SENT_MESSAGE)));
    };
    if user.email_verified {
        return Err(AppError::validation("Email is already verified"));
    }

    let token = tokens::generate_token();
    state.store.set_verification_token(user.id, &token).await?;

    let message = mailer::verification_message(
        &state.config.mail.from_address,
        &state.config.mail.app_url,
        &user.email,
        &token,
    );
    state.mailer.send(message).await.map_err(|e| {
        tracing::error!(error = %e, user_id = user.id, "Verification resend failed");
        AppError::mail("Failed to resend verification email")
    })?;

    tracing::info!(user_id = user.id, "Verification token reissued");
    Ok(Json(MessageResponse::new(VERIFY_SENT_MESSAGE)))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let Some(user) = state.store.user_by_reset_token(&token).await? else {
        return Err(AppError::invalid_token("Invalid or expired reset token"));
    };
    match user.reset_token_expiry {
        Some(expiry) if expiry > Utc::now() => {}
        _ => return Err(AppError::token_expired("Reset token has expired")),
    }

    let password_hash = password::hash_password(&req.password)?;
    state.store.update_password(user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "Password reset");
    Ok(Json(MessageResponse::new(
        "Password has been reset successfully",
    )))
}

fn session_cookie(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax",
        SESSION_COOKIE, token
    ))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("cookie header: {}", e)))
}

fn clear_session_cookie() -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("{}=; HttpOnly; Path=/; Max-Age=0", SESSION_COOKIE))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("cookie header: {}", e)))
}
