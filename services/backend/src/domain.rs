use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Amount, GameType, Multiplier};
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Characters counted as "special" by the password policy.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown user status: {0}")]
pub struct UnknownUserStatus(pub String);

/// Account standing; modeled but not enforced in routes, matching the
/// shipped behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Banned => "banned",
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = UnknownUserStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "banned" => Ok(UserStatus::Banned),
            other => Err(UnknownUserStatus(other.to_string())),
        }
    }
}

/// A stored account.
///
/// Deliberately not Serialize: the password hash and tokens must never
/// reach a response body. API responses go through [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub balance: Amount,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub role: Role,
    pub status: UserStatus,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields the account directory supplies when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
}

/// One settled round, append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub game_type: GameType,
    pub bet_amount: Amount,
    pub multiplier: Multiplier,
    pub payout: Amount,
    pub timestamp: DateTime<Utc>,
}

/// A verified round ready for the ledger: the payout has already been
/// recomputed server-side from bet x multiplier.
#[derive(Debug, Clone, Copy)]
pub struct NewGameRound {
    pub game_type: GameType,
    pub bet_amount: Amount,
    pub multiplier: Multiplier,
    pub payout: Amount,
}

/// Admin-configurable per-game overlay.
///
/// Persisted configuration intent only: outcome generation and settlement
/// do not consult it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub id: i64,
    pub game_type: GameType,
    pub rtp: f64,
    pub house_edge: f64,
    pub min_bet: Amount,
    pub max_bet: Amount,
    pub max_payout: Amount,
    pub settings: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: i64,
}

#[derive(Debug, Clone)]
pub struct NewGameSettings {
    pub game_type: GameType,
    pub rtp: f64,
    pub house_edge: f64,
    pub min_bet: Amount,
    pub max_bet: Amount,
    pub max_payout: Amount,
    pub settings: String,
    pub updated_by: i64,
}

/// Aggregate over settled rounds, optionally per game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStatistics {
    pub total_bets: i64,
    pub total_bet_amount: Amount,
    pub total_payout: Amount,
    pub avg_multiplier: f64,
}

// ---------------------------------------------------------------------------
// Request/response contracts
//
// Every request body is a closed, typed schema: unknown fields and mistyped
// values are rejected during deserialization, field rules by validator.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(custom = "validate_username")]
    pub username: String,
    #[validate(
        email(message = "Invalid email address"),
        custom = "validate_email_domain"
    )]
    pub email: String,
    #[validate(custom = "validate_password")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ResendVerificationRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    #[validate(custom = "validate_password")]
    pub password: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameResultRequest {
    pub game_type: GameType,
    pub bet_amount: Amount,
    pub multiplier: Multiplier,
    pub payout: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub balance: Amount,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            balance: user.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResultResponse {
    pub balance: Amount,
    pub history: GameHistoryEntry,
}

fn validation_failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < 3 {
        return Err(validation_failure(
            "username_length",
            "Username must be at least 3 characters",
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(validation_failure(
            "username_charset",
            "Username must contain only letters and numbers, no spaces or special characters",
        ));
    }
    Ok(())
}

fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    if !email.ends_with("@gmail.com") {
        return Err(validation_failure(
            "email_domain",
            "Only Gmail addresses are allowed",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 6 {
        return Err(validation_failure(
            "password_length",
            "Password must be at least 6 characters",
        ));
    }
    let allowed =
        |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    let strong = password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && password.chars().all(allowed);
    if !strong {
        return Err(validation_failure(
            "password_strength",
            "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character (!@#$%^&*)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        let req = register_request("alice", "alice@gmail.com", "Passw0rd!");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_short_username_rejected() {
        let req = register_request("al", "alice@gmail.com", "Passw0rd!");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_username_with_symbols_rejected() {
        let req = register_request("al ice!", "alice@gmail.com", "Passw0rd!");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_gmail_address_rejected() {
        let req = register_request("alice", "alice@yahoo.com", "Passw0rd!");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_password_policy() {
        for weak in ["short", "alllower1!", "ALLUPPER1!", "NoDigits!", "NoSpecial1"] {
            let req = register_request("alice", "alice@gmail.com", weak);
            assert!(req.validate().is_err(), "{} should be rejected", weak);
        }
        let req = register_request("alice", "alice@gmail.com", "G00d#pass");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_password_with_forbidden_characters_rejected() {
        let req = register_request("alice", "alice@gmail.com", "Passw0rd! space");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_game_result_request_rejects_unknown_fields() {
        let body = r#"{"gameType":"dice","betAmount":10,"multiplier":2,"payout":20,"userId":1}"#;
        assert!(serde_json::from_str::<GameResultRequest>(body).is_err());
    }

    #[test]
    fn test_game_result_request_parses_camel_case() {
        let body = r#"{"gameType":"dice","betAmount":10,"multiplier":2.0,"payout":20.0}"#;
        let req: GameResultRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.game_type, shared::GameType::Dice);
        assert_eq!(req.bet_amount.as_cents(), 1_000);
        assert_eq!(req.multiplier.as_hundredths(), 200);
    }
}
