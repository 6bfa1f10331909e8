//! Storage backends for accounts, settlement, and history.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared::{Amount, GameType};

use crate::domain::{
    GameHistoryEntry, GameSettings, GameStatistics, NewGameRound, NewGameSettings, NewUser, User,
    UserStatus,
};
use crate::errors::Result;

/// Outcome of an applied (or replayed) settlement.
#[derive(Debug, Clone)]
pub struct SettledRound {
    pub balance: Amount,
    pub entry: GameHistoryEntry,
    /// True when an idempotency key matched a previously recorded round
    /// and nothing was re-applied.
    pub replayed: bool,
}

#[async_trait]
pub trait Storage: Send + Sync {
    // Account directory
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self, page: i64, limit: i64) -> Result<(Vec<User>, i64)>;
    async fn update_user_status(
        &self,
        id: i64,
        status: UserStatus,
        ban_reason: Option<String>,
    ) -> Result<User>;

    // Email verification
    /// Single-use: clears the token and marks the email verified on match.
    async fn verify_email(&self, token: &str) -> Result<Option<User>>;
    async fn set_verification_token(&self, id: i64, token: &str) -> Result<User>;

    // Password reset
    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<User>;
    async fn user_by_reset_token(&self, token: &str) -> Result<Option<User>>;
    /// Overwrites the hash and clears any outstanding reset token.
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<User>;

    // Settlement ledger
    /// Atomically apply a verified round: balance += payout - bet, append
    /// the history row. Same-account calls serialize; an idempotency key
    /// that was already recorded replays the stored result instead.
    async fn settle(
        &self,
        user_id: i64,
        round: NewGameRound,
        idempotency_key: Option<Uuid>,
    ) -> Result<SettledRound>;
    /// Rounds for one account, oldest first.
    async fn user_history(&self, user_id: i64) -> Result<Vec<GameHistoryEntry>>;
    async fn game_statistics(&self, game_type: Option<GameType>) -> Result<GameStatistics>;

    // Game settings overlay
    async fn game_settings(&self, game_type: GameType) -> Result<Option<GameSettings>>;
    async fn upsert_game_settings(&self, settings: NewGameSettings) -> Result<GameSettings>;
    async fn list_game_settings(&self) -> Result<Vec<GameSettings>>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> bool;
}
