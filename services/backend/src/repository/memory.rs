//! In-memory Storage implementation
//!
//! Backs development without a database and the test suites. The single
//! mutex also serializes the settlement read-modify-write, so concurrent
//! rounds for one account can never lose updates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{Amount, GameType, STARTING_BALANCE_CENTS};

use crate::domain::{
    GameHistoryEntry, GameSettings, GameStatistics, NewGameRound, NewGameSettings, NewUser, Role,
    User, UserStatus,
};
use crate::errors::{AppError, Result};

use super::{SettledRound, Storage};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    history: Vec<GameHistoryEntry>,
    settings: HashMap<GameType, GameSettings>,
    settlement_keys: HashMap<(i64, Uuid), (Amount, i64)>,
    next_user_id: i64,
    next_history_id: i64,
    next_settings_id: i64,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_user_id: 1,
                next_history_id: 1,
                next_settings_id: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn overflow(e: shared::MoneyError) -> AppError {
    AppError::Internal(anyhow::anyhow!("balance arithmetic failed: {}", e))
}

#[async_trait]
impl Storage for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut inner = self.inner.lock().await;
        if inner
            .users
            .values()
            .any(|u| u.username == new_user.username)
        {
            return Err(AppError::username_taken());
        }
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::email_taken());
        }

        let id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            balance: Amount::from_cents(STARTING_BALANCE_CENTS),
            email_verified: false,
            verification_token: Some(new_user.verification_token),
            reset_token: None,
            reset_token_expiry: None,
            role: Role::User,
            status: UserStatus::Active,
            ban_reason: None,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: i64, limit: i64) -> Result<(Vec<User>, i64)> {
        let inner = self.inner.lock().await;
        let total = inner.users.len() as i64;
        let offset = (page.max(1) - 1) * limit;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        let page = users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_user_status(
        &self,
        id: i64,
        status: UserStatus,
        ban_reason: Option<String>,
    ) -> Result<User> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        user.status = status;
        user.ban_reason = ban_reason;
        Ok(user.clone())
    }

    async fn verify_email(&self, token: &str) -> Result<Option<User>> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .values_mut()
            .find(|u| u.verification_token.as_deref() == Some(token));
        Ok(user.map(|u| {
            u.email_verified = true;
            u.verification_token = None;
            u.clone()
        }))
    }

    async fn set_verification_token(&self, id: i64, token: &str) -> Result<User> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        user.verification_token = Some(token.to_string());
        Ok(user.clone())
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<User> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        user.reset_token = Some(token.to_string());
        user.reset_token_expiry = Some(expiry);
        Ok(user.clone())
    }

    async fn user_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<User> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expiry = None;
        Ok(user.clone())
    }

    async fn settle(
        &self,
        user_id: i64,
        round: NewGameRound,
        idempotency_key: Option<Uuid>,
    ) -> Result<SettledRound> {
        let mut inner = self.inner.lock().await;

        if let Some(key) = idempotency_key {
            if let Some(&(balance, history_id)) = inner.settlement_keys.get(&(user_id, key)) {
                let entry = inner
                    .history
                    .iter()
                    .find(|e| e.id == history_id)
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Internal(anyhow::anyhow!(
                            "settlement key {} points at missing history row",
                            key
                        ))
                    })?;
                return Ok(SettledRound {
                    balance,
                    entry,
                    replayed: true,
                });
            }
        }

        let id = inner.next_history_id;
        inner.next_history_id += 1;

        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let delta = round.payout.checked_sub(round.bet_amount).map_err(overflow)?;
        let balance = user.balance.checked_add(delta).map_err(overflow)?;
        user.balance = balance;

        let entry = GameHistoryEntry {
            id,
            user_id,
            game_type: round.game_type,
            bet_amount: round.bet_amount,
            multiplier: round.multiplier,
            payout: round.payout,
            timestamp: Utc::now(),
        };
        inner.history.push(entry.clone());
        if let Some(key) = idempotency_key {
            inner.settlement_keys.insert((user_id, key), (balance, id));
        }

        Ok(SettledRound {
            balance,
            entry,
            replayed: false,
        })
    }

    async fn user_history(&self, user_id: i64) -> Result<Vec<GameHistoryEntry>> {
        let inner = self.inner.lock().await;
        // insertion order == timestamp order
        Ok(inner
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn game_statistics(&self, game_type: Option<GameType>) -> Result<GameStatistics> {
        let inner = self.inner.lock().await;
        let rounds: Vec<&GameHistoryEntry> = inner
            .history
            .iter()
            .filter(|e| game_type.map_or(true, |g| e.game_type == g))
            .collect();

        let total_bets = rounds.len() as i64;
        let total_bet_amount = rounds.iter().map(|e| e.bet_amount.as_cents()).sum();
        let total_payout = rounds.iter().map(|e| e.payout.as_cents()).sum();
        let avg_multiplier = if rounds.is_empty() {
            0.0
        } else {
            rounds.iter().map(|e| e.multiplier.to_f64()).sum::<f64>() / rounds.len() as f64
        };

        Ok(GameStatistics {
            total_bets,
            total_bet_amount: Amount::from_cents(total_bet_amount),
            total_payout: Amount::from_cents(total_payout),
            avg_multiplier,
        })
    }

    async fn game_settings(&self, game_type: GameType) -> Result<Option<GameSettings>> {
        let inner = self.inner.lock().await;
        Ok(inner.settings.get(&game_type).cloned())
    }

    async fn upsert_game_settings(&self, settings: NewGameSettings) -> Result<GameSettings> {
        let mut inner = self.inner.lock().await;
        let id = match inner.settings.get(&settings.game_type) {
            Some(existing) => existing.id,
            None => {
                let id = inner.next_settings_id;
                inner.next_settings_id += 1;
                id
            }
        };
        let stored = GameSettings {
            id,
            game_type: settings.game_type,
            rtp: settings.rtp,
            house_edge: settings.house_edge,
            min_bet: settings.min_bet,
            max_bet: settings.max_bet,
            max_payout: settings.max_payout,
            settings: settings.settings,
            updated_at: Utc::now(),
            updated_by: settings.updated_by,
        };
        inner.settings.insert(stored.game_type, stored.clone());
        Ok(stored)
    }

    async fn list_game_settings(&self) -> Result<Vec<GameSettings>> {
        let inner = self.inner.lock().await;
        let mut all: Vec<GameSettings> = inner.settings.values().cloned().collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    async fn ping(&self) -> bool {
        true
    }
}
