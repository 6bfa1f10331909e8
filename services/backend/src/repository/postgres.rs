//! Postgres Storage implementation
//!
//! SQL is bound at runtime (no compile-time checked macros) so the crate
//! builds without a live database. Settlement runs in one transaction: a
//! SELECT ... FOR UPDATE on the account row serializes concurrent rounds
//! for the same account while leaving other accounts untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use shared::{Amount, GameType, Multiplier, STARTING_BALANCE_CENTS};

use crate::domain::{
    GameHistoryEntry, GameSettings, GameStatistics, NewGameRound, NewGameSettings, NewUser, User,
    UserStatus,
};
use crate::errors::{AppError, Result};

use super::{SettledRound, Storage};

const USER_COLUMNS: &str = "id, username, email, password_hash, balance, email_verified, \
     verification_token, reset_token, reset_token_expiry, role, status, ban_reason, created_at";

const HISTORY_COLUMNS: &str =
    "id, user_id, game_type, bet_amount, multiplier, payout, created_at";

const SETTINGS_COLUMNS: &str = "id, game_type, rtp, house_edge, min_bet, max_bet, max_payout, \
     settings, updated_at, updated_by";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("migration failed: {}", e)))?;
        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        balance: Amount::from_cents(row.try_get("balance")?),
        email_verified: row.try_get("email_verified")?,
        verification_token: row.try_get("verification_token")?,
        reset_token: row.try_get("reset_token")?,
        reset_token_expiry: row.try_get("reset_token_expiry")?,
        role: role
            .parse()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("{}", e)))?,
        status: status
            .parse()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("{}", e)))?,
        ban_reason: row.try_get("ban_reason")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_history(row: &PgRow) -> Result<GameHistoryEntry> {
    let game_type: String = row.try_get("game_type")?;
    Ok(GameHistoryEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        game_type: game_type
            .parse()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("{}", e)))?,
        bet_amount: Amount::from_cents(row.try_get("bet_amount")?),
        multiplier: Multiplier::from_hundredths(row.try_get("multiplier")?),
        payout: Amount::from_cents(row.try_get("payout")?),
        timestamp: row.try_get("created_at")?,
    })
}

fn row_to_settings(row: &PgRow) -> Result<GameSettings> {
    let game_type: String = row.try_get("game_type")?;
    Ok(GameSettings {
        id: row.try_get("id")?,
        game_type: game_type
            .parse()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("{}", e)))?,
        rtp: row.try_get("rtp")?,
        house_edge: row.try_get("house_edge")?,
        min_bet: Amount::from_cents(row.try_get("min_bet")?),
        max_bet: Amount::from_cents(row.try_get("max_bet")?),
        max_payout: Amount::from_cents(row.try_get("max_payout")?),
        settings: row.try_get("settings")?,
        updated_at: row.try_get("updated_at")?,
        updated_by: row.try_get("updated_by")?,
    })
}

/// Turn unique-constraint violations into the public conflict errors.
fn map_insert_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return match db_error.constraint() {
                Some(name) if name.contains("email") => AppError::email_taken(),
                _ => AppError::username_taken(),
            };
        }
    }
    AppError::Database(error)
}

#[async_trait]
impl Storage for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, balance, verification_token) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(STARTING_BALANCE_CENTS)
            .bind(&new_user.verification_token)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        row_to_user(&row)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn list_users(&self, page: i64, limit: i64) -> Result<(Vec<User>, i64)> {
        let offset = (page.max(1) - 1) * limit;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let users = rows
            .iter()
            .map(row_to_user)
            .collect::<Result<Vec<User>>>()?;

        let count_row = sqlx::query("SELECT COUNT(*)::BIGINT AS total FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.try_get("total")?;
        Ok((users, total))
    }

    async fn update_user_status(
        &self,
        id: i64,
        status: UserStatus,
        ban_reason: Option<String>,
    ) -> Result<User> {
        let sql = format!(
            "UPDATE users SET status = $2, ban_reason = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(ban_reason)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        row_to_user(&row)
    }

    async fn verify_email(&self, token: &str) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET email_verified = TRUE, verification_token = NULL \
             WHERE verification_token = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn set_verification_token(&self, id: i64, token: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET verification_token = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        row_to_user(&row)
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<User> {
        let sql = format!(
            "UPDATE users SET reset_token = $2, reset_token_expiry = $3 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(token)
            .bind(expiry)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        row_to_user(&row)
    }

    async fn user_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1");
        let row = sqlx::query(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, reset_token = NULL, reset_token_expiry = NULL \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        row_to_user(&row)
    }

    async fn settle(
        &self,
        user_id: i64,
        round: NewGameRound,
        idempotency_key: Option<Uuid>,
    ) -> Result<SettledRound> {
        let mut tx = self.pool.begin().await?;

        // Row lock first: same-account settlements serialize here.
        let locked = sqlx::query("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if let Some(key) = idempotency_key {
            let sql = format!(
                "SELECT k.balance_after, h.id, h.user_id, h.game_type, h.bet_amount, \
                 h.multiplier, h.payout, h.created_at \
                 FROM settlement_keys k JOIN game_history h ON h.id = k.history_id \
                 WHERE k.user_id = $1 AND k.key = $2"
            );
            if let Some(row) = sqlx::query(&sql)
                .bind(user_id)
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?
            {
                let entry = row_to_history(&row)?;
                let balance = Amount::from_cents(row.try_get("balance_after")?);
                tx.rollback().await?;
                return Ok(SettledRound {
                    balance,
                    entry,
                    replayed: true,
                });
            }
        }

        let delta = round
            .payout
            .checked_sub(round.bet_amount)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("delta overflow: {}", e)))?;
        let balance = Amount::from_cents(locked.try_get("balance")?)
            .checked_add(delta)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("balance overflow: {}", e)))?;

        sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
            .bind(user_id)
            .bind(balance.as_cents())
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO game_history (user_id, game_type, bet_amount, multiplier, payout) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {HISTORY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(round.game_type.as_str())
            .bind(round.bet_amount.as_cents())
            .bind(round.multiplier.as_hundredths())
            .bind(round.payout.as_cents())
            .fetch_one(&mut *tx)
            .await?;
        let entry = row_to_history(&row)?;

        if let Some(key) = idempotency_key {
            sqlx::query(
                "INSERT INTO settlement_keys (user_id, key, history_id, balance_after) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(key)
            .bind(entry.id)
            .bind(balance.as_cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(SettledRound {
            balance,
            entry,
            replayed: false,
        })
    }

    async fn user_history(&self, user_id: i64) -> Result<Vec<GameHistoryEntry>> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM game_history \
             WHERE user_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_history).collect()
    }

    async fn game_statistics(&self, game_type: Option<GameType>) -> Result<GameStatistics> {
        let base = "SELECT COUNT(*)::BIGINT AS total_bets, \
             COALESCE(SUM(bet_amount), 0)::BIGINT AS total_bet_amount, \
             COALESCE(SUM(payout), 0)::BIGINT AS total_payout, \
             COALESCE(AVG(multiplier), 0)::DOUBLE PRECISION AS avg_multiplier \
             FROM game_history";
        let row = match game_type {
            Some(game) => {
                sqlx::query(&format!("{base} WHERE game_type = $1"))
                    .bind(game.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => sqlx::query(base).fetch_one(&self.pool).await?,
        };
        let avg_hundredths: f64 = row.try_get("avg_multiplier")?;
        Ok(GameStatistics {
            total_bets: row.try_get("total_bets")?,
            total_bet_amount: Amount::from_cents(row.try_get("total_bet_amount")?),
            total_payout: Amount::from_cents(row.try_get("total_payout")?),
            avg_multiplier: avg_hundredths / 100.0,
        })
    }

    async fn game_settings(&self, game_type: GameType) -> Result<Option<GameSettings>> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM game_settings WHERE game_type = $1");
        let row = sqlx::query(&sql)
            .bind(game_type.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_settings).transpose()
    }

    async fn upsert_game_settings(&self, settings: NewGameSettings) -> Result<GameSettings> {
        let sql = format!(
            "INSERT INTO game_settings \
             (game_type, rtp, house_edge, min_bet, max_bet, max_payout, settings, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (game_type) DO UPDATE SET \
             rtp = EXCLUDED.rtp, house_edge = EXCLUDED.house_edge, \
             min_bet = EXCLUDED.min_bet, max_bet = EXCLUDED.max_bet, \
             max_payout = EXCLUDED.max_payout, settings = EXCLUDED.settings, \
             updated_at = NOW(), updated_by = EXCLUDED.updated_by \
             RETURNING {SETTINGS_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(settings.game_type.as_str())
            .bind(settings.rtp)
            .bind(settings.house_edge)
            .bind(settings.min_bet.as_cents())
            .bind(settings.max_bet.as_cents())
            .bind(settings.max_payout.as_cents())
            .bind(&settings.settings)
            .bind(settings.updated_by)
            .fetch_one(&self.pool)
            .await?;
        row_to_settings(&row)
    }

    async fn list_game_settings(&self) -> Result<Vec<GameSettings>> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM game_settings ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_settings).collect()
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
