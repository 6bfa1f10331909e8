use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use crate::domain::{GameHistoryEntry, GameResultRequest, GameResultResponse};
use crate::errors::{AppError, Result};
use crate::extractors::{AuthSession, ValidatedJson};
use crate::services::settlement;
use crate::state::AppState;

/// Settle one client-played round against the caller's balance.
pub async fn submit_result(
    State(state): State<AppState>,
    session: AuthSession,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<GameResultRequest>,
) -> Result<Json<GameResultResponse>> {
    let idempotency_key = parse_idempotency_key(&headers)?;

    // A session whose account has vanished reads as unauthenticated.
    let user = state
        .store
        .user_by_id(session.user_id)
        .await?
        .ok_or_else(AppError::unknown_user)?;

    let settled = settlement::settle(state.store.as_ref(), user.id, req, idempotency_key).await?;

    if settled.replayed {
        tracing::info!(
            user_id = user.id,
            history_id = settled.entry.id,
            "Settlement replayed from idempotency key"
        );
    } else {
        tracing::info!(
            user_id = user.id,
            game_type = %settled.entry.game_type,
            bet = %settled.entry.bet_amount,
            balance = %settled.balance,
            history_id = settled.entry.id,
            "Round settled"
        );
        metrics::counter!(
            "settlements_total",
            "game_type" => settled.entry.game_type.as_str()
        )
        .increment(1);
    }

    Ok(Json(GameResultResponse {
        balance: settled.balance,
        history: settled.entry,
    }))
}

/// The caller's settled rounds, oldest first.
pub async fn history(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<GameHistoryEntry>>> {
    let entries = state.store.user_history(session.user_id).await?;
    tracing::debug!(user_id = session.user_id, rounds = entries.len(), "History fetched");
    Ok(Json(entries))
}

fn parse_idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>> {
    let Some(value) = headers.get("idempotency-key") else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|text| Uuid::parse_str(text).ok())
        .map(Some)
        .ok_or_else(|| AppError::validation("Idempotency-Key must be a UUID"))
}
