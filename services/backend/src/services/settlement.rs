//! Settlement verification gate
//!
//! The server never trusts a submitted payout. A round settles only when
//! the multiplier can occur under the claimed game's rules and the payout
//! equals the recomputed bet x multiplier to the cent; the storage layer
//! then applies the verified round atomically.

use uuid::Uuid;

use crate::domain::{GameResultRequest, NewGameRound};
use crate::errors::{AppError, Result};
use crate::games;
use crate::repository::{SettledRound, Storage};

/// Validate a submitted round against the game rules and apply it.
pub async fn settle(
    store: &dyn Storage,
    user_id: i64,
    request: GameResultRequest,
    idempotency_key: Option<Uuid>,
) -> Result<SettledRound> {
    let round = verify_round(&request)?;
    store.settle(user_id, round, idempotency_key).await
}

/// Check the bet/multiplier/payout relationship, returning the round with
/// the server-recomputed payout.
pub fn verify_round(request: &GameResultRequest) -> Result<NewGameRound> {
    if !request.bet_amount.is_positive() {
        return Err(AppError::invalid_amount("Bet amount must be positive"));
    }
    if !games::multiplier_is_achievable(request.game_type, request.multiplier) {
        return Err(AppError::invalid_multiplier(format!(
            "Multiplier {} is not possible for {}",
            request.multiplier, request.game_type
        )));
    }
    let payout = request
        .multiplier
        .apply(request.bet_amount)
        .map_err(|e| AppError::invalid_amount(format!("Invalid payout: {}", e)))?;
    if payout != request.payout {
        return Err(AppError::payout_mismatch(format!(
            "Payout {} does not match bet {} at multiplier {}",
            request.payout, request.bet_amount, request.multiplier
        )));
    }
    Ok(NewGameRound {
        game_type: request.game_type,
        bet_amount: request.bet_amount,
        multiplier: request.multiplier,
        payout,
    })
}
