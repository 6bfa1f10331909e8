use axum::{extract::State, Json};

use crate::domain::UserResponse;
use crate::errors::{AppError, Result};
use crate::extractors::AuthSession;
use crate::state::AppState;

pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<UserResponse>> {
    let user = state
        .store
        .user_by_id(session.user_id)
        .await?
        .ok_or_else(AppError::unknown_user)?;
    Ok(Json(UserResponse::from(&user)))
}
