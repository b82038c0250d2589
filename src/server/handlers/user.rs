//! User profile lookup and account deletion

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::Database;
use crate::models::UserDto;
use crate::server::error::ApiError;
use crate::server::extract::{parse_id, CurrentUser};
use crate::server::router::AppState;

/// `GET /api/user/:id`
pub async fn get_user<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_id(&id)?;

    match state.database.find_user(id).await {
        Ok(Some(user)) => Ok(Json(UserDto::from(&user))),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// `DELETE /api/user/:id`, allowed only for the account's owner
pub async fn delete_user<D: Database + 'static>(
    State(state): State<AppState<D>>,
    CurrentUser(acting): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.accounts.delete_account(id, &acting).await?;
    Ok(StatusCode::OK)
}
