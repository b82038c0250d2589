//! Session CRUD and enrollment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::Database;
use crate::models::SessionDto;
use crate::server::error::ApiError;
use crate::server::extract::{parse_id, ValidatedJson};
use crate::server::router::AppState;

/// `GET /api/session`
pub async fn list_sessions<D: Database + 'static>(
    State(state): State<AppState<D>>,
) -> Result<Json<Vec<SessionDto>>, ApiError> {
    let sessions = state.sessions.list().await?;
    Ok(Json(sessions.iter().map(SessionDto::from).collect()))
}

/// `GET /api/session/:id`
pub async fn get_session<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let id = parse_id(&id)?;
    let session = state.sessions.find(id).await?;
    Ok(Json(SessionDto::from(&session)))
}

/// `POST /api/session`
pub async fn create_session<D: Database + 'static>(
    State(state): State<AppState<D>>,
    ValidatedJson(dto): ValidatedJson<SessionDto>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.sessions.create(dto).await?;
    Ok(Json(SessionDto::from(&session)))
}

/// `PUT /api/session/:id`
pub async fn update_session<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<SessionDto>,
) -> Result<Json<SessionDto>, ApiError> {
    let id = parse_id(&id)?;
    let session = state.sessions.update(id, dto).await?;
    Ok(Json(SessionDto::from(&session)))
}

/// `DELETE /api/session/:id`
pub async fn delete_session<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.sessions.delete(id).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/session/:id/participate/:user_id`
pub async fn participate<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (id, user_id) = (parse_id(&id)?, parse_id(&user_id)?);
    state.enrollment.join(id, user_id).await?;
    state.metrics.record_enrollment("join");
    Ok(StatusCode::OK)
}

/// `DELETE /api/session/:id/participate/:user_id`
pub async fn no_longer_participate<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (id, user_id) = (parse_id(&id)?, parse_id(&user_id)?);
    state.enrollment.leave(id, user_id).await?;
    state.metrics.record_enrollment("leave");
    Ok(StatusCode::OK)
}
