//! Teacher lookups

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::database::Database;
use crate::models::TeacherDto;
use crate::server::error::ApiError;
use crate::server::extract::parse_id;
use crate::server::router::AppState;

/// `GET /api/teacher`
pub async fn list_teachers<D: Database + 'static>(
    State(state): State<AppState<D>>,
) -> Result<Json<Vec<TeacherDto>>, ApiError> {
    let teachers = state
        .database
        .list_teachers()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(teachers.iter().map(TeacherDto::from).collect()))
}

/// `GET /api/teacher/:id`
pub async fn get_teacher<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Json<TeacherDto>, ApiError> {
    let id = parse_id(&id)?;

    match state.database.find_teacher(id).await {
        Ok(Some(teacher)) => Ok(Json(TeacherDto::from(&teacher))),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}
