use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::models::project::ProjectInput;
use crate::database::models::Project;
use crate::database::Repository;
use crate::middleware::{ApiResponse, ApiResult};
use crate::relations::ProjectDetail;

/// GET /api/projects - Plain rows; relations are on the detail route
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    Ok(ApiResponse::success(Repository::<Project>::new(state.pool.clone()).list().await?))
}

/// GET /api/projects/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProjectDetail> {
    Ok(ApiResponse::success(state.details.get_project_with_relations(id).await?))
}

/// POST /api/projects - Scalar fields plus `technology_ids`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> ApiResult<ProjectDetail> {
    let project = state.content.create_project(input).await?;
    Ok(ApiResponse::created(project).with_message("project created"))
}

/// PUT /api/projects/:id - Replaces fields and the technology links
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProjectInput>,
) -> ApiResult<ProjectDetail> {
    let project = state.content.update_project(id, input).await?;
    Ok(ApiResponse::success(project).with_message("project updated"))
}

/// DELETE /api/projects/:id - Also removes its images
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    let (project, _released) = state.content.delete_project(id).await?;
    Ok(ApiResponse::success(project).with_message("project deleted"))
}
