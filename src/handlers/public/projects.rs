use axum::extract::{Path, State};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::relations::ProjectDetail;

/// GET /api/public/projects - All projects with technologies, statistic and images
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ProjectDetail>> {
    let projects = state.details.list_projects_with_relations().await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/public/projects/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProjectDetail> {
    let project = state.details.get_project_with_relations(id).await?;
    Ok(ApiResponse::success(project))
}
