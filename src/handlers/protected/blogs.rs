use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::models::blog::BlogInput;
use crate::database::models::Blog;
use crate::database::Repository;
use crate::middleware::{ApiResponse, ApiResult};
use crate::relations::BlogDetail;

/// GET /api/blogs - Every blog, drafts included
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Blog>> {
    Ok(ApiResponse::success(Repository::<Blog>::new(state.pool.clone()).list().await?))
}

/// GET /api/blogs/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<BlogDetail> {
    Ok(ApiResponse::success(state.details.get_blog_with_relations(id).await?))
}

/// POST /api/blogs - Scalar fields plus `topic_ids`; reading time is derived
pub async fn create(State(state): State<AppState>, Json(input): Json<BlogInput>) -> ApiResult<BlogDetail> {
    let blog = state.content.create_blog(input).await?;
    Ok(ApiResponse::created(blog).with_message("blog created"))
}

/// PUT /api/blogs/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<BlogInput>,
) -> ApiResult<BlogDetail> {
    let blog = state.content.update_blog(id, input).await?;
    Ok(ApiResponse::success(blog).with_message("blog updated"))
}

/// DELETE /api/blogs/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Blog> {
    let (blog, _released) = state.content.delete_blog(id).await?;
    Ok(ApiResponse::success(blog).with_message("blog deleted"))
}
