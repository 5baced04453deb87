use axum::extract::{Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::relations::BlogDetail;

/// GET /api/public/blogs - Published blogs with author, topics and images
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<BlogDetail>> {
    let blogs = state.details.list_blogs_with_relations().await?;
    Ok(ApiResponse::success(blogs))
}

/// GET /api/public/blogs/:id - Drafts are hidden from visitors
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<BlogDetail> {
    let blog = state.details.get_blog_with_relations(id).await?;
    if blog.blog.published_at.is_none() {
        return Err(ApiError::not_found(format!("blog {} not found", id)));
    }
    Ok(ApiResponse::success(blog))
}
