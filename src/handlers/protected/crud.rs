//! Generic handlers for single-table entities.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::database::{Entity, Repository};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

fn repository<T: Entity>(state: &AppState) -> Repository<T> {
    Repository::new(state.pool.clone())
}

/// GET /api/{entity}
pub async fn list<T: Entity>(State(state): State<AppState>) -> ApiResult<Vec<T>> {
    Ok(ApiResponse::success(repository::<T>(&state).list().await?))
}

/// GET /api/{entity}/:id
pub async fn show<T: Entity>(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<T> {
    Ok(ApiResponse::success(repository::<T>(&state).find_404(id).await?))
}

/// POST /api/{entity}
pub async fn create<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<T::Input>,
) -> ApiResult<T> {
    let created = repository::<T>(&state).insert(&input).await?;
    tracing::info!(entity = T::NAME, editor = user.user_id, "created record");
    Ok(ApiResponse::created(created).with_message(format!("{} created", T::NAME)))
}

/// PUT /api/{entity}/:id
pub async fn update<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<T::Input>,
) -> ApiResult<T> {
    let updated = repository::<T>(&state).update(id, &input).await?;
    tracing::info!(entity = T::NAME, id, editor = user.user_id, "updated record");
    Ok(ApiResponse::success(updated).with_message(format!("{} updated", T::NAME)))
}

/// DELETE /api/{entity}/:id
pub async fn delete<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<T> {
    let deleted = repository::<T>(&state).delete(id).await?;
    tracing::info!(entity = T::NAME, id, editor = user.user_id, "deleted record");
    Ok(ApiResponse::success(deleted).with_message(format!("{} deleted", T::NAME)))
}
