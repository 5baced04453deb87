use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::storage::{content_type_for_key, validate_key};

/// GET /uploads/:key - Serve a stored image
pub async fn get(State(state): State<AppState>, Path(key): Path<String>) -> Result<impl IntoResponse, ApiError> {
    validate_key(&key)?;
    let bytes = state.blobs.get(&key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for_key(&key)),
            // Keys are content hashes, so the bytes behind one never change
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}
