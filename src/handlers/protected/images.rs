//! Image upload and removal for projects and blogs.
//!
//! Uploads are multipart with a required `image` file field and an optional
//! `alt` text field. Bytes go to the blob store under a content-addressed key,
//! then a `content_images` row records the owner. Both steps run under the
//! key's lock in `ContentService::upload_image`.

use axum::extract::{Multipart, Path, State};
use std::collections::HashMap;

use crate::app::AppState;
use crate::database::models::{ContentImage, NewContentImage, OwnerKind};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::relations::project::ImageRef;
use crate::storage::{content_key, StorageError};

struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    alt: Option<String>,
}

/// POST /api/projects/:id/images
pub async fn upload_project_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<ImageRef> {
    upload(state, OwnerKind::Project, id, multipart).await
}

/// POST /api/blogs/:id/images
pub async fn upload_blog_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<ImageRef> {
    upload(state, OwnerKind::Blog, id, multipart).await
}

/// DELETE /api/images/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ContentImage> {
    let image = state.content.detach_image(id).await?;
    Ok(ApiResponse::success(image).with_message("image deleted"))
}

async fn upload(
    state: AppState,
    owner_kind: OwnerKind,
    owner_id: i64,
    multipart: Multipart,
) -> ApiResult<ImageRef> {
    let upload = read_upload(multipart, &state).await?;
    let key = content_key(&upload.bytes, &upload.content_type)?;

    let image = state
        .content
        .upload_image(
            NewContentImage {
                owner_kind,
                owner_id,
                blob_key: key,
                alt: upload.alt,
                content_type: upload.content_type,
            },
            &upload.bytes,
        )
        .await?;

    let image = ImageRef::new(image.id, image.blob_key, image.alt, Some(image.content_type));
    Ok(ApiResponse::created(image).with_message("image uploaded"))
}

async fn read_upload(mut multipart: Multipart, state: &AppState) -> Result<Upload, ApiError> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut alt = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !state.storage.allowed_image_types.iter().any(|t| *t == content_type) {
                    return Err(StorageError::UnsupportedType(content_type).into());
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                if bytes.len() > state.storage.max_upload_bytes {
                    return Err(StorageError::TooLarge {
                        size: bytes.len(),
                        max: state.storage.max_upload_bytes,
                    }
                    .into());
                }
                file = Some((bytes.to_vec(), content_type));
            }
            Some("alt") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid alt text: {}", e)))?;
                let text = text.trim();
                if !text.is_empty() {
                    alt = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let (bytes, content_type) = file.ok_or_else(|| {
        let mut fields = HashMap::new();
        fields.insert("image".to_string(), "This field is required".to_string());
        ApiError::validation_error("Missing image upload", Some(fields))
    })?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded image is empty"));
    }

    Ok(Upload { bytes, content_type, alt })
}
