use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Profile;

/// GET /api/profile - About, major technologies, current work and all experiences
pub async fn get(State(state): State<AppState>) -> ApiResult<Profile> {
    let profile = state.profiles.get_profile().await?;
    Ok(ApiResponse::success(profile).with_message("profile retrieved"))
}
