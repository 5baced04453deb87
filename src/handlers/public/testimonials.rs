use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Testimonial;
use crate::database::Repository;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/public/testimonials
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Testimonial>> {
    let testimonials = Repository::<Testimonial>::new(state.pool.clone()).list().await?;
    Ok(ApiResponse::success(testimonials))
}
