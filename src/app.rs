use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, StorageConfig};
use crate::database::models::{About, Author, Experience, Statistic, Technology, Testimonial, Topic, User};
use crate::database::{DatabaseManager, Entity, PgStore, ProfileStore, RelationStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{ContentService, DetailService, ProfileService};
use crate::storage::{BlobStore, LocalBlobStore};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub profiles: ProfileService,
    pub details: DetailService,
    pub content: ContentService,
    pub blobs: Arc<dyn BlobStore>,
    pub storage: Arc<StorageConfig>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    /// Wire the Postgres-backed stores and the local blob store
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let blobs = Arc::new(LocalBlobStore::new(&config.storage.upload_dir));
        Self::with_stores(pool, store.clone(), store, blobs, config)
    }

    /// Wire explicit stores; the pool still backs CRUD and content writes
    pub fn with_stores(
        pool: PgPool,
        profile_store: Arc<dyn ProfileStore>,
        relation_store: Arc<dyn RelationStore>,
        blobs: Arc<dyn BlobStore>,
        config: &AppConfig,
    ) -> Self {
        let details = DetailService::new(relation_store);
        Self {
            content: ContentService::new(pool.clone(), details.clone(), blobs.clone()),
            profiles: ProfileService::new(profile_store),
            details,
            pool,
            blobs,
            storage: Arc::new(config.storage.clone()),
            jwt_secret: Arc::from(config.security.jwt_secret.as_str()),
        }
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let protected = protected_routes(&state)
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    let app = if config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    };

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(public::profile::get))
        .route("/api/public/projects", get(public::projects::list))
        .route("/api/public/projects/:id", get(public::projects::show))
        .route("/api/public/blogs", get(public::blogs::list))
        .route("/api/public/blogs/:id", get(public::blogs::show))
        .route("/api/public/testimonials", get(public::testimonials::list))
        .route("/uploads/:key", get(public::uploads::get))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{blogs, images, projects};

    // Multipart framing adds a little on top of the file itself
    let upload_limit = state.storage.max_upload_bytes + 64 * 1024;

    Router::new()
        .merge(crud_routes::<Technology>("/api/technologies"))
        .merge(crud_routes::<Topic>("/api/topics"))
        .merge(crud_routes::<Author>("/api/authors"))
        .merge(crud_routes::<Testimonial>("/api/testimonials"))
        .merge(crud_routes::<Statistic>("/api/statistics"))
        .merge(crud_routes::<Experience>("/api/experiences"))
        .merge(crud_routes::<About>("/api/abouts"))
        .merge(crud_routes::<User>("/api/users"))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/:id",
            get(projects::show).put(projects::update).delete(projects::delete),
        )
        .route("/api/blogs", get(blogs::list).post(blogs::create))
        .route(
            "/api/blogs/:id",
            get(blogs::show).put(blogs::update).delete(blogs::delete),
        )
        .route("/api/images/:id", delete(images::delete))
        .merge(
            Router::new()
                .route("/api/projects/:id/images", post(images::upload_project_image))
                .route("/api/blogs/:id/images", post(images::upload_blog_image))
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
}

/// list/create on `path`, show/update/delete on `path/:id`
fn crud_routes<T: Entity>(path: &str) -> Router<AppState> {
    use protected::crud;

    Router::new()
        .route(path, get(crud::list::<T>).post(crud::create::<T>))
        .route(
            &format!("{}/:id", path),
            get(crud::show::<T>).put(crud::update::<T>).delete(crud::delete::<T>),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "status": 200,
        "message": "OK",
        "data": {
            "name": "Portfolio API",
            "version": version,
            "endpoints": {
                "profile": "/api/profile (public)",
                "public": "/api/public/{projects,blogs,testimonials}[/:id] (public)",
                "uploads": "/uploads/:key (public)",
                "content": "/api/{projects,blogs,technologies,topics,authors,testimonials,statistics,experiences,abouts,users}[/:id] (protected)",
                "images": "/api/{projects,blogs}/:id/images, /api/images/:id (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "message": "OK",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": 503,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
