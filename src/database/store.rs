use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{About, Experience, Technology};
use crate::relations::blog::BLOG_JOIN_SELECT;
use crate::relations::project::PROJECT_JOIN_SELECT;
use crate::relations::{BlogJoinRow, ProjectJoinRow};

/// Reads behind the public profile. Each method is independent of the others.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The featured "about" record, if one is flagged
    async fn featured_about(&self) -> Result<Option<About>, DatabaseError>;

    async fn major_technologies(&self) -> Result<Vec<Technology>, DatabaseError>;

    /// The experience marked as current, most recent first if several are
    async fn current_experience(&self) -> Result<Option<Experience>, DatabaseError>;

    async fn experiences(&self) -> Result<Vec<Experience>, DatabaseError>;
}

/// Denormalized join reads for the detail endpoints
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn project_rows(&self, id: i64) -> Result<Vec<ProjectJoinRow>, DatabaseError>;

    async fn all_project_rows(&self) -> Result<Vec<ProjectJoinRow>, DatabaseError>;

    async fn blog_rows(&self, id: i64) -> Result<Vec<BlogJoinRow>, DatabaseError>;

    async fn all_blog_rows(&self) -> Result<Vec<BlogJoinRow>, DatabaseError>;
}

/// Postgres-backed implementation of the read traits
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn featured_about(&self) -> Result<Option<About>, DatabaseError> {
        let about = sqlx::query_as::<_, About>(
            "SELECT * FROM abouts WHERE is_featured ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(about)
    }

    async fn major_technologies(&self) -> Result<Vec<Technology>, DatabaseError> {
        let technologies = sqlx::query_as::<_, Technology>(
            "SELECT * FROM technologies WHERE is_major ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(technologies)
    }

    async fn current_experience(&self) -> Result<Option<Experience>, DatabaseError> {
        let experience = sqlx::query_as::<_, Experience>(
            "SELECT * FROM experiences WHERE is_current ORDER BY start_date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(experience)
    }

    async fn experiences(&self) -> Result<Vec<Experience>, DatabaseError> {
        let experiences = sqlx::query_as::<_, Experience>(
            "SELECT * FROM experiences ORDER BY start_date DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(experiences)
    }
}

#[async_trait]
impl RelationStore for PgStore {
    async fn project_rows(&self, id: i64) -> Result<Vec<ProjectJoinRow>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $1 ORDER BY t.name, t.id, ci.id", PROJECT_JOIN_SELECT);
        let rows = sqlx::query_as::<_, ProjectJoinRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn all_project_rows(&self) -> Result<Vec<ProjectJoinRow>, DatabaseError> {
        let sql = format!(
            "{} ORDER BY p.created_at DESC, p.id, t.name, t.id, ci.id",
            PROJECT_JOIN_SELECT
        );
        let rows = sqlx::query_as::<_, ProjectJoinRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn blog_rows(&self, id: i64) -> Result<Vec<BlogJoinRow>, DatabaseError> {
        let sql = format!("{} WHERE b.id = $1 ORDER BY tp.name, tp.id, ci.id", BLOG_JOIN_SELECT);
        let rows = sqlx::query_as::<_, BlogJoinRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn all_blog_rows(&self) -> Result<Vec<BlogJoinRow>, DatabaseError> {
        let sql = format!(
            "{} WHERE b.published_at IS NOT NULL \
             ORDER BY b.published_at DESC, b.id, tp.name, tp.id, ci.id",
            BLOG_JOIN_SELECT
        );
        let rows = sqlx::query_as::<_, BlogJoinRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
