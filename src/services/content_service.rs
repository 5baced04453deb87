use std::sync::Arc;

use sha2::{Digest, Sha256};
use sqlx::{Connection, PgConnection, PgPool, Postgres, Transaction};

use crate::database::models::blog::BlogInput;
use crate::database::models::project::ProjectInput;
use crate::database::models::{Blog, ContentImage, NewContentImage, OwnerKind, Project, ReadingTime};
use crate::database::{DatabaseError, Repository};
use crate::relations::{BlogDetail, ProjectDetail};
use crate::services::{DetailService, ServiceError};
use crate::storage::BlobStore;

/// Project and blog writes that also maintain link tables and derived rows
#[derive(Clone)]
pub struct ContentService {
    pool: PgPool,
    details: DetailService,
    blobs: Arc<dyn BlobStore>,
}

impl ContentService {
    pub fn new(pool: PgPool, details: DetailService, blobs: Arc<dyn BlobStore>) -> Self {
        Self { pool, details, blobs }
    }

    pub async fn create_project(&self, input: ProjectInput) -> Result<ProjectDetail, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let project = Repository::<Project>::insert_on(&mut *tx, &input.fields).await?;
        replace_links(&mut *tx, LinkTable::ProjectTechnologies, project.id, &input.technology_ids).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(project_id = project.id, "created project");
        self.details.get_project_with_relations(project.id).await
    }

    pub async fn update_project(&self, id: i64, input: ProjectInput) -> Result<ProjectDetail, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        Repository::<Project>::update_on(&mut *tx, id, &input.fields).await?;
        replace_links(&mut *tx, LinkTable::ProjectTechnologies, id, &input.technology_ids).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(project_id = id, "updated project");
        self.details.get_project_with_relations(id).await
    }

    pub async fn create_blog(&self, input: BlogInput) -> Result<BlogDetail, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let blog = Repository::<Blog>::insert_on(&mut *tx, &input.fields).await?;
        replace_links(&mut *tx, LinkTable::BlogTopics, blog.id, &input.topic_ids).await?;
        upsert_reading_time(&mut *tx, blog.id, &blog.content).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(blog_id = blog.id, "created blog");
        self.details.get_blog_with_relations(blog.id).await
    }

    pub async fn update_blog(&self, id: i64, input: BlogInput) -> Result<BlogDetail, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let blog = Repository::<Blog>::update_on(&mut *tx, id, &input.fields).await?;
        replace_links(&mut *tx, LinkTable::BlogTopics, id, &input.topic_ids).await?;
        upsert_reading_time(&mut *tx, id, &blog.content).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(blog_id = id, "updated blog");
        self.details.get_blog_with_relations(id).await
    }

    /// Delete a project with its images; returns the blob keys whose files
    /// were removed because no image row references them any more.
    pub async fn delete_project(&self, id: i64) -> Result<(Project, Vec<String>), ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let keys = delete_owned_images(&mut *tx, OwnerKind::Project, id).await?;
        let project = Repository::<Project>::delete_on(&mut *tx, id).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(project_id = id, images = keys.len(), "deleted project");
        Ok((project, self.release_blobs(keys).await))
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(Blog, Vec<String>), ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let keys = delete_owned_images(&mut *tx, OwnerKind::Blog, id).await?;
        let blog = Repository::<Blog>::delete_on(&mut *tx, id).await?;
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        tracing::info!(blog_id = id, images = keys.len(), "deleted blog");
        Ok((blog, self.release_blobs(keys).await))
    }

    /// Store `bytes` under `image.blob_key` and record it against an existing
    /// project or blog.
    ///
    /// The blob write, the row insert and any cleanup after a failed insert
    /// all happen under the key's advisory lock, the same lock `release_blob`
    /// takes before deciding a blob is unreferenced.
    pub async fn upload_image(&self, image: NewContentImage, bytes: &[u8]) -> Result<ContentImage, ServiceError> {
        let key = image.blob_key.clone();
        let mut lock = self.lock_blob(&key).await?;

        self.blobs.put(&key, bytes).await?;

        // Savepoint, so the lock transaction survives a failed insert
        let mut attach = lock.begin().await.map_err(DatabaseError::Sqlx)?;
        match attach_on(&mut *attach, &image).await {
            Ok(created) => {
                attach.commit().await.map_err(DatabaseError::Sqlx)?;
                lock.commit().await.map_err(DatabaseError::Sqlx)?;
                tracing::info!(
                    image_id = created.id,
                    owner = image.owner_kind.as_str(),
                    owner_id = image.owner_id,
                    "attached image"
                );
                Ok(created)
            }
            Err(e) => {
                attach.rollback().await.map_err(DatabaseError::Sqlx)?;
                if let Err(cleanup) = self.release_if_unreferenced(&mut *lock, &key).await {
                    tracing::warn!(key = %key, "failed to clean up blob after rejected upload: {}", cleanup);
                }
                lock.commit().await.map_err(DatabaseError::Sqlx)?;
                Err(e)
            }
        }
    }

    /// Delete an image row, then its blob if nothing else uses it
    pub async fn detach_image(&self, id: i64) -> Result<ContentImage, ServiceError> {
        let image = Repository::<ContentImage>::new(self.pool.clone()).delete(id).await?;
        self.release_blobs(vec![image.blob_key.clone()]).await;
        Ok(image)
    }

    /// Remove each unreferenced blob; returns the keys actually removed.
    /// A failure only leaves an unreferenced file behind, so it is logged.
    async fn release_blobs(&self, mut keys: Vec<String>) -> Vec<String> {
        keys.sort();
        keys.dedup();

        let mut released = Vec::with_capacity(keys.len());
        for key in keys {
            match self.release_blob(&key).await {
                Ok(true) => released.push(key),
                Ok(false) => tracing::debug!(key = %key, "blob still referenced"),
                Err(e) => tracing::warn!(key = %key, "failed to release blob: {}", e),
            }
        }
        released
    }

    async fn release_blob(&self, key: &str) -> Result<bool, ServiceError> {
        let mut lock = self.lock_blob(key).await?;
        let released = self.release_if_unreferenced(&mut *lock, key).await?;
        lock.commit().await.map_err(DatabaseError::Sqlx)?;
        Ok(released)
    }

    /// Caller must hold the key's lock
    async fn release_if_unreferenced(&self, conn: &mut PgConnection, key: &str) -> Result<bool, ServiceError> {
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM content_images WHERE blob_key = $1)")
                .bind(key)
                .fetch_one(&mut *conn)
                .await
                .map_err(DatabaseError::Sqlx)?;
        if referenced {
            return Ok(false);
        }

        self.blobs.delete(key).await?;
        tracing::debug!(key, "released blob");
        Ok(true)
    }

    /// A transaction holding the advisory lock for `key`; commit or drop it to
    /// release the lock.
    async fn lock_blob(&self, key: &str) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(blob_lock_id(key))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

/// Advisory lock id for a blob key: the first 8 bytes of its SHA-256
fn blob_lock_id(key: &str) -> i64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut id = [0u8; 8];
    id.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(id)
}

async fn attach_on(conn: &mut PgConnection, image: &NewContentImage) -> Result<ContentImage, ServiceError> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", image.owner_kind.table());
    let exists: bool = sqlx::query_scalar(&sql)
        .bind(image.owner_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::Sqlx)?;
    if !exists {
        return Err(ServiceError::not_found(format!("{} {}", image.owner_kind.as_str(), image.owner_id)));
    }

    Ok(Repository::<ContentImage>::insert_on(conn, image).await?)
}

#[derive(Debug, Clone, Copy)]
enum LinkTable {
    ProjectTechnologies,
    BlogTopics,
}

impl LinkTable {
    /// (table, owner column, related column)
    fn parts(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            LinkTable::ProjectTechnologies => ("project_technologies", "project_id", "technology_id"),
            LinkTable::BlogTopics => ("blog_topics", "blog_id", "topic_id"),
        }
    }
}

/// Replace every link of `owner_id` with `related_ids`; duplicates collapse
async fn replace_links(
    conn: &mut PgConnection,
    table: LinkTable,
    owner_id: i64,
    related_ids: &[i64],
) -> Result<(), DatabaseError> {
    let (table, owner, related) = table.parts();

    sqlx::query(&format!("DELETE FROM {} WHERE {} = $1", table, owner))
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

    if related_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(&format!(
        "INSERT INTO {table} ({owner}, {related}) \
         SELECT $1, related_id FROM UNNEST($2::bigint[]) AS related_id \
         ON CONFLICT DO NOTHING"
    ))
    .bind(owner_id)
    .bind(related_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_owned_images(
    conn: &mut PgConnection,
    kind: OwnerKind,
    owner_id: i64,
) -> Result<Vec<String>, DatabaseError> {
    let keys: Vec<String> = sqlx::query_scalar(
        "DELETE FROM content_images WHERE owner_kind = $1 AND owner_id = $2 RETURNING blob_key",
    )
    .bind(kind.as_str())
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(keys)
}

async fn upsert_reading_time(conn: &mut PgConnection, blog_id: i64, content: &str) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO reading_times (blog_id, minutes) VALUES ($1, $2) \
         ON CONFLICT (blog_id) DO UPDATE SET minutes = EXCLUDED.minutes",
    )
    .bind(blog_id)
    .bind(ReadingTime::estimate(content))
    .execute(&mut *conn)
    .await?;
    Ok(())
}
