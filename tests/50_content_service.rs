mod common;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use portfolio_api::database::models::project::{ProjectFields, ProjectInput};
use portfolio_api::database::models::{NewContentImage, OwnerKind};
use portfolio_api::database::PgStore;
use portfolio_api::services::{ContentService, DetailService};
use portfolio_api::storage::{content_key, BlobStore, LocalBlobStore};
use sqlx::PgPool;

struct Fixture {
    content: ContentService,
    blobs: Arc<LocalBlobStore>,
    dir: PathBuf,
}

impl Fixture {
    fn new(pool: PgPool) -> Self {
        let dir = std::env::temp_dir().join(format!("portfolio-svc-{}", uuid::Uuid::new_v4()));
        let blobs = Arc::new(LocalBlobStore::new(&dir));
        let details = DetailService::new(Arc::new(PgStore::new(pool.clone())));
        Self { content: ContentService::new(pool, details, blobs.clone()), blobs, dir }
    }

    async fn project(&self) -> Result<i64> {
        let input = ProjectInput {
            fields: ProjectFields {
                title: "Fixture".into(),
                slug: common::unique("fixture"),
                summary: None,
                content: None,
                url: None,
                repo_url: None,
                is_featured: false,
            },
            technology_ids: vec![],
        };
        Ok(self.content.create_project(input).await?.project.id)
    }

    fn image(project_id: i64, key: &str) -> NewContentImage {
        NewContentImage {
            owner_kind: OwnerKind::Project,
            owner_id: project_id,
            blob_key: key.to_string(),
            alt: None,
            content_type: "image/png".into(),
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn unique_png() -> Vec<u8> {
    format!("\u{89}PNG{}", uuid::Uuid::new_v4()).into_bytes()
}

#[tokio::test]
async fn deleting_a_project_returns_each_released_key_once() -> Result<()> {
    let Some(pool) = common::database().await? else {
        return Ok(());
    };
    let fx = Fixture::new(pool);
    let id = fx.project().await?;

    let shared = unique_png();
    let shared_key = content_key(&shared, "image/png")?;
    let single = unique_png();
    let single_key = content_key(&single, "image/png")?;

    fx.content.upload_image(Fixture::image(id, &shared_key), &shared).await?;
    fx.content.upload_image(Fixture::image(id, &shared_key), &shared).await?;
    fx.content.upload_image(Fixture::image(id, &single_key), &single).await?;

    let (project, mut released) = fx.content.delete_project(id).await?;
    released.sort();
    let mut expected = vec![shared_key.clone(), single_key.clone()];
    expected.sort();

    assert_eq!(project.id, id);
    assert_eq!(released, expected);
    assert!(fx.blobs.get(&shared_key).await.is_err());
    assert!(fx.blobs.get(&single_key).await.is_err());
    Ok(())
}

#[tokio::test]
async fn a_blob_still_referenced_elsewhere_is_not_released() -> Result<()> {
    let Some(pool) = common::database().await? else {
        return Ok(());
    };
    let fx = Fixture::new(pool);
    let (first, second) = (fx.project().await?, fx.project().await?);

    let bytes = unique_png();
    let key = content_key(&bytes, "image/png")?;
    fx.content.upload_image(Fixture::image(first, &key), &bytes).await?;
    fx.content.upload_image(Fixture::image(second, &key), &bytes).await?;

    let (_, released) = fx.content.delete_project(first).await?;
    assert!(released.is_empty());
    assert_eq!(fx.blobs.get(&key).await?, bytes);

    let (_, released) = fx.content.delete_project(second).await?;
    assert_eq!(released, vec![key]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detach_racing_an_upload_of_the_same_key_keeps_the_blob() -> Result<()> {
    let Some(pool) = common::database().await? else {
        return Ok(());
    };
    let fx = Arc::new(Fixture::new(pool));
    let id = fx.project().await?;

    for _ in 0..20 {
        let bytes = unique_png();
        let key = content_key(&bytes, "image/png")?;
        let old = fx.content.upload_image(Fixture::image(id, &key), &bytes).await?;

        let detach = {
            let fx = fx.clone();
            tokio::spawn(async move { fx.content.detach_image(old.id).await })
        };
        let upload = {
            let (fx, key, bytes) = (fx.clone(), key.clone(), bytes.clone());
            tokio::spawn(async move { fx.content.upload_image(Fixture::image(id, &key), &bytes).await })
        };
        detach.await??;
        upload.await??;

        // The surviving row must still have its file
        assert_eq!(fx.blobs.get(&key).await?, bytes);
    }

    fx.content.delete_project(id).await?;
    Ok(())
}
