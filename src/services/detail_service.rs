use std::sync::Arc;

use crate::database::RelationStore;
use crate::relations::{flatten_many, flatten_one, BlogDetail, ProjectDetail};
use crate::services::ServiceError;

/// Projects and blogs with their related records folded in
#[derive(Clone)]
pub struct DetailService {
    store: Arc<dyn RelationStore>,
}

impl DetailService {
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self { store }
    }

    pub async fn get_project_with_relations(&self, id: i64) -> Result<ProjectDetail, ServiceError> {
        let rows = self.store.project_rows(id).await?;
        tracing::debug!(project_id = id, rows = rows.len(), "flattening project rows");
        flatten_one(&rows).map_err(|e| ServiceError::from_flatten(e, format!("project {}", id)))
    }

    pub async fn get_blog_with_relations(&self, id: i64) -> Result<BlogDetail, ServiceError> {
        let rows = self.store.blog_rows(id).await?;
        tracing::debug!(blog_id = id, rows = rows.len(), "flattening blog rows");
        flatten_one(&rows).map_err(|e| ServiceError::from_flatten(e, format!("blog {}", id)))
    }

    pub async fn list_projects_with_relations(&self) -> Result<Vec<ProjectDetail>, ServiceError> {
        let rows = self.store.all_project_rows().await?;
        Ok(flatten_many(&rows).into_values().collect())
    }

    pub async fn list_blogs_with_relations(&self) -> Result<Vec<BlogDetail>, ServiceError> {
        let rows = self.store.all_blog_rows().await?;
        Ok(flatten_many(&rows).into_values().collect())
    }
}
