use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query::Column;
use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub repo_url: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scalar project fields accepted on create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFields {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub repo_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Request body for project writes: scalar fields plus linked technology ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(flatten)]
    pub fields: ProjectFields,
    #[serde(default)]
    pub technology_ids: Vec<i64>,
}

impl Entity for Project {
    type Input = ProjectFields;
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [Column] = &[
        Column::new("title", "text"),
        Column::new("slug", "text"),
        Column::new("summary", "text"),
        Column::new("content", "text"),
        Column::new("url", "text"),
        Column::new("repo_url", "text"),
        Column::new("is_featured", "boolean"),
    ];
    const NAME: &'static str = "project";
    const ORDER_BY: &'static str = "created_at DESC, id";
}
