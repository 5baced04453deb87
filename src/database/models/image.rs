use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query::Column;
use crate::database::repository::Entity;

/// Which content table an image hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Project,
    Blog,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Project => "project",
            OwnerKind::Blog => "blog",
        }
    }

    /// Table holding the owning rows
    pub fn table(&self) -> &'static str {
        match self {
            OwnerKind::Project => "projects",
            OwnerKind::Blog => "blogs",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentImage {
    pub id: i64,
    pub owner_kind: String,
    pub owner_id: i64,
    pub blob_key: String,
    pub alt: Option<String>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContentImage {
    pub owner_kind: OwnerKind,
    pub owner_id: i64,
    pub blob_key: String,
    pub alt: Option<String>,
    pub content_type: String,
}

impl Entity for ContentImage {
    type Input = NewContentImage;
    const TABLE: &'static str = "content_images";
    const COLUMNS: &'static [Column] = &[
        Column::new("owner_kind", "text"),
        Column::new("owner_id", "bigint"),
        Column::new("blob_key", "text"),
        Column::new("alt", "text"),
        Column::new("content_type", "text"),
    ];
    const NAME: &'static str = "image";
}
