use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query::Column;
use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub author_id: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogFields {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub author_id: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Request body for blog writes: scalar fields plus linked topic ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogInput {
    #[serde(flatten)]
    pub fields: BlogFields,
    #[serde(default)]
    pub topic_ids: Vec<i64>,
}

impl Entity for Blog {
    type Input = BlogFields;
    const TABLE: &'static str = "blogs";
    const COLUMNS: &'static [Column] = &[
        Column::new("title", "text"),
        Column::new("slug", "text"),
        Column::new("summary", "text"),
        Column::new("content", "text"),
        Column::new("author_id", "bigint"),
        Column::new("published_at", "timestamptz"),
    ];
    const NAME: &'static str = "blog";
    const ORDER_BY: &'static str = "published_at DESC NULLS LAST, id";
}

/// Estimated reading time, one row per blog, derived from the content on save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReadingTime {
    pub id: i64,
    pub blog_id: i64,
    pub minutes: i32,
}

impl ReadingTime {
    pub const WORDS_PER_MINUTE: usize = 200;

    /// Whole minutes needed to read `content`, never less than one
    pub fn estimate(content: &str) -> i32 {
        let words = content.split_whitespace().count();
        words.div_ceil(Self::WORDS_PER_MINUTE).max(1) as i32
    }
}
