use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query::Column;
use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Technology {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    /// Major technologies are listed on the public profile
    pub is_major: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyInput {
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub is_major: bool,
}

impl Entity for Technology {
    type Input = TechnologyInput;
    const TABLE: &'static str = "technologies";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", "text"),
        Column::new("icon", "text"),
        Column::new("is_major", "boolean"),
    ];
    const NAME: &'static str = "technology";
    const ORDER_BY: &'static str = "name";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicInput {
    pub name: String,
    pub slug: String,
}

impl Entity for Topic {
    type Input = TopicInput;
    const TABLE: &'static str = "topics";
    const COLUMNS: &'static [Column] = &[Column::new("name", "text"), Column::new("slug", "text")];
    const NAME: &'static str = "topic";
    const ORDER_BY: &'static str = "name";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl Entity for Author {
    type Input = AuthorInput;
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", "text"),
        Column::new("bio", "text"),
        Column::new("avatar_url", "text"),
    ];
    const NAME: &'static str = "author";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialInput {
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub content: String,
}

impl Entity for Testimonial {
    type Input = TestimonialInput;
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", "text"),
        Column::new("role", "text"),
        Column::new("company", "text"),
        Column::new("content", "text"),
    ];
    const NAME: &'static str = "testimonial";
    const ORDER_BY: &'static str = "created_at DESC, id";
}

/// Per-project counters; at most one row per project
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Statistic {
    pub id: i64,
    pub project_id: i64,
    pub views: i64,
    pub stars: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticInput {
    pub project_id: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub stars: i64,
    #[serde(default)]
    pub downloads: i64,
}

impl Entity for Statistic {
    type Input = StatisticInput;
    const TABLE: &'static str = "project_statistics";
    const COLUMNS: &'static [Column] = &[
        Column::new("project_id", "bigint"),
        Column::new("views", "bigint"),
        Column::new("stars", "bigint"),
        Column::new("downloads", "bigint"),
    ];
    const NAME: &'static str = "statistic";
}
