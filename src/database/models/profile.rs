use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query::Column;
use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct About {
    pub id: i64,
    pub headline: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutInput {
    pub headline: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl Entity for About {
    type Input = AboutInput;
    const TABLE: &'static str = "abouts";
    const COLUMNS: &'static [Column] = &[
        Column::new("headline", "text"),
        Column::new("bio", "text"),
        Column::new("avatar_url", "text"),
        Column::new("resume_url", "text"),
        Column::new("is_featured", "boolean"),
    ];
    const NAME: &'static str = "about";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceInput {
    pub company: String,
    pub role: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl Entity for Experience {
    type Input = ExperienceInput;
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static [Column] = &[
        Column::new("company", "text"),
        Column::new("role", "text"),
        Column::new("description", "text"),
        Column::new("start_date", "date"),
        Column::new("end_date", "date"),
        Column::new("is_current", "boolean"),
    ];
    const NAME: &'static str = "experience";
    const ORDER_BY: &'static str = "start_date DESC, id";
}
