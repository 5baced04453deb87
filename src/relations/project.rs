use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::database::models::Project;
use crate::relations::flatten::{related_id, FoldRows, JoinRow, RelatedList};

/// Columns selected by the project detail queries
pub const PROJECT_JOIN_SELECT: &str = r#"
SELECT
    p.id, p.title, p.slug, p.summary, p.content, p.url, p.repo_url, p.is_featured,
    p.created_at, p.updated_at,
    s.id AS statistic_id, s.views, s.stars, s.downloads,
    t.id AS technology_id, t.name AS technology_name, t.icon AS technology_icon,
    ci.id AS image_id, ci.blob_key AS image_key, ci.alt AS image_alt,
    ci.content_type AS image_content_type
FROM projects p
LEFT JOIN project_statistics s ON s.project_id = p.id
LEFT JOIN project_technologies pt ON pt.project_id = p.id
LEFT JOIN technologies t ON t.id = pt.technology_id
LEFT JOIN content_images ci ON ci.owner_kind = 'project' AND ci.owner_id = p.id
"#;

/// One row of the project LEFT JOIN: a project crossed with one technology
/// and one image occurrence.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectJoinRow {
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

    pub statistic_id: Option<i64>,
    pub views: Option<i64>,
    pub stars: Option<i64>,
    pub downloads: Option<i64>,

    pub technology_id: Option<i64>,
    pub technology_name: Option<String>,
    pub technology_icon: Option<String>,

    pub image_id: Option<i64>,
    pub image_key: Option<String>,
    pub image_alt: Option<String>,
    pub image_content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticSummary {
    pub id: i64,
    pub views: i64,
    pub stars: i64,
    pub downloads: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyRef {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub id: i64,
    pub key: String,
    pub url: String,
    pub alt: Option<String>,
    pub content_type: Option<String>,
}

impl ImageRef {
    pub fn new(id: i64, key: String, alt: Option<String>, content_type: Option<String>) -> Self {
        Self {
            id,
            url: format!("/uploads/{}", key),
            key,
            alt,
            content_type,
        }
    }
}

/// A project with its statistic, technologies and images
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub statistic: Option<StatisticSummary>,
    pub technologies: RelatedList<TechnologyRef>,
    pub images: RelatedList<ImageRef>,
}

impl JoinRow for ProjectJoinRow {
    type Key = i64;
    type Aggregate = ProjectDetail;

    fn parent_key(&self) -> i64 {
        self.id
    }
}

impl FoldRows<ProjectJoinRow> for ProjectDetail {
    fn start(row: &ProjectJoinRow) -> Self {
        let statistic = related_id(row.statistic_id).map(|id| StatisticSummary {
            id,
            views: row.views.unwrap_or_default(),
            stars: row.stars.unwrap_or_default(),
            downloads: row.downloads.unwrap_or_default(),
        });

        Self {
            project: Project {
                id: row.id,
                title: row.title.clone(),
                slug: row.slug.clone(),
                summary: row.summary.clone(),
                content: row.content.clone(),
                url: row.url.clone(),
                repo_url: row.repo_url.clone(),
                is_featured: row.is_featured,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            statistic,
            technologies: RelatedList::new(),
            images: RelatedList::new(),
        }
    }

    fn absorb(&mut self, row: &ProjectJoinRow) {
        self.technologies.insert_with(row.technology_id, |id| TechnologyRef {
            id,
            name: row.technology_name.clone().unwrap_or_default(),
            icon: row.technology_icon.clone(),
        });
        self.images.insert_with(row.image_id, |id| {
            ImageRef::new(
                id,
                row.image_key.clone().unwrap_or_default(),
                row.image_alt.clone(),
                row.image_content_type.clone(),
            )
        });
    }
}
