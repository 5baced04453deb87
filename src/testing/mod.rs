//! Fixtures and in-memory stores shared by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::Duration;

use crate::database::models::{About, Experience, Technology};
use crate::database::{DatabaseError, ProfileStore, RelationStore};
use crate::relations::{BlogJoinRow, ProjectJoinRow};

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A project join row with optional `(technology_id, name)` and image id
pub fn project_row(id: i64, technology: Option<(i64, &str)>, image_id: Option<i64>) -> ProjectJoinRow {
    ProjectJoinRow {
        id,
        title: format!("Project {id}"),
        slug: format!("project-{id}"),
        summary: None,
        content: Some("Body".into()),
        url: None,
        repo_url: None,
        is_featured: false,
        created_at: timestamp(),
        updated_at: timestamp(),
        statistic_id: None,
        views: None,
        stars: None,
        downloads: None,
        technology_id: technology.map(|(id, _)| id),
        technology_name: technology.map(|(_, name)| name.to_string()),
        technology_icon: None,
        image_id,
        image_key: image_id.map(|id| format!("img-{id}.png")),
        image_alt: None,
        image_content_type: image_id.map(|_| "image/png".to_string()),
    }
}

/// A blog join row with optional `(topic_id, slug)` and image id
pub fn blog_row(id: i64, topic: Option<(i64, &str)>, image_id: Option<i64>) -> BlogJoinRow {
    BlogJoinRow {
        id,
        title: format!("Blog {id}"),
        slug: format!("blog-{id}"),
        summary: None,
        content: "Some words here".into(),
        author_id: None,
        published_at: Some(timestamp()),
        created_at: timestamp(),
        updated_at: timestamp(),
        author_name: None,
        author_avatar_url: None,
        reading_time_id: None,
        reading_minutes: None,
        topic_id: topic.map(|(id, _)| id),
        topic_name: topic.map(|(_, slug)| slug.to_uppercase()),
        topic_slug: topic.map(|(_, slug)| slug.to_string()),
        image_id,
        image_key: image_id.map(|id| format!("img-{id}.png")),
        image_alt: None,
        image_content_type: image_id.map(|_| "image/png".to_string()),
    }
}

pub fn experience(
    id: i64,
    company: &str,
    start: (i32, u32, u32),
    end: Option<(i32, u32, u32)>,
    is_current: bool,
) -> Experience {
    Experience {
        id,
        company: company.to_string(),
        role: "Engineer".into(),
        description: None,
        start_date: date(start),
        end_date: end.map(date),
        is_current,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn technology(id: i64, name: &str) -> Technology {
    Technology {
        id,
        name: name.to_string(),
        icon: None,
        is_major: true,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// Profile store backed by plain fields. `delays` holds one latency per read,
/// in the order about, technologies, current work, experiences.
#[derive(Debug, Clone)]
pub struct FakeProfileStore {
    pub about: Option<About>,
    pub technologies: Vec<Technology>,
    pub current: Option<Experience>,
    pub experiences: Vec<Experience>,
    pub fail_experiences: bool,
    pub delays: [Duration; 4],
}

impl FakeProfileStore {
    pub fn complete() -> Self {
        Self {
            about: Some(About {
                id: 1,
                headline: "Systems engineer".into(),
                bio: "Builds backends.".into(),
                avatar_url: None,
                resume_url: None,
                is_featured: true,
                created_at: timestamp(),
                updated_at: timestamp(),
            }),
            technologies: vec![technology(1, "Go"), technology(2, "Rust")],
            current: Some(experience(3, "Acme", (2023, 2, 1), None, true)),
            experiences: vec![
                experience(3, "Acme", (2023, 2, 1), None, true),
                experience(2, "Initech", (2019, 1, 7), Some((2023, 1, 31)), false),
            ],
            fail_experiences: false,
            delays: [Duration::ZERO; 4],
        }
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn featured_about(&self) -> Result<Option<About>, DatabaseError> {
        tokio::time::sleep(self.delays[0]).await;
        Ok(self.about.clone())
    }

    async fn major_technologies(&self) -> Result<Vec<Technology>, DatabaseError> {
        tokio::time::sleep(self.delays[1]).await;
        Ok(self.technologies.clone())
    }

    async fn current_experience(&self) -> Result<Option<Experience>, DatabaseError> {
        tokio::time::sleep(self.delays[2]).await;
        Ok(self.current.clone())
    }

    async fn experiences(&self) -> Result<Vec<Experience>, DatabaseError> {
        tokio::time::sleep(self.delays[3]).await;
        if self.fail_experiences {
            return Err(DatabaseError::QueryError("experiences unavailable".into()));
        }
        Ok(self.experiences.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeRelationStore {
    pub projects: Vec<ProjectJoinRow>,
    pub blogs: Vec<BlogJoinRow>,
    pub fail: bool,
}

impl FakeRelationStore {
    pub fn with_projects(projects: Vec<ProjectJoinRow>) -> Self {
        Self { projects, ..Default::default() }
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.fail {
            return Err(DatabaseError::QueryError("relation store down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RelationStore for FakeRelationStore {
    async fn project_rows(&self, id: i64) -> Result<Vec<ProjectJoinRow>, DatabaseError> {
        self.check()?;
        Ok(self.projects.iter().filter(|r| r.id == id).cloned().collect())
    }

    async fn all_project_rows(&self) -> Result<Vec<ProjectJoinRow>, DatabaseError> {
        self.check()?;
        Ok(self.projects.clone())
    }

    async fn blog_rows(&self, id: i64) -> Result<Vec<BlogJoinRow>, DatabaseError> {
        self.check()?;
        Ok(self.blogs.iter().filter(|r| r.id == id).cloned().collect())
    }

    async fn all_blog_rows(&self) -> Result<Vec<BlogJoinRow>, DatabaseError> {
        self.check()?;
        Ok(self.blogs.clone())
    }
}
