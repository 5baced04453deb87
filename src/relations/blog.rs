use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::database::models::{Blog, ReadingTime};
use crate::relations::flatten::{related_id, FoldRows, JoinRow, RelatedList};
use crate::relations::project::ImageRef;

pub const BLOG_JOIN_SELECT: &str = r#"
SELECT
    b.id, b.title, b.slug, b.summary, b.content, b.author_id, b.published_at,
    b.created_at, b.updated_at,
    a.name AS author_name, a.avatar_url AS author_avatar_url,
    rt.id AS reading_time_id, rt.minutes AS reading_minutes,
    tp.id AS topic_id, tp.name AS topic_name, tp.slug AS topic_slug,
    ci.id AS image_id, ci.blob_key AS image_key, ci.alt AS image_alt,
    ci.content_type AS image_content_type
FROM blogs b
LEFT JOIN authors a ON a.id = b.author_id
LEFT JOIN reading_times rt ON rt.blog_id = b.id
LEFT JOIN blog_topics bt ON bt.blog_id = b.id
LEFT JOIN topics tp ON tp.id = bt.topic_id
LEFT JOIN content_images ci ON ci.owner_kind = 'blog' AND ci.owner_id = b.id
"#;

/// One row of the blog LEFT JOIN: a blog with its author and reading time,
/// crossed with one topic and one image occurrence.
#[derive(Debug, Clone, FromRow)]
pub struct BlogJoinRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub author_id: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,

    pub reading_time_id: Option<i64>,
    pub reading_minutes: Option<i32>,

    pub topic_id: Option<i64>,
    pub topic_name: Option<String>,
    pub topic_slug: Option<String>,

    pub image_id: Option<i64>,
    pub image_key: Option<String>,
    pub image_alt: Option<String>,
    pub image_content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub blog: Blog,
    pub author: Option<AuthorRef>,
    pub reading_time: Option<ReadingTime>,
    pub topics: RelatedList<TopicRef>,
    pub images: RelatedList<ImageRef>,
}

impl JoinRow for BlogJoinRow {
    type Key = i64;
    type Aggregate = BlogDetail;

    fn parent_key(&self) -> i64 {
        self.id
    }
}

impl FoldRows<BlogJoinRow> for BlogDetail {
    fn start(row: &BlogJoinRow) -> Self {
        // The author's id lives on the blog row itself; a dangling id with no
        // joined name means the author row is gone.
        let author = related_id(row.author_id).and_then(|id| {
            row.author_name.clone().map(|name| AuthorRef {
                id,
                name,
                avatar_url: row.author_avatar_url.clone(),
            })
        });
        let reading_time = related_id(row.reading_time_id).map(|id| ReadingTime {
            id,
            blog_id: row.id,
            minutes: row.reading_minutes.unwrap_or(1),
        });

        Self {
            blog: Blog {
                id: row.id,
                title: row.title.clone(),
                slug: row.slug.clone(),
                summary: row.summary.clone(),
                content: row.content.clone(),
                author_id: row.author_id,
                published_at: row.published_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            author,
            reading_time,
            topics: RelatedList::new(),
            images: RelatedList::new(),
        }
    }

    fn absorb(&mut self, row: &BlogJoinRow) {
        self.topics.insert_with(row.topic_id, |id| TopicRef {
            id,
            name: row.topic_name.clone().unwrap_or_default(),
            slug: row.topic_slug.clone().unwrap_or_default(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::flatten::{flatten_many, flatten_one};
    use crate::testing::blog_row;

    #[test]
    fn collapses_topics_and_images() {
        let rows = vec![
            blog_row(1, Some((2, "rust")), Some(30)),
            blog_row(1, Some((2, "rust")), Some(31)),
            blog_row(1, Some((4, "async")), Some(30)),
            blog_row(1, Some((4, "async")), Some(31)),
        ];
        let detail = flatten_one(&rows).unwrap();
        let topics: Vec<&str> = detail.topics.as_slice().iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(topics, vec!["rust", "async"]);
        assert_eq!(detail.images.len(), 2);
    }

    #[test]
    fn one_to_one_relations_come_from_first_row() {
        let mut row = blog_row(9, None, None);
        row.author_id = Some(3);
        row.author_name = Some("Ada".into());
        row.reading_time_id = Some(12);
        row.reading_minutes = Some(4);

        let detail = flatten_one(&[row]).unwrap();
        assert_eq!(detail.author.as_ref().map(|a| a.name.as_str()), Some("Ada"));
        assert_eq!(
            detail.reading_time,
            Some(ReadingTime { id: 12, blog_id: 9, minutes: 4 })
        );
    }

    #[test]
    fn absent_author_and_reading_time_are_none() {
        let mut row = blog_row(5, Some((0, "")), None);
        row.author_id = Some(77);
        let detail = flatten_one(&[row]).unwrap();
        assert!(detail.author.is_none());
        assert!(detail.reading_time.is_none());
        assert!(detail.topics.is_empty());
    }

    #[test]
    fn list_mode_groups_blogs() {
        let rows = vec![
            blog_row(2, Some((1, "a")), None),
            blog_row(8, None, None),
            blog_row(2, Some((1, "a")), Some(5)),
        ];
        let flat = flatten_many(&rows);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get(&2).unwrap().topics.len(), 1);
        assert_eq!(flat.get(&2).unwrap().images.len(), 1);
    }
}
