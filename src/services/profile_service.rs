use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::aggregate::Fork;
use crate::database::models::{About, Experience, Technology};
use crate::database::ProfileStore;
use crate::services::ServiceError;

/// Display form for experience dates, e.g. "March 2021"
pub const EXPERIENCE_DATE_FORMAT: &str = "%B %Y";

/// The public profile: every part is required
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub about: About,
    pub technologies: Vec<Technology>,
    pub current_work: Experience,
    pub experiences: Vec<ExperienceView>,
}

/// An experience with its dates rendered for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: Experience,
    pub from: String,
    pub to: Option<String>,
}

impl From<Experience> for ExperienceView {
    fn from(experience: Experience) -> Self {
        let from = experience.start_date.format(EXPERIENCE_DATE_FORMAT).to_string();
        let to = experience
            .end_date
            .map(|d| d.format(EXPERIENCE_DATE_FORMAT).to_string());
        Self { experience, from, to }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetch the four profile parts concurrently. Any failure, including a
    /// missing featured about or current experience, fails the whole profile.
    pub async fn get_profile(&self) -> Result<Profile, ServiceError> {
        let started = Instant::now();

        let store = self.store.clone();
        let about = Fork::spawn("about", async move {
            store
                .featured_about()
                .await?
                .ok_or_else(|| ServiceError::not_found("featured about"))
        });

        let store = self.store.clone();
        let technologies = Fork::spawn("technologies", async move {
            Ok::<_, ServiceError>(store.major_technologies().await?)
        });

        let store = self.store.clone();
        let current_work = Fork::spawn("current_work", async move {
            store
                .current_experience()
                .await?
                .ok_or_else(|| ServiceError::not_found("current work experience"))
        });

        let store = self.store.clone();
        let experiences = Fork::spawn("experiences", async move {
            Ok::<_, ServiceError>(store.experiences().await?)
        });

        let (about, technologies, current_work, experiences) = tokio::try_join!(
            about.join(),
            technologies.join(),
            current_work.join(),
            experiences.join()
        )
        .map_err(|err| {
            tracing::debug!(task = err.task(), "profile aggregation failed: {}", err);
            ServiceError::from(err)
        })?;

        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "profile aggregated");

        Ok(Profile {
            about,
            technologies,
            current_work,
            experiences: experiences.into_iter().map(ExperienceView::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateError;
    use crate::database::DatabaseError;
    use crate::testing::{experience, FakeProfileStore};
    use std::time::Duration;

    #[test]
    fn experience_dates_use_month_and_year() {
        let view = ExperienceView::from(experience(1, "Acme", (2021, 3, 14), Some((2023, 6, 1)), false));
        assert_eq!(view.from, "March 2021");
        assert_eq!(view.to.as_deref(), Some("June 2023"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["from"], "March 2021");
    }

    #[tokio::test(start_paused = true)]
    async fn assembles_the_profile() {
        let service = ProfileService::new(Arc::new(FakeProfileStore::complete()));
        let profile = service.get_profile().await.unwrap();

        assert_eq!(profile.about.headline, "Systems engineer");
        assert_eq!(profile.technologies.len(), 2);
        assert!(profile.current_work.is_current);
        assert_eq!(profile.experiences.len(), 2);
        assert_eq!(profile.experiences[1].from, "January 2019");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_current_work_is_not_found() {
        let mut store = FakeProfileStore::complete();
        store.current = None;
        let service = ProfileService::new(Arc::new(store));

        let err = service.get_profile().await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err:?}");
        match err {
            ServiceError::Aggregation(inner) => assert_eq!(inner.task(), "current_work"),
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_about_is_not_found() {
        let mut store = FakeProfileStore::complete();
        store.about = None;
        let err = ProfileService::new(Arc::new(store)).get_profile().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_is_internal() {
        let mut store = FakeProfileStore::complete();
        store.fail_experiences = true;
        let err = ProfileService::new(Arc::new(store)).get_profile().await.unwrap_err();

        assert!(!err.is_not_found());
        match err {
            ServiceError::Aggregation(inner) => match *inner {
                AggregateError::Failed { task, source: ServiceError::Store(DatabaseError::QueryError(_)) } => {
                    assert_eq!(task, "experiences")
                }
                other => panic!("unexpected aggregation error: {other:?}"),
            },
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn layout_does_not_depend_on_completion_order() {
        let mut current_first = FakeProfileStore::complete();
        current_first.delays = [Duration::from_millis(40), Duration::from_millis(30), Duration::from_millis(1), Duration::from_millis(20)];
        let mut current_last = FakeProfileStore::complete();
        current_last.delays = [Duration::from_millis(1), Duration::from_millis(5), Duration::from_millis(90), Duration::from_millis(10)];

        let a = ProfileService::new(Arc::new(current_first)).get_profile().await.unwrap();
        let b = ProfileService::new(Arc::new(current_last)).get_profile().await.unwrap();

        assert_eq!(a, b);
        assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
    }
}
