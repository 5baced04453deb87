pub mod content_service;
pub mod detail_service;
pub mod profile_service;

pub use content_service::ContentService;
pub use detail_service::DetailService;
pub use profile_service::{ExperienceView, Profile, ProfileService};

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::database::DatabaseError;
use crate::relations::FlattenError;
use crate::storage::StorageError;

/// Errors surfaced by the profile, detail and content services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// First failure of a fan-out read; boxed since it nests a ServiceError
    #[error(transparent)]
    Aggregation(Box<AggregateError<ServiceError>>),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::NotFound(_) => true,
            ServiceError::Store(e) => e.is_not_found(),
            ServiceError::Storage(_) => false,
            ServiceError::Aggregation(e) => e.source_error().is_some_and(ServiceError::is_not_found),
        }
    }
}

impl From<AggregateError<ServiceError>> for ServiceError {
    fn from(err: AggregateError<ServiceError>) -> Self {
        ServiceError::Aggregation(Box::new(err))
    }
}

impl ServiceError {
    pub(crate) fn from_flatten(err: FlattenError, what: impl Into<String>) -> Self {
        match err {
            FlattenError::NotFound => ServiceError::NotFound(what.into()),
        }
    }
}
