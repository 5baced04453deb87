//! Fork-join over independent read tasks.
//!
//! Each task is spawned onto the runtime as soon as it is forked, so all of
//! them make progress in parallel. Joining a set of forks with
//! `tokio::try_join!` yields every value, or the first error observed. A fork
//! that is dropped before it finishes aborts its task, so once one sibling
//! fails the rest are cancelled rather than left running.

use std::future::Future;

use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum AggregateError<E> {
    #[error("aggregation task '{task}' failed: {source}")]
    Failed {
        task: &'static str,
        #[source]
        source: E,
    },

    #[error("aggregation task '{task}' did not complete: {reason}")]
    Aborted { task: &'static str, reason: String },
}

impl<E> AggregateError<E> {
    /// Name of the task that failed
    pub fn task(&self) -> &'static str {
        match self {
            AggregateError::Failed { task, .. } | AggregateError::Aborted { task, .. } => task,
        }
    }

    /// The task's own error, if it returned one
    pub fn source_error(&self) -> Option<&E> {
        match self {
            AggregateError::Failed { source, .. } => Some(source),
            AggregateError::Aborted { .. } => None,
        }
    }

    pub fn into_source(self) -> Option<E> {
        match self {
            AggregateError::Failed { source, .. } => Some(source),
            AggregateError::Aborted { .. } => None,
        }
    }
}

/// A named read operation running on its own task.
#[derive(Debug)]
pub struct Fork<T, E> {
    task: &'static str,
    handle: JoinHandle<Result<T, E>>,
}

impl<T, E> Fork<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Spawn `future` immediately; it runs whether or not the fork is awaited yet.
    pub fn spawn<F>(task: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        tracing::trace!(task, "forking aggregation task");
        Self {
            task,
            handle: tokio::spawn(future),
        }
    }

    /// Wait for the task and tag any failure with its name.
    pub async fn join(mut self) -> Result<T, AggregateError<E>> {
        let task = self.task;
        match (&mut self.handle).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::debug!(task, "aggregation task returned an error");
                Err(AggregateError::Failed { task, source })
            }
            Err(join_error) => {
                tracing::error!(task, "aggregation task did not complete: {}", join_error);
                Err(AggregateError::Aborted {
                    task,
                    reason: join_error.to_string(),
                })
            }
        }
    }
}

impl<T, E> Drop for Fork<T, E> {
    fn drop(&mut self) {
        // No-op when the task has already finished.
        self.handle.abort();
    }
}
