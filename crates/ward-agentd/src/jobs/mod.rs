//! Job implementations the executor can run.
//!
//! A [`JobContext`]'s `job_class` is resolved against a registry of
//! factories: extensible like dynamic loading, without any reflection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ward_model::JobContext;

/// Class tag of the built-in job that idles until cancelled.
pub const DUMMY_JOB_CLASS: &str = "ward.job.Dummy";

#[derive(Debug, Error)]
pub enum JobError {
    #[error("unknown job class: {0}")]
    UnknownClass(String),
    #[error("job failed: {0}")]
    Failed(String),
}

/// One runnable job implementation.
#[async_trait]
pub trait Job: Send + Sync {
    /// Run to completion or until `cancel` fires.
    async fn run(&self, ctx: &JobContext, cancel: CancellationToken) -> Result<(), JobError>;
}

pub type JobFactory = Arc<dyn Fn() -> Arc<dyn Job> + Send + Sync>;

/// Maps job class tags to factories.
#[derive(Default)]
pub struct JobRegistry {
    factories: HashMap<String, JobFactory>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in jobs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DUMMY_JOB_CLASS, || Arc::new(DummyJob));
        registry
    }

    pub fn register<F>(&mut self, class: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Job> + Send + Sync + 'static,
    {
        self.factories.insert(class.to_string(), Arc::new(factory));
    }

    /// Instantiate the job for `class`.
    pub fn create(&self, class: &str) -> Result<Arc<dyn Job>, JobError> {
        self.factories
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| JobError::UnknownClass(class.to_string()))
    }

    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }
}

/// Idles until cancelled; stands in for real job logic in tests and demos.
pub struct DummyJob;

#[async_trait]
impl Job for DummyJob {
    async fn run(&self, ctx: &JobContext, cancel: CancellationToken) -> Result<(), JobError> {
        info!(target: "ward_agentd::jobs", job_id = %ctx.job_id, "dummy job running until cancelled");
        cancel.cancelled().await;
        info!(target: "ward_agentd::jobs", job_id = %ctx.job_id, "dummy job cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ward_model::JobId;

    #[test]
    fn builtins_contain_the_dummy_job() {
        let registry = JobRegistry::with_builtins();
        assert!(registry.contains(DUMMY_JOB_CLASS));
        assert!(registry.create(DUMMY_JOB_CLASS).is_ok());
    }

    #[test]
    fn unknown_class_is_an_error() {
        let registry = JobRegistry::with_builtins();
        assert!(matches!(
            registry.create("ward.job.Missing"),
            Err(JobError::UnknownClass(_))
        ));
    }

    #[test]
    fn custom_registration_wins_lookup() {
        struct InstantJob;

        #[async_trait]
        impl Job for InstantJob {
            async fn run(
                &self,
                _ctx: &JobContext,
                _cancel: CancellationToken,
            ) -> Result<(), JobError> {
                Ok(())
            }
        }

        let mut registry = JobRegistry::new();
        registry.register("ward.job.Instant", || Arc::new(InstantJob));
        assert!(registry.create("ward.job.Instant").is_ok());
    }

    #[tokio::test]
    async fn dummy_job_stops_on_cancel() {
        let job = DummyJob;
        let ctx = JobContext::new(DUMMY_JOB_CLASS, JobId::from(1));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        tokio::time::timeout(Duration::from_secs(2), job.run(&ctx, cancel))
            .await
            .expect("job must return once cancelled")
            .unwrap();
    }
}
