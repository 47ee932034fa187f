//! Background jobs that run on an interval for the lifetime of the
//! server.

use std::time::Duration;

use async_trait::async_trait;

use crate::admission::AdmissionController;
use crate::core::AppConfig;

mod sweep_rate_limits;

pub use sweep_rate_limits::SweepRateLimits;

#[async_trait]
pub trait PeriodicJob: Send + Sync {
    fn interval(&self) -> Duration;

    async fn run_job(&self, config: &AppConfig, admission: &AdmissionController);
}

/// Run `job` in its own task every `job.interval()`. The first run
/// happens one interval after startup.
pub fn spawn_periodic_job<J>(config: AppConfig, admission: AdmissionController, job: J)
where
    J: PeriodicJob + 'static,
{
    tokio::spawn(async move {
        let period = job.interval();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            job.run_job(&config, &admission).await;
        }
    });
}
