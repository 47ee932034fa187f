use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::PeriodicJob;
use crate::admission::AdmissionController;
use crate::core::AppConfig;

/// Drops expired rate limit records so clients that never come back
/// don't accumulate in memory.
#[derive(Debug)]
pub struct SweepRateLimits;

#[async_trait]
impl PeriodicJob for SweepRateLimits {
    fn interval(&self) -> Duration {
        // Every 5 minutes
        Duration::from_secs(60 * 5)
    }

    async fn run_job(&self, _config: &AppConfig, admission: &AdmissionController) {
        let removed = admission.sweep(Utc::now());
        let remaining = admission.per_minute().len() + admission.daily().len();
        tracing::info!(
            "Swept {} expired rate limit record(s), {} remaining",
            removed,
            remaining
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::core::ChatLimits;

    #[tokio::test]
    async fn it_sweeps_expired_records() {
        let admission = AdmissionController::new(ChatLimits::default());
        let stale = Utc::now() - TimeDelta::hours(25);
        let _ = admission.check_at("ip-default", "ip", "hi", Vec::<String>::new(), stale);
        assert_eq!(admission.per_minute().len(), 1);

        SweepRateLimits
            .run_job(&AppConfig::default(), &admission)
            .await;

        assert_eq!(admission.per_minute().len(), 0);
        assert_eq!(admission.daily().len(), 0);
    }

    #[test]
    fn it_runs_every_five_minutes() {
        assert_eq!(SweepRateLimits.interval(), Duration::from_secs(300));
    }
}
