use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// The date reports are evaluated against.
    fn today(&self) -> NaiveDate;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

/// Follows the local calendar, so a long running watch rolls over to the next day at midnight.
#[derive(Debug, Clone, Copy)]
pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock stuck on a single date. Used when the user asks for a report as of some other day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

#[async_trait]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
