//! Keeps a heatmap up to date while the snapshot changes. A [watcher::SnapshotWatcher] polls the
//! source and a [refresh::RefreshModule] recomputes reports, connected by a channel.

use std::time::Duration;

use anyhow::Result;
use refresh::{RefreshModule, SnapshotProcessor};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;
use watcher::SnapshotWatcher;

use crate::{storage::snapshot::SnapshotSource, utils::clock::Clock};

pub mod event;
pub mod refresh;
pub mod shutdown;
pub mod watcher;

use event::SnapshotEvent;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Only the latest snapshots matter, a slow processor shouldn't let them pile up.
const CHANNEL_CAPACITY: usize = 2;

/// Runs the watch loop until the user interrupts it.
pub async fn start_watch<P: SnapshotProcessor>(
    source: impl SnapshotSource + 'static,
    processor: P,
    poll_interval: Duration,
    clock: impl Clock,
) -> Result<()> {
    let shutdown_token = CancellationToken::new();
    let (sender, receiver) = mpsc::channel::<SnapshotEvent>(CHANNEL_CAPACITY);

    let watcher = create_watcher(sender, source, &shutdown_token, poll_interval, clock);
    let refresher = RefreshModule::new(receiver, processor);

    let (_, watch_result, refresh_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        async {
            let result = watcher.run().await;
            shutdown_token.cancel();
            result
        },
        refresher.run(),
    );

    if let Err(watch_result) = &watch_result {
        error!("Watch module got an error {:?}", watch_result);
    }

    if let Err(refresh_result) = &refresh_result {
        error!("Refresh module got an error {:?}", refresh_result);
    }

    watch_result.and(refresh_result)
}

fn create_watcher(
    sender: mpsc::Sender<SnapshotEvent>,
    source: impl SnapshotSource + 'static,
    shutdown_token: &CancellationToken,
    poll_interval: Duration,
    clock: impl Clock,
) -> SnapshotWatcher {
    SnapshotWatcher::new(
        sender,
        Box::new(source),
        shutdown_token.clone(),
        poll_interval,
        Box::new(clock),
    )
}

#[cfg(test)]
mod watch_tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        activity::entities::ActivityRecord,
        storage::snapshot::MockSnapshotSource,
        utils::{
            clock::{Clock, FixedClock},
            logging::TEST_LOGGING,
        },
        watch::{
            create_watcher,
            event::SnapshotEvent,
            refresh::{RefreshModule, SnapshotProcessor},
        },
    };

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();

    #[derive(Clone, Default)]
    struct CollectingProcessor {
        events: Arc<Mutex<Vec<SnapshotEvent>>>,
    }

    impl SnapshotProcessor for CollectingProcessor {
        async fn process_next(&mut self, event: SnapshotEvent) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        async fn finalize(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn snapshot_a() -> Vec<ActivityRecord> {
        vec![
            ActivityRecord::new(TODAY, 1),
            ActivityRecord::new(TODAY.pred_opt().unwrap(), 2),
        ]
    }

    fn snapshot_b() -> Vec<ActivityRecord> {
        let mut records = snapshot_a();
        records.push(ActivityRecord::new(TODAY, 3));
        records
    }

    /// Moves to the next day once `rollover` has passed since creation.
    struct MidnightClock {
        created: Instant,
        rollover: Duration,
    }

    #[async_trait]
    impl Clock for MidnightClock {
        fn today(&self) -> NaiveDate {
            if self.created.elapsed() >= self.rollover {
                TODAY.succ_opt().unwrap()
            } else {
                TODAY
            }
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    /// Fetches happen at 0s, 1s, ..., 5s. The second fetch fails, the snapshot changes from the
    /// fourth fetch on.
    fn changing_source() -> MockSnapshotSource {
        let calls = AtomicUsize::new(0);
        let mut source = MockSnapshotSource::new();
        source.expect_fetch().returning(move || {
            match calls.fetch_add(1, Ordering::SeqCst) {
                1 => Err(anyhow!("backend unavailable")),
                // Same totals as snapshot_a, only reordered.
                2 => Ok(snapshot_a().into_iter().rev().collect()),
                0 => Ok(snapshot_a()),
                _ => Ok(snapshot_b()),
            }
        });
        source
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_forwards_only_changes() -> Result<()> {
        *TEST_LOGGING;
        let shutdown_token = CancellationToken::new();
        let (sender, receiver) = mpsc::channel::<SnapshotEvent>(10);
        let watcher = create_watcher(
            sender,
            changing_source(),
            &shutdown_token,
            Duration::from_secs(1),
            FixedClock(TODAY),
        );
        let processor = CollectingProcessor::default();
        let refresher = RefreshModule::new(receiver, processor.clone());

        let (_, watch_result, refresh_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(5500)).await;
                shutdown_token.cancel()
            },
            watcher.run(),
            refresher.run(),
        );
        watch_result?;
        refresh_result?;

        let events = processor.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                SnapshotEvent {
                    sequence: 1,
                    evaluation_date: TODAY,
                    records: snapshot_a()
                },
                SnapshotEvent {
                    sequence: 2,
                    evaluation_date: TODAY,
                    records: snapshot_b()
                },
            ]
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn new_day_is_forwarded_without_new_records() -> Result<()> {
        *TEST_LOGGING;
        let mut source = MockSnapshotSource::new();
        source.expect_fetch().returning(|| Ok(snapshot_a()));

        let shutdown_token = CancellationToken::new();
        let (sender, receiver) = mpsc::channel::<SnapshotEvent>(10);
        let watcher = create_watcher(
            sender,
            source,
            &shutdown_token,
            Duration::from_secs(1),
            MidnightClock {
                created: Instant::now(),
                rollover: Duration::from_millis(1500),
            },
        );
        let processor = CollectingProcessor::default();
        let refresher = RefreshModule::new(receiver, processor.clone());

        let (_, watch_result, refresh_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(4500)).await;
                shutdown_token.cancel()
            },
            watcher.run(),
            refresher.run(),
        );
        watch_result?;
        refresh_result?;

        let events = processor.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                SnapshotEvent {
                    sequence: 1,
                    evaluation_date: TODAY,
                    records: snapshot_a()
                },
                SnapshotEvent {
                    sequence: 2,
                    evaluation_date: TODAY.succ_opt().unwrap(),
                    records: snapshot_a()
                },
            ]
        );
        Ok(())
    }
}
