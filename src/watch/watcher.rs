use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, trace, Instrument};

use crate::{
    activity::entities::{aggregate_days, AggregatedDay},
    storage::snapshot::SnapshotSource,
    utils::clock::Clock,
};

use super::event::SnapshotEvent;

/// Polls a [SnapshotSource] and forwards snapshots that changed. Stands in for a change feed:
/// whatever happened in between, the receiver always gets the whole latest snapshot.
///
/// A new day counts as a change too, the grid end and the streak move with the date even when
/// the records don't.
pub struct SnapshotWatcher {
    next: mpsc::Sender<SnapshotEvent>,
    source: Box<dyn SnapshotSource>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl SnapshotWatcher {
    pub fn new(
        next: mpsc::Sender<SnapshotEvent>,
        source: Box<dyn SnapshotSource>,
        shutdown: CancellationToken,
        poll_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            source,
            shutdown,
            poll_interval,
            time_provider,
        }
    }

    /// Executes the polling loop until shutdown.
    pub async fn run(self) -> Result<()> {
        let mut poll_point = self.time_provider.instant();
        // Snapshots are compared by their day totals, so reordered or split records don't
        // trigger a refresh.
        let mut previous: Option<(NaiveDate, Vec<AggregatedDay>)> = None;
        let mut sequence = 0;
        loop {
            poll_point += self.poll_interval;

            match self.source.fetch().await {
                Ok(records) => {
                    let evaluation_date = self.time_provider.today();
                    let current = (evaluation_date, aggregate_days(&records));
                    if previous.as_ref() == Some(&current) {
                        trace!("Snapshot unchanged");
                    } else {
                        if let Some((previous_date, _)) = &previous {
                            if *previous_date != evaluation_date {
                                info!("Day changed to {evaluation_date}");
                            }
                        }
                        previous = Some(current);
                        sequence += 1;
                        let span = info_span!("Forwarding snapshot", sequence);
                        debug!("Sending snapshot with {} records", records.len());
                        self.next
                            .send(SnapshotEvent {
                                sequence,
                                evaluation_date,
                                records,
                            })
                            .instrument(span)
                            .await
                            .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                        info!("Forwarded snapshot {sequence}");
                    }
                }
                Err(e) => {
                    error!("Failed to fetch snapshot {e:?}")
                }
            }

            tokio::select! {
                // Cancelation means we stop the loop. Which means we also drop the sender
                // channel and consequently stop the refresh module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(poll_point) => ()
            }
        }
    }
}
