use std::{future::Future, io::Write};

use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use crate::{
    activity::{analyze, grid::GridOptions},
    render::{render_report, RenderOptions},
};

use super::event::SnapshotEvent;

/// Reacts to snapshots. Could realistically render to a terminal, push to a client, etc.
pub trait SnapshotProcessor {
    fn process_next(&mut self, event: SnapshotEvent) -> impl Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl Future<Output = Result<()>>;
}

/// Receives snapshots and hands them to a processor one at a time, in the order they were sent.
pub struct RefreshModule<Processor> {
    receiver: Receiver<SnapshotEvent>,
    processor: Processor,
}

impl<P: SnapshotProcessor> RefreshModule<P> {
    pub fn new(receiver: Receiver<SnapshotEvent>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(event) = self.receiver.recv().await {
            let sequence = event.sequence;
            debug!("Processing snapshot {sequence}");
            match self.processor.process_next(event).await {
                Ok(_) => {
                    info!("Processed snapshot {sequence}")
                }
                Err(e) => {
                    error!("Error processing snapshot {sequence}: {e:?}")
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}

/// Recomputes the full report for every snapshot and writes it out.
pub struct ReportRenderer<W> {
    options: GridOptions,
    render_options: RenderOptions,
    out: W,
}

impl<W: Write> ReportRenderer<W> {
    pub fn new(
        options: GridOptions,
        render_options: RenderOptions,
        out: W,
    ) -> Self {
        Self {
            options,
            render_options,
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SnapshotProcessor for ReportRenderer<W> {
    async fn process_next(&mut self, event: SnapshotEvent) -> Result<()> {
        let report = analyze(&event.records, &self.options, event.evaluation_date)?;
        if self.render_options.color {
            // Clear the screen so the heatmap is redrawn in place.
            write!(self.out, "\x1b[2J\x1b[H")?;
        }
        write!(self.out, "{}", render_report(&report, &self.render_options))?;
        self.out.flush()?;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tokio::sync::mpsc;

    use crate::{
        activity::{entities::ActivityRecord, grid::GridOptions},
        render::RenderOptions,
        watch::event::SnapshotEvent,
    };

    use super::{RefreshModule, ReportRenderer, SnapshotProcessor};

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();

    fn event(sequence: u64, records: Vec<ActivityRecord>) -> SnapshotEvent {
        SnapshotEvent {
            sequence,
            evaluation_date: TODAY,
            records,
        }
    }

    fn renderer(weeks: u32) -> ReportRenderer<Vec<u8>> {
        ReportRenderer::new(
            GridOptions::default().with_weeks(weeks),
            RenderOptions { color: false },
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn renderer_redraws_every_snapshot() -> Result<()> {
        let (sender, receiver) = mpsc::channel::<SnapshotEvent>(10);
        sender
            .send(event(1, vec![ActivityRecord::new(TODAY, 3)]))
            .await?;
        sender
            .send(event(
                2,
                vec![
                    ActivityRecord::new(TODAY, 3),
                    ActivityRecord::new(TODAY.pred_opt().unwrap(), 3),
                ],
            ))
            .await?;
        drop(sender);

        let mut refresher = RefreshModule::new(receiver, renderer(4));
        while let Some(event) = refresher.receiver.recv().await {
            refresher.processor.process_next(event).await?;
        }
        let output = String::from_utf8(refresher.processor.into_inner())?;

        assert!(output.contains("3 activities in the last 4 weeks"));
        assert!(output.contains("6 activities in the last 4 weeks"));
        assert!(output.contains("Day streak: 2 (longest 2, last active 2024-01-12)"));
        Ok(())
    }

    #[tokio::test]
    async fn processing_errors_do_not_stop_refreshing() -> Result<()> {
        let (sender, receiver) = mpsc::channel::<SnapshotEvent>(10);
        for sequence in 1..=3 {
            sender
                .send(event(sequence, vec![ActivityRecord::new(TODAY, 1)]))
                .await?;
        }
        drop(sender);

        // Zero weeks can't be rendered, every event fails and gets logged.
        let mut renderer = renderer(0);
        assert!(renderer.process_next(event(0, vec![])).await.is_err());
        RefreshModule::new(receiver, renderer).run().await?;
        Ok(())
    }

    #[tokio::test]
    async fn report_follows_event_date() -> Result<()> {
        let mut renderer = renderer(4);
        let two_days_later = TODAY.checked_add_days(chrono::Days::new(2)).unwrap();
        renderer
            .process_next(SnapshotEvent {
                sequence: 1,
                evaluation_date: two_days_later,
                records: vec![ActivityRecord::new(TODAY, 3)],
            })
            .await?;
        let output = String::from_utf8(renderer.into_inner())?;

        assert!(output.contains("Day streak: 0 (longest 1, last active 2024-01-12)"));
        Ok(())
    }
}
