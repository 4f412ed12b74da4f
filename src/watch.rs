use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::IngestError;
use crate::ingest::ingest;
use crate::models::Roster;
use crate::source::Source;

/// One completed ingestion run. Never modified once published.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub run_id: Uuid,
    pub loaded_at: DateTime<Local>,
    pub roster: Roster,
}

impl Snapshot {
    pub fn new(roster: Roster) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            loaded_at: Local::now(),
            roster,
        }
    }
}

/// Holds the last known-good snapshot and replaces it only on a full success.
pub struct Refresher {
    source: Source,
    current: Option<Arc<Snapshot>>,
}

impl Refresher {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.clone()
    }

    pub async fn refresh(&mut self) -> Result<Arc<Snapshot>, IngestError> {
        let text = self.source.read().await?;
        let snapshot = Arc::new(Snapshot::new(ingest(&text)?));
        self.current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}

/// Re-ingests on every tick. Failed runs are logged and the previous snapshot
/// stays current. `max_runs` bounds the loop; `None` runs until cancelled.
pub async fn watch<F>(
    refresher: &mut Refresher,
    every: Duration,
    max_runs: Option<usize>,
    mut publish: F,
) where
    F: FnMut(&Snapshot),
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs = 0usize;

    while max_runs.map_or(true, |max| runs < max) {
        ticker.tick().await;
        runs += 1;

        match refresher.refresh().await {
            Ok(snapshot) => {
                info!(
                    run_id = %snapshot.run_id,
                    teachers = snapshot.roster.teachers.len(),
                    schools = snapshot.roster.schools.len(),
                    "attendance data refreshed"
                );
                publish(snapshot.as_ref());
            }
            Err(err) => match refresher.current() {
                Some(previous) => warn!(
                    error = %err,
                    run_id = %previous.run_id,
                    "refresh failed, keeping previous data"
                ),
                None => warn!(error = %err, "refresh failed, no data loaded yet"),
            },
        }
    }
}
