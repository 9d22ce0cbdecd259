use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::executor::pool::{PoolError, WorkItem, WorkerPool};

/// Produces a stage's work queue on demand.
///
/// Queues are built lazily because a stage's inputs usually exist only after
/// the previous stage has finished. A stage that never runs never enumerates
/// its work.
#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn build(&self) -> Result<Vec<WorkItem>, StageError>;
}

/// A queue known up front.
pub struct FixedQueueSource(pub Vec<WorkItem>);

#[async_trait]
impl QueueSource for FixedQueueSource {
    async fn build(&self) -> Result<Vec<WorkItem>, StageError> {
        Ok(self.0.clone())
    }
}

pub struct StageSpec {
    pub name: String,
    /// Wiped and recreated before the stage runs, so re-runs start clean.
    pub scratch_dir: Option<PathBuf>,
    pub queue: Box<dyn QueueSource>,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, queue: impl QueueSource + 'static) -> Self {
        Self {
            name: name.into(),
            scratch_dir: None,
            queue: Box::new(queue),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Every item ran and succeeded.
    Completed,
    /// The queue had nothing in it. Not a failure.
    Empty,
    /// At least one item failed.
    Failed,
}

impl StageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageOutcome::Completed => "completed",
            StageOutcome::Empty => "empty",
            StageOutcome::Failed => "failed",
        }
    }
}

/// A recorded item failure, rendered for reports.
#[derive(Debug, Clone)]
pub struct ItemFailureSummary {
    pub index: usize,
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub name: String,
    pub outcome: StageOutcome,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailureSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn is_success(&self) -> bool {
        self.outcome != StageOutcome::Failed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to reset {}: {source}", path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Deletes and recreates `path`. A missing directory is not an error, so the
/// reset is idempotent and a first run needs no special casing.
pub async fn reset_scratch_dir(path: &Path) -> Result<(), StageError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StageError::Scratch {
                path: path.to_path_buf(),
                source,
            })
        }
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StageError::Scratch {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs one stage to completion: reset the scratch directory, build the
/// queue, drain it through the pool.
///
/// An empty queue yields an [`StageOutcome::Empty`] report, not an error;
/// item failures are aggregated into the report rather than bubbling up.
/// `Err` here means the stage could not run at all.
pub async fn run_stage(
    pool: &WorkerPool,
    run_id: Uuid,
    spec: &StageSpec,
) -> Result<StageReport, StageError> {
    let started_at = Utc::now();
    let clock = std::time::Instant::now();

    if let Some(dir) = &spec.scratch_dir {
        reset_scratch_dir(dir).await?;
    }

    let items = spec.queue.build().await?;
    if items.is_empty() {
        return Ok(StageReport {
            name: spec.name.clone(),
            outcome: StageOutcome::Empty,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            started_at,
            finished_at: Utc::now(),
            elapsed: clock.elapsed(),
        });
    }

    let report = pool.run(run_id, &spec.name, items).await?;
    let outcome = if report.is_success() {
        StageOutcome::Completed
    } else {
        StageOutcome::Failed
    };
    Ok(StageReport {
        name: spec.name.clone(),
        outcome,
        attempted: report.attempted,
        succeeded: report.succeeded,
        failed: report.failed,
        failures: report
            .failures
            .iter()
            .map(|f| ItemFailureSummary {
                index: f.index,
                label: f.label.clone(),
                detail: f.error.detail(),
            })
            .collect(),
        started_at,
        finished_at: Utc::now(),
        elapsed: clock.elapsed(),
    })
}
