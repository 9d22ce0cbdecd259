use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::executor::events::{Event, EventSink};
use crate::executor::pool::{PoolConfig, WorkerPool};
use crate::executor::process::ProcessExecutor;
use crate::executor::stage::{run_stage, StageError, StageOutcome, StageReport, StageSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Succeeded => "succeeded",
            PipelineStatus::Failed => "failed",
        }
    }
}

/// The record of one pipeline run. Lives for the duration of the run only;
/// nothing is persisted.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub status: PipelineStatus,
    /// The stage the run halted at, when `status` is `Failed`.
    pub failed_stage: Option<String>,
    /// Reports of the stages that ran, in order.
    pub stages: Vec<StageReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    fn new(run_id: Uuid, stage_count: usize) -> Self {
        Self {
            run_id,
            status: PipelineStatus::Pending,
            failed_stage: None,
            stages: Vec::with_capacity(stage_count),
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Drives stages strictly in order with a full barrier between them.
///
/// The first stage reporting a failure halts the run: queues of the
/// remaining stages are never built and artifacts of completed stages stay
/// on disk. Re-running is safe because each stage resets its own scratch
/// directory.
pub struct Pipeline {
    pool: WorkerPool,
    event_sink: Arc<dyn EventSink>,
}

impl Pipeline {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        event_sink: Arc<dyn EventSink>,
        pool: PoolConfig,
    ) -> Self {
        Self {
            pool: WorkerPool::new(executor, event_sink.clone(), pool),
            event_sink,
        }
    }

    pub async fn execute(
        &self,
        run_id: Uuid,
        stages: Vec<StageSpec>,
    ) -> Result<PipelineRun, PipelineError> {
        let mut run = PipelineRun::new(run_id, stages.len());
        self.event_sink
            .emit(Event::PipelineStarted {
                run_id,
                stages: stages.iter().map(|s| s.name.clone()).collect(),
            })
            .await;
        run.status = PipelineStatus::Running;

        for (index, spec) in stages.iter().enumerate() {
            self.event_sink
                .emit(Event::StageStarted {
                    run_id,
                    stage: spec.name.clone(),
                    index,
                })
                .await;

            let report = match run_stage(&self.pool, run_id, spec).await {
                Ok(report) => report,
                Err(source) => {
                    self.finish(&mut run, PipelineStatus::Failed, Some(&spec.name))
                        .await;
                    return Err(PipelineError::Stage {
                        stage: spec.name.clone(),
                        source,
                    });
                }
            };

            self.event_sink
                .emit(Event::StageFinished {
                    run_id,
                    stage: spec.name.clone(),
                    index,
                    outcome: report.outcome,
                    attempted: report.attempted,
                    succeeded: report.succeeded,
                    failed: report.failed,
                })
                .await;

            let failed = report.outcome == StageOutcome::Failed;
            run.stages.push(report);
            if failed {
                self.finish(&mut run, PipelineStatus::Failed, Some(&spec.name))
                    .await;
                return Ok(run);
            }
        }

        self.finish(&mut run, PipelineStatus::Succeeded, None).await;
        Ok(run)
    }

    async fn finish(&self, run: &mut PipelineRun, status: PipelineStatus, stage: Option<&str>) {
        run.status = status;
        run.failed_stage = stage.map(String::from);
        run.finished_at = Some(Utc::now());
        self.event_sink
            .emit(Event::PipelineFinished {
                run_id: run.run_id,
                status,
            })
            .await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("stage {stage} could not run: {source}")]
    Stage {
        stage: String,
        #[source]
        source: StageError,
    },
}
