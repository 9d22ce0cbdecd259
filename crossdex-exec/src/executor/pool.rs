use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use uuid::Uuid;

use crate::executor::events::{Event, EventSink};
use crate::executor::process::{run_checked, ProcessError, ProcessExecutor, ProcessInvocation};

/// One schedulable unit of work. Immutable once enqueued.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub label: String,
    pub kind: WorkKind,
}

#[derive(Debug, Clone)]
pub enum WorkKind {
    /// A single tool invocation.
    Single(ProcessInvocation),
    /// Two invocations chained stdout-to-stdin: the producer's captured
    /// stdout becomes the consumer's stdin. Replaces `a | b` shell lines
    /// without involving a shell.
    Piped {
        producer: ProcessInvocation,
        consumer: ProcessInvocation,
    },
}

impl WorkItem {
    pub fn single(invocation: ProcessInvocation) -> Self {
        Self {
            label: invocation.label.clone(),
            kind: WorkKind::Single(invocation),
        }
    }

    pub fn piped(
        label: impl Into<String>,
        producer: ProcessInvocation,
        consumer: ProcessInvocation,
    ) -> Self {
        Self {
            label: label.into(),
            kind: WorkKind::Piped { producer, consumer },
        }
    }
}

/// Scheduling policy once an item has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the failure and keep draining the queue.
    #[default]
    Continue,
    /// Let in-flight items finish, stop claiming new ones.
    FailFast,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub concurrency: usize,
    pub failure_mode: FailureMode,
}

impl PoolConfig {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            failure_mode: FailureMode::default(),
        }
    }
}

#[derive(Debug)]
pub struct ItemFailure {
    pub index: usize,
    pub label: String,
    pub error: ProcessError,
}

#[derive(Debug, Default)]
pub struct PoolReport {
    /// Items a worker actually claimed and ran.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// All recorded failures, in queue order.
    pub failures: Vec<ItemFailure>,
}

impl PoolReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn first_failure(&self) -> Option<&ItemFailure> {
        self.failures.first()
    }
}

/// A fixed-width pool draining an ordered queue through a shared cursor.
///
/// Exactly `concurrency` workers are spawned; each claims the next index,
/// runs the item, and claims again until the queue is exhausted. A slow item
/// only ever occupies its own worker. Nothing about completion order is
/// guaranteed, only that every index is claimed exactly once.
pub struct WorkerPool {
    executor: Arc<dyn ProcessExecutor>,
    event_sink: Arc<dyn EventSink>,
    config: PoolConfig,
}

impl WorkerPool {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        event_sink: Arc<dyn EventSink>,
        config: PoolConfig,
    ) -> Self {
        Self {
            executor,
            event_sink,
            config,
        }
    }

    pub async fn run(
        &self,
        run_id: Uuid,
        stage: &str,
        items: Vec<WorkItem>,
    ) -> Result<PoolReport, PoolError> {
        if self.config.concurrency == 0 {
            return Err(PoolError::InvalidConcurrency);
        }

        let items: Arc<[WorkItem]> = items.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let failure_seen = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(self.config.concurrency);
        for _ in 0..self.config.concurrency {
            let shared = WorkerShared {
                executor: self.executor.clone(),
                event_sink: self.event_sink.clone(),
                items: items.clone(),
                cursor: cursor.clone(),
                completed: completed.clone(),
                failure_seen: failure_seen.clone(),
                failure_mode: self.config.failure_mode,
                run_id,
                stage: stage.to_string(),
            };
            workers.push(tokio::spawn(worker_loop(shared)));
        }

        let mut report = PoolReport::default();
        for joined in join_all(workers).await {
            let outcome = joined.map_err(|e| PoolError::TaskJoin(e.to_string()))?;
            report.attempted += outcome.attempted;
            report.succeeded += outcome.succeeded;
            report.failures.extend(outcome.failures);
        }
        report.failures.sort_by_key(|f| f.index);
        report.failed = report.failures.len();
        Ok(report)
    }
}

struct WorkerShared {
    executor: Arc<dyn ProcessExecutor>,
    event_sink: Arc<dyn EventSink>,
    items: Arc<[WorkItem]>,
    cursor: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    failure_seen: Arc<AtomicBool>,
    failure_mode: FailureMode,
    run_id: Uuid,
    stage: String,
}

#[derive(Default)]
struct WorkerOutcome {
    attempted: usize,
    succeeded: usize,
    failures: Vec<ItemFailure>,
}

async fn worker_loop(shared: WorkerShared) -> WorkerOutcome {
    let mut outcome = WorkerOutcome::default();
    loop {
        if shared.failure_mode == FailureMode::FailFast
            && shared.failure_seen.load(Ordering::Relaxed)
        {
            break;
        }

        // fetch_add hands every index to exactly one worker.
        let index = shared.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= shared.items.len() {
            break;
        }
        let item = &shared.items[index];
        outcome.attempted += 1;

        shared
            .event_sink
            .emit(Event::ItemStarted {
                run_id: shared.run_id,
                stage: shared.stage.clone(),
                label: item.label.clone(),
                index,
            })
            .await;

        let result = run_item(shared.executor.as_ref(), item).await;
        let succeeded = result.is_ok();
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(error) => {
                shared.failure_seen.store(true, Ordering::Relaxed);
                outcome.failures.push(ItemFailure {
                    index,
                    label: item.label.clone(),
                    error,
                });
            }
        }

        // Advisory progress counter; never gates scheduling.
        let done = shared.completed.fetch_add(1, Ordering::Relaxed) + 1;
        shared
            .event_sink
            .emit(Event::ItemFinished {
                run_id: shared.run_id,
                stage: shared.stage.clone(),
                label: item.label.clone(),
                index,
                succeeded,
                completed: done,
                total: shared.items.len(),
            })
            .await;
    }
    outcome
}

async fn run_item(executor: &dyn ProcessExecutor, item: &WorkItem) -> Result<(), ProcessError> {
    match &item.kind {
        WorkKind::Single(invocation) => {
            run_checked(executor, invocation).await?;
            Ok(())
        }
        WorkKind::Piped { producer, consumer } => {
            let produced = run_checked(executor, producer).await?;
            let mut fed = consumer.clone();
            fed.stdin = Some(produced.stdout);
            run_checked(executor, &fed).await?;
            Ok(())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool requires at least one worker")]
    InvalidConcurrency,
    #[error("task join error: {0}")]
    TaskJoin(String),
}
