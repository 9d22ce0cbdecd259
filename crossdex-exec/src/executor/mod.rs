pub mod events;
pub mod pipeline;
pub mod pool;
pub mod process;
pub mod stage;

pub use events::{CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink};
pub use pipeline::{Pipeline, PipelineError, PipelineRun, PipelineStatus};
pub use pool::{
    FailureMode, ItemFailure, PoolConfig, PoolError, PoolReport, WorkItem, WorkKind, WorkerPool,
};
pub use process::{
    run_checked, EnvMode, ProcessError, ProcessExecutor, ProcessInvocation, ProcessOutput,
    TokioExecutor,
};
pub use stage::{
    reset_scratch_dir, run_stage, FixedQueueSource, ItemFailureSummary, QueueSource, StageError,
    StageOutcome, StageReport, StageSpec,
};
