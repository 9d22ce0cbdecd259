use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::executor::pipeline::PipelineStatus;
use crate::executor::stage::StageOutcome;

#[derive(Debug, Clone)]
pub enum Event {
    PipelineStarted {
        run_id: Uuid,
        stages: Vec<String>,
    },
    PipelineFinished {
        run_id: Uuid,
        status: PipelineStatus,
    },
    StageStarted {
        run_id: Uuid,
        stage: String,
        index: usize,
    },
    StageFinished {
        run_id: Uuid,
        stage: String,
        index: usize,
        outcome: StageOutcome,
        attempted: usize,
        succeeded: usize,
        failed: usize,
    },
    ItemStarted {
        run_id: Uuid,
        stage: String,
        label: String,
        index: usize,
    },
    ItemFinished {
        run_id: Uuid,
        stage: String,
        label: String,
        index: usize,
        succeeded: bool,
        completed: usize,
        total: usize,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            let event_clone = event.clone();
            sink.emit(event_clone).await;
        }
    }
}

pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        let json = match event {
            Event::PipelineStarted { run_id, stages } => {
                json!({ "type": "pipeline.started", "run_id": run_id.to_string(), "stages": stages })
            }
            Event::PipelineFinished { run_id, status } => {
                json!({ "type": "pipeline.finished", "run_id": run_id.to_string(), "status": status.as_str() })
            }
            Event::StageStarted { run_id, stage, index } => {
                json!({ "type": "stage.started", "run_id": run_id.to_string(), "stage": stage, "index": index })
            }
            Event::StageFinished { run_id, stage, index, outcome, attempted, succeeded, failed } => {
                json!({
                    "type": "stage.finished",
                    "run_id": run_id.to_string(),
                    "stage": stage,
                    "index": index,
                    "outcome": outcome.as_str(),
                    "attempted": attempted,
                    "succeeded": succeeded,
                    "failed": failed
                })
            }
            Event::ItemStarted { run_id, stage, label, index } => {
                json!({ "type": "item.started", "run_id": run_id.to_string(), "stage": stage, "label": label, "index": index })
            }
            Event::ItemFinished { run_id, stage, label, index, succeeded, completed, total } => {
                json!({
                    "type": "item.finished",
                    "run_id": run_id.to_string(),
                    "stage": stage,
                    "label": label,
                    "index": index,
                    "succeeded": succeeded,
                    "completed": completed,
                    "total": total
                })
            }
        };
        println!("{}", serde_json::to_string(&json).unwrap_or_default());
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {
    }
}
