use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use console::style;
use crossdex_exec::executor::{Event, EventSink, StageOutcome};
use indicatif::{ProgressBar, ProgressStyle};

/// Draws one progress bar per stage on stderr.
///
/// Stages run strictly in sequence, so a single live bar is enough. The
/// queue length is unknown when a stage starts (lazy queues); the bar grows
/// to its real length on the first completed item.
pub struct ProgressEventSink {
    current: Mutex<Option<ProgressBar>>,
}

impl Default for ProgressEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEventSink {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn stage_bar(stage: &str) -> ProgressBar {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix:>7} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        bar.set_prefix(stage.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        match event {
            Event::StageStarted { stage, .. } => {
                if let Some(old) = current.replace(Self::stage_bar(&stage)) {
                    old.finish_and_clear();
                }
            }
            Event::ItemFinished {
                label,
                succeeded,
                completed,
                total,
                ..
            } => {
                if let Some(bar) = current.as_ref() {
                    bar.set_length(total as u64);
                    bar.set_position(completed as u64);
                    if succeeded {
                        bar.set_message(label);
                    } else {
                        bar.set_message(format!("{} {label}", style("✗").red()));
                    }
                }
            }
            Event::StageFinished {
                stage,
                outcome,
                succeeded,
                failed,
                ..
            } => {
                if let Some(bar) = current.take() {
                    bar.finish_and_clear();
                }
                match outcome {
                    StageOutcome::Empty => {
                        println!("  {} {stage}: nothing to do", style("-").dim());
                    }
                    StageOutcome::Completed => {
                        println!("  {} {stage}: {succeeded} succeeded", style("✓").green());
                    }
                    StageOutcome::Failed => {
                        println!(
                            "  {} {stage}: {succeeded} succeeded, {failed} failed",
                            style("✗").red()
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

/// Forwards every event to the progress display and the base sink.
pub struct CompositeProgressSink {
    progress: Arc<ProgressEventSink>,
    base: Arc<dyn EventSink>,
}

impl CompositeProgressSink {
    pub fn new(progress: Arc<ProgressEventSink>, base: Arc<dyn EventSink>) -> Self {
        Self { progress, base }
    }
}

#[async_trait]
impl EventSink for CompositeProgressSink {
    async fn emit(&self, event: Event) {
        self.progress.emit(event.clone()).await;
        self.base.emit(event).await;
    }
}
