use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use crossdex_core::{plan_selection, Selector};
use crossdex_exec::driver;
use crossdex_exec::executor::{
    EventSink, FailureMode, NoOpEventSink, PipelineStatus, PoolConfig, StageOutcome,
    StdoutEventSink, TokioExecutor,
};
use crossdex_exec::Pipeline;
use dialoguer::Confirm;
use serde::Serialize;
use uuid::Uuid;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::format_duration;
use crate::OutputArgs;

use super::progress::{CompositeProgressSink, ProgressEventSink};

#[derive(Serialize)]
struct StageResult {
    name: String,
    outcome: String,
    attempted: usize,
    succeeded: usize,
    failed: usize,
    duration_ms: u128,
}

#[derive(Serialize)]
struct RunResult {
    run_id: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_stage: Option<String>,
    stages: Vec<StageResult>,
    duration_ms: u128,
}

#[allow(clippy::too_many_arguments)]
pub async fn run_cmd(
    config_path: &Path,
    subtree: Option<&str>,
    parallel: Option<usize>,
    yes: bool,
    no_serve: bool,
    fail_fast: bool,
    events: &str,
    output: OutputArgs,
) -> i32 {
    let mut config = match super::config::load_config(config_path, &output) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(subtree) = subtree {
        config.subtree = subtree.to_string();
    }
    match parallel {
        Some(0) => {
            print_error(
                output.format,
                output.quiet,
                "worker count must be at least 1",
            );
            return exit_codes::VALIDATION_FAILED;
        }
        Some(n) => config.parallel = n,
        None => {}
    }

    let db = match super::config::load_database(&config, &output) {
        Ok(db) => db,
        Err(code) => return code,
    };

    let selector = Selector::Subtree(config.subtree.clone());
    let plan = match plan_selection(&db, &selector) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("{e}"));
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let base_sink: Arc<dyn EventSink> = match events {
        "none" => Arc::new(NoOpEventSink),
        "stdout" => Arc::new(StdoutEventSink),
        other => {
            print_error(
                output.format,
                output.quiet,
                &format!("unknown event sink: {other}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    // Decide whether to rebuild or keep what a previous run left behind.
    if config.output.root.exists() {
        let rebuild = if yes {
            true
        } else {
            let question = format!(
                "Output directory {} exists. Delete and rebuild?",
                config.output.root.display()
            );
            match Confirm::new()
                .with_prompt(question)
                .default(true)
                .interact()
            {
                Ok(answer) => answer,
                Err(e) => {
                    print_error(
                        output.format,
                        output.quiet,
                        &format!("cannot prompt for confirmation ({e}); pass --yes to rebuild"),
                    );
                    return exit_codes::RUNTIME_ERROR;
                }
            }
        };
        if !rebuild {
            // Keep the artifacts, go straight to serving.
            if no_serve {
                if output.format == OutputFormat::Text && !output.quiet {
                    println!("Keeping existing output; nothing to do.");
                }
                return exit_codes::SUCCESS;
            }
            return super::serve::serve_and_wait(&config, &output).await;
        }
        if let Err(e) = tokio::fs::remove_dir_all(&config.output.root).await {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to delete {}: {e}", config.output.root.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    }
    if let Err(e) = tokio::fs::create_dir_all(&config.output.root).await {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to create {}: {e}", config.output.root.display()),
        );
        return exit_codes::RUNTIME_ERROR;
    }

    let show_progress = output.format == OutputFormat::Text && !output.quiet;
    if show_progress {
        println!(
            "Processing {} out of {} commands",
            plan.selected_count, plan.total_records
        );
    }
    let event_sink: Arc<dyn EventSink> = if show_progress {
        Arc::new(CompositeProgressSink::new(
            Arc::new(ProgressEventSink::new()),
            base_sink,
        ))
    } else {
        base_sink
    };

    let pool = PoolConfig {
        concurrency: config.parallel,
        failure_mode: if fail_fast {
            FailureMode::FailFast
        } else {
            FailureMode::Continue
        },
    };
    let pipeline = Pipeline::new(Arc::new(TokioExecutor), event_sink, pool);
    let run_id = Uuid::new_v4();
    let stages = driver::build_stages(&config, plan.selected(&db));

    let run = match pipeline.execute(run_id, stages).await {
        Ok(run) => run,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("{e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let total: Duration = run.stages.iter().map(|s| s.elapsed).sum();
    let result = RunResult {
        run_id: run.run_id.to_string(),
        status: run.status.as_str().to_string(),
        failed_stage: run.failed_stage.clone(),
        stages: run
            .stages
            .iter()
            .map(|s| StageResult {
                name: s.name.clone(),
                outcome: s.outcome.as_str().to_string(),
                attempted: s.attempted,
                succeeded: s.succeeded,
                failed: s.failed,
                duration_ms: s.elapsed.as_millis(),
            })
            .collect(),
        duration_ms: total.as_millis(),
    };

    if show_progress {
        println!();
        match run.status {
            PipelineStatus::Succeeded => {
                println!("Run {} completed in {}", run.run_id, format_duration(total));
            }
            _ => {
                let stage = run.failed_stage.as_deref().unwrap_or("unknown");
                println!(
                    "Run {} {} at stage {stage}",
                    run.run_id,
                    style("failed").red().bold()
                );
            }
        }
        for s in &run.stages {
            println!(
                "  {}: {} ({}/{} succeeded) in {}",
                s.name,
                s.outcome.as_str(),
                s.succeeded,
                s.attempted,
                format_duration(s.elapsed)
            );
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if run.status == PipelineStatus::Failed {
        if show_progress {
            if let Some(stage) = run
                .stages
                .iter()
                .find(|s| s.outcome == StageOutcome::Failed)
            {
                if let Some(first) = stage.failures.first() {
                    eprintln!();
                    eprintln!("{}", first.detail);
                    if stage.failures.len() > 1 {
                        eprintln!(
                            "... and {} more failures in stage {}",
                            stage.failures.len() - 1,
                            stage.name
                        );
                    }
                }
            }
        }
        return exit_codes::RUN_FAILED;
    }

    if no_serve {
        return exit_codes::SUCCESS;
    }
    super::serve::serve_and_wait(&config, &output).await
}
