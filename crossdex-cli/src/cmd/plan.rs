use std::path::Path;

use crossdex_core::{plan_selection, ResolvedConfig, SelectionPlan, Selector};
use crossdex_exec::driver::{STAGE_EXTRACT, STAGE_INDEX, STAGE_TABLES};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, OutputFormat};
use crate::OutputArgs;

pub async fn plan_cmd(path: &Path, subtree: Option<&str>, output: OutputArgs) -> i32 {
    let mut config = match super::config::load_config(path, &output) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(subtree) = subtree {
        config.subtree = subtree.to_string();
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

    match output.format {
        OutputFormat::Json => print_json(&config, &plan, output.quiet),
        OutputFormat::Text => print_text(&config, &selector, &plan, output.quiet),
    }
}

#[derive(Serialize)]
struct StagePreview {
    name: &'static str,
    /// Known queue length; absent for the index stage, whose queue is only
    /// enumerable after extraction has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<usize>,
    tool: String,
    scratch_dir: String,
}

#[derive(Serialize)]
struct PlanJsonOutput<'a> {
    selection: &'a SelectionPlan,
    stages: Vec<StagePreview>,
    listen_address: &'a str,
}

fn stage_previews(config: &ResolvedConfig, plan: &SelectionPlan) -> Vec<StagePreview> {
    vec![
        StagePreview {
            name: STAGE_EXTRACT,
            items: Some(plan.selected_count),
            tool: config.tools.extractor.display().to_string(),
            scratch_dir: config.output.kzips.display().to_string(),
        },
        StagePreview {
            name: STAGE_INDEX,
            items: None,
            tool: format!(
                "{} | {} --graphstore {}",
                config.tools.indexer.display(),
                config.tools.write_entries.display(),
                config.output.graphstore.display()
            ),
            scratch_dir: config.output.graphstore.display().to_string(),
        },
        StagePreview {
            name: STAGE_TABLES,
            items: Some(1),
            tool: config.tools.write_tables.display().to_string(),
            scratch_dir: config.output.serving.display().to_string(),
        },
    ]
}

fn print_json(config: &ResolvedConfig, plan: &SelectionPlan, quiet: bool) -> i32 {
    if quiet {
        return exit_codes::SUCCESS;
    }
    let payload = PlanJsonOutput {
        selection: plan,
        stages: stage_previews(config, plan),
        listen_address: &config.listen_address,
    };
    match serde_json::to_string_pretty(&payload) {
        Ok(s) => {
            println!("{s}");
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize plan as JSON: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn print_text(
    config: &ResolvedConfig,
    selector: &Selector,
    plan: &SelectionPlan,
    quiet: bool,
) -> i32 {
    if quiet {
        return exit_codes::SUCCESS;
    }

    println!(
        "selection: {} of {} records ({selector}, {} matching, last match at index {})",
        plan.selected_count, plan.total_records, plan.matching_records, plan.last_match_index
    );

    println!("\nstages:");
    for stage in stage_previews(config, plan) {
        match stage.items {
            Some(items) => println!("- {}: {items} items", stage.name),
            None => println!("- {}: one item per extracted archive", stage.name),
        }
        println!("  tool: {}", stage.tool);
        println!("  scratch: {}", stage.scratch_dir);
    }

    println!("\nserving: http://{}", config.listen_address);
    exit_codes::SUCCESS
}
