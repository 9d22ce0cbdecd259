//! Assembles the concrete extract/index/tables run from a resolved config.
//!
//! The executor layers below know nothing about cross-reference toolchains;
//! everything toolchain-shaped (binary locations, artifact layout, the
//! environment contract of the extractor) is pinned down here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crossdex_core::config::ResolvedConfig;
use crossdex_core::types::CompileCommand;

use crate::executor::{
    FixedQueueSource, ProcessInvocation, QueueSource, StageError, StageSpec, WorkItem,
};

/// Read by the extractor to locate sources relative to the project root.
pub const ENV_ROOT_DIRECTORY: &str = "KYTHE_ROOT_DIRECTORY";
/// Read by the extractor to decide where its archives go.
pub const ENV_OUTPUT_DIRECTORY: &str = "KYTHE_OUTPUT_DIRECTORY";

pub const STAGE_EXTRACT: &str = "extract";
pub const STAGE_INDEX: &str = "index";
pub const STAGE_TABLES: &str = "tables";

/// Builds the three stages of one indexing run, in execution order.
///
/// `selected` is the prefix of the compilation database chosen by the
/// planner. The extract queue is known up front (one item per record); the
/// index queue is a [`KzipQueueSource`] because its inputs exist only once
/// extraction has finished.
pub fn build_stages(config: &ResolvedConfig, selected: &[CompileCommand]) -> Vec<StageSpec> {
    let extract_items = selected
        .iter()
        .map(|record| WorkItem::single(extract_invocation(config, record)))
        .collect();

    vec![
        StageSpec::new(STAGE_EXTRACT, FixedQueueSource(extract_items))
            .with_scratch_dir(&config.output.kzips),
        StageSpec::new(STAGE_INDEX, KzipQueueSource::from_config(config))
            .with_scratch_dir(&config.output.graphstore),
        StageSpec::new(STAGE_TABLES, FixedQueueSource(vec![tables_item(config)]))
            .with_scratch_dir(&config.output.serving),
    ]
}

/// One extractor run for one compilation-database record.
///
/// The extractor wants the original compiler arguments without the compiler
/// itself, run from the record's own directory so relative include paths
/// resolve. The env overlay is merged over the inherited environment; the
/// extractor still needs the ambient `PATH` and friends.
pub fn extract_invocation(config: &ResolvedConfig, record: &CompileCommand) -> ProcessInvocation {
    let argv = record.argv();
    ProcessInvocation::new(&record.file, &config.tools.extractor)
        .args(argv.iter().skip(1).cloned())
        .current_dir(&record.directory)
        .env(ENV_ROOT_DIRECTORY, config.project_root.display().to_string())
        .env(
            ENV_OUTPUT_DIRECTORY,
            config.output.kzips.display().to_string(),
        )
}

/// Enumerates the `.kzip` archives extraction produced and turns each into
/// an indexer run piped into `write_entries`.
pub struct KzipQueueSource {
    kzips_dir: PathBuf,
    indexer: PathBuf,
    write_entries: PathBuf,
    graphstore: PathBuf,
}

impl KzipQueueSource {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            kzips_dir: config.output.kzips.clone(),
            indexer: config.tools.indexer.clone(),
            write_entries: config.tools.write_entries.clone(),
            graphstore: config.output.graphstore.clone(),
        }
    }

    fn index_item(&self, kzip: &Path) -> WorkItem {
        let label = kzip
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| kzip.display().to_string());
        let producer =
            ProcessInvocation::new(&label, &self.indexer).arg(kzip.display().to_string());
        let consumer = ProcessInvocation::new(&label, &self.write_entries)
            .arg("--graphstore")
            .arg(self.graphstore.display().to_string());
        WorkItem::piped(label, producer, consumer)
    }
}

#[async_trait]
impl QueueSource for KzipQueueSource {
    async fn build(&self) -> Result<Vec<WorkItem>, StageError> {
        let io_err = |source| StageError::Io {
            path: self.kzips_dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.kzips_dir).await.map_err(io_err)?;
        let mut kzips = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("kzip") {
                kzips.push(path);
            }
        }
        // Directory iteration order is arbitrary; keep runs deterministic.
        kzips.sort();

        Ok(kzips.iter().map(|kzip| self.index_item(kzip)).collect())
    }
}

/// The single post-processing run that folds the graphstore into serving
/// tables. `--num_workers` reuses the pool width so the external tool's own
/// parallelism matches the operator's setting.
fn tables_item(config: &ResolvedConfig) -> WorkItem {
    WorkItem::single(
        ProcessInvocation::new("write_tables", &config.tools.write_tables)
            .arg("--graphstore")
            .arg(config.output.graphstore.display().to_string())
            .arg("--out")
            .arg(config.output.serving.display().to_string())
            .arg("--num_workers")
            .arg(config.parallel.to_string()),
    )
}

/// The long-running query server over the serving tables.
///
/// Not part of the stage pipeline; callers spawn and wait on it themselves.
pub fn serve_invocation(config: &ResolvedConfig) -> ProcessInvocation {
    ProcessInvocation::new("http_server", &config.tools.http_server)
        .arg("--public_resources")
        .arg(config.tools.web_ui.display().to_string())
        .arg("--listen")
        .arg(&config.listen_address)
        .arg("--serving_table")
        .arg(config.output.serving.display().to_string())
}
