use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_LISTEN_ADDRESS: &str = "localhost:8080";

/// Project config exactly as the user wrote it (JSON or YAML).
///
/// Every field is optional at this layer so a half-written file still
/// parses; [`ProjectConfig::resolve`] is where requirements are enforced.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectConfig {
    /// Root of the Kythe toolchain installation.
    pub kythe_path: Option<PathBuf>,

    /// Root of the source tree being indexed.
    pub project_root: Option<PathBuf>,

    /// Path to the project's `compile_commands.json`.
    pub compilation_database: Option<PathBuf>,

    /// Directory that receives all run artifacts.
    pub output_directory: Option<PathBuf>,

    /// Substring filter over record file paths; empty matches everything.
    pub subtree: Option<String>,

    /// Worker pool width. Defaults to the machine's available parallelism.
    pub parallel: Option<usize>,

    /// `host:port` the query server listens on.
    pub listen_address: Option<String>,
}

/// Locations of the external toolchain binaries, derived from `kythe_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub extractor: PathBuf,
    pub indexer: PathBuf,
    pub write_entries: PathBuf,
    pub write_tables: PathBuf,
    pub http_server: PathBuf,
    pub web_ui: PathBuf,
}

impl ToolPaths {
    fn under(kythe_path: &Path) -> Self {
        Self {
            extractor: kythe_path.join("extractors/cxx_extractor"),
            indexer: kythe_path.join("indexers/cxx_indexer"),
            write_entries: kythe_path.join("tools/write_entries"),
            write_tables: kythe_path.join("tools/write_tables"),
            http_server: kythe_path.join("tools/http_server"),
            web_ui: kythe_path.join("web/ui"),
        }
    }
}

/// Per-run artifact directories, derived from `output_directory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub kzips: PathBuf,
    pub graphstore: PathBuf,
    pub serving: PathBuf,
}

impl OutputLayout {
    fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            kzips: root.join("kzips"),
            graphstore: root.join("graphstore"),
            serving: root.join("serving"),
        }
    }
}

/// A validated config with every default applied and every derived path
/// computed. Components take this by value or reference; there is no
/// process-global config state.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project_root: PathBuf,
    pub compilation_database: PathBuf,
    pub subtree: String,
    pub parallel: usize,
    pub listen_address: String,
    pub tools: ToolPaths,
    pub output: OutputLayout,
}

impl ProjectConfig {
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let kythe_path = require(&self.kythe_path, "kythe_path")?;
        let project_root = require(&self.project_root, "project_root")?;
        let compilation_database = require(&self.compilation_database, "compilation_database")?;
        let output_root = require(&self.output_directory, "output_directory")?;

        let parallel = match self.parallel {
            Some(0) => {
                return Err(ConfigError::InvalidField {
                    field: "parallel",
                    reason: "worker count must be at least 1".to_string(),
                })
            }
            Some(n) => n,
            None => default_parallelism(),
        };

        let listen_address = match &self.listen_address {
            Some(addr) if addr.is_empty() => {
                return Err(ConfigError::InvalidField {
                    field: "listen_address",
                    reason: "listen address must not be empty".to_string(),
                })
            }
            Some(addr) => addr.clone(),
            None => DEFAULT_LISTEN_ADDRESS.to_string(),
        };

        Ok(ResolvedConfig {
            project_root: project_root.clone(),
            compilation_database: compilation_database.clone(),
            subtree: self.subtree.clone().unwrap_or_default(),
            parallel,
            listen_address,
            tools: ToolPaths::under(kythe_path),
            output: OutputLayout::under(output_root),
        })
    }
}

fn require<'a>(value: &'a Option<PathBuf>, field: &'static str) -> Result<&'a PathBuf, ConfigError> {
    value.as_ref().ok_or(ConfigError::MissingField { field })
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
