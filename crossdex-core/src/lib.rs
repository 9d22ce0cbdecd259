#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod parser;
pub mod planner;
pub mod types;

pub use crate::config::{ProjectConfig, ResolvedConfig};
pub use crate::error::{ConfigError, CrossdexError, ParseError};
pub use crate::parser::{
    parse_compilation_database, parse_config_str, DocumentFormat, ParsedConfig,
};
pub use crate::planner::{plan_selection, PlannerError, SelectionPlan, Selector};
pub use crate::types::{CompilationDatabase, CompileCommand};
