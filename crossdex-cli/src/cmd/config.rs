use std::path::Path;

use crossdex_core::{parse_compilation_database, parse_config_str, DocumentFormat};
use crossdex_core::{CompilationDatabase, ResolvedConfig};

use crate::exit_codes;
use crate::output::print_error;
use crate::OutputArgs;

/// Reads, parses, and resolves the project config, printing the failure and
/// handing back the exit code the command should return with.
pub fn load_config(path: &Path, output: &OutputArgs) -> Result<ResolvedConfig, i32> {
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return Err(exit_codes::RUNTIME_ERROR);
        }
    };

    let parsed = match parse_config_str(&content, DocumentFormat::Auto) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("{e}"));
            return Err(exit_codes::VALIDATION_FAILED);
        }
    };

    match parsed.config.resolve() {
        Ok(resolved) => Ok(resolved),
        Err(e) => {
            print_error(output.format, output.quiet, &format!("{e}"));
            Err(exit_codes::VALIDATION_FAILED)
        }
    }
}

/// Loads the compilation database the config points at.
pub fn load_database(
    config: &ResolvedConfig,
    output: &OutputArgs,
) -> Result<CompilationDatabase, i32> {
    let path = &config.compilation_database;
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return Err(exit_codes::RUNTIME_ERROR);
        }
    };

    match parse_compilation_database(&content) {
        Ok(db) => Ok(db),
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to parse {}: {e}", path.display()),
            );
            Err(exit_codes::VALIDATION_FAILED)
        }
    }
}
