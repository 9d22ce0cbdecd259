use crate::config::ProjectConfig;
use crate::error::ParseError;
use crate::types::CompilationDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub config: ProjectConfig,
    pub format: DocumentFormat,
}

pub fn parse_config_str(input: &str, format: DocumentFormat) -> Result<ParsedConfig, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedConfig {
            config: serde_json::from_str::<ProjectConfig>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedConfig {
            config: serde_yaml::from_str::<ProjectConfig>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_config_auto(input),
    }
}

fn parse_config_auto(input: &str) -> Result<ParsedConfig, ParseError> {
    // Heuristic: JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<ProjectConfig>(input) {
            Ok(config) => {
                return Ok(ParsedConfig {
                    config,
                    format: DocumentFormat::Json,
                });
            }
            Err(e) => {
                // If JSON parsing fails, try YAML as fallback
                match serde_yaml::from_str::<ProjectConfig>(input) {
                    Ok(config) => {
                        return Ok(ParsedConfig {
                            config,
                            format: DocumentFormat::Yaml,
                        });
                    }
                    Err(_) => {
                        // Return JSON error since we tried JSON first
                        return Err(ParseError::Json(e));
                    }
                }
            }
        }
    }

    match serde_yaml::from_str::<ProjectConfig>(input) {
        Ok(config) => Ok(ParsedConfig {
            config,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(config) = serde_json::from_str::<ProjectConfig>(input) {
                return Ok(ParsedConfig {
                    config,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}

/// Parses a `compile_commands.json` document. Databases are JSON arrays by
/// convention; YAML is not accepted here.
pub fn parse_compilation_database(input: &str) -> Result<CompilationDatabase, ParseError> {
    Ok(serde_json::from_str::<CompilationDatabase>(input)?)
}
