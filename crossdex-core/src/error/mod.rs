use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrossdexError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to auto-detect config format (neither valid JSON nor valid YAML)")]
    UnknownFormat,
}

/// Rejections raised while turning a raw config file into a usable one.
///
/// All of these are fatal before any work starts; nothing is spawned until
/// the config resolves cleanly.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for config field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
