use std::path::PathBuf;

use thiserror::Error;

/// Reasons the rules file cannot be used.  The engine has no fallback
/// values, so every variant is fatal to start-up.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rule `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The play field cannot host a game under the active rules.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("play field {width}x{height} is too small (need at least {min_width}x{min_height})")]
    TooSmall {
        width: f32,
        height: f32,
        min_width: f32,
        min_height: f32,
    },
}
