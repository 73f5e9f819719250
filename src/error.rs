use thiserror::Error;

/// Errors raised at the engine's fallible boundaries
///
/// Absence of a match is never an error; these cover configuration and
/// input that cannot be used at all.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid pattern for {context}: {source}")]
    Pattern {
        context: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Empty {0} list in configuration")]
    EmptyList(&'static str),

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
