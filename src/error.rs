//! Crate-wide error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("invalid strategy '{0}' (expected balanced, aggro, control, cycle, splash or spell)")]
    InvalidStrategy(String),

    #[error("invalid weight {0}: must be a finite number")]
    InvalidWeight(f64),

    #[error("invalid weight '{0}': not a number")]
    UnparsableWeight(String),

    #[error("unable to load analysis '{path}': {message}")]
    AnalysisLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("insufficient candidates: found {found}, need {required}")]
    InsufficientCandidates { found: usize, required: usize },

    #[error("unable to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("knowledge base '{path}': {message}")]
    KnowledgeBase { path: String, message: String },

    #[error("config '{path}': {message}")]
    Config { path: String, message: String },

    #[error("invalid scoring tuning: {0}")]
    InvalidScoring(String),

    #[error("invalid player tag '{0}'")]
    InvalidPlayerTag(String),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl DeckError {
    pub(crate) fn analysis_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::AnalysisLoad {
            path: path.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn analysis_parse(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self::AnalysisLoad {
            path: path.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Re-tag a document error raised while reading a configuration file.
    pub(crate) fn into_config(self) -> Self {
        match self {
            Self::KnowledgeBase { path, message } => Self::Config { path, message },
            other => other,
        }
    }

    pub(crate) fn analysis_missing(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AnalysisLoad {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_io_error_keeps_source() {
        let err = DeckError::analysis_io(
            "missing.json",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn invalid_strategy_message_names_input() {
        let err = DeckError::InvalidStrategy("turbo".to_string());
        assert!(err.to_string().contains("'turbo'"));
    }
}
