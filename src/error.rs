use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single extraction run. Every variant aborts the run; there
/// is no partial graph.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("couldn't find or generate cabal solver plan at {path}: {reason}")]
    PlanUnavailable { path: PathBuf, reason: String },

    #[error("failed to read cabal plan {path}: {source}")]
    PlanRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode cabal plan {path}: {source}")]
    PlanDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{command}` failed: {reason}")]
    Invocation { command: String, reason: String },

    #[error("unknown haskell analysis strategy: {0:?} (expected \"cabal-install\" or \"stack\")")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
