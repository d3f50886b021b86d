use std::path::Path;
use std::str::FromStr;

use crate::error::{AnalyzeError, Result};
use crate::exec::Runner;
use crate::models::Deps;

pub mod cabal;
pub mod stack;

pub trait Analyzer {
    fn analyze(&self, path: &Path) -> Result<Deps>;
}

/// Which package manager's already-solved plan to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Read cabal-install's `plan.json`.
    CabalInstall,
    /// Read `stack ls dependencies` listings.
    Stack,
}

impl FromStr for Strategy {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cabal-install" | "cabal" => Ok(Strategy::CabalInstall),
            "stack" => Ok(Strategy::Stack),
            other => Err(AnalyzeError::UnknownStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CabalInstall => write!(f, "cabal-install"),
            Strategy::Stack => write!(f, "stack"),
        }
    }
}

/// Run the analyzer for `strategy` against the project at `path`.
pub fn analyze(strategy: Strategy, path: &Path, runner: &dyn Runner) -> Result<Deps> {
    match strategy {
        Strategy::CabalInstall => cabal::CabalAnalyzer::new(runner).analyze(path),
        Strategy::Stack => stack::StackAnalyzer::new(runner).analyze(path),
    }
}
