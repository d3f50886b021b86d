use std::path::Path;

use crate::analyzer::cabal::CABAL_PLAN_REL_PATH;
use crate::analyzer::Strategy;

/// Guess the extraction strategy from the files in the project root.
///
/// A `stack.yaml` means stack; otherwise any cabal project file, package
/// description or existing plan means cabal-install.
pub fn detect_strategy(path: &Path) -> Option<Strategy> {
    if path.join("stack.yaml").exists() {
        return Some(Strategy::Stack);
    }

    if path.join("cabal.project").exists()
        || path.join("cabal.project.local").exists()
        || path.join(CABAL_PLAN_REL_PATH).exists()
        || has_cabal_file(path)
    {
        return Some(Strategy::CabalInstall);
    }

    None
}

fn has_cabal_file(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().extension().and_then(|s| s.to_str()) == Some("cabal"))
        })
        .unwrap_or(false)
}
