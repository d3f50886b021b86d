use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::exec::{Cmd, Runner};
use crate::models::{Deps, PackageId};

/// Analyzer for stack projects, driven by `stack ls dependencies`.
///
/// `stack ls dependencies` prints one `<name> <version>` pair per line. The
/// depth-1 listing gives the direct imports and the full listing gives the
/// transitive set; lines already emitted by the shallow pass are not
/// repeated in the transitive set.
pub struct StackAnalyzer<'a> {
    runner: &'a dyn Runner,
}

impl<'a> StackAnalyzer<'a> {
    pub fn new(runner: &'a dyn Runner) -> Self {
        Self { runner }
    }

    fn list(&self, path: &Path, argv: &[&str]) -> Result<String> {
        self.runner.run(&Cmd {
            name: "stack",
            argv,
            dir: path,
        })
    }
}

impl super::Analyzer for StackAnalyzer<'_> {
    fn analyze(&self, path: &Path) -> Result<Deps> {
        let direct_stdout = self.list(path, &["ls", "dependencies", "--depth", "1"])?;
        let all_stdout = self.list(path, &["ls", "dependencies"])?;

        let mut seen = HashSet::new();
        let mut deps = Deps::default();

        fold_listing(&mut seen, &direct_stdout, |name, version| {
            deps.add_direct(PackageId::haskell(name, version));
        });
        fold_listing(&mut seen, &all_stdout, |name, version| {
            deps.add_transitive(PackageId::haskell(name, version));
        });

        tracing::debug!(
            direct = deps.direct.len(),
            transitive = deps.transitive.len(),
            "parsed stack listings"
        );

        Ok(deps)
    }
}

/// Feed every unseen `<name> <version>` line of `output` to `consume`.
///
/// Lines are keyed by their raw text in `seen`, which is shared across
/// listings, after dropping a CRLF line ending's `\r`. Lines without both a
/// name and a version are skipped.
fn fold_listing<'o>(
    seen: &mut HashSet<&'o str>,
    output: &'o str,
    mut consume: impl FnMut(&str, &str),
) {
    for line in output.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split(' ');
        let (Some(name), Some(version)) = (fields.next(), fields.next()) else {
            continue;
        };
        if name.is_empty() || version.is_empty() {
            continue;
        }

        if seen.insert(line) {
            consume(name, version);
        }
    }
}
