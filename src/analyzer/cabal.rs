use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{AnalyzeError, Result};
use crate::exec::{Cmd, Runner};
use crate::models::{Deps, PackageId};

/// Where cabal-install writes its solver plan, relative to the project root.
pub const CABAL_PLAN_REL_PATH: &str = "dist-newstyle/cache/plan.json";

#[derive(Debug, Deserialize)]
struct CabalPlan {
    #[serde(rename = "install-plan")]
    packages: Vec<PlanPackage>,
}

#[derive(Debug, Deserialize)]
struct PlanPackage {
    #[serde(rename = "type")]
    kind: String,
    /// Plan-local id, e.g. `aeson-2.1.2.1-6c1e...`. Not a package identity.
    id: String,
    #[serde(rename = "pkg-name")]
    name: String,
    #[serde(rename = "pkg-version")]
    version: String,
    /// Per-component dependency lists (`lib`, `exe:foo`, `test:bar`, ...).
    #[serde(default)]
    components: BTreeMap<String, Component>,
    #[serde(default)]
    depends: Vec<String>,
    /// Only present on `configured` packages.
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Component {
    #[serde(default)]
    depends: Vec<String>,
}

impl PlanPackage {
    /// Packages that belong to the analyzed project itself.
    fn is_local(&self) -> bool {
        self.kind == "configured" && self.style.as_deref() == Some("local")
    }

    /// Top-level dependencies followed by each component's, in component name order.
    fn all_depends(&self) -> impl Iterator<Item = &str> {
        self.depends
            .iter()
            .chain(self.components.values().flat_map(|c| c.depends.iter()))
            .map(String::as_str)
    }

    fn package_id(&self) -> PackageId {
        PackageId::haskell(&self.name, &self.version)
    }
}

/// Analyzer for cabal-install projects, driven by `plan.json`.
///
/// The plan is generated with `cabal new-build --dry-run` when it does not
/// exist yet. Packages with type `configured` and style `local` are the
/// project's own; whatever they depend on is a direct import and the rest of
/// the plan is transitive.
pub struct CabalAnalyzer<'a> {
    runner: &'a dyn Runner,
}

impl<'a> CabalAnalyzer<'a> {
    pub fn new(runner: &'a dyn Runner) -> Self {
        Self { runner }
    }

    fn load_plan(&self, path: &Path) -> Result<CabalPlan> {
        let plan_path = path.join(CABAL_PLAN_REL_PATH);

        if !plan_path.exists() {
            tracing::info!(path = %plan_path.display(), "cabal plan missing, generating it");
            let cmd = Cmd {
                name: "cabal",
                argv: &["new-build", "--dry-run"],
                dir: path,
            };
            self.runner
                .run(&cmd)
                .map_err(|e| AnalyzeError::PlanUnavailable {
                    path: plan_path.clone(),
                    reason: e.to_string(),
                })?;

            if !plan_path.exists() {
                return Err(AnalyzeError::PlanUnavailable {
                    path: plan_path,
                    reason: format!("`{}` did not write a plan", cmd.display()),
                });
            }
        }

        let content =
            std::fs::read_to_string(&plan_path).map_err(|source| AnalyzeError::PlanRead {
                path: plan_path.clone(),
                source,
            })?;
        parse_plan(&content, &plan_path)
    }
}

impl super::Analyzer for CabalAnalyzer<'_> {
    fn analyze(&self, path: &Path) -> Result<Deps> {
        let plan = self.load_plan(path)?;
        let classified = classify(&plan);

        tracing::debug!(
            local = classified.local.len(),
            direct = classified.deps.direct.len(),
            transitive = classified.deps.transitive.len(),
            "classified cabal plan"
        );

        Ok(classified.deps)
    }
}

fn parse_plan(content: &str, plan_path: &Path) -> Result<CabalPlan> {
    serde_json::from_str(content).map_err(|source| AnalyzeError::PlanDecode {
        path: plan_path.to_path_buf(),
        source,
    })
}

/// Result of splitting a plan into the project's own packages and its graph.
struct Classified {
    local: Vec<PackageId>,
    deps: Deps,
}

/// Partition the plan into local packages, direct imports and transitive
/// packages. The id table is never mutated; a claimed set records which plan
/// ids have already been emitted as direct imports, so the first local
/// package (in plan id order) to reference a dependency claims it.
///
/// Per-component plans can list one package identity under several plan ids.
/// An identity that was imported directly is not repeated in the transitive
/// set, even when another of its plan ids was never claimed.
fn classify(plan: &CabalPlan) -> Classified {
    let table: BTreeMap<&str, &PlanPackage> =
        plan.packages.iter().map(|p| (p.id.as_str(), p)).collect();

    let local_ids: BTreeSet<&str> = table
        .iter()
        .filter(|(_, p)| p.is_local())
        .map(|(id, _)| *id)
        .collect();

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut direct_ids: HashSet<PackageId> = HashSet::new();
    let mut deps = Deps::default();
    let mut local = Vec::new();

    for project in local_ids.iter().filter_map(|id| table.get(id)) {
        local.push(project.package_id());

        for dep_id in project.all_depends() {
            if local_ids.contains(dep_id) {
                continue;
            }
            let Some(dep) = table.get(dep_id) else {
                tracing::debug!(id = dep_id, "dependency id not in plan, skipping");
                continue;
            };
            if claimed.insert(dep_id) {
                let id = dep.package_id();
                direct_ids.insert(id.clone());
                deps.add_direct(id);
            }
        }
    }

    for (id, package) in &table {
        if local_ids.contains(id) || claimed.contains(id) {
            continue;
        }
        let package_id = package.package_id();
        if !direct_ids.contains(&package_id) {
            deps.add_transitive(package_id);
        }
    }

    Classified { local, deps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::exec::Cmd;
    use std::cell::Cell;
    use std::collections::HashSet;

    /// Stands in for `cabal`: optionally writes a plan into the project when run.
    struct FakeCabal {
        plan: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl FakeCabal {
        fn new(plan: Option<&'static str>) -> Self {
            Self {
                plan,
                calls: Cell::new(0),
            }
        }
    }

    impl Runner for FakeCabal {
        fn run(&self, cmd: &Cmd<'_>) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(cmd.display(), "cabal new-build --dry-run");
            match self.plan {
                Some(plan) => {
                    let path = cmd.dir.join(CABAL_PLAN_REL_PATH);
                    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                    std::fs::write(path, plan).unwrap();
                    Ok(String::new())
                }
                None => Err(AnalyzeError::Invocation {
                    command: cmd.display(),
                    reason: "exit status: 1".to_string(),
                }),
            }
        }
    }

    fn write_plan(dir: &Path, plan: &str) {
        let path = dir.join(CABAL_PLAN_REL_PATH);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, plan).unwrap();
    }

    fn classify_str(json: &str) -> Classified {
        let plan = parse_plan(json, Path::new("plan.json")).unwrap();
        classify(&plan)
    }

    fn direct_ids(deps: &Deps) -> Vec<String> {
        deps.direct.iter().map(|i| i.resolved.to_string()).collect()
    }

    fn transitive_ids(deps: &Deps) -> Vec<String> {
        deps.transitive.keys().map(|id| id.to_string()).collect()
    }

    const APP_PLAN: &str = r#"{
  "cabal-version": "3.10.1.0",
  "compiler-id": "ghc-9.4.7",
  "install-plan": [
    {
      "type": "configured",
      "id": "app-0.1.0.0-inplace",
      "pkg-name": "app",
      "pkg-version": "0.1.0.0",
      "style": "local",
      "pkg-src": { "type": "local", "path": "/src/app/." },
      "depends": ["p1", "p2"]
    },
    {
      "type": "configured",
      "id": "p1",
      "pkg-name": "lib-a",
      "pkg-version": "1.0.0",
      "style": "global",
      "depends": []
    },
    {
      "type": "configured",
      "id": "p2",
      "pkg-name": "lib-b",
      "pkg-version": "2.0.0",
      "style": "global",
      "depends": ["p3"]
    },
    {
      "type": "pre-existing",
      "id": "p3",
      "pkg-name": "lib-c",
      "pkg-version": "0.1.0",
      "depends": []
    }
  ]
}"#;

    #[test]
    fn test_direct_and_transitive() {
        let classified = classify_str(APP_PLAN);
        assert_eq!(classified.local, vec![PackageId::haskell("app", "0.1.0.0")]);
        assert_eq!(
            direct_ids(&classified.deps),
            vec!["lib-a@1.0.0", "lib-b@2.0.0"]
        );
        assert_eq!(transitive_ids(&classified.deps), vec!["lib-c@0.1.0"]);
    }

    #[test]
    fn test_component_depends_are_direct() {
        let json = r#"{
  "install-plan": [
    {
      "type": "configured",
      "id": "app-inplace",
      "pkg-name": "app",
      "pkg-version": "0.1.0.0",
      "style": "local",
      "components": {
        "lib": { "depends": ["base-4.18"] },
        "exe:app": { "depends": ["base-4.18", "app-inplace", "optparse-0.18"] },
        "test:spec": { "depends": ["hspec-2.11"] }
      }
    },
    { "type": "pre-existing", "id": "base-4.18", "pkg-name": "base", "pkg-version": "4.18.0.0", "depends": ["ghc-prim-0.10"] },
    { "type": "pre-existing", "id": "ghc-prim-0.10", "pkg-name": "ghc-prim", "pkg-version": "0.10.0", "depends": [] },
    { "type": "configured", "id": "optparse-0.18", "pkg-name": "optparse-applicative", "pkg-version": "0.18.1.0", "style": "global", "depends": ["base-4.18"] },
    { "type": "configured", "id": "hspec-2.11", "pkg-name": "hspec", "pkg-version": "2.11.7", "style": "global", "depends": ["base-4.18"] }
  ]
}"#;
        let classified = classify_str(json);
        // Components are walked in name order: exe:app, lib, test:spec.
        assert_eq!(
            direct_ids(&classified.deps),
            vec![
                "base@4.18.0.0",
                "optparse-applicative@0.18.1.0",
                "hspec@2.11.7"
            ]
        );
        assert_eq!(transitive_ids(&classified.deps), vec!["ghc-prim@0.10.0"]);
    }

    #[test]
    fn test_shared_dependency_claimed_once() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "core-inplace", "pkg-name": "core", "pkg-version": "0.1", "style": "local", "depends": ["text-2"] },
    { "type": "configured", "id": "web-inplace", "pkg-name": "web", "pkg-version": "0.1", "style": "local", "depends": ["text-2", "core-inplace", "warp-3"] },
    { "type": "configured", "id": "text-2", "pkg-name": "text", "pkg-version": "2.0.2", "style": "global", "depends": [] },
    { "type": "configured", "id": "warp-3", "pkg-name": "warp", "pkg-version": "3.3.30", "style": "global", "depends": ["text-2"] }
  ]
}"#;
        let classified = classify_str(json);
        assert_eq!(classified.local.len(), 2);
        assert_eq!(direct_ids(&classified.deps), vec!["text@2.0.2", "warp@3.3.30"]);
        assert!(classified.deps.transitive.is_empty());
    }

    #[test]
    fn test_no_local_packages_everything_transitive() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "a", "pkg-name": "a", "pkg-version": "1", "style": "global", "depends": ["b"] },
    { "type": "pre-existing", "id": "b", "pkg-name": "b", "pkg-version": "2", "depends": [] }
  ]
}"#;
        let classified = classify_str(json);
        assert!(classified.local.is_empty());
        assert!(classified.deps.direct.is_empty());
        assert_eq!(transitive_ids(&classified.deps), vec!["a@1", "b@2"]);
    }

    #[test]
    fn test_configured_non_local_is_not_ours() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "app", "pkg-name": "app", "pkg-version": "1", "style": "local", "depends": [] },
    { "type": "configured", "id": "vendored", "pkg-name": "vendored", "pkg-version": "1", "style": "inplace", "depends": [] },
    { "type": "pre-existing", "id": "rts", "pkg-name": "rts", "pkg-version": "1.0.2", "style": "local" }
  ]
}"#;
        let classified = classify_str(json);
        assert_eq!(classified.local, vec![PackageId::haskell("app", "1")]);
        assert_eq!(transitive_ids(&classified.deps), vec!["rts@1.0.2", "vendored@1"]);
    }

    #[test]
    fn test_duplicate_identities_collapse_in_transitive() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "zlib-lib", "pkg-name": "zlib", "pkg-version": "0.6.3", "style": "global", "component-name": "lib" },
    { "type": "configured", "id": "zlib-exe", "pkg-name": "zlib", "pkg-version": "0.6.3", "style": "global", "component-name": "exe:zlib" }
  ]
}"#;
        let classified = classify_str(json);
        assert_eq!(transitive_ids(&classified.deps), vec!["zlib@0.6.3"]);
    }

    #[test]
    fn test_direct_identity_not_repeated_under_other_plan_id() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "app", "pkg-name": "app", "pkg-version": "1", "style": "local", "depends": ["zlib-lib"] },
    { "type": "configured", "id": "zlib-lib", "pkg-name": "zlib", "pkg-version": "0.6.3", "style": "global", "component-name": "lib" },
    { "type": "configured", "id": "zlib-exe", "pkg-name": "zlib", "pkg-version": "0.6.3", "style": "global", "component-name": "exe:zlib", "depends": ["zlib-lib"] },
    { "type": "pre-existing", "id": "base", "pkg-name": "base", "pkg-version": "4.18.0.0" }
  ]
}"#;
        let classified = classify_str(json);
        let deps = &classified.deps;

        assert_eq!(direct_ids(deps), vec!["zlib@0.6.3"]);
        assert_eq!(transitive_ids(deps), vec!["base@4.18.0.0"]);
        assert!(deps
            .direct
            .iter()
            .all(|i| !deps.transitive.contains_key(&i.resolved)));
    }

    #[test]
    fn test_every_package_classified_exactly_once() {
        let json = r#"{
  "install-plan": [
    { "type": "configured", "id": "app", "pkg-name": "app", "pkg-version": "1", "style": "local", "depends": ["a", "missing"], "components": { "test:t": { "depends": ["b", "a"] } } },
    { "type": "configured", "id": "tool", "pkg-name": "tool", "pkg-version": "1", "style": "local", "depends": ["c", "app"] },
    { "type": "configured", "id": "a", "pkg-name": "a", "pkg-version": "1", "style": "global", "depends": ["d"] },
    { "type": "configured", "id": "b", "pkg-name": "b", "pkg-version": "1", "style": "global" },
    { "type": "configured", "id": "c", "pkg-name": "c", "pkg-version": "1", "style": "global", "depends": ["d", "e"] },
    { "type": "pre-existing", "id": "d", "pkg-name": "d", "pkg-version": "1" },
    { "type": "pre-existing", "id": "e", "pkg-name": "e", "pkg-version": "1" }
  ]
}"#;
        let classified = classify_str(json);
        let deps = &classified.deps;

        let direct: HashSet<&PackageId> = deps.direct.iter().map(|i| &i.resolved).collect();
        let transitive: HashSet<&PackageId> = deps.transitive.keys().collect();
        let local: HashSet<&PackageId> = classified.local.iter().collect();

        assert!(direct.is_disjoint(&transitive));
        assert!(local.is_disjoint(&direct));
        assert!(local.is_disjoint(&transitive));
        assert_eq!(direct.len(), deps.direct.len());
        assert_eq!(local.len() + direct.len() + transitive.len(), 7);
        assert_eq!(direct_ids(deps), vec!["a@1", "b@1", "c@1"]);
        assert_eq!(transitive_ids(deps), vec!["d@1", "e@1"]);
    }

    #[test]
    fn test_analyze_reads_existing_plan() {
        let dir = tempfile::tempdir().unwrap();
        write_plan(dir.path(), APP_PLAN);
        let runner = FakeCabal::new(None);

        let deps = CabalAnalyzer::new(&runner).analyze(dir.path()).unwrap();

        assert_eq!(runner.calls.get(), 0);
        assert_eq!(deps.direct.len(), 2);
        assert_eq!(deps.transitive.len(), 1);
    }

    #[test]
    fn test_analyze_generates_missing_plan() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeCabal::new(Some(APP_PLAN));

        let deps = CabalAnalyzer::new(&runner).analyze(dir.path()).unwrap();

        assert_eq!(runner.calls.get(), 1);
        assert_eq!(direct_ids(&deps), vec!["lib-a@1.0.0", "lib-b@2.0.0"]);
    }

    #[test]
    fn test_plan_unavailable_when_generation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeCabal::new(None);

        let err = CabalAnalyzer::new(&runner).analyze(dir.path()).unwrap_err();

        assert!(matches!(err, AnalyzeError::PlanUnavailable { .. }));
    }

    #[test]
    fn test_plan_unavailable_when_generation_writes_nothing() {
        struct Silent;
        impl Runner for Silent {
            fn run(&self, _cmd: &Cmd<'_>) -> Result<String> {
                Ok(String::new())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let err = CabalAnalyzer::new(&Silent).analyze(dir.path()).unwrap_err();

        match err {
            AnalyzeError::PlanUnavailable { path, reason } => {
                assert!(path.ends_with(CABAL_PLAN_REL_PATH));
                assert!(reason.contains("did not write a plan"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_plan_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        write_plan(dir.path(), r#"{ "install-plan": [ { "id": "x" } ] }"#);
        let runner = FakeCabal::new(None);

        let err = CabalAnalyzer::new(&runner).analyze(dir.path()).unwrap_err();

        assert!(matches!(err, AnalyzeError::PlanDecode { .. }));
    }
}
