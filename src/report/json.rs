use anyhow::Result;
use serde::Serialize;

use crate::analyzer::Strategy;
use crate::models::{Deps, PackageId};

/// JSON shape of a dependency graph. The transitive map is flattened to its
/// keys since JSON objects cannot be keyed by structured identities.
#[derive(Debug, Serialize)]
struct GraphReport<'a> {
    strategy: String,
    direct: Vec<&'a PackageId>,
    transitive: Vec<&'a PackageId>,
}

pub fn to_json(deps: &Deps, strategy: Strategy) -> Result<String> {
    let report = GraphReport {
        strategy: strategy.to_string(),
        direct: deps.direct.iter().map(|i| &i.resolved).collect(),
        transitive: deps.transitive.values().map(|p| &p.id).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render(deps: &Deps, strategy: Strategy) -> Result<()> {
    println!("{}", to_json(deps, strategy)?);
    Ok(())
}
