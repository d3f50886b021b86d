use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Haskell,
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Haskell => write!(f, "haskell"),
        }
    }
}

/// Identity of a resolved package. Two packages with the same triple are the
/// same package, whichever extractor observed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub revision: String,
}

impl PackageId {
    pub fn haskell(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            ecosystem: Ecosystem::Haskell,
            name: name.into(),
            revision: revision.into(),
        }
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.revision)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
}

/// A dependency declared directly by the analyzed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub resolved: PackageId,
}

/// Normalized dependency graph: direct imports in discovery order plus the
/// transitive set keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deps {
    pub direct: Vec<Import>,
    pub transitive: BTreeMap<PackageId, Package>,
}

impl Deps {
    pub fn add_direct(&mut self, id: PackageId) {
        self.direct.push(Import { resolved: id });
    }

    /// Inserting an identity that is already present is a no-op.
    pub fn add_transitive(&mut self, id: PackageId) {
        self.transitive
            .entry(id.clone())
            .or_insert(Package { id });
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.transitive.is_empty()
    }
}
