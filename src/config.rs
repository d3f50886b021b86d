use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::analyzer::Strategy;

/// Root configuration structure, deserialized from `.hsdeps/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub haskell: HaskellOptions,
}

/// Options for Haskell dependency extraction.
#[derive(Debug, Default, Deserialize)]
pub struct HaskellOptions {
    /// `"cabal-install"` or `"stack"`. Kept as a string so an unknown value is
    /// reported as an unknown strategy rather than a TOML syntax error.
    pub strategy: Option<String>,
}

impl Config {
    /// The configured strategy, if any.
    pub fn strategy(&self) -> crate::error::Result<Option<Strategy>> {
        self.haskell
            .strategy
            .as_deref()
            .map(str::parse::<Strategy>)
            .transpose()
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.hsdeps/config.toml`
/// 3. `~/.config/hsdeps/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".hsdeps").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("hsdeps").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    tracing::debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
