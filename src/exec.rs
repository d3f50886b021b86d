use std::path::Path;
use std::process::Command;

use crate::error::{AnalyzeError, Result};

/// An external command to run inside a project directory.
#[derive(Debug, Clone, Copy)]
pub struct Cmd<'a> {
    pub name: &'a str,
    pub argv: &'a [&'a str],
    pub dir: &'a Path,
}

impl Cmd<'_> {
    /// Shell-like rendering used in logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.name)
            .chain(self.argv.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external package manager commands and captures their stdout.
pub trait Runner {
    fn run(&self, cmd: &Cmd<'_>) -> Result<String>;
}

/// [`Runner`] backed by real child processes. Blocks until the child exits.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, cmd: &Cmd<'_>) -> Result<String> {
        let command = cmd.display();
        tracing::debug!(command = %command, dir = %cmd.dir.display(), "running");

        let output = Command::new(cmd.name)
            .args(cmd.argv)
            .current_dir(cmd.dir)
            .output()
            .map_err(|e| AnalyzeError::Invocation {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => output.status.to_string(),
                msg => format!("{}: {}", output.status, msg),
            };
            return Err(AnalyzeError::Invocation { command, reason });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
