// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary plugin directories for discovery tests.

use std::path::Path;

use tempfile::TempDir;

/// Builds a plugin directory under a fresh temp dir.
///
/// Writes are immediate; the directory is removed when the returned
/// [`TempDir`] drops.
pub struct PluginDirBuilder {
    dir: TempDir,
}

impl PluginDirBuilder {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a publisher manifest at `rel`.
    pub fn publisher(self, rel: &str, name: &str, factory: &str) -> std::io::Result<Self> {
        let content = format!(
            "[plugin]\nname = \"{name}\"\nversion = \"0.1.0\"\ncapability = \"EventPublisher\"\nfactory = \"{factory}\"\n"
        );
        self.raw(rel, &content)
    }

    /// Writes a publisher manifest with a `requires` list.
    pub fn publisher_requiring(
        self,
        rel: &str,
        name: &str,
        factory: &str,
        requires: &[&str],
    ) -> std::io::Result<Self> {
        let requires = requires
            .iter()
            .map(|r| format!("\"{r}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "[plugin]\nname = \"{name}\"\nversion = \"0.1.0\"\ncapability = \"EventPublisher\"\nfactory = \"{factory}\"\nrequires = [{requires}]\n"
        );
        self.raw(rel, &content)
    }

    /// Writes arbitrary content at `rel`, creating parent directories.
    pub fn raw(self, rel: &str, content: &str) -> std::io::Result<Self> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(self)
    }

    pub fn build(self) -> TempDir {
        self.dir
    }
}
