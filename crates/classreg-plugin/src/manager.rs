// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest loader that populates the class registry.
//!
//! `PluginManager` owns the configured manifest sources and a
//! [`ManifestReader`]. Reloading clears the registry and re-reads every source;
//! a source that fails is logged and skipped, the rest still load.

use std::path::{Path, PathBuf};

use classreg_config::model::ManifestConfig;
use classreg_core::ClassRegError;
use tracing::{debug, info, warn};

use crate::manifest::{ManifestReader, TomlManifestReader, MANIFEST_EXTENSION};
use crate::paths::path_list_from_env;
use crate::registry::ClassRegistry;

pub use classreg_config::model::DEFAULT_DISCOVERY_ENV;

/// Outcome of a manifest reload.
#[derive(Debug, Default)]
pub struct ReloadStats {
    /// Number of manifest files read successfully.
    pub sources: usize,
    /// Number of class records inserted (before last-write-wins deduplication).
    pub classes: usize,
    /// Sources that could not be read or parsed.
    pub failed: Vec<ClassRegError>,
}

impl ReloadStats {
    /// Returns true if every source loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry plus the manifest sources it is built from.
pub struct PluginManager {
    registry: ClassRegistry,
    manifest_paths: Vec<PathBuf>,
    auto_discover: bool,
    discovery_env: String,
    reader: Box<dyn ManifestReader>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("classes", &self.registry.len())
            .field("manifest_paths", &self.manifest_paths)
            .field("auto_discover", &self.auto_discover)
            .field("discovery_env", &self.discovery_env)
            .finish()
    }
}

impl PluginManager {
    /// Create a manager reading TOML manifests and load them immediately.
    pub fn new<I, P>(manifest_paths: I, auto_discover: bool) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_reader(manifest_paths, auto_discover, Box::new(TomlManifestReader))
    }

    /// Create a manager with a custom manifest reader and load immediately.
    pub fn with_reader<I, P>(
        manifest_paths: I,
        auto_discover: bool,
        reader: Box<dyn ManifestReader>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::build(
            manifest_paths.into_iter().map(Into::into).collect(),
            auto_discover,
            DEFAULT_DISCOVERY_ENV,
            reader,
        )
    }

    /// Create a manager from the `[manifest]` configuration section and load immediately.
    pub fn from_config(config: &ManifestConfig) -> Self {
        Self::build(
            config.paths.iter().map(PathBuf::from).collect(),
            config.auto_discover,
            &config.discovery_env,
            Box::new(TomlManifestReader),
        )
    }

    fn build(
        manifest_paths: Vec<PathBuf>,
        auto_discover: bool,
        discovery_env: &str,
        reader: Box<dyn ManifestReader>,
    ) -> Self {
        let mut manager = Self {
            registry: ClassRegistry::new(),
            manifest_paths,
            auto_discover,
            discovery_env: discovery_env.to_string(),
            reader,
        };
        manager.reload_manifests();
        manager
    }

    /// Use a different environment variable for auto-discovery. Does not reload.
    pub fn set_discovery_env(&mut self, var: impl Into<String>) {
        self.discovery_env = var.into();
    }

    /// Replace the configured manifest sources. Does not reload.
    pub fn override_manifest_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.manifest_paths = paths.into_iter().map(Into::into).collect();
    }

    /// The configured manifest sources (files or directories).
    pub fn manifest_paths(&self) -> &[PathBuf] {
        &self.manifest_paths
    }

    /// Whether sources from the discovery variable are added on reload.
    pub fn auto_discover(&self) -> bool {
        self.auto_discover
    }

    /// Clear the registry and re-read every configured source.
    pub fn reload_manifests(&mut self) -> ReloadStats {
        self.registry.clear();
        let mut stats = ReloadStats::default();

        for source in self.sources() {
            let files = match manifest_files(&source) {
                Ok(files) => files,
                Err(err) => {
                    warn!(error = %err, "skipping manifest source");
                    stats.failed.push(err);
                    continue;
                }
            };

            for file in files {
                match self.reader.read(&file) {
                    Ok(records) => {
                        debug!(path = %file.display(), classes = records.len(), "read manifest");
                        stats.sources += 1;
                        stats.classes += records.len();
                        self.registry.extend(records);
                    }
                    Err(err) => {
                        warn!(error = %err, "skipping manifest");
                        stats.failed.push(err);
                    }
                }
            }
        }

        info!(
            sources = stats.sources,
            classes = self.registry.len(),
            failed = stats.failed.len(),
            "class registry loaded"
        );
        stats
    }

    /// Explicit sources followed by discovered ones.
    fn sources(&self) -> Vec<PathBuf> {
        let mut sources = self.manifest_paths.clone();
        if self.auto_discover {
            let discovered = path_list_from_env(&self.discovery_env);
            debug!(var = %self.discovery_env, count = discovered.len(), "discovered manifest directories");
            sources.extend(discovered.into_iter().map(PathBuf::from));
        }
        sources
    }

    /// Read-only access to the class registry.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Mutable access to the class registry.
    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }
}

/// Expand a manifest source into the files to read.
///
/// Directories contribute their `*.toml` files in name order (non-recursive).
fn manifest_files(source: &Path) -> Result<Vec<PathBuf>, ClassRegError> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        return Err(ClassRegError::Manifest {
            path: source.to_path_buf(),
            message: "source does not exist".to_string(),
        });
    }

    let entries = std::fs::read_dir(source).map_err(|e| ClassRegError::Manifest {
        path: source.to_path_buf(),
        message: format!("cannot read directory: {e}"),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                warn!(dir = %source.display(), error = %err, "failed to read directory entry");
                None
            }
        })
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(MANIFEST_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VECTOR_MANIFEST: &str = r#"
[[class]]
name = "envire::VectorPlugin"
base_class = "envire::core::ItemBase"
library = "envire_vector_plugin"
associated_classes = ["Eigen::Vector3d"]

[[class]]
name = "envire::FakePlugin"
base_class = "envire::core::ItemBase"
library = "envire_vector_plugin"
"#;

    const STRING_MANIFEST: &str = r#"
[[class]]
name = "envire::StringPlugin"
base_class = "envire::core::ItemBase"
library = "envire_string_plugin"
singleton = true
"#;

    fn manifest_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vector.toml"), VECTOR_MANIFEST).unwrap();
        fs::write(dir.path().join("string.toml"), STRING_MANIFEST).unwrap();
        fs::write(dir.path().join("README.md"), "not a manifest").unwrap();
        dir
    }

    #[test]
    fn loads_every_manifest_in_a_directory() {
        let dir = manifest_dir();
        let manager = PluginManager::new([dir.path()], false);
        assert_eq!(manager.registry().len(), 3);
        assert_eq!(
            manager.registry().class_library("StringPlugin"),
            Some("envire_string_plugin")
        );
    }

    #[test]
    fn loads_a_single_manifest_file() {
        let dir = manifest_dir();
        let manager = PluginManager::new([dir.path().join("string.toml")], false);
        assert_eq!(manager.registry().available_classes(), vec!["envire::StringPlugin"]);
    }

    #[test]
    fn reload_restores_cleared_registry() {
        let dir = manifest_dir();
        let mut manager = PluginManager::new([dir.path()], false);
        let before = manager.registry().clone();

        manager.registry_mut().clear();
        assert!(manager.registry().available_classes().is_empty());

        let stats = manager.reload_manifests();
        assert!(stats.is_complete());
        assert_eq!(stats.sources, 2);
        assert_eq!(manager.registry(), &before);

        manager.reload_manifests();
        assert_eq!(manager.registry(), &before);
    }

    #[test]
    fn override_does_not_reload() {
        let dir = manifest_dir();
        let mut manager = PluginManager::new([dir.path()], false);
        manager.override_manifest_paths([dir.path().join("string.toml")]);
        assert_eq!(manager.registry().len(), 3);
        manager.reload_manifests();
        assert_eq!(manager.registry().len(), 1);
    }

    #[test]
    fn broken_source_does_not_abort_the_load() {
        let dir = manifest_dir();
        fs::write(dir.path().join("broken.toml"), "[[class]]\nname = 3\n").unwrap();
        let missing = dir.path().join("missing");

        let mut manager = PluginManager::new([missing, dir.path().to_path_buf()], false);
        assert_eq!(manager.registry().len(), 3);

        let stats = manager.reload_manifests();
        assert_eq!(stats.failed.len(), 2);
        assert_eq!(stats.sources, 2);
        assert!(stats.failed.iter().all(ClassRegError::is_recoverable));
    }

    #[test]
    fn later_sources_override_earlier_ones() {
        let first = manifest_dir();
        let second = tempfile::tempdir().unwrap();
        fs::write(
            second.path().join("override.toml"),
            r#"
[[class]]
name = "envire::StringPlugin"
base_class = "envire::core::ItemBase"
library = "envire_string_plugin_v2"
"#,
        )
        .unwrap();

        let manager = PluginManager::new([first.path(), second.path()], false);
        assert_eq!(
            manager.registry().class_library("envire::StringPlugin"),
            Some("envire_string_plugin_v2")
        );
        assert_eq!(manager.registry().singleton_flag("envire::StringPlugin"), Some(false));
    }
}
