// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for loader integration tests.
//!
//! `TestHarness` lays out a temp directory with a `manifests/` directory and a
//! `lib/` directory of placeholder library files, and builds loaders that
//! read those manifests and open libraries through a [`MockLibraryOpener`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use classreg_plugin::{library_file_name, ClassExports, PluginLoader, PluginManager};
use tempfile::TempDir;

use crate::fixtures::{fixture_exports, FIXTURE_LIBRARY, FIXTURE_MANIFEST};
use crate::mock_library::MockLibraryOpener;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    manifests: Vec<(String, String)>,
    libraries: Vec<(String, ClassExports)>,
    closed: Vec<(String, ClassExports)>,
    failing: Vec<(String, String)>,
    env_paths: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            manifests: Vec::new(),
            libraries: Vec::new(),
            closed: Vec::new(),
            failing: Vec::new(),
            env_paths: false,
        }
    }

    /// Add the fixture manifest and the fixture library.
    pub fn with_fixtures(self) -> Self {
        self.with_manifest("fixtures.toml", FIXTURE_MANIFEST)
            .with_library(FIXTURE_LIBRARY, fixture_exports())
    }

    /// Write a manifest file named `file_name` into the manifest directory.
    pub fn with_manifest(mut self, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        self.manifests.push((file_name.into(), content.into()));
        self
    }

    /// Provide library `name` with `exports`.
    pub fn with_library(mut self, name: impl Into<String>, exports: ClassExports) -> Self {
        self.libraries.push((name.into(), exports));
        self
    }

    /// Provide library `name` as a file that opens but reports itself as not loaded.
    pub fn with_closed_library(mut self, name: impl Into<String>, exports: ClassExports) -> Self {
        self.closed.push((name.into(), exports));
        self
    }

    /// Provide library `name` as a file that fails to open.
    pub fn with_failing_library(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing.push((name.into(), message.into()));
        self
    }

    /// Keep the search paths read from the environment. Off by default.
    pub fn with_env_library_paths(mut self) -> Self {
        self.env_paths = true;
        self
    }

    /// Create the directory layout.
    pub fn build(self) -> io::Result<TestHarness> {
        let dir = TempDir::new()?;
        let manifest_dir = dir.path().join("manifests");
        let library_dir = dir.path().join("lib");
        fs::create_dir_all(&manifest_dir)?;
        fs::create_dir_all(&library_dir)?;

        for (file_name, content) in &self.manifests {
            fs::write(manifest_dir.join(file_name), content)?;
        }

        let mut opener = MockLibraryOpener::new();
        for (name, exports) in self.libraries {
            let file_name = library_file_name(&name);
            fs::write(library_dir.join(&file_name), b"")?;
            opener = opener.with_library(file_name, exports);
        }
        for (name, exports) in self.closed {
            let file_name = library_file_name(&name);
            fs::write(library_dir.join(&file_name), b"")?;
            opener = opener.with_closed_library(file_name, exports);
        }
        for (name, message) in self.failing {
            let file_name = library_file_name(&name);
            fs::write(library_dir.join(&file_name), b"")?;
            opener = opener.with_failure(file_name, message);
        }

        Ok(TestHarness {
            dir,
            manifest_dir,
            library_dir,
            opener,
            env_paths: self.env_paths,
        })
    }
}

/// Temp directory of manifests and placeholder libraries.
pub struct TestHarness {
    dir: TempDir,
    manifest_dir: PathBuf,
    library_dir: PathBuf,
    opener: MockLibraryOpener,
    env_paths: bool,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with only the fixture manifest and library.
    pub fn fixtures() -> io::Result<Self> {
        Self::builder().with_fixtures().build()
    }

    /// A manager reading this harness's manifest directory, without auto-discovery.
    pub fn manager(&self) -> PluginManager {
        PluginManager::new([self.manifest_dir.as_path()], false)
    }

    /// A loader over [`manager`](Self::manager) searching this harness's library directory.
    pub fn loader(&self) -> PluginLoader {
        let mut loader = self.loader_without_paths();
        loader.add_library_path(self.library_dir.to_string_lossy());
        loader
    }

    /// A loader with no library directory added.
    pub fn loader_without_paths(&self) -> PluginLoader {
        let mut loader = PluginLoader::with_opener(self.manager(), Box::new(self.opener.clone()));
        if !self.env_paths {
            loader.clear_library_paths();
        }
        loader
    }

    /// Shared handle to the mock backend used by every loader from this harness.
    pub fn opener(&self) -> &MockLibraryOpener {
        &self.opener
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }
}
