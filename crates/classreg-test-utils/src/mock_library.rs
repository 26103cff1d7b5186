// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory library backend for deterministic tests.
//!
//! `MockLibraryOpener` maps library file names (e.g. `libfoo.so`) to export
//! tables. Behavior set for a full path takes precedence over the file name,
//! so one search directory can fail while another succeeds. Clones share state, so a test can keep a handle after giving one
//! to a `PluginLoader` and inspect the recorded open attempts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use classreg_core::ClassRegError;
use classreg_plugin::{ClassExports, ClassLibrary, LibraryOpener};

#[derive(Clone)]
enum Behavior {
    Open(Arc<ClassExports>),
    Closed(Arc<ClassExports>),
    Fail(String),
}

#[derive(Default)]
struct State {
    libraries: HashMap<String, Behavior>,
    paths: HashMap<PathBuf, Behavior>,
    attempts: Vec<PathBuf>,
}

/// A library "opened" by [`MockLibraryOpener`].
#[derive(Debug)]
pub struct MockLibrary {
    path: PathBuf,
    exports: Arc<ClassExports>,
    open: bool,
}

impl ClassLibrary for MockLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn exports(&self) -> &ClassExports {
        &self.exports
    }
}

/// Library opener backed by in-memory export tables.
#[derive(Clone, Default)]
pub struct MockLibraryOpener {
    state: Arc<Mutex<State>>,
}

impl MockLibraryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `exports` for files named `file_name`.
    pub fn with_library(self, file_name: impl Into<String>, exports: ClassExports) -> Self {
        self.set(file_name, Behavior::Open(Arc::new(exports)));
        self
    }

    /// Fail every open of `file_name` with `message`.
    pub fn with_failure(self, file_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.set(file_name, Behavior::Fail(message.into()));
        self
    }

    /// Open `file_name` successfully but report the library as not loaded.
    pub fn with_closed_library(self, file_name: impl Into<String>, exports: ClassExports) -> Self {
        self.set(file_name, Behavior::Closed(Arc::new(exports)));
        self
    }

    /// Fail opens of exactly `path` with `message`, whatever its file name serves elsewhere.
    pub fn fail_path(&self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.lock()
            .paths
            .insert(path.into(), Behavior::Fail(message.into()));
    }

    /// Every path passed to `open`, in call order.
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.lock().attempts.clone()
    }

    /// Number of open attempts for files named `file_name`.
    pub fn open_count(&self, file_name: &str) -> usize {
        self.lock()
            .attempts
            .iter()
            .filter(|path| path.file_name().and_then(|n| n.to_str()) == Some(file_name))
            .count()
    }

    fn set(&self, file_name: impl Into<String>, behavior: Behavior) {
        self.lock().libraries.insert(file_name.into(), behavior);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LibraryOpener for MockLibraryOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn ClassLibrary>, ClassRegError> {
        let mut state = self.lock();
        state.attempts.push(path.to_path_buf());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let library = |exports: Arc<ClassExports>, open: bool| {
            Arc::new(MockLibrary {
                path: path.to_path_buf(),
                exports,
                open,
            }) as Arc<dyn ClassLibrary>
        };

        let behavior = state
            .paths
            .get(path)
            .or_else(|| state.libraries.get(&file_name))
            .cloned();
        match behavior {
            Some(Behavior::Open(exports)) => Ok(library(exports, true)),
            Some(Behavior::Closed(exports)) => Ok(library(exports, false)),
            Some(Behavior::Fail(message)) => Err(ClassRegError::LibraryOpen {
                path: path.to_path_buf(),
                message,
            }),
            None => Err(ClassRegError::LibraryOpen {
                path: path.to_path_buf(),
                message: "no mock library registered".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_attempts_and_serves_exports() {
        let opener = MockLibraryOpener::new().with_library("libdemo.so", ClassExports::new());
        let handle = opener.clone();

        let library = opener.open(Path::new("/lib/libdemo.so")).unwrap();
        assert!(library.is_open());
        assert_eq!(library.path(), Path::new("/lib/libdemo.so"));
        assert_eq!(handle.open_count("libdemo.so"), 1);
    }

    #[test]
    fn unknown_and_failing_files_are_errors() {
        let opener = MockLibraryOpener::new().with_failure("libbad.so", "bad ELF header");
        assert!(opener.open(Path::new("/lib/libbad.so")).is_err());
        assert!(opener.open(Path::new("/lib/libother.so")).is_err());
        assert_eq!(opener.attempts().len(), 2);
    }

    #[test]
    fn path_behavior_overrides_file_name() {
        let opener = MockLibraryOpener::new().with_library("libdemo.so", ClassExports::new());
        opener.fail_path("/first/libdemo.so", "truncated file");

        let Err(err) = opener.open(Path::new("/first/libdemo.so")) else {
            panic!("overridden path should fail");
        };
        assert!(err.to_string().contains("truncated file"));
        assert!(opener.open(Path::new("/second/libdemo.so")).is_ok());
    }

    #[test]
    fn closed_library_reports_not_open() {
        let opener =
            MockLibraryOpener::new().with_closed_library("libdemo.so", ClassExports::new());
        let library = opener.open(Path::new("/lib/libdemo.so")).unwrap();
        assert!(!library.is_open());
    }
}
