// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loads the `classreg-fixture-plugin` shared library through `libloading`.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use classreg_plugin::{
    library_file_name, ClassLibrary, DylibLibrary, DylibOpener, LibraryOpener, PluginLoader,
    PluginManager,
};
use classreg_test_utils::fixtures::{FIXTURE_LIBRARY, FIXTURE_MANIFEST, FLOAT_PLUGIN, STRING_PLUGIN};
use classreg_test_utils::{BaseClass, FloatPlugin, StringPlugin};

/// Cargo builds the fixture's cdylib next to the test binary's dependencies.
fn built_fixture_library() -> PathBuf {
    let prefix = "libclassreg_fixture_plugin";
    let suffix = format!(".{}", std::env::consts::DLL_EXTENSION);
    let exe = std::env::current_exe().unwrap();
    let deps = exe.parent().unwrap();

    [deps.to_path_buf(), deps.join("deps")]
        .iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flatten()
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(prefix) && name.ends_with(&suffix)
        })
        .max_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok())
        .map(|entry| entry.path())
        .unwrap_or_else(|| panic!("fixture plugin library not built next to {}", exe.display()))
}

/// Copy the built library into `dir` under the name the loader searches for.
fn install_fixture_library(dir: &Path) -> PathBuf {
    let target = dir.join(library_file_name(FIXTURE_LIBRARY));
    std::fs::copy(built_fixture_library(), &target).unwrap();
    target
}

#[test]
fn opens_a_built_plugin_library() {
    let dir = tempfile::tempdir().unwrap();
    let path = install_fixture_library(dir.path());

    let library: Arc<dyn ClassLibrary> = DylibOpener.open(&path).unwrap();
    assert_eq!(library.path(), path.as_path());
    assert!(library.is_open());
    assert!(library.has_class::<dyn BaseClass>(STRING_PLUGIN));
    assert!(library.has_class::<dyn BaseClass>(FLOAT_PLUGIN));
    assert!(!library.has_class::<dyn BaseClass>("classreg::MissingPlugin"));

    let instance = library.instantiate::<dyn BaseClass>(STRING_PLUGIN).unwrap();
    instance.set_time(7);
    assert_eq!(instance.time(), 7);
}

#[test]
fn export_table_lists_the_fixture_classes() {
    let dir = tempfile::tempdir().unwrap();
    let path = install_fixture_library(dir.path());

    let library = DylibLibrary::open(&path).unwrap();
    let mut names = library.exports().class_names();
    names.sort_unstable();
    assert_eq!(names, vec![FLOAT_PLUGIN, STRING_PLUGIN]);
}

#[test]
fn loader_instantiates_from_a_built_plugin_library() {
    let root = tempfile::tempdir().unwrap();
    let manifests = root.path().join("manifests");
    let lib = root.path().join("lib");
    std::fs::create_dir_all(&manifests).unwrap();
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(manifests.join("fixtures.toml"), FIXTURE_MANIFEST).unwrap();
    install_fixture_library(&lib);

    let mut loader = PluginLoader::new(PluginManager::new([&manifests], false));
    loader.add_library_path(lib.to_string_lossy());

    let string = loader
        .create_instance_as::<StringPlugin, dyn BaseClass>("StringPlugin")
        .unwrap()
        .unwrap();
    string.set_data("from a shared library");
    assert_eq!(string.data(), "from a shared library");
    assert!(loader.is_library_loaded(FIXTURE_LIBRARY));

    let first = loader
        .create_instance_as::<FloatPlugin, dyn BaseClass>("FloatPlugin")
        .unwrap()
        .unwrap();
    let second = loader
        .create_instance_as::<FloatPlugin, dyn BaseClass>("FloatPlugin")
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.loaded_libraries().len(), 1);
}
