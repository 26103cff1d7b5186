// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class registry, manifest loader, and plugin instantiation engine.
//!
//! Plugin classes are declared in TOML manifests and compiled into shared
//! libraries. [`PluginManager`] reads the manifests into a [`ClassRegistry`];
//! [`PluginLoader`] opens the matching libraries on demand and hands out
//! instances typed as the caller's interface.

pub mod dylib;
pub mod library;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod singleton;

pub use dylib::{DylibLibrary, DylibOpener, PLUGIN_INIT_SYMBOL};
pub use library::{ClassExports, ClassLibrary, LibraryOpener};
pub use loader::{library_file_name, PluginLoader};
pub use manager::{PluginManager, ReloadStats, DEFAULT_DISCOVERY_ENV};
pub use manifest::{parse_class_manifest, ManifestReader, TomlManifestReader};
pub use registry::ClassRegistry;
pub use singleton::SingletonCache;
