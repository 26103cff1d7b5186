// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instantiation engine turning registry entries into live plugin instances.
//!
//! `PluginLoader` resolves a class name to its library through the registry,
//! opens the library on first use, and asks it for an instance of the
//! requested interface. Classes flagged as singletons are created once and
//! shared afterwards.
//!
//! Environment problems (no search paths, missing library, unknown class) are
//! recoverable and come back as [`ClassRegError`]s or `None`. Asking for a
//! concrete type the instance does not have is a contract violation reported
//! as a [`DownCastError`].

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex};

use classreg_config::model::{ClassRegConfig, DEFAULT_LIBRARY_PATH_ENV};
use classreg_core::{
    downcast_instance, has_namespace, remove_namespace, ClassRegError, DownCastError,
    PluginObject,
};
use tracing::{debug, error, info, warn};

use crate::dylib::DylibOpener;
use crate::library::{ClassLibrary, LibraryOpener};
use crate::manager::PluginManager;
use crate::paths::{normalize_dir, path_list_from_env};
use crate::singleton::SingletonCache;

/// File name a logical library name is searched for, e.g. `libfoo.so`.
pub fn library_file_name(library_name: &str) -> String {
    format!("lib{library_name}.{}", std::env::consts::DLL_EXTENSION)
}

static GLOBAL: LazyLock<Mutex<PluginLoader>> = LazyLock::new(|| {
    let config = match classreg_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            warn!(errors = errors.len(), "invalid classreg configuration, using defaults");
            ClassRegConfig::default()
        }
    };
    Mutex::new(PluginLoader::from_config(&config))
});

/// Registry-driven plugin instantiation engine.
pub struct PluginLoader {
    manager: PluginManager,
    opener: Box<dyn LibraryOpener>,
    library_paths: BTreeSet<String>,
    library_path_env: String,
    // Declared before `libraries` so cached instances drop before their code is unloaded.
    singletons: SingletonCache,
    libraries: HashMap<String, Arc<dyn ClassLibrary>>,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("manager", &self.manager)
            .field("library_paths", &self.library_paths)
            .field("libraries", &self.loaded_libraries())
            .field("singletons", &self.singletons)
            .finish()
    }
}

/// Registry entry fields needed to instantiate one class.
struct Resolved {
    class_name: String,
    library_name: String,
    is_singleton: bool,
}

impl PluginLoader {
    /// Process-wide loader built lazily from the layered configuration.
    ///
    /// Prefer owning a `PluginLoader` where possible; the global instance
    /// exists for call sites that cannot be handed one.
    pub fn global() -> &'static Mutex<PluginLoader> {
        &GLOBAL
    }

    /// Create a loader over `manager` that opens real shared libraries.
    ///
    /// The library search set is seeded from the platform library path variable.
    pub fn new(manager: PluginManager) -> Self {
        Self::with_opener(manager, Box::new(DylibOpener))
    }

    /// Create a loader with a custom library backend.
    pub fn with_opener(manager: PluginManager, opener: Box<dyn LibraryOpener>) -> Self {
        Self::build(manager, opener, DEFAULT_LIBRARY_PATH_ENV)
    }

    /// Create a loader from configuration: manifests, search path variable, and extra paths.
    pub fn from_config(config: &ClassRegConfig) -> Self {
        Self::from_config_with_opener(config, Box::new(DylibOpener))
    }

    /// Create a loader from configuration with a custom library backend.
    pub fn from_config_with_opener(
        config: &ClassRegConfig,
        opener: Box<dyn LibraryOpener>,
    ) -> Self {
        let manager = PluginManager::from_config(&config.manifest);
        let mut loader = Self::build(manager, opener, &config.loader.library_path_env);
        for path in &config.loader.library_paths {
            loader.add_library_path(path);
        }
        loader
    }

    fn build(manager: PluginManager, opener: Box<dyn LibraryOpener>, env_var: &str) -> Self {
        let mut loader = Self {
            manager,
            opener,
            library_paths: BTreeSet::new(),
            library_path_env: env_var.to_string(),
            singletons: SingletonCache::new(),
            libraries: HashMap::new(),
        };
        loader.load_library_paths_from_env(env_var);
        loader
    }

    /// Returns true if the class is registered.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.manager.registry().is_class_info_available(class_name)
    }

    /// Returns true if the class is registered with exactly this base class.
    pub fn has_class_of_type(&self, class_name: &str, base_class_name: &str) -> bool {
        self.manager.registry().base_class(class_name) == Some(base_class_name)
    }

    /// Add a directory to the library search set.
    pub fn add_library_path(&mut self, library_path: impl AsRef<str>) {
        let path = normalize_dir(library_path.as_ref());
        if !path.is_empty() {
            self.library_paths.insert(path);
        }
    }

    /// Add every directory listed in the path-list variable `var`.
    ///
    /// Returns the number of entries read. An unset variable adds nothing.
    pub fn load_library_paths_from_env(&mut self, var: &str) -> usize {
        let paths = path_list_from_env(var);
        let count = paths.len();
        self.library_paths.extend(paths);
        debug!(var = %var, count, "library search paths from environment");
        count
    }

    /// Empty the library search set. Already opened libraries stay loaded.
    pub fn clear_library_paths(&mut self) {
        self.library_paths.clear();
    }

    /// The library search set, in search order.
    pub fn library_paths(&self) -> &BTreeSet<String> {
        &self.library_paths
    }

    /// Candidate files for `library_name` that exist on the search path, in search order.
    pub fn locate_library(&self, library_name: &str) -> Vec<PathBuf> {
        self.library_candidates(library_name)
            .into_iter()
            .filter(|path| path.exists())
            .collect()
    }

    /// Returns true if `library_name` has been opened.
    pub fn is_library_loaded(&self, library_name: &str) -> bool {
        self.libraries.contains_key(library_name)
    }

    /// Names of the opened libraries, sorted.
    pub fn loaded_libraries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.libraries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create an instance of `class_name` as interface `B`.
    ///
    /// Returns `None` and logs the cause if the class cannot be instantiated.
    pub fn create_instance<B>(&mut self, class_name: &str) -> Option<Arc<B>>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        self.try_create_instance::<B>(class_name).ok()
    }

    /// Create an instance of `class_name` as interface `B`, reporting the cause on failure.
    ///
    /// The library is opened on first use. If the library does not export the
    /// class under the requested name, a qualified name is retried without its
    /// namespace and a bare name is retried with its registered qualified name.
    pub fn try_create_instance<B>(&mut self, class_name: &str) -> Result<Arc<B>, ClassRegError>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        let result = self.resolve_instance::<B>(class_name);
        if let Err(err) = &result {
            error!(class = %class_name, error = %err, "failed to create plugin instance");
        }
        result
    }

    /// Create an instance of `class_name` as `B` and convert it to the concrete type `D`.
    ///
    /// Returns `Ok(None)` for the recoverable failures of
    /// [`create_instance`](Self::create_instance). Fails with a [`DownCastError`]
    /// if the instance is not a `D`. The returned handle shares ownership with
    /// the created instance.
    pub fn create_instance_as<D, B>(
        &mut self,
        class_name: &str,
    ) -> Result<Option<Arc<D>>, DownCastError>
    where
        D: Any + Send + Sync,
        B: ?Sized + PluginObject,
    {
        let Some(instance) = self.create_instance::<B>(class_name) else {
            return Ok(None);
        };
        downcast_instance::<D, B>(instance, class_name).map(Some)
    }

    /// Drop the loader's reference to every cached singleton.
    ///
    /// The next request for a singleton class creates a new instance.
    pub fn clear_singletons(&mut self) {
        self.singletons.clear();
    }

    /// Returns true if a singleton instance of `class_name` is cached.
    pub fn has_singleton_instance(&self, class_name: &str) -> bool {
        self.manager
            .registry()
            .full_class_name(class_name)
            .is_some_and(|name| self.singletons.contains(name))
    }

    /// The manifest loader and registry.
    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    /// Mutable access to the manifest loader and registry.
    pub fn manager_mut(&mut self) -> &mut PluginManager {
        &mut self.manager
    }

    fn resolve_instance<B>(&mut self, class_name: &str) -> Result<Arc<B>, ClassRegError>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        let resolved = self
            .manager
            .registry()
            .get(class_name)
            .map(|record| Resolved {
                class_name: record.name.clone(),
                library_name: record.library_name.clone(),
                is_singleton: record.is_singleton,
            })
            .ok_or_else(|| ClassRegError::UnknownClass(class_name.to_string()))?;

        let library = self.load_library(class_name, &resolved.library_name)?;

        let mut candidates = vec![class_name.to_string()];
        if has_namespace(class_name) {
            candidates.push(remove_namespace(class_name).to_string());
        } else if resolved.class_name != class_name {
            candidates.push(resolved.class_name.clone());
        }

        let Some(export_name) = candidates
            .into_iter()
            .find(|candidate| library.has_class::<B>(candidate))
        else {
            return Err(ClassRegError::ClassNotAvailable {
                class_name: class_name.to_string(),
                library: resolved.library_name,
                interface: std::any::type_name::<B>(),
            });
        };

        let construct = || {
            library
                .instantiate::<B>(&export_name)
                .ok_or_else(|| ClassRegError::ClassNotAvailable {
                    class_name: export_name.clone(),
                    library: resolved.library_name.clone(),
                    interface: std::any::type_name::<B>(),
                })
        };

        if resolved.is_singleton {
            let cached = self.singletons.contains(&resolved.class_name);
            let instance = self
                .singletons
                .get_or_try_insert::<B, _>(&resolved.class_name, construct)?;
            debug!(class = %resolved.class_name, cached, "singleton instance");
            Ok(instance)
        } else {
            construct()
        }
    }

    /// Return the opened library, opening it from the search path on first use.
    ///
    /// Each failed candidate is warned about here; the overall failure is
    /// logged once by `try_create_instance`.
    fn load_library(
        &mut self,
        class_name: &str,
        library_name: &str,
    ) -> Result<Arc<dyn ClassLibrary>, ClassRegError> {
        if let Some(library) = self.libraries.get(library_name) {
            return Ok(Arc::clone(library));
        }

        if self.library_paths.is_empty() {
            return Err(ClassRegError::NoLibraryPaths {
                env_var: self.library_path_env.clone(),
            });
        }

        let candidates = self.library_candidates(library_name);
        let mut failed = Vec::new();
        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match self.opener.open(path) {
                Ok(library) if library.is_open() => {
                    info!(library = %library_name, path = %path.display(), "loaded plugin library");
                    self.libraries
                        .insert(library_name.to_string(), Arc::clone(&library));
                    return Ok(library);
                }
                Ok(_) => {
                    warn!(path = %path.display(), "plugin library opened but is not loaded");
                    failed.push(path.clone());
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to load library");
                    failed.push(path.clone());
                }
            }
        }

        if failed.is_empty() {
            debug!(library = %library_name, searched = ?candidates, "no candidate library file exists");
            Err(ClassRegError::LibraryNotFound {
                library: library_name.to_string(),
                class_name: class_name.to_string(),
                searched: candidates,
            })
        } else {
            Err(ClassRegError::LibraryLoad {
                library: library_name.to_string(),
                class_name: class_name.to_string(),
                failed,
            })
        }
    }

    /// Every file `library_name` would be looked for at, existing or not.
    pub fn library_candidates(&self, library_name: &str) -> Vec<PathBuf> {
        let file_name = library_file_name(library_name);
        self.library_paths
            .iter()
            .map(|dir| PathBuf::from(dir).join(&file_name))
            .collect()
    }
}
