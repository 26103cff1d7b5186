// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-library backend built on `libloading`.
//!
//! # Plugin entry point
//!
//! Each plugin library exports a constructor for its export table:
//!
//! ```rust,ignore
//! #[unsafe(no_mangle)]
//! pub extern "C" fn classreg_plugin_init() -> *mut classreg_plugin::ClassExports {
//!     let mut exports = classreg_plugin::ClassExports::new();
//!     exports.register::<dyn BaseClass, _>("plugins::StringPlugin", || {
//!         std::sync::Arc::new(StringPlugin::default()) as std::sync::Arc<dyn BaseClass>
//!     });
//!     Box::into_raw(Box::new(exports))
//! }
//! ```
//!
//! # Safety
//!
//! Rust types cross the library boundary, so the plugin must be built with the
//! same toolchain and the same `classreg-core`/`classreg-plugin` versions as the
//! host. Instances must not outlive the [`DylibLibrary`] that created them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use classreg_core::ClassRegError;
use libloading::{Library, Symbol};
use tracing::debug;

use crate::library::{ClassExports, ClassLibrary, LibraryOpener};

/// Symbol every plugin library exports.
pub const PLUGIN_INIT_SYMBOL: &[u8] = b"classreg_plugin_init";

type PluginInit = unsafe extern "C" fn() -> *mut ClassExports;

/// Opens plugin libraries with `libloading`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibOpener;

impl LibraryOpener for DylibOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn ClassLibrary>, ClassRegError> {
        Ok(Arc::new(DylibLibrary::open(path)?))
    }
}

/// A plugin library loaded into the process.
pub struct DylibLibrary {
    path: PathBuf,
    // Dropped before `library` so no factory outlives the code it points into.
    exports: ClassExports,
    library: Library,
}

impl std::fmt::Debug for DylibLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DylibLibrary")
            .field("path", &self.path)
            .field("exports", &self.exports)
            .finish()
    }
}

impl DylibLibrary {
    /// Load the library at `path` and collect its export table.
    pub fn open(path: &Path) -> Result<Self, ClassRegError> {
        let open_error = |message: String| ClassRegError::LibraryOpen {
            path: path.to_path_buf(),
            message,
        };

        // SAFETY: loading runs the library's initializers. The caller vouches for
        // the library being a classreg plugin built against this host.
        let library = unsafe { Library::new(path) }.map_err(|e| open_error(e.to_string()))?;

        let raw = {
            // SAFETY: the symbol type matches the documented entry point signature.
            let init: Symbol<PluginInit> = unsafe { library.get(PLUGIN_INIT_SYMBOL) }
                .map_err(|e| open_error(format!("missing entry point: {e}")))?;
            // SAFETY: the entry point hands over ownership of a boxed export table.
            unsafe { init() }
        };
        if raw.is_null() {
            return Err(open_error("entry point returned no export table".to_string()));
        }
        // SAFETY: `raw` came from `Box::into_raw` in the plugin and is not used again there.
        let exports = *unsafe { Box::from_raw(raw) };

        debug!(path = %path.display(), classes = ?exports.class_names(), "opened plugin library");
        Ok(Self {
            path: path.to_path_buf(),
            exports,
            library,
        })
    }

    /// The underlying `libloading` handle.
    pub fn library(&self) -> &Library {
        &self.library
    }
}

impl ClassLibrary for DylibLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_open(&self) -> bool {
        true
    }

    fn exports(&self) -> &ClassExports {
        &self.exports
    }
}
