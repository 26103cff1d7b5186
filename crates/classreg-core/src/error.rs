// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the classreg plugin registry.

use std::any::TypeId;
use std::path::PathBuf;

use thiserror::Error;

/// The error type used across the registry, manifest loader, and instantiation engine.
///
/// Every variant except [`ClassRegError::DownCast`] describes an ordinary
/// "plugin not available" condition that callers are expected to branch on.
#[derive(Debug, Error)]
pub enum ClassRegError {
    /// The class name is not present in the registry.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// The library search set is empty.
    #[error("no library search paths configured; set {env_var} or add a library path")]
    NoLibraryPaths { env_var: String },

    /// No candidate library file exists under any search path.
    #[error("library `{library}` for class {class_name} not found in any search path")]
    LibraryNotFound {
        library: String,
        class_name: String,
        searched: Vec<PathBuf>,
    },

    /// The dynamic-loading collaborator failed to open one library file.
    #[error("failed to open library {}: {message}", path.display())]
    LibraryOpen { path: PathBuf, message: String },

    /// Candidate files existed but none of them could be opened.
    #[error("failed to load library `{library}` for class {class_name}")]
    LibraryLoad {
        library: String,
        class_name: String,
        failed: Vec<PathBuf>,
    },

    /// The loaded library cannot construct the requested interface under any name variant.
    #[error("class {class_name} is not available as {interface} in library `{library}`")]
    ClassNotAvailable {
        class_name: String,
        library: String,
        interface: &'static str,
    },

    /// A cached singleton was stored under a different interface type.
    #[error("singleton {class_name} was not created as {interface}")]
    SingletonTypeMismatch {
        class_name: String,
        interface: &'static str,
    },

    /// A manifest source could not be read or parsed.
    #[error("manifest error in {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// The instance does not have the requested concrete type.
    #[error(transparent)]
    DownCast(#[from] DownCastError),
}

impl ClassRegError {
    /// Returns false only for contract violations that indicate a metadata or usage bug.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClassRegError::DownCast(_))
    }
}

/// A base-interface instance could not be converted to the requested concrete type.
///
/// Raised when the manifest declares a class whose implementation is not the
/// derived type the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot downcast instance of class {class_name} from {base} to {derived}")]
pub struct DownCastError {
    /// Class name that was instantiated.
    pub class_name: String,
    /// Type name of the requested concrete type.
    pub derived: &'static str,
    /// Type name of the interface the instance was created as.
    pub base: &'static str,
    /// Type identity of the requested concrete type.
    pub derived_id: TypeId,
    /// Type identity of the interface the instance was created as.
    pub base_id: TypeId,
}

impl DownCastError {
    /// Build the error for a failed `B -> D` conversion.
    pub fn new<D, B>(class_name: impl Into<String>) -> Self
    where
        D: ?Sized + 'static,
        B: ?Sized + 'static,
    {
        Self {
            class_name: class_name.into(),
            derived: std::any::type_name::<D>(),
            base: std::any::type_name::<B>(),
            derived_id: TypeId::of::<D>(),
            base_id: TypeId::of::<B>(),
        }
    }

    /// Returns true if this error was raised for the `B -> D` pair.
    pub fn is_for<D, B>(&self) -> bool
    where
        D: ?Sized + 'static,
        B: ?Sized + 'static,
    {
        self.derived_id == TypeId::of::<D>() && self.base_id == TypeId::of::<B>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape {}

    #[test]
    fn downcast_error_carries_both_type_identities() {
        let err = DownCastError::new::<u32, dyn Shape>("ns::Square");
        assert!(err.is_for::<u32, dyn Shape>());
        assert!(!err.is_for::<u64, dyn Shape>());
        assert_eq!(err.class_name, "ns::Square");
        let msg = err.to_string();
        assert!(msg.contains("u32"), "got: {msg}");
        assert!(msg.contains("Shape"), "got: {msg}");
        assert!(msg.contains("ns::Square"), "got: {msg}");
    }

    #[test]
    fn library_errors_render_paths() {
        let err = ClassRegError::LibraryOpen {
            path: PathBuf::from("/opt/lib/libfoo.so"),
            message: "undefined symbol".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to open library /opt/lib/libfoo.so: undefined symbol"
        );
    }
}
