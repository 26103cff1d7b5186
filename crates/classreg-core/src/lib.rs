// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the classreg plugin registry.
//!
//! This crate provides the class metadata record, the namespace helpers used
//! for short/qualified name resolution, the error taxonomy shared by the
//! registry and the instantiation engine, and the checked downcast from a
//! base-interface handle to a concrete plugin type.

pub mod downcast;
pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use downcast::{downcast_instance, PluginObject};
pub use error::{ClassRegError, DownCastError};
pub use types::{has_namespace, remove_namespace, ClassRecord, NAMESPACE_SEPARATOR};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_reg_error_has_all_variants() {
        let _unknown = ClassRegError::UnknownClass("test".into());
        let _no_paths = ClassRegError::NoLibraryPaths {
            env_var: "LD_LIBRARY_PATH".into(),
        };
        let _not_found = ClassRegError::LibraryNotFound {
            library: "lib".into(),
            class_name: "test".into(),
            searched: vec![],
        };
        let _open = ClassRegError::LibraryOpen {
            path: "/tmp/libx.so".into(),
            message: "bad".into(),
        };
        let _load = ClassRegError::LibraryLoad {
            library: "lib".into(),
            class_name: "test".into(),
            failed: vec![],
        };
        let _unavailable = ClassRegError::ClassNotAvailable {
            class_name: "test".into(),
            library: "lib".into(),
            interface: "dyn Base",
        };
        let _mismatch = ClassRegError::SingletonTypeMismatch {
            class_name: "test".into(),
            interface: "dyn Base",
        };
        let _manifest = ClassRegError::Manifest {
            path: "/tmp/a.toml".into(),
            message: "bad".into(),
        };
    }

    #[test]
    fn only_downcast_is_a_contract_violation() {
        let err = ClassRegError::UnknownClass("x".into());
        assert!(err.is_recoverable());

        struct A;
        let base: std::sync::Arc<dyn PluginObject> = std::sync::Arc::new(A);
        let err = downcast_instance::<String, dyn PluginObject>(base, "A").unwrap_err();
        let err = ClassRegError::from(err);
        assert!(!err.is_recoverable());
    }
}
