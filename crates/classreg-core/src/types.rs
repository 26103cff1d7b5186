// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class metadata record and namespace helpers.

use serde::{Deserialize, Serialize};

/// Separator between namespace segments in a qualified class name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Metadata describing one plugin class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Fully qualified class name (e.g., "envire::VectorPlugin").
    pub name: String,
    /// Fully qualified name of the interface this class implements.
    pub base_class_name: String,
    /// Logical library name, without directory, `lib` prefix, or extension.
    pub library_name: String,
    /// Whether every instantiation shares one instance.
    pub is_singleton: bool,
    /// Auxiliary type names related to this class.
    ///
    /// `None` when the manifest did not declare the list at all.
    pub associated_classes: Option<Vec<String>>,
}

impl ClassRecord {
    /// Create a non-singleton record with no associated classes.
    pub fn new(
        name: impl Into<String>,
        base_class_name: impl Into<String>,
        library_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_class_name: base_class_name.into(),
            library_name: library_name.into(),
            is_singleton: false,
            associated_classes: None,
        }
    }

    /// Set the singleton policy.
    pub fn singleton(mut self, is_singleton: bool) -> Self {
        self.is_singleton = is_singleton;
        self
    }

    /// Declare the associated class list.
    pub fn with_associated_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    /// The class name with its namespace prefix removed.
    pub fn short_name(&self) -> &str {
        remove_namespace(&self.name)
    }
}

/// Returns true if `class_name` carries a namespace prefix.
pub fn has_namespace(class_name: &str) -> bool {
    class_name.contains(NAMESPACE_SEPARATOR)
}

/// Returns the last namespace segment of `class_name`.
///
/// Names without a namespace are returned unchanged.
pub fn remove_namespace(class_name: &str) -> &str {
    match class_name.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => &class_name[pos + NAMESPACE_SEPARATOR.len()..],
        None => class_name,
    }
}
