// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class registry holding plugin class metadata.
//!
//! The `ClassRegistry` stores `ClassRecord`s keyed by fully qualified class
//! name. Every query accepts either the qualified name or the bare class name
//! (last namespace segment); see [`ClassRegistry::get`] for the resolution rule.

use std::collections::{BTreeMap, BTreeSet};

use classreg_core::{has_namespace, remove_namespace, ClassRecord};
use tracing::{debug, warn};

/// Registry of plugin class metadata, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRegistry {
    classes: BTreeMap<String, ClassRecord>,
}

impl ClassRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// Register a class. A record with the same name is replaced.
    pub fn register(&mut self, record: ClassRecord) {
        if let Some(previous) = self.classes.insert(record.name.clone(), record) {
            debug!(class = %previous.name, "replaced existing class record");
        }
    }

    /// Look up a record by qualified or bare name.
    ///
    /// An exact key match wins. Otherwise a bare name matches the records whose
    /// last namespace segment equals it; the first in name order is returned
    /// and an ambiguous match is logged. Qualified names only match exactly.
    pub fn get(&self, class_name: &str) -> Option<&ClassRecord> {
        if let Some(record) = self.classes.get(class_name) {
            return Some(record);
        }
        if has_namespace(class_name) {
            return None;
        }

        let mut matches = self
            .classes
            .values()
            .filter(|record| remove_namespace(&record.name) == class_name);
        let first = matches.next()?;
        let others: Vec<&str> = matches.map(|record| record.name.as_str()).collect();
        if !others.is_empty() {
            warn!(
                class = %class_name,
                chosen = %first.name,
                ignored = ?others,
                "ambiguous short class name"
            );
        }
        Some(first)
    }

    /// Returns the fully qualified name registered for `class_name`.
    pub fn full_class_name(&self, class_name: &str) -> Option<&str> {
        self.get(class_name).map(|record| record.name.as_str())
    }

    /// Returns true if a record exists for `class_name`.
    pub fn is_class_info_available(&self, class_name: &str) -> bool {
        self.get(class_name).is_some()
    }

    /// All registered class names.
    pub fn available_classes(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    /// Registered class names whose base class is exactly `base_class_name`.
    ///
    /// An empty filter returns every class.
    pub fn available_classes_of(&self, base_class_name: &str) -> Vec<String> {
        if base_class_name.is_empty() {
            return self.available_classes();
        }
        self.classes
            .values()
            .filter(|record| record.base_class_name == base_class_name)
            .map(|record| record.name.clone())
            .collect()
    }

    /// Base class name of `class_name`.
    pub fn base_class(&self, class_name: &str) -> Option<&str> {
        self.get(class_name)
            .map(|record| record.base_class_name.as_str())
    }

    /// Associated classes of `class_name`.
    ///
    /// Returns `None` for unknown classes and for classes whose manifest did
    /// not declare the list; an explicitly empty list yields `Some(&[])`.
    pub fn associated_classes(&self, class_name: &str) -> Option<&[String]> {
        self.get(class_name)
            .and_then(|record| record.associated_classes.as_deref())
    }

    /// Logical library name implementing `class_name`.
    pub fn class_library(&self, class_name: &str) -> Option<&str> {
        self.get(class_name).map(|record| record.library_name.as_str())
    }

    /// Singleton policy of `class_name`.
    pub fn singleton_flag(&self, class_name: &str) -> Option<bool> {
        self.get(class_name).map(|record| record.is_singleton)
    }

    /// Distinct library names across all records.
    pub fn registered_libraries(&self) -> BTreeSet<String> {
        self.classes
            .values()
            .map(|record| record.library_name.clone())
            .collect()
    }

    /// Remove the record for `class_name`. Returns whether it existed.
    pub fn remove_class_info(&mut self, class_name: &str) -> bool {
        let Some(key) = self.full_class_name(class_name).map(str::to_owned) else {
            return false;
        };
        self.classes.remove(&key).is_some()
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.classes.clear();
    }

    /// Iterate over all records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes.values()
    }

    /// Returns the number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Extend<ClassRecord> for ClassRegistry {
    fn extend<T: IntoIterator<Item = ClassRecord>>(&mut self, iter: T) {
        for record in iter {
            self.register(record);
        }
    }
}

impl FromIterator<ClassRecord> for ClassRegistry {
    fn from_iter<T: IntoIterator<Item = ClassRecord>>(iter: T) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn envire_registry() -> ClassRegistry {
        [
            ClassRecord::new("envire::VectorPlugin", "envire::core::ItemBase", "envire_vector_plugin")
                .with_associated_classes(["Eigen::Vector3d"]),
            ClassRecord::new("envire::FakePlugin", "envire::core::ItemBase", "envire_vector_plugin"),
            ClassRecord::new("envire::StringPlugin", "envire::core::ItemBase", "envire_string_plugin")
                .singleton(true),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lists_all_and_filtered_classes() {
        let registry = envire_registry();
        assert_eq!(
            registry.available_classes(),
            vec!["envire::FakePlugin", "envire::StringPlugin", "envire::VectorPlugin"]
        );
        assert_eq!(registry.available_classes_of("envire::core::ItemBase").len(), 3);
        assert_eq!(registry.available_classes_of("").len(), 3);
        assert!(registry.available_classes_of("envire::core::Other").is_empty());
    }

    #[test]
    fn resolves_short_and_qualified_names() {
        let registry = envire_registry();
        assert!(registry.is_class_info_available("VectorPlugin"));
        assert!(registry.is_class_info_available("envire::FakePlugin"));
        assert!(!registry.is_class_info_available("UnknownPlugin"));
        assert!(!registry.is_class_info_available("other::VectorPlugin"));
        assert_eq!(registry.base_class("VectorPlugin"), Some("envire::core::ItemBase"));
        assert_eq!(
            registry.full_class_name("StringPlugin"),
            Some("envire::StringPlugin")
        );
    }

    #[test]
    fn getters_report_metadata() {
        let registry = envire_registry();
        assert_eq!(
            registry.associated_classes("VectorPlugin"),
            Some(&["Eigen::Vector3d".to_string()][..])
        );
        assert_eq!(registry.associated_classes("FakePlugin"), None);
        assert_eq!(
            registry.class_library("envire::VectorPlugin"),
            Some("envire_vector_plugin")
        );
        assert_eq!(registry.singleton_flag("envire::VectorPlugin"), Some(false));
        assert_eq!(registry.singleton_flag("envire::StringPlugin"), Some(true));
    }

    #[test]
    fn explicitly_empty_associated_classes_is_not_missing() {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassRecord::new("a::Empty", "a::Base", "a").with_associated_classes(Vec::<String>::new()),
        );
        assert_eq!(registry.associated_classes("Empty"), Some(&[][..]));
    }

    #[test]
    fn unknown_names_fail_every_getter() {
        let registry = envire_registry();
        assert_eq!(registry.base_class("UnknownPlugin"), None);
        assert_eq!(registry.associated_classes("UnknownPlugin"), None);
        assert_eq!(registry.class_library("UnknownPlugin"), None);
        assert_eq!(registry.singleton_flag("UnknownPlugin"), None);
        assert_eq!(registry.full_class_name("UnknownPlugin"), None);
    }

    #[test]
    fn registered_libraries_are_distinct() {
        let libs = envire_registry().registered_libraries();
        assert_eq!(libs.len(), 2);
        assert!(libs.contains("envire_vector_plugin"));
        assert!(libs.contains("envire_string_plugin"));
    }

    #[test]
    fn remove_succeeds_exactly_once() {
        let mut registry = envire_registry();
        assert!(registry.remove_class_info("envire::FakePlugin"));
        assert_eq!(registry.len(), 2);
        assert!(!registry.remove_class_info("envire::FakePlugin"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_accepts_short_names() {
        let mut registry = envire_registry();
        assert!(registry.remove_class_info("VectorPlugin"));
        assert!(!registry.is_class_info_available("envire::VectorPlugin"));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut registry = envire_registry();
        registry.clear();
        assert!(registry.is_empty());
        registry.clear();
        assert!(registry.available_classes().is_empty());
    }

    #[test]
    fn reregistration_is_last_write_wins() {
        let mut registry = envire_registry();
        registry.register(
            ClassRecord::new("envire::FakePlugin", "envire::core::Other", "fake_v2").singleton(true),
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.base_class("FakePlugin"), Some("envire::core::Other"));
        assert_eq!(registry.class_library("FakePlugin"), Some("fake_v2"));
    }

    #[test]
    fn ambiguous_short_name_resolves_to_first_in_name_order() {
        let registry: ClassRegistry = [
            ClassRecord::new("zeta::Plugin", "Base", "z"),
            ClassRecord::new("alpha::Plugin", "Base", "a"),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry.full_class_name("Plugin"), Some("alpha::Plugin"));
    }

    proptest! {
        #[test]
        fn registered_names_answer_consistently(
            names in proptest::collection::btree_set("[a-z]{1,6}::[A-Z][a-z]{0,6}", 1..12),
            unknown in "[a-z]{1,6}::[A-Z][a-z]{0,6}",
        ) {
            let registry: ClassRegistry = names
                .iter()
                .map(|name| ClassRecord::new(name.clone(), "ns::Base", "lib"))
                .collect();
            for name in &names {
                prop_assert!(registry.is_class_info_available(name));
                prop_assert_eq!(registry.base_class(name), Some("ns::Base"));
            }
            if !names.contains(&unknown) {
                prop_assert!(!registry.is_class_info_available(&unknown));
                prop_assert_eq!(registry.base_class(&unknown), None);
                prop_assert_eq!(registry.singleton_flag(&unknown), None);
            }
        }
    }
}
