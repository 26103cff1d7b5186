// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic-library collaborator interface.
//!
//! A plugin library publishes a [`ClassExports`] table of typed factories.
//! The instantiation engine only talks to libraries through [`LibraryOpener`]
//! and [`ClassLibrary`], so the real `libloading` backend and in-memory test
//! doubles are interchangeable.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use classreg_core::ClassRegError;

type Factory<B> = Box<dyn Fn() -> Arc<B> + Send + Sync>;

/// Factories a plugin library exports, keyed by class name and interface type.
///
/// A class can be exported under several interfaces by registering one
/// factory per interface.
#[derive(Default)]
pub struct ClassExports {
    factories: HashMap<(String, TypeId), Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for ClassExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassExports")
            .field("classes", &self.class_names())
            .finish()
    }
}

impl ClassExports {
    /// Create an empty export table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `class_name` as interface `B`.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use classreg_core::PluginObject;
    /// use classreg_plugin::ClassExports;
    ///
    /// trait Greeter: PluginObject {}
    /// struct Hello;
    /// impl Greeter for Hello {}
    ///
    /// let mut exports = ClassExports::new();
    /// exports.register::<dyn Greeter, _>("demo::Hello", || Arc::new(Hello) as Arc<dyn Greeter>);
    /// assert!(exports.has_class::<dyn Greeter>("demo::Hello"));
    /// ```
    pub fn register<B, F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        B: ?Sized + 'static,
        F: Fn() -> Arc<B> + Send + Sync + 'static,
    {
        let factory: Factory<B> = Box::new(factory);
        self.factories
            .insert((class_name.into(), TypeId::of::<B>()), Box::new(factory));
        self
    }

    /// Returns true if `class_name` can be constructed as interface `B`.
    pub fn has_class<B: ?Sized + 'static>(&self, class_name: &str) -> bool {
        self.factory::<B>(class_name).is_some()
    }

    /// Construct a new instance of `class_name` as interface `B`.
    pub fn instantiate<B: ?Sized + 'static>(&self, class_name: &str) -> Option<Arc<B>> {
        self.factory::<B>(class_name).map(|factory| factory())
    }

    /// Exported class names, sorted and deduplicated.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn factory<B: ?Sized + 'static>(&self, class_name: &str) -> Option<&Factory<B>> {
        self.factories
            .get(&(class_name.to_string(), TypeId::of::<B>()))
            .and_then(|factory| factory.downcast_ref::<Factory<B>>())
    }
}

/// An opened plugin library.
pub trait ClassLibrary: Send + Sync {
    /// File the library was opened from.
    fn path(&self) -> &Path;

    /// Returns true while the library is loaded and usable.
    fn is_open(&self) -> bool;

    /// The library's export table.
    fn exports(&self) -> &ClassExports;
}

impl dyn ClassLibrary {
    /// Returns true if the library can construct `class_name` as interface `B`.
    pub fn has_class<B: ?Sized + 'static>(&self, class_name: &str) -> bool {
        self.exports().has_class::<B>(class_name)
    }

    /// Construct a new instance of `class_name` as interface `B`.
    pub fn instantiate<B: ?Sized + 'static>(&self, class_name: &str) -> Option<Arc<B>> {
        self.exports().instantiate::<B>(class_name)
    }
}

/// Opens library files into [`ClassLibrary`] handles.
pub trait LibraryOpener: Send + Sync {
    /// Open the library at `path`.
    ///
    /// Failures are reported as [`ClassRegError::LibraryOpen`].
    fn open(&self, path: &Path) -> Result<Arc<dyn ClassLibrary>, ClassRegError>;
}
