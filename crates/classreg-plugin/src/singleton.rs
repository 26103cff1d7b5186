// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Type-erased cache of singleton plugin instances.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use classreg_core::ClassRegError;

/// Singleton instances keyed by qualified class name.
///
/// Each entry holds one `Arc<B>` for the interface the instance was first
/// created as. Lookups under any other interface fail instead of reinterpreting.
#[derive(Default)]
pub struct SingletonCache {
    instances: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.instances.keys().collect();
        names.sort();
        f.debug_struct("SingletonCache").field("instances", &names).finish()
    }
}

impl SingletonCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached instance of `class_name`, creating and storing it on first use.
    ///
    /// `create` is only called on a miss; its error is returned unchanged and
    /// nothing is cached.
    pub fn get_or_try_insert<B, F>(
        &mut self,
        class_name: &str,
        create: F,
    ) -> Result<Arc<B>, ClassRegError>
    where
        B: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Result<Arc<B>, ClassRegError>,
    {
        if let Some(cached) = self.instances.get(class_name) {
            return cached
                .downcast_ref::<Arc<B>>()
                .cloned()
                .ok_or_else(|| ClassRegError::SingletonTypeMismatch {
                    class_name: class_name.to_string(),
                    interface: std::any::type_name::<B>(),
                });
        }

        let instance = create()?;
        self.instances
            .insert(class_name.to_string(), Box::new(Arc::clone(&instance)));
        Ok(instance)
    }

    /// Returns true if an instance of `class_name` is cached.
    pub fn contains(&self, class_name: &str) -> bool {
        self.instances.contains_key(class_name)
    }

    /// Drop every cached instance.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Returns the number of cached instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
