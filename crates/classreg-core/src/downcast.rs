// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checked conversion from a base-interface handle to a concrete plugin type.
//!
//! Plugin interfaces are declared as `trait Base: PluginObject`. Because every
//! `Any + Send + Sync` type implements [`PluginObject`], implementors get the
//! capability for free and `Arc<dyn Base>` can later be checked against a
//! concrete type with [`downcast_instance`].

use std::any::Any;
use std::sync::Arc;

use crate::error::DownCastError;

/// Capability every plugin instance carries: erase itself to `dyn Any`.
///
/// The blanket impl also covers smart pointers such as `Arc<dyn Base>`, so call
/// these methods on the pointee (`PluginObject::into_any_arc(handle)`), not with
/// method syntax on the handle.
pub trait PluginObject: Any + Send + Sync {
    /// Convert a shared handle into a type-erased shared handle to the same allocation.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Name of the concrete type behind the handle.
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> PluginObject for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Convert `instance` to its concrete type `D`.
///
/// The returned handle shares ownership with `instance`. Fails with a
/// [`DownCastError`] naming both types and `class_name` if the instance is not a `D`.
pub fn downcast_instance<D, B>(instance: Arc<B>, class_name: &str) -> Result<Arc<D>, DownCastError>
where
    D: Any + Send + Sync,
    B: ?Sized + PluginObject,
{
    <B as PluginObject>::into_any_arc(instance)
        .downcast::<D>()
        .map_err(|_| DownCastError::new::<D, B>(class_name))
}
