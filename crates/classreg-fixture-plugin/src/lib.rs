// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixture plugins packaged as a loadable plugin library.
//!
//! Exports `classreg::StringPlugin` and `classreg::FloatPlugin` as
//! `dyn BaseClass` through the standard entry point.

use classreg_plugin::ClassExports;

/// Plugin entry point. Ownership of the table passes to the host.
#[unsafe(no_mangle)]
pub extern "C" fn classreg_plugin_init() -> *mut ClassExports {
    Box::into_raw(Box::new(classreg_test_utils::fixtures::fixture_exports()))
}
