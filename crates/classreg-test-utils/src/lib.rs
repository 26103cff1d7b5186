// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for classreg integration tests.
//!
//! Everything runs in-process: plugin libraries are simulated by
//! [`MockLibraryOpener`], so tests need no compiled shared objects.
//!
//! # Components
//!
//! - [`fixtures`] - `BaseClass` interface with `StringPlugin` and `FloatPlugin`
//! - [`MockLibraryOpener`] - in-memory library backend that records open attempts
//! - [`TestHarness`] - temp directory with manifests, placeholder libraries, and a loader

pub mod fixtures;
pub mod harness;
pub mod mock_library;

pub use fixtures::{BaseClass, FloatPlugin, StringPlugin};
pub use harness::TestHarness;
pub use mock_library::{MockLibrary, MockLibraryOpener};
