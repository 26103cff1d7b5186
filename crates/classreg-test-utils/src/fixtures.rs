// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture plugin interface and implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use classreg_core::PluginObject;
use classreg_plugin::ClassExports;

pub const BASE_CLASS: &str = "classreg::BaseClass";
pub const STRING_PLUGIN: &str = "classreg::StringPlugin";
pub const FLOAT_PLUGIN: &str = "classreg::FloatPlugin";
/// Library both fixture plugins live in.
pub const FIXTURE_LIBRARY: &str = "classreg_fixture_plugins";

/// Manifest registering both fixtures. `FloatPlugin` is a singleton.
pub const FIXTURE_MANIFEST: &str = r#"
[[class]]
name = "classreg::StringPlugin"
base_class = "classreg::BaseClass"
library = "classreg_fixture_plugins"

[[class]]
name = "classreg::FloatPlugin"
base_class = "classreg::BaseClass"
library = "classreg_fixture_plugins"
singleton = true
"#;

/// Interface the fixture plugins are created as.
pub trait BaseClass: PluginObject {
    /// Creation timestamp in nanoseconds since the epoch.
    fn time(&self) -> u64;

    fn set_time(&self, time: u64);
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[derive(Debug)]
pub struct StringPlugin {
    time: AtomicU64,
    data: Mutex<String>,
}

impl Default for StringPlugin {
    fn default() -> Self {
        Self {
            time: AtomicU64::new(now_nanos()),
            data: Mutex::new(String::new()),
        }
    }
}

impl StringPlugin {
    pub fn data(&self) -> String {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_data(&self, data: impl Into<String>) {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = data.into();
    }
}

impl BaseClass for StringPlugin {
    fn time(&self) -> u64 {
        self.time.load(Ordering::Relaxed)
    }

    fn set_time(&self, time: u64) {
        self.time.store(time, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct FloatPlugin {
    time: AtomicU64,
    data: Mutex<f64>,
}

impl Default for FloatPlugin {
    fn default() -> Self {
        Self {
            time: AtomicU64::new(now_nanos()),
            data: Mutex::new(0.0),
        }
    }
}

impl FloatPlugin {
    pub fn data(&self) -> f64 {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_data(&self, data: f64) {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = data;
    }
}

impl BaseClass for FloatPlugin {
    fn time(&self) -> u64 {
        self.time.load(Ordering::Relaxed)
    }

    fn set_time(&self, time: u64) {
        self.time.store(time, Ordering::Relaxed);
    }
}

/// Export table of the fixture library. Classes are exported under their qualified names.
pub fn fixture_exports() -> ClassExports {
    let mut exports = ClassExports::new();
    exports
        .register::<dyn BaseClass, _>(STRING_PLUGIN, || {
            Arc::new(StringPlugin::default()) as Arc<dyn BaseClass>
        })
        .register::<dyn BaseClass, _>(FLOAT_PLUGIN, || {
            Arc::new(FloatPlugin::default()) as Arc<dyn BaseClass>
        });
    exports
}
