// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the plugin loader.
//!
//! Every section rejects unknown keys so typos surface at startup.

use serde::{Deserialize, Serialize};

/// Variable listing extra manifest directories when auto-discovery is on.
pub const DEFAULT_DISCOVERY_ENV: &str = "CLASSREG_PLUGIN_PATH";

/// Variable the platform's dynamic linker searches for shared libraries.
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_PATH_ENV: &str = "DYLD_LIBRARY_PATH";
#[cfg(windows)]
pub const DEFAULT_LIBRARY_PATH_ENV: &str = "PATH";
#[cfg(not(any(target_os = "macos", windows)))]
pub const DEFAULT_LIBRARY_PATH_ENV: &str = "LD_LIBRARY_PATH";

/// Log levels accepted by `[log] level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level classreg configuration. All sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassRegConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Library search settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Manifest source settings.
    #[serde(default)]
    pub manifest: ManifestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for classreg's own targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where plugin libraries are searched for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Path-list variable seeding the library search set.
    #[serde(default = "default_library_path_env")]
    pub library_path_env: String,

    /// Extra directories added after the variable is read.
    #[serde(default)]
    pub library_paths: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_path_env: default_library_path_env(),
            library_paths: Vec::new(),
        }
    }
}

fn default_library_path_env() -> String {
    DEFAULT_LIBRARY_PATH_ENV.to_string()
}

/// Where class manifests are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest files or directories of `*.toml` manifests, read in order.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Also read the directories listed in `discovery_env`.
    #[serde(default = "default_true")]
    pub auto_discover: bool,

    /// Path-list variable consulted when `auto_discover` is on.
    #[serde(default = "default_discovery_env")]
    pub discovery_env: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            auto_discover: true,
            discovery_env: default_discovery_env(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_discovery_env() -> String {
    DEFAULT_DISCOVERY_ENV.to_string()
}
