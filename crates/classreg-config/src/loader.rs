// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order, later overriding earlier: `/etc/classreg/classreg.toml`,
//! `~/.config/classreg/classreg.toml`, `./classreg.toml`, then `CLASSREG_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClassRegConfig;

/// Name of the configuration file at every level of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "classreg.toml";

/// Prefix of environment overrides, e.g. `CLASSREG_LOG_LEVEL`.
pub const ENV_PREFIX: &str = "CLASSREG_";

const SECTIONS: &[&str] = &["log", "loader", "manifest"];

/// System-wide configuration file.
pub fn system_config_path() -> PathBuf {
    Path::new("/etc/classreg").join(CONFIG_FILE_NAME)
}

/// Per-user configuration file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("classreg").join(CONFIG_FILE_NAME))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ClassRegConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults. No env overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<ClassRegConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClassRegConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClassRegConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClassRegConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ClassRegConfig::default()))
        .merge(Toml::file(system_config_path()));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Map `CLASSREG_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only variables naming a known section are picked up, so
/// `CLASSREG_PLUGIN_PATH` and similar runtime variables are ignored.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS.iter().find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}").into())
        })
    })
}
