// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::{ClassRegConfig, LOG_LEVELS};

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &ClassRegConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        let hint = suggest_key(&level, LOG_LEVELS)
            .map(|s| format!(" (did you mean `{s}`?)"))
            .unwrap_or_default();
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}{hint}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    check_env_var_name("loader.library_path_env", &config.loader.library_path_env, &mut errors);
    if config.manifest.auto_discover {
        check_env_var_name("manifest.discovery_env", &config.manifest.discovery_env, &mut errors);
    }

    for (i, path) in config.loader.library_paths.iter().enumerate() {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("loader.library_paths[{i}] must not be empty"),
            });
        }
    }

    for (i, path) in config.manifest.paths.iter().enumerate() {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("manifest.paths[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_env_var_name(key: &str, name: &str, errors: &mut Vec<ConfigError>) {
    if name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} must not be empty"),
        });
    } else if name.contains('=') || name.contains(char::is_whitespace) {
        errors.push(ConfigError::Validation {
            message: format!("{key} `{name}` is not a valid environment variable name"),
        });
    }
}
