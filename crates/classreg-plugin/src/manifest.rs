// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class manifest parsing from TOML.
//!
//! A manifest declares the classes a set of plugin libraries provides:
//!
//! ```toml
//! [[class]]
//! name = "envire::VectorPlugin"
//! base_class = "envire::core::ItemBase"
//! library = "envire_vector_plugin"
//! singleton = false
//! associated_classes = ["Eigen::Vector3d"]
//! ```

use std::path::Path;

use classreg_core::{ClassRecord, ClassRegError};
use serde::Deserialize;

/// File extension of manifest files picked up from manifest directories.
pub const MANIFEST_EXTENSION: &str = "toml";

/// Reads class records from one manifest source.
///
/// The manifest loader only orchestrates; parsing is delegated to a reader
/// so other formats can be plugged in.
pub trait ManifestReader: Send + Sync {
    /// Read every class record declared in the file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<ClassRecord>, ClassRegError>;
}

/// Reader for `[[class]]` TOML manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestReader;

impl ManifestReader for TomlManifestReader {
    fn read(&self, path: &Path) -> Result<Vec<ClassRecord>, ClassRegError> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassRegError::Manifest {
            path: path.to_path_buf(),
            message: format!("cannot read file: {e}"),
        })?;
        parse_class_manifest(&content).map_err(|message| ClassRegError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }
}

// --- TOML intermediate structs ---

/// Top-level structure of a manifest file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    class: Vec<ClassSection>,
}

/// One `[[class]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassSection {
    name: String,
    base_class: String,
    library: String,
    #[serde(default)]
    singleton: bool,
    #[serde(default)]
    associated_classes: Option<Vec<String>>,
}

/// Parse class records from TOML content.
///
/// Rejects records with an empty name, base class, or library. Returns the
/// error message on failure; callers attach the source path.
pub fn parse_class_manifest(toml_content: &str) -> Result<Vec<ClassRecord>, String> {
    let file: ManifestFile =
        toml::from_str(toml_content).map_err(|e| format!("invalid class manifest: {e}"))?;

    file.class
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            for (field, value) in [
                ("name", &section.name),
                ("base_class", &section.base_class),
                ("library", &section.library),
            ] {
                if value.trim().is_empty() {
                    return Err(format!("class #{index}: {field} must not be empty"));
                }
            }
            Ok(ClassRecord {
                name: section.name,
                base_class_name: section.base_class,
                library_name: section.library,
                is_singleton: section.singleton,
                associated_classes: section.associated_classes,
            })
        })
        .collect()
}
