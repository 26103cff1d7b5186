// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Output goes to the supplied writer so commands can be tested without a terminal.

#![allow(unused_assignments)] // generated by miette's Diagnostic derive

use std::io::{self, Write};

use classreg_plugin::{library_file_name, PluginLoader};
use miette::Diagnostic;
use thiserror::Error;

use crate::Commands;

#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    #[error("unknown class `{0}`")]
    #[diagnostic(
        code(classreg::unknown_class),
        help("run `classreg list` to see the registered classes")
    )]
    UnknownClass(String),

    #[error("library `{library}` of class {class_name} not found")]
    #[diagnostic(
        code(classreg::library_not_found),
        help("looked for {file_name} in: {searched}")
    )]
    LibraryNotFound {
        class_name: String,
        library: String,
        file_name: String,
        searched: String,
    },

    #[error("failed to write output")]
    #[diagnostic(code(classreg::io))]
    Io(#[from] io::Error),
}

/// Run `command` against `loader`, writing results to `out`.
pub fn run(command: &Commands, loader: &PluginLoader, out: &mut impl Write) -> Result<(), CommandError> {
    match command {
        Commands::List { base } => list(loader, base.as_deref(), out),
        Commands::Info { class } => info(loader, class, out),
        Commands::Libraries => libraries(loader, out),
        Commands::Locate { class } => locate(loader, class, out),
    }
}

fn list(loader: &PluginLoader, base: Option<&str>, out: &mut impl Write) -> Result<(), CommandError> {
    let registry = loader.manager().registry();
    let classes = match base {
        Some(base) => registry.available_classes_of(base),
        None => registry.available_classes(),
    };
    for class in classes {
        writeln!(out, "{class}")?;
    }
    Ok(())
}

fn info(loader: &PluginLoader, class: &str, out: &mut impl Write) -> Result<(), CommandError> {
    let record = loader
        .manager()
        .registry()
        .get(class)
        .ok_or_else(|| CommandError::UnknownClass(class.to_string()))?;

    let associated = match &record.associated_classes {
        Some(classes) if classes.is_empty() => "(none)".to_string(),
        Some(classes) => classes.join(", "),
        None => "(not declared)".to_string(),
    };

    writeln!(out, "name:        {}", record.name)?;
    writeln!(out, "base class:  {}", record.base_class_name)?;
    writeln!(out, "library:     {}", record.library_name)?;
    writeln!(out, "singleton:   {}", record.is_singleton)?;
    writeln!(out, "associated:  {associated}")?;
    Ok(())
}

fn libraries(loader: &PluginLoader, out: &mut impl Write) -> Result<(), CommandError> {
    for library in loader.manager().registry().registered_libraries() {
        writeln!(out, "{library}")?;
    }
    Ok(())
}

fn locate(loader: &PluginLoader, class: &str, out: &mut impl Write) -> Result<(), CommandError> {
    let record = loader
        .manager()
        .registry()
        .get(class)
        .ok_or_else(|| CommandError::UnknownClass(class.to_string()))?;

    let found = loader.locate_library(&record.library_name);
    if found.is_empty() {
        let searched: Vec<String> = loader.library_paths().iter().cloned().collect();
        return Err(CommandError::LibraryNotFound {
            class_name: record.name.clone(),
            library: record.library_name.clone(),
            file_name: library_file_name(&record.library_name),
            searched: if searched.is_empty() {
                "(no search paths)".to_string()
            } else {
                searched.join(", ")
            },
        });
    }

    for path in found {
        writeln!(out, "{}", path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classreg_plugin::PluginManager;

    const MANIFEST: &str = r#"
[[class]]
name = "envire::VectorPlugin"
base_class = "envire::core::ItemBase"
library = "envire_vector_plugin"
associated_classes = ["Eigen::Vector3d"]

[[class]]
name = "envire::FakePlugin"
base_class = "envire::core::ItemBase"
library = "envire_vector_plugin"

[[class]]
name = "envire::Frame"
base_class = "envire::core::FrameBase"
library = "envire_core"
singleton = true
"#;

    struct Fixture {
        dir: tempfile::TempDir,
        loader: PluginLoader,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("envire.toml"), MANIFEST).unwrap();
        let manager = PluginManager::new([dir.path()], false);
        let mut loader = PluginLoader::new(manager);
        loader.clear_library_paths();
        Fixture { dir, loader }
    }

    fn output(command: Commands, loader: &PluginLoader) -> Result<String, CommandError> {
        let mut buf = Vec::new();
        run(&command, loader, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn list_prints_classes_in_name_order() {
        let fx = fixture();
        let out = output(Commands::List { base: None }, &fx.loader).unwrap();
        assert_eq!(out, "envire::FakePlugin\nenvire::Frame\nenvire::VectorPlugin\n");
    }

    #[test]
    fn list_filters_by_base_class() {
        let fx = fixture();
        let out = output(
            Commands::List {
                base: Some("envire::core::FrameBase".into()),
            },
            &fx.loader,
        )
        .unwrap();
        assert_eq!(out, "envire::Frame\n");
    }

    #[test]
    fn info_shows_the_record() {
        let fx = fixture();
        let out = output(Commands::Info { class: "VectorPlugin".into() }, &fx.loader).unwrap();
        assert!(out.contains("name:        envire::VectorPlugin"));
        assert!(out.contains("library:     envire_vector_plugin"));
        assert!(out.contains("associated:  Eigen::Vector3d"));

        let out = output(Commands::Info { class: "envire::FakePlugin".into() }, &fx.loader).unwrap();
        assert!(out.contains("associated:  (not declared)"));
    }

    #[test]
    fn info_of_unknown_class_fails() {
        let fx = fixture();
        let err = output(Commands::Info { class: "Nope".into() }, &fx.loader).unwrap_err();
        assert!(matches!(err, CommandError::UnknownClass(name) if name == "Nope"));
    }

    #[test]
    fn libraries_are_deduplicated() {
        let fx = fixture();
        let out = output(Commands::Libraries, &fx.loader).unwrap();
        assert_eq!(out, "envire_core\nenvire_vector_plugin\n");
    }

    #[test]
    fn locate_prints_existing_files() {
        let mut fx = fixture();
        let lib_dir = fx.dir.path().join("lib");
        std::fs::create_dir(&lib_dir).unwrap();
        let lib = lib_dir.join(library_file_name("envire_core"));
        std::fs::write(&lib, b"").unwrap();
        fx.loader.add_library_path(lib_dir.to_string_lossy());

        let out = output(Commands::Locate { class: "Frame".into() }, &fx.loader).unwrap();
        assert_eq!(out.trim_end(), lib.display().to_string());
    }

    #[test]
    fn locate_reports_missing_library() {
        let fx = fixture();
        let err = output(Commands::Locate { class: "Frame".into() }, &fx.loader).unwrap_err();
        match err {
            CommandError::LibraryNotFound { library, searched, .. } => {
                assert_eq!(library, "envire_core");
                assert_eq!(searched, "(no search paths)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
