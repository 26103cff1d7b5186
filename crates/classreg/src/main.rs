// SPDX-FileCopyrightText: 2026 Classreg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! classreg - inspect plugin manifests and library search paths.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use classreg_config::ClassRegConfig;
use classreg_plugin::PluginLoader;

/// Inspect the classreg plugin registry.
#[derive(Parser, Debug)]
#[command(name = "classreg", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest file or directory; replaces the configured paths. Repeatable.
    #[arg(long = "manifest", global = true)]
    manifests: Vec<String>,

    /// Do not read manifest directories from the discovery variable.
    #[arg(long, global = true)]
    no_discover: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List registered classes.
    List {
        /// Only classes registered with this base class.
        #[arg(long)]
        base: Option<String>,
    },
    /// Show the registry record of a class.
    Info {
        /// Qualified or bare class name.
        class: String,
    },
    /// List the libraries referenced by registered classes.
    Libraries,
    /// Show where the library of a class would be loaded from.
    Locate {
        /// Qualified or bare class name.
        class: String,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => classreg_config::load_and_validate_path(path),
        None => classreg_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            classreg_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);
    apply_overrides(&mut config, &cli);

    let loader = PluginLoader::from_config(&config);
    tracing::debug!(
        classes = loader.manager().registry().len(),
        library_paths = loader.library_paths().len(),
        "plugin loader ready"
    );
    let mut stdout = std::io::stdout().lock();
    commands::run(&cli.command, &loader, &mut stdout)?;
    Ok(())
}

/// Command-line flags take precedence over configuration.
fn apply_overrides(config: &mut ClassRegConfig, cli: &Cli) {
    if !cli.manifests.is_empty() {
        config.manifest.paths = cli.manifests.clone();
    }
    if cli.no_discover {
        config.manifest.auto_discover = false;
    }
}

/// Log to stderr; `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("classreg={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
