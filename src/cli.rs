// src/cli.rs

//! CLI argument parsing using `clap` (derive feature).

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `pipewright`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipewright",
    version,
    about = "Declarative asset-pipeline task runner with watch and live reload.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Pipewright.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pipewright.toml")]
    pub config: String,

    /// Override the dev server port from [serve].port.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEWRIGHT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print tasks and bindings, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Rebuild the output directory from scratch and exit.
    Build,
    /// Compile once, then serve and watch until interrupted.
    ///
    /// This is also what a bare `pipewright` invocation runs.
    Default,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
