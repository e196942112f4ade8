use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(name = "cds", version = env!("CARGO_PKG_VERSION"), about = "Content delivery store", long_about = None, propagate_version = true)]
pub struct App {
    /// Configuration file; missing files fall back to defaults.
    #[arg(short, long, global = true, default_value = "cds.toml")]
    pub config: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "s", name = "serve", about = "Reconcile and validate packages, then serve HTTP")]
    Serve,
    #[command(alias = "b", name = "bootstrap", about = "Extract archives that have no extracted tree")]
    Bootstrap,
    #[command(alias = "c", name = "check", about = "Validate all content packages")]
    Check(CheckArg),
    #[command(alias = "ls", name = "list", about = "List content packages")]
    List,
}

#[derive(Clone, Debug, clap::Args)]
pub struct CheckArg {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}
