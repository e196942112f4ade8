//! # cds: binary entry point
//!
//! Loads configuration, installs the tracing subscriber and dispatches the
//! CLI command. `serve` reconciles and validates the package root before
//! the listener is bound.

mod cli;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cds_fs::AtomicWriteOptions;
use cds_server::{AppState, ServerConfig};
use cds_store::{ExtractOptions, PackageStore, ValidationReport};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{App, CheckArg, Commands, LogFormat};
use crate::config::Config;

const TRACING_TARGET: &str = "cds";

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();
    init_tracing(app.log_format);

    let config = Config::load(&app.config)
        .with_context(|| format!("failed to load configuration from {}", app.config.display()))?;
    let store = open_store(&config)?;

    match app.cmd {
        Commands::Serve => serve(config, store).await,
        Commands::Bootstrap => {
            for id in store.initialize_packages() {
                println!("{id}");
            }
            Ok(())
        }
        Commands::Check(arg) => check(&store, &arg),
        Commands::List => {
            let mut packages = store.list_packages();
            packages.sort();
            for id in packages {
                println!("{id}");
            }
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn open_store(config: &Config) -> Result<PackageStore> {
    let root = &config.content.path;
    let store = PackageStore::open(root).with_context(|| {
        format!(
            "content directory {} must be an existing directory",
            root.display()
        )
    })?;
    let readonly = std::fs::metadata(root)
        .with_context(|| format!("failed to inspect content directory {}", root.display()))?
        .permissions()
        .readonly();
    if readonly {
        anyhow::bail!("content directory {} is not writable", root.display());
    }

    let options = match config.content.max_extracted_bytes {
        Some(limit) => ExtractOptions::default().max_total_bytes(limit),
        None => ExtractOptions::default(),
    };
    Ok(store.with_extract_options(options))
}

/// The configured static directory, if it is usable.
fn static_dir(config: &Config) -> Option<PathBuf> {
    let dir = config.content.static_path.clone()?;
    if dir.is_dir() {
        Some(dir)
    } else {
        tracing::warn!(
            target: TRACING_TARGET,
            path = %dir.display(),
            "static content directory is not accessible, static routes disabled"
        );
        None
    }
}

async fn serve(config: Config, store: PackageStore) -> Result<()> {
    let store = Arc::new(store);
    {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            store.initialize_packages();
            log_report(&store.check_content_packages());
        })
        .await
        .context("startup scan failed")?;
    }

    let mut server_config = ServerConfig::new()
        .with_base_path(&config.webserver.base_path)
        .with_max_upload_bytes(config.webserver.max_upload_bytes);
    if let Some(dir) = static_dir(&config) {
        server_config = server_config.with_static_dir(dir);
    }
    let router = cds_server::app(AppState::new(store, server_config));

    let addr = SocketAddr::new(config.webserver.bind, config.webserver.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(target: TRACING_TARGET, %addr, "content delivery store listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: TRACING_TARGET, error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: TRACING_TARGET, "shutting down");
}

fn log_report(report: &ValidationReport) {
    let invalid = report.invalid().count();
    tracing::info!(
        target: TRACING_TARGET,
        total = report.packages.len(),
        invalid,
        "content package validation finished"
    );
}

fn check(store: &PackageStore, arg: &CheckArg) -> Result<()> {
    let report = store.check_content_packages();

    if let Some(path) = &arg.report {
        let json = serde_json::to_vec_pretty(&report)?;
        cds_fs::atomic_write(path, &json, AtomicWriteOptions::new().sync(true))
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    if arg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for package in &report.packages {
            if package.is_valid() {
                println!("{}: ok", package.id);
                continue;
            }
            println!("{}: invalid", package.id);
            for issue in &package.issues {
                println!("  - {issue}");
            }
        }
    }

    let invalid = report.invalid().count();
    if invalid > 0 {
        anyhow::bail!(
            "{invalid} of {} content packages failed validation",
            report.packages.len()
        );
    }
    Ok(())
}
